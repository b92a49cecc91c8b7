//! Thumbsmith composes thumbnail graphics and exports them as PNG files.
//!
//! A thumbnail is a canvas with one background (solid color, two-stop gradient, or a photo)
//! and three text layers (title, subtitle, description). The crate is split into:
//!
//! - [`CompositionState`]: the editable aggregate and its pure mutations, also reachable as
//!   [`Action`] values through one reducer entry point
//! - [`compile_scene`]: a pure display list for a state, drawn by a [`RenderBackend`]
//! - [`ExportPipeline`]: capture, gallery permission, then atomic save
//! - [`Editor`]: the application root tying these together
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod composition;
mod config;
mod editor;
mod export;
mod foundation;
mod render;

pub use crate::assets::decode::{PreparedImage, decode_image};
pub use crate::assets::store::ImageStore;
pub use crate::composition::action::{Action, parse_script};
pub use crate::composition::layout::{CANVAS_WIDTH_FRACTION, canvas_for, canvas_logical_size};
pub use crate::composition::model::{
    AspectRatio, Background, ColorTarget, CompositionState, FONT_STEP, FontSizeRange, FontStep,
    TextLayer, TextLayerId, TextLayers,
};
pub use crate::config::{
    ENV_GALLERY_DIR, ENV_PIXEL_RATIO, ENV_SEED, ENV_VIEWPORT_WIDTH, GalleryConfig, ThumbConfig,
};
pub use crate::editor::Editor;
pub use crate::export::capture::{
    CaptureFormat, CaptureRequest, CaptureService, CapturedImage, PngCapture, RenderedCanvas,
    encode_png,
};
pub use crate::export::media::{GalleryDir, MediaStore, Permission, SavedAsset};
pub use crate::export::picker::{ImagePicker, MediaKind, PathPicker, PickOutcome, PickRequest};
pub use crate::export::pipeline::{
    CancelToken, ExportOutcome, ExportPhase, ExportPipeline, PERMISSION_NOTICE, PermissionChoice,
    PermissionNotice, PermissionPrompt, SAVE_FAILED_NOTICE, SAVED_NOTICE,
};
pub use crate::foundation::color::HexColor;
pub use crate::foundation::core::{Affine, Canvas, Point, ResourceHandle, Size, Viewport};
pub use crate::foundation::error::{ThumbError, ThumbResult};
pub use crate::render::backend::{
    BackendKind, FrameRGBA, RenderBackend, RenderSettings, create_backend,
};
pub use crate::render::cpu::CpuBackend;
pub use crate::render::layout::{
    TextBlock, center_offset, cover_transform, gradient_axis, stack_text_blocks,
};
pub use crate::render::plan::{
    DESCRIPTION_BOTTOM_INSET, DrawOp, FLOW_MARGIN_BOTTOM, FontWeight, ScenePlan, TextAnchor,
    TextOp, compile_scene,
};
pub use crate::render::text::{FontFace, FontSet, FontSources};
