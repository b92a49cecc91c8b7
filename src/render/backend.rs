use crate::{
    assets::store::ImageStore, foundation::error::ThumbResult, render::plan::ScenePlan,
    render::text::FontSources,
};

/// A rendered canvas as RGBA8 pixels.
///
/// Frames are **premultiplied alpha**. The `premultiplied` flag makes this explicit at API
/// boundaries; export un-premultiplies before encoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// RGBA8 of the pixel at (`x`, `y`), if in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// A renderer that executes a compiled [`ScenePlan`] into a [`FrameRGBA`].
///
/// Most callers go through [`crate::Editor`], which recompiles and renders after every
/// state change.
pub trait RenderBackend {
    /// Draw every op of `plan` and read back the final frame.
    ///
    /// Images referenced by the plan must already be decoded in `images`.
    fn render_scene(&mut self, plan: &ScenePlan, images: &ImageStore) -> ThumbResult<FrameRGBA>;
}

/// Available backend kinds.
#[derive(Clone, Copy, Debug, Default)]
pub enum BackendKind {
    /// CPU raster backend powered by `vello_cpu`.
    #[default]
    Cpu,
}

/// Backend-agnostic settings.
#[derive(Clone, Debug, Default)]
pub struct RenderSettings {
    /// Font files to use instead of system fonts.
    pub fonts: FontSources,
}

/// Create a rendering backend implementation.
pub fn create_backend(kind: BackendKind, settings: &RenderSettings) -> Box<dyn RenderBackend> {
    match kind {
        BackendKind::Cpu => Box::new(crate::render::cpu::CpuBackend::new(settings.clone())),
    }
}
