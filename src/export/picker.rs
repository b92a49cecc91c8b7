use std::{future::Future, path::PathBuf, sync::Mutex};

use crate::{
    composition::model::AspectRatio,
    foundation::{
        core::ResourceHandle,
        error::{ThumbError, ThumbResult},
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Media types offered by the picker.
pub enum MediaKind {
    /// Still images only.
    Images,
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Picker parameters.
pub struct PickRequest {
    /// Allowed media.
    pub media: MediaKind,
    /// Whether the user may crop before confirming.
    pub allows_editing: bool,
    /// Crop aspect hint.
    pub crop_aspect: AspectRatio,
    /// Requested quality in `(0, 1]`.
    pub quality: f32,
}

impl PickRequest {
    /// Request for a background photo matching `ratio`.
    pub fn background(ratio: AspectRatio) -> Self {
        Self {
            media: MediaKind::Images,
            allows_editing: true,
            crop_aspect: ratio,
            quality: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Picker response.
pub enum PickOutcome {
    /// The user backed out; nothing changes.
    Cancelled,
    /// The user chose an image.
    Picked(ResourceHandle),
}

/// Host image picker.
pub trait ImagePicker {
    /// Let the user choose an image.
    fn pick(&self, req: &PickRequest) -> impl Future<Output = ThumbResult<PickOutcome>>;
}

#[derive(Debug, Default)]
/// [`ImagePicker`] that hands out one preselected file, then reports cancellation.
pub struct PathPicker {
    path: Mutex<Option<PathBuf>>,
}

impl PathPicker {
    /// Picker yielding `path` once; `None` always cancels.
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path: Mutex::new(path),
        }
    }
}

impl ImagePicker for PathPicker {
    async fn pick(&self, req: &PickRequest) -> ThumbResult<PickOutcome> {
        if req.media != MediaKind::Images {
            return Err(ThumbError::validation("only image media can be picked"));
        }
        let next = self
            .path
            .lock()
            .map_err(|_| ThumbError::export("picker state poisoned"))?
            .take();
        let Some(path) = next else {
            tracing::debug!("image pick cancelled");
            return Ok(PickOutcome::Cancelled);
        };
        image::ImageFormat::from_path(&path).map_err(|_| {
            ThumbError::validation(format!("'{}' is not a known image format", path.display()))
        })?;
        tracing::debug!(path = %path.display(), crop = req.crop_aspect.label(), "image picked");
        Ok(PickOutcome::Picked(ResourceHandle::from(path)))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/picker.rs"]
mod tests;
