use std::path::PathBuf;

use crate::foundation::error::{ThumbError, ThumbResult};

pub use kurbo::{Affine, Point, Size};

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Canvas size as floating-point pixels.
    pub fn size(self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }
}

/// The host window the canvas is laid out in.
///
/// `width` is in logical (density-independent) pixels; `pixel_ratio` maps logical pixels to
/// physical pixels, the same way a phone screen reports its density.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    /// Logical viewport width.
    pub width: f64,
    /// Physical pixels per logical pixel.
    pub pixel_ratio: f64,
}

impl Viewport {
    /// Create a validated viewport.
    pub fn new(width: f64, pixel_ratio: f64) -> ThumbResult<Self> {
        if !width.is_finite() || width <= 0.0 {
            return Err(ThumbError::validation(
                "viewport width must be finite and > 0",
            ));
        }
        if !pixel_ratio.is_finite() || pixel_ratio <= 0.0 {
            return Err(ThumbError::validation(
                "viewport pixel_ratio must be finite and > 0",
            ));
        }
        Ok(Self { width, pixel_ratio })
    }
}

/// Opaque reference to an image resource handed out by a picker or a media store.
///
/// The core never interprets the handle beyond resolving `file://` URIs and bare paths when an
/// image has to be decoded.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ResourceHandle(String);

impl ResourceHandle {
    /// Wrap a URI or path.
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    /// Raw handle text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolve to a local filesystem path.
    ///
    /// Accepts `file://` URIs and scheme-less paths. Other schemes are rejected.
    pub fn to_path(&self) -> ThumbResult<PathBuf> {
        let s = self.0.trim();
        if s.is_empty() {
            return Err(ThumbError::validation("resource handle must be non-empty"));
        }
        if let Some(rest) = s.strip_prefix("file://") {
            return Ok(PathBuf::from(rest));
        }
        if let Some((scheme, _)) = s.split_once("://") {
            return Err(ThumbError::validation(format!(
                "unsupported resource scheme '{scheme}'"
            )));
        }
        Ok(PathBuf::from(s))
    }
}

impl From<PathBuf> for ResourceHandle {
    fn from(p: PathBuf) -> Self {
        Self(p.to_string_lossy().into_owned())
    }
}

impl std::fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
