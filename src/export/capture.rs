use std::{future::Future, io::Cursor, sync::Arc};

use anyhow::Context as _;

use crate::{
    assets::decode::unpremultiply_rgba8_in_place,
    foundation::{
        core::Canvas,
        error::{ThumbError, ThumbResult},
    },
    render::backend::FrameRGBA,
};

#[derive(Clone, Debug)]
/// Latest frame drawn for the mounted canvas.
///
/// Frames are immutable once rendered; export captures clone the `Arc`, never the pixels.
pub struct RenderedCanvas {
    /// Rendered pixels.
    pub frame: Arc<FrameRGBA>,
    /// Canvas the frame was rendered for.
    pub canvas: Canvas,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Lossless output formats supported by capture.
pub enum CaptureFormat {
    /// PNG with straight alpha.
    #[default]
    Png,
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Capture parameters.
pub struct CaptureRequest {
    /// Output format.
    pub format: CaptureFormat,
    /// Quality in `(0, 1]`; lossless formats only validate it.
    pub quality: f32,
}

impl Default for CaptureRequest {
    fn default() -> Self {
        Self {
            format: CaptureFormat::Png,
            quality: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Encoded snapshot of a rendered canvas.
pub struct CapturedImage {
    /// Encoding of `bytes`.
    pub format: CaptureFormat,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Encoded file bytes.
    pub bytes: Vec<u8>,
}

/// Turns a rendered surface into a standalone encoded image.
pub trait CaptureService {
    /// Snapshot `surface` as requested.
    fn capture(
        &self,
        surface: &RenderedCanvas,
        req: &CaptureRequest,
    ) -> impl Future<Output = ThumbResult<CapturedImage>>;
}

#[derive(Clone, Copy, Debug, Default)]
/// [`CaptureService`] that encodes PNG on the blocking pool.
pub struct PngCapture;

impl CaptureService for PngCapture {
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(w = surface.canvas.width, h = surface.canvas.height)
    )]
    async fn capture(
        &self,
        surface: &RenderedCanvas,
        req: &CaptureRequest,
    ) -> ThumbResult<CapturedImage> {
        if !req.quality.is_finite() || req.quality <= 0.0 || req.quality > 1.0 {
            return Err(ThumbError::validation("capture quality must be in (0, 1]"));
        }
        let format = req.format;
        let frame = Arc::clone(&surface.frame);
        let bytes = tokio::task::spawn_blocking(move || encode_png(&frame))
            .await
            .context("join png encoder task")??;
        tracing::debug!(bytes = bytes.len(), "captured canvas");
        Ok(CapturedImage {
            format,
            width: surface.frame.width,
            height: surface.frame.height,
            bytes,
        })
    }
}

/// Encode a frame as PNG, un-premultiplying alpha first when needed.
pub fn encode_png(frame: &FrameRGBA) -> ThumbResult<Vec<u8>> {
    let expected = (frame.width as usize) * (frame.height as usize) * 4;
    if frame.data.len() != expected {
        return Err(ThumbError::export("frame byte length mismatch"));
    }

    let mut data = frame.data.clone();
    if frame.premultiplied {
        unpremultiply_rgba8_in_place(&mut data);
    }
    let img = image::RgbaImage::from_raw(frame.width, frame.height, data)
        .ok_or_else(|| ThumbError::export("frame buffer does not match its dimensions"))?;

    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .context("encode png")?;
    Ok(out.into_inner())
}

#[cfg(test)]
#[path = "../../tests/unit/export/capture.rs"]
mod tests;
