use std::collections::HashMap;

use anyhow::Context;

use crate::{
    assets::decode::{PreparedImage, decode_image},
    foundation::core::ResourceHandle,
    foundation::error::{ThumbError, ThumbResult},
};

#[derive(Clone, Debug, Default)]
/// Decoded background images keyed by the handle they were picked under.
///
/// Images are decoded before a handle is committed to the composition, so rendering never
/// touches the filesystem.
pub struct ImageStore {
    images: HashMap<ResourceHandle, PreparedImage>,
}

impl ImageStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and decode the image behind `handle` without touching the store.
    pub fn read(handle: &ResourceHandle) -> ThumbResult<PreparedImage> {
        let path = handle.to_path()?;
        let bytes = std::fs::read(&path)
            .with_context(|| format!("read image bytes from '{}'", path.display()))?;
        decode_image(&bytes)
    }

    /// Decode `handle` unless it is already present.
    pub fn ensure(&mut self, handle: &ResourceHandle) -> ThumbResult<&PreparedImage> {
        if !self.images.contains_key(handle) {
            let img = Self::read(handle)?;
            tracing::debug!(%handle, width = img.width, height = img.height, "decoded image");
            self.images.insert(handle.clone(), img);
        }
        self.get(handle)
    }

    /// Insert an already decoded image.
    pub fn insert(&mut self, handle: ResourceHandle, image: PreparedImage) {
        self.images.insert(handle, image);
    }

    /// Lookup a decoded image.
    pub fn get(&self, handle: &ResourceHandle) -> ThumbResult<&PreparedImage> {
        self.images
            .get(handle)
            .ok_or_else(|| ThumbError::render(format!("image '{handle}' was not loaded")))
    }

    /// Return `true` when `handle` has been decoded.
    pub fn contains(&self, handle: &ResourceHandle) -> bool {
        self.images.contains_key(handle)
    }

    /// Drop every image except `keep`.
    pub fn retain_only(&mut self, keep: Option<&ResourceHandle>) {
        self.images.retain(|h, _| Some(h) == keep);
    }

    /// Number of decoded images held.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Return `true` when no images are held.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
