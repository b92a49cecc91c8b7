use std::{
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::{
    export::media::GalleryDir,
    foundation::{
        core::Viewport,
        error::{ThumbError, ThumbResult},
    },
    render::{backend::RenderSettings, text::FontSources},
};

/// Overrides `gallery.dir`.
pub const ENV_GALLERY_DIR: &str = "THUMBSMITH_GALLERY_DIR";
/// Overrides `viewport_width`.
pub const ENV_VIEWPORT_WIDTH: &str = "THUMBSMITH_VIEWPORT_WIDTH";
/// Overrides `pixel_ratio`.
pub const ENV_PIXEL_RATIO: &str = "THUMBSMITH_PIXEL_RATIO";
/// Overrides `seed`.
pub const ENV_SEED: &str = "THUMBSMITH_SEED";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
/// Runtime configuration. Every field has a default, so `{}` is a valid config.
pub struct ThumbConfig {
    /// Logical viewport width; the canvas takes 90% of it.
    pub viewport_width: f64,
    /// Device pixels per logical pixel.
    pub pixel_ratio: f64,
    /// RNG seed for reproducible random backgrounds; entropy when unset.
    pub seed: Option<u64>,
    /// Font files overriding system fonts.
    pub fonts: FontSources,
    /// Where exports are saved.
    pub gallery: GalleryConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
/// Gallery directory settings.
pub struct GalleryConfig {
    /// Directory receiving saved thumbnails.
    pub dir: PathBuf,
    /// When `false`, gallery permission is always denied.
    pub allow_write: bool,
}

impl Default for ThumbConfig {
    fn default() -> Self {
        Self {
            viewport_width: 390.0,
            pixel_ratio: 2.0,
            seed: None,
            fonts: FontSources::default(),
            gallery: GalleryConfig::default(),
        }
    }
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("gallery"),
            allow_write: true,
        }
    }
}

impl ThumbConfig {
    /// Load from a JSON file, apply environment overrides, and validate.
    pub fn from_path(path: &Path) -> ThumbResult<Self> {
        let f = File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
        let mut cfg = Self::from_reader(BufReader::new(f))?;
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse JSON without applying overrides.
    pub fn from_reader(r: impl Read) -> ThumbResult<Self> {
        serde_json::from_reader(r).map_err(|e| ThumbError::serde(format!("config: {e}")))
    }

    /// Apply `THUMBSMITH_*` environment overrides.
    pub fn apply_env(&mut self) -> ThumbResult<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`, keyed by the `ENV_*` names.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> ThumbResult<()> {
        if let Some(dir) = lookup(ENV_GALLERY_DIR).filter(|v| !v.is_empty()) {
            self.gallery.dir = PathBuf::from(dir);
        }
        if let Some(v) = lookup(ENV_VIEWPORT_WIDTH) {
            self.viewport_width = parse_override(ENV_VIEWPORT_WIDTH, &v)?;
        }
        if let Some(v) = lookup(ENV_PIXEL_RATIO) {
            self.pixel_ratio = parse_override(ENV_PIXEL_RATIO, &v)?;
        }
        if let Some(v) = lookup(ENV_SEED) {
            self.seed = Some(parse_override(ENV_SEED, &v)?);
        }
        Ok(())
    }

    /// Reject unusable values.
    pub fn validate(&self) -> ThumbResult<()> {
        self.viewport()?;
        if self.gallery.dir.as_os_str().is_empty() {
            return Err(ThumbError::validation("gallery.dir must be non-empty"));
        }
        Ok(())
    }

    /// Viewport described by this config.
    pub fn viewport(&self) -> ThumbResult<Viewport> {
        Viewport::new(self.viewport_width, self.pixel_ratio)
    }

    /// Backend settings described by this config.
    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            fonts: self.fonts.clone(),
        }
    }

    /// Media store described by this config.
    pub fn gallery(&self) -> GalleryDir {
        GalleryDir::new(self.gallery.dir.clone(), self.gallery.allow_write)
    }
}

fn parse_override<T: std::str::FromStr>(key: &str, value: &str) -> ThumbResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ThumbError::validation(format!("{key}: cannot parse '{value}'")))
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
