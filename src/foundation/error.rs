/// Convenience result type used across thumbsmith.
pub type ThumbResult<T> = Result<T, ThumbError>;

/// Top-level error taxonomy used by editor, render and export APIs.
///
/// State mutations on [`crate::CompositionState`] never produce errors; these variants cover
/// input validation, rasterization and the host-facing export collaborators.
#[derive(thiserror::Error, Debug)]
pub enum ThumbError {
    /// Invalid user-provided data (colors, config values, handles).
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while turning a scene plan into pixels.
    #[error("render error: {0}")]
    Render(String),

    /// Errors from capture, picking or media persistence.
    #[error("export error: {0}")]
    Export(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ThumbError {
    /// Build a [`ThumbError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ThumbError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`ThumbError::Export`] value.
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// Build a [`ThumbError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
