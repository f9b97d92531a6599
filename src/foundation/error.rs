/// Convenience result type used across spriteforge.
pub type SpriteResult<T> = Result<T, SpriteError>;

/// Top-level error taxonomy for fatal-to-run failures.
///
/// Per-part and per-file problems that only skip work are not errors; they are reported through
/// [`crate::ScanReport::skipped`] and [`crate::ComposedFrame::dropped`].
#[derive(thiserror::Error, Debug)]
pub enum SpriteError {
    /// Capture or override data violates a contract.
    #[error("validation error: {0}")]
    Validation(String),

    /// A document could not be parsed, even after trailing-comma repair.
    #[error("document error: {0}")]
    Document(String),

    /// An exporter refused its input (no frames, mismatched lengths, oversized frames).
    #[error("export error: {0}")]
    Export(String),

    /// Errors when serializing output metadata.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SpriteError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn document(msg: impl Into<String>) -> Self {
        Self::Document(msg.into())
    }

    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
