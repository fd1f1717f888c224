/// Crate-wide result alias.
pub type CaptionFxResult<T> = Result<T, CaptionFxError>;

/// Errors surfaced by compositing and export.
///
/// `MediaLoad`, `UnsupportedFormat`, `GraphicsContext` and `Encoder` are terminal for an export
/// attempt; the pipeline never retries them.
#[derive(thiserror::Error, Debug)]
pub enum CaptionFxError {
    /// The source clip could not be opened, probed or decoded.
    #[error("media load error: {0}")]
    MediaLoad(String),

    /// No acceptable output container/codec is available on this runtime.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The drawing surface could not be acquired or used.
    #[error("graphics context error: {0}")]
    GraphicsContext(String),

    /// The streaming encoder failed to start, accept a frame, or finalize.
    #[error("encoder error: {0}")]
    Encoder(String),

    /// Invalid input or configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// An export is already in flight for this pipeline.
    #[error("export busy: {0}")]
    Busy(String),

    /// JSON (de)serialization failure.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Anything else, with source context preserved.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Discriminant of [`CaptionFxError`] for programmatic matching and reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// See [`CaptionFxError::MediaLoad`].
    MediaLoad,
    /// See [`CaptionFxError::UnsupportedFormat`].
    UnsupportedFormat,
    /// See [`CaptionFxError::GraphicsContext`].
    GraphicsContext,
    /// See [`CaptionFxError::Encoder`].
    Encoder,
    /// See [`CaptionFxError::Validation`].
    Validation,
    /// See [`CaptionFxError::Busy`].
    Busy,
    /// See [`CaptionFxError::Serde`].
    Serde,
    /// See [`CaptionFxError::Other`].
    Other,
}

impl CaptionFxError {
    /// Build a [`CaptionFxError::MediaLoad`].
    pub fn media_load(msg: impl Into<String>) -> Self {
        Self::MediaLoad(msg.into())
    }

    /// Build a [`CaptionFxError::UnsupportedFormat`].
    pub fn unsupported_format(msg: impl Into<String>) -> Self {
        Self::UnsupportedFormat(msg.into())
    }

    /// Build a [`CaptionFxError::GraphicsContext`].
    pub fn graphics_context(msg: impl Into<String>) -> Self {
        Self::GraphicsContext(msg.into())
    }

    /// Build a [`CaptionFxError::Encoder`].
    pub fn encoder(msg: impl Into<String>) -> Self {
        Self::Encoder(msg.into())
    }

    /// Build a [`CaptionFxError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CaptionFxError::Busy`].
    pub fn busy(msg: impl Into<String>) -> Self {
        Self::Busy(msg.into())
    }

    /// Build a [`CaptionFxError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Return the variant discriminant.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MediaLoad(_) => ErrorKind::MediaLoad,
            Self::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            Self::GraphicsContext(_) => ErrorKind::GraphicsContext,
            Self::Encoder(_) => ErrorKind::Encoder,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Busy(_) => ErrorKind::Busy,
            Self::Serde(_) => ErrorKind::Serde,
            Self::Other(_) => ErrorKind::Other,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
