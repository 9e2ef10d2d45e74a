use std::sync::Arc;

use crate::foundation::format::OutputFormat;

/// Convenience result type used across backdrop.
pub type BackdropResult<T> = Result<T, BackdropError>;

/// Top-level error taxonomy used by generation APIs.
///
/// The type is `Clone` so that every waiter on a shared in-flight generation
/// receives the same failure.
#[derive(thiserror::Error, Debug, Clone)]
pub enum BackdropError {
    /// Requested output format is not one of [`OutputFormat::ALL`].
    #[error("unsupported format: '{requested}' (supported: {})", OutputFormat::supported_list())]
    UnsupportedFormat {
        /// Format string as supplied by the caller.
        requested: String,
    },

    /// The source bitmap could not be obtained.
    #[error("source unavailable: {0}")]
    SourceUnavailable(String),

    /// Source bytes are not a decodable image.
    #[error("decode error: {0}")]
    Decode(String),

    /// Reading or publishing a cache entry failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// Malformed asset bundle or warp geometry.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies.
    #[error("{0:#}")]
    Other(Arc<anyhow::Error>),
}

impl BackdropError {
    /// Build a [`BackdropError::UnsupportedFormat`] value.
    pub fn unsupported_format(requested: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            requested: requested.into(),
        }
    }

    /// Build a [`BackdropError::SourceUnavailable`] value.
    pub fn source_unavailable(msg: impl Into<String>) -> Self {
        Self::SourceUnavailable(msg.into())
    }

    /// Build a [`BackdropError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`BackdropError::Storage`] value.
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Build a [`BackdropError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// `true` for failures caused by the request itself rather than the service.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedFormat { .. } | Self::SourceUnavailable(_) | Self::Decode(_)
        )
    }
}

impl From<anyhow::Error> for BackdropError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(Arc::new(err))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
