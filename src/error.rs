use std::fmt;
use thiserror::Error;

use crate::models::ImageRef;

/// Errors surfaced by the service clients and the annotator.
#[derive(Debug, Error)]
pub enum Error {
    #[error("object {bucket}/{key} not found")]
    NotFound { bucket: String, key: String },

    #[error("access denied for {bucket}/{key}")]
    AccessDenied { bucket: String, key: String },

    #[error("transient service failure: {0}")]
    Transient(String),

    #[error("unsupported image format for {bucket}/{key}")]
    UnsupportedImageFormat { bucket: String, key: String },

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Map an HTTP status to the error taxonomy. Returns `None` for
    /// success statuses.
    pub(crate) fn from_status(
        status: reqwest::StatusCode,
        bucket: &str,
        key: &str,
    ) -> Option<Self> {
        if status.is_success() {
            return None;
        }
        let err = match status.as_u16() {
            404 => Error::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            },
            401 | 403 => Error::AccessDenied {
                bucket: bucket.to_string(),
                key: key.to_string(),
            },
            415 => Error::UnsupportedImageFormat {
                bucket: bucket.to_string(),
                key: key.to_string(),
            },
            _ => Error::Transient(format!(
                "unexpected status {} for {}/{}",
                status, bucket, key
            )),
        };
        Some(err)
    }

    /// Transport-level failures (connect errors, timeouts) are treated
    /// as retryable.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        Error::Transient(err.to_string())
    }
}

/// Pipeline stage, used to identify where a batch item failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Detect,
    Report,
    Annotate,
    Display,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Fetch => "fetch",
            Stage::Detect => "detect",
            Stage::Report => "report",
            Stage::Annotate => "annotate",
            Stage::Display => "display",
        };
        f.write_str(name)
    }
}

/// A failure for one batch item, tagged with the stage and image that
/// produced it.
#[derive(Debug, Error)]
#[error("{stage} failed for {image}: {source}")]
pub struct BatchError {
    pub stage: Stage,
    pub image: ImageRef,
    #[source]
    pub source: Error,
}
