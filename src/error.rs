//! Error taxonomy for the resolution and download pipeline.
//!
//! Every failure a caller can observe is one of the kinds below, mapped
//! to an HTTP status and a structured `{error: {code, message, details}}`
//! payload. Errors discovered after streaming has begun cannot become a
//! payload anymore (headers are committed) and abort the connection
//! instead.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::quality::{FormatContainer, QualityLevel};
use crate::platforms::Platform;

/// Result type alias for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum GatewayError {
    /// The parser could not classify the input; no upstream call was made.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Recognized domain, but no resolver is implemented for it.
    #[error("{} downloads are not yet supported", .0.display_name())]
    UnsupportedPlatform(Platform),

    /// Upstream explicitly denies access. Terminal, not retryable.
    #[error("video is private or unavailable: {0}")]
    PrivateOrUnavailable(String),

    /// The id does not resolve to any content. Terminal, not retryable.
    #[error("video not found: {0}")]
    NotFound(String),

    /// Metadata succeeded but no encoding matches the requested
    /// quality/format. Retryable with a different selection only.
    #[error("no {container} encoding available at {quality}")]
    FormatNotAvailable {
        quality: QualityLevel,
        container: FormatContainer,
    },

    /// Selection succeeded but opening the stream failed. Transient.
    #[error("download failed: {0}")]
    DownloadFailed(String),

    /// Unclassified upstream failure; message preserved verbatim.
    #[error("upstream error: {0}")]
    Upstream(String),
}

impl GatewayError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            GatewayError::InvalidUrl(_) => 400,
            GatewayError::UnsupportedPlatform(_) => 501,
            GatewayError::PrivateOrUnavailable(_) => 403,
            GatewayError::NotFound(_) => 404,
            GatewayError::FormatNotAvailable { .. } => 400,
            GatewayError::DownloadFailed(_) => 502,
            GatewayError::Upstream(_) => 500,
        }
    }

    /// Machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        self.kind().code()
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::InvalidUrl(_) => ErrorKind::InvalidUrl,
            GatewayError::UnsupportedPlatform(_) => ErrorKind::UnsupportedPlatform,
            GatewayError::PrivateOrUnavailable(_) => ErrorKind::PrivateOrUnavailable,
            GatewayError::NotFound(_) => ErrorKind::NotFound,
            GatewayError::FormatNotAvailable { .. } => ErrorKind::FormatNotAvailable,
            GatewayError::DownloadFailed(_) => ErrorKind::DownloadFailed,
            GatewayError::Upstream(_) => ErrorKind::Upstream,
        }
    }
}

/// Serializable tag for the taxonomy, used where the full error cannot
/// travel (inside `VideoMetadata.error`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidUrl,
    UnsupportedPlatform,
    PrivateOrUnavailable,
    NotFound,
    FormatNotAvailable,
    DownloadFailed,
    Upstream,
}

impl ErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::InvalidUrl => "invalid_url",
            ErrorKind::UnsupportedPlatform => "unsupported_platform",
            ErrorKind::PrivateOrUnavailable => "private_or_unavailable",
            ErrorKind::NotFound => "not_found",
            ErrorKind::FormatNotAvailable => "format_not_available",
            ErrorKind::DownloadFailed => "download_failed",
            ErrorKind::Upstream => "upstream_error",
        }
    }
}

/// Failure embedded in a metadata object. Resolvers never raise for
/// expected failure modes; they populate this instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolveError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ResolveError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<ResolveError> for GatewayError {
    fn from(err: ResolveError) -> Self {
        match err.kind {
            ErrorKind::InvalidUrl => GatewayError::InvalidUrl(err.message),
            ErrorKind::UnsupportedPlatform => GatewayError::Upstream(err.message),
            ErrorKind::PrivateOrUnavailable => GatewayError::PrivateOrUnavailable(err.message),
            ErrorKind::NotFound => GatewayError::NotFound(err.message),
            ErrorKind::FormatNotAvailable => GatewayError::Upstream(err.message),
            ErrorKind::DownloadFailed => GatewayError::DownloadFailed(err.message),
            ErrorKind::Upstream => GatewayError::Upstream(err.message),
        }
    }
}

/// JSON error payload returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("validation_error", message)
    }
}

impl From<GatewayError> for ApiError {
    fn from(error: GatewayError) -> Self {
        let details = match &error {
            GatewayError::FormatNotAvailable { quality, container } => Some(serde_json::json!({
                "quality": quality,
                "format": container,
            })),
            GatewayError::UnsupportedPlatform(platform) => Some(serde_json::json!({
                "platform": platform,
            })),
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code: error.error_code().to_string(),
                message: error.to_string(),
                details,
            },
        }
    }
}
