//! Ties the parser, registry and resolvers together: one resolution +
//! open attempt per call and no retries; retrying is the caller's call.

use crate::core::registry::ResolverRegistry;
use crate::core::stream::MediaStream;
use crate::core::url_parser;
use crate::error::GatewayError;
use crate::models::media::{DownloadRequest, VideoMetadata};
use crate::platforms::Platform;

/// Metadata-only action: raw URL in, normalized metadata out, no stream
/// opened. Parser and registry failures surface before any upstream
/// call; resolver failures ride inside `VideoMetadata.error`.
pub async fn fetch_metadata(
    registry: &ResolverRegistry,
    raw_url: &str,
) -> Result<VideoMetadata, GatewayError> {
    let locator = url_parser::parse(raw_url);

    if !locator.is_valid {
        return Err(GatewayError::InvalidUrl(
            locator
                .validation_error
                .unwrap_or_else(|| "invalid URL".to_string()),
        ));
    }

    let id = match locator.canonical_id {
        Some(id) => id,
        // Valid but unclassified: a shortener that still needs expansion.
        None => {
            return Err(GatewayError::InvalidUrl(
                locator
                    .validation_error
                    .unwrap_or_else(|| "could not extract a video id".to_string()),
            ))
        }
    };

    let resolver = registry
        .get(locator.platform)
        .ok_or(GatewayError::UnsupportedPlatform(locator.platform))?;

    Ok(resolver.get_metadata(&id).await)
}

/// Validates the request and opens the byte stream for it.
pub async fn resolve_and_open(
    registry: &ResolverRegistry,
    request: &DownloadRequest,
) -> Result<MediaStream, GatewayError> {
    if request.video_id.trim().is_empty() {
        return Err(GatewayError::InvalidUrl(
            "video id must not be empty".to_string(),
        ));
    }

    if request.platform == Platform::Unknown {
        return Err(GatewayError::UnsupportedPlatform(Platform::Unknown));
    }

    let resolver = registry
        .get(request.platform)
        .ok_or(GatewayError::UnsupportedPlatform(request.platform))?;

    resolver.open_download(request).await
}
