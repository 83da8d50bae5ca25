//! Request handlers.
//!
//! Download responses stream the upstream bytes straight through; once
//! headers are out, an upstream failure can only abort the connection
//! (logged server-side), never become a JSON body.

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::core::orchestrator;
use crate::core::stream::MediaStream;
use crate::error::{ApiError, GatewayError};
use crate::models::media::DownloadRequest;
use crate::models::quality::{FormatContainer, QualityLevel};
use crate::platforms::Platform;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct DownloadParams {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
    quality: Option<String>,
    format: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MetadataParams {
    url: Option<String>,
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiError::validation(message)),
    )
        .into_response()
}

fn stream_response(stream: MediaStream) -> Response {
    let content_type = stream.content_type();
    let disposition = format!("attachment; filename=\"{}\"", stream.attachment_name());

    match Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_DISPOSITION, disposition)
        .body(Body::from_stream(stream.into_body()))
    {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("failed to build streaming response: {}", e);
            GatewayError::Upstream(e.to_string()).into_response()
        }
    }
}

fn parse_download_params(
    params: &DownloadParams,
) -> Result<(String, QualityLevel, FormatContainer), Response> {
    let video_id = match params.video_id.as_deref() {
        Some(id) if !id.trim().is_empty() => id.trim().to_string(),
        _ => return Err(bad_request("videoId is required")),
    };

    let quality = match params.quality.as_deref() {
        Some(q) => q
            .parse::<QualityLevel>()
            .map_err(|e| bad_request(&e))?,
        None => return Err(bad_request("quality is required")),
    };

    let container = match params.format.as_deref() {
        Some(f) => f
            .parse::<FormatContainer>()
            .map_err(|e| bad_request(&e))?,
        None => return Err(bad_request("format is required")),
    };

    Ok((video_id, quality, container))
}

/// GET /download?videoId=..&quality=..&format=..
pub async fn download_youtube(
    State(state): State<AppState>,
    Query(params): Query<DownloadParams>,
) -> Response {
    let (video_id, quality, container) = match parse_download_params(&params) {
        Ok(parsed) => parsed,
        Err(response) => return response,
    };

    let request = DownloadRequest {
        platform: Platform::Youtube,
        video_id,
        quality,
        container,
    };

    match orchestrator::resolve_and_open(&state.registry, &request).await {
        Ok(stream) => stream_response(stream),
        Err(e) => {
            tracing::warn!("youtube download failed: {}", e);
            e.into_response()
        }
    }
}

/// GET /download/twitter?videoId=..&quality=..&format=mp4
///
/// The extraction backend delivers mp4 for this platform; other
/// containers would mean transcoding, which is out of scope.
pub async fn download_twitter(
    State(state): State<AppState>,
    Query(params): Query<DownloadParams>,
) -> Response {
    let mut params = params;
    if params.format.is_none() {
        params.format = Some("mp4".to_string());
    }

    let (video_id, quality, container) = match parse_download_params(&params) {
        Ok(parsed) => parsed,
        Err(response) => return response,
    };

    if container != FormatContainer::Mp4 {
        return bad_request("Only mp4 format is supported for Twitter videos");
    }

    let request = DownloadRequest {
        platform: Platform::Twitter,
        video_id,
        quality,
        container,
    };

    match orchestrator::resolve_and_open(&state.registry, &request).await {
        Ok(stream) => stream_response(stream),
        Err(e) => {
            tracing::warn!("twitter download failed: {}", e);
            e.into_response()
        }
    }
}

/// GET /metadata?url=..
///
/// Returns the normalized metadata without opening any stream. A
/// resolver failure rides inside the body's `error` field, with the
/// HTTP status drawn from its kind so clients can branch on either.
pub async fn video_metadata(
    State(state): State<AppState>,
    Query(params): Query<MetadataParams>,
) -> Response {
    let url = match params.url.as_deref() {
        Some(u) if !u.trim().is_empty() => u,
        _ => return bad_request("url is required"),
    };

    match orchestrator::fetch_metadata(&state.registry, url).await {
        Ok(meta) => match &meta.error {
            Some(err) => {
                let status = StatusCode::from_u16(GatewayError::from(err.clone()).status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                (status, Json(meta)).into_response()
            }
            None => (StatusCode::OK, Json(meta)).into_response(),
        },
        Err(e) => e.into_response(),
    }
}

/// GET /health
pub async fn health() -> Response {
    (StatusCode::OK, Json(json!({ "status": "ok" }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registry::ResolverRegistry;
    use crate::server::create_router;
    use axum::body::to_bytes;
    use axum::http::Request;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> axum::Router {
        create_router(Arc::new(ResolverRegistry::new()))
    }

    async fn get(uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (status, body) = get("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn download_requires_every_parameter() {
        for uri in [
            "/download",
            "/download?videoId=dQw4w9WgXcQ",
            "/download?videoId=dQw4w9WgXcQ&quality=720p",
            "/download?quality=720p&format=mp4",
        ] {
            let (status, body) = get(uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "expected 400 for {}", uri);
            assert_eq!(body["error"]["code"], "validation_error");
        }
    }

    #[tokio::test]
    async fn download_rejects_unknown_quality_and_format() {
        let (status, _) = get("/download?videoId=dQw4w9WgXcQ&quality=4k&format=mp4").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get("/download?videoId=dQw4w9WgXcQ&quality=720p&format=avi").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn twitter_download_is_mp4_only() {
        let (status, body) = get("/download/twitter?videoId=123&quality=best&format=webm").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("mp4"));
    }

    #[tokio::test]
    async fn twitter_download_defaults_format_to_mp4() {
        // No format param: passes validation, then fails at the (empty)
        // registry with the platform error rather than a 400.
        let (status, body) = get("/download/twitter?videoId=123&quality=best").await;
        assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
        assert_eq!(body["error"]["code"], "unsupported_platform");
    }

    #[tokio::test]
    async fn metadata_requires_url() {
        let (status, body) = get("/metadata").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "validation_error");
    }

    #[tokio::test]
    async fn metadata_rejects_invalid_url_without_upstream_call() {
        let (status, body) = get("/metadata?url=not-a-video-link").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "invalid_url");
    }

    #[tokio::test]
    async fn metadata_for_reserved_platform_is_not_implemented() {
        let (status, body) =
            get("/metadata?url=https://www.instagram.com/reel/CuV3xYzN1aB/").await;
        assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
        assert_eq!(body["error"]["code"], "unsupported_platform");
        assert_eq!(body["error"]["details"]["platform"], "instagram");
    }
}
