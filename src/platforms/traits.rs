use async_trait::async_trait;

use crate::core::stream::MediaStream;
use crate::error::GatewayError;
use crate::models::media::{DownloadRequest, VideoMetadata};
use crate::platforms::Platform;

/// Lightweight existence/availability verdict, checked before
/// committing to a download.
#[derive(Debug, Clone)]
pub struct Validation {
    pub valid: bool,
    pub error: Option<String>,
}

#[async_trait]
pub trait PlatformResolver: Send + Sync {
    fn platform(&self) -> Platform;

    /// Fetches and normalizes metadata for a canonical id. Expected
    /// failure modes never raise; they populate `VideoMetadata.error`.
    async fn get_metadata(&self, video_id: &str) -> VideoMetadata;

    /// Reuses `get_metadata` rather than duplicating error
    /// classification.
    async fn validate(&self, video_id: &str) -> Validation {
        let meta = self.get_metadata(video_id).await;
        match meta.error {
            Some(err) => Validation {
                valid: false,
                error: Some(err.message),
            },
            None => Validation {
                valid: true,
                error: None,
            },
        }
    }

    /// Opens the byte stream for a validated request. Best/Worst go to
    /// the platform's own best/worst primitive; concrete levels go
    /// through encoding selection or a format-selector expression,
    /// depending on how the platform delivers streams.
    async fn open_download(&self, request: &DownloadRequest)
        -> Result<MediaStream, GatewayError>;
}
