use std::io;
use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use tokio_util::sync::CancellationToken;

use crate::core::filename::attachment_filename;
use crate::core::selection::select_encoding;
use crate::core::stream::MediaStream;
use crate::error::{ErrorKind, GatewayError, ResolveError};
use crate::models::media::{
    derive_quality_levels, DownloadRequest, PlatformEncoding, VideoMetadata,
};
use crate::models::quality::{FormatContainer, QualityLevel};
use crate::platforms::traits::PlatformResolver;
use crate::platforms::Platform;

pub mod innertube;

use self::innertube::InnertubeClient;

/// YouTube resolver over a process-long InnerTube session. Constructed
/// once at startup and shared read-only across requests; never
/// re-created per request.
pub struct YouTubeResolver {
    innertube: InnertubeClient,
    http: reqwest::Client,
}

impl YouTubeResolver {
    pub fn new(request_timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(InnertubeClient::user_agent())
            .connect_timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_default();

        Self {
            innertube: InnertubeClient::new(http.clone(), request_timeout),
            http,
        }
    }

    #[cfg(test)]
    fn with_endpoint(endpoint: &str) -> Self {
        let http = reqwest::Client::new();
        Self {
            innertube: InnertubeClient::with_endpoint(
                http.clone(),
                endpoint,
                Duration::from_secs(5),
            ),
            http,
        }
    }

    /// Maps the InnerTube error vocabulary onto the error taxonomy.
    /// This classifier is YouTube's own; the yt-dlp-backed resolvers
    /// keep theirs separate because the vocabularies drift
    /// independently.
    fn classify_upstream_error(message: &str) -> ResolveError {
        let lower = message.to_lowercase();
        if lower.contains("private") || lower.contains("unavailable") || lower.contains("removed")
        {
            ResolveError::new(
                ErrorKind::PrivateOrUnavailable,
                "Video is private or unavailable.",
            )
        } else if lower.contains("not found") || lower.contains("invalid video id") {
            ResolveError::new(ErrorKind::NotFound, "Video not found.")
        } else {
            ResolveError::new(ErrorKind::Upstream, message)
        }
    }

    fn playability_failure(player: &serde_json::Value) -> Option<ResolveError> {
        let status = player
            .pointer("/playabilityStatus/status")
            .and_then(|v| v.as_str())
            .unwrap_or("ERROR");

        if status == "OK" {
            return None;
        }

        let reason = player
            .pointer("/playabilityStatus/reason")
            .and_then(|v| v.as_str())
            .unwrap_or(match status {
                "LOGIN_REQUIRED" => "This video is private",
                _ => "Video unavailable",
            });

        Some(Self::classify_upstream_error(reason))
    }

    fn encoding_from_format(format: &serde_json::Value, muxed: bool) -> Option<PlatformEncoding> {
        let mime = format.get("mimeType").and_then(|v| v.as_str());

        if !muxed && !mime.map(|m| m.starts_with("video/")).unwrap_or(false) {
            // Audio-only adaptive entry.
            return None;
        }

        let itag = format.get("itag").and_then(|v| v.as_u64())?;

        Some(PlatformEncoding {
            id: itag.to_string(),
            url: format
                .get("url")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
            mime_type: mime.map(|s| s.to_string()),
            container: mime.and_then(FormatContainer::from_mime),
            width: format.get("width").and_then(|v| v.as_u64()).map(|v| v as u32),
            height: format
                .get("height")
                .and_then(|v| v.as_u64())
                .map(|v| v as u32),
            bitrate: format
                .get("bitrate")
                .or_else(|| format.get("averageBitrate"))
                .and_then(|v| v.as_u64()),
            fps: format.get("fps").and_then(|v| v.as_f64()),
            has_audio: muxed,
            has_video: true,
            quality_label: format
                .get("qualityLabel")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
        })
    }

    fn parse_player(video_id: &str, player: &serde_json::Value) -> VideoMetadata {
        if let Some(failure) = Self::playability_failure(player) {
            return VideoMetadata::failed(Platform::Youtube, video_id, failure);
        }

        let details = player.get("videoDetails");

        let title = details
            .and_then(|d| d.get("title"))
            .and_then(|v| v.as_str())
            .unwrap_or("");

        if title.is_empty() {
            // A successful fetch without a title usually means a
            // restricted video masquerading as playable.
            return VideoMetadata::failed(
                Platform::Youtube,
                video_id,
                ResolveError::new(
                    ErrorKind::PrivateOrUnavailable,
                    "Video title is missing; the video may be restricted or unavailable.",
                ),
            );
        }

        let author = details
            .and_then(|d| d.get("author"))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());

        let duration_seconds = details
            .and_then(|d| d.get("lengthSeconds"))
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse::<f64>().ok())
            .unwrap_or(0.0);

        let thumbnail_url = details
            .and_then(|d| d.pointer("/thumbnail/thumbnails"))
            .and_then(|v| v.as_array())
            .and_then(|arr| arr.last())
            .and_then(|t| t.get("url"))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());

        let mut encodings: Vec<PlatformEncoding> = Vec::new();

        if let Some(formats) = player
            .pointer("/streamingData/formats")
            .and_then(|v| v.as_array())
        {
            for f in formats {
                if let Some(enc) = Self::encoding_from_format(f, true) {
                    encodings.push(enc);
                }
            }
        }

        if let Some(formats) = player
            .pointer("/streamingData/adaptiveFormats")
            .and_then(|v| v.as_array())
        {
            for f in formats {
                if let Some(enc) = Self::encoding_from_format(f, false) {
                    encodings.push(enc);
                }
            }
        }

        let available_qualities = derive_quality_levels(&encodings);

        VideoMetadata {
            platform: Platform::Youtube,
            id: video_id.to_string(),
            title: title.to_string(),
            duration_seconds,
            thumbnail_url,
            author,
            available_qualities,
            encodings,
            error: None,
        }
    }

    /// The platform's own best/worst pick: upstream bitrate order over
    /// the requested container, preferring muxed streams. Derived
    /// quality levels are never consulted here.
    fn pick_sentinel<'a>(
        encodings: &'a [PlatformEncoding],
        quality: QualityLevel,
        container: FormatContainer,
    ) -> Option<&'a PlatformEncoding> {
        let in_container = |enc: &&PlatformEncoding| {
            enc.has_video && enc.container == Some(container) && enc.url.is_some()
        };

        let muxed = encodings.iter().filter(in_container).filter(|e| e.has_audio);
        let picked = match quality {
            QualityLevel::Worst => muxed.min_by_key(|e| e.bitrate.unwrap_or(0)),
            _ => muxed.max_by_key(|e| e.bitrate.unwrap_or(0)),
        };
        if picked.is_some() {
            return picked;
        }

        let adaptive = encodings.iter().filter(in_container);
        match quality {
            QualityLevel::Worst => adaptive.min_by_key(|e| e.bitrate.unwrap_or(0)),
            _ => adaptive.max_by_key(|e| e.bitrate.unwrap_or(0)),
        }
    }

    async fn open_encoding(
        &self,
        encoding: &PlatformEncoding,
        container: FormatContainer,
        title: &str,
    ) -> Result<MediaStream, GatewayError> {
        let url = encoding.url.as_deref().ok_or_else(|| {
            GatewayError::DownloadFailed(format!("encoding {} has no direct URL", encoding.id))
        })?;

        let response = self
            .http
            .get(url)
            .header("Accept-Encoding", "identity")
            .send()
            .await
            .map_err(|e| GatewayError::DownloadFailed(e.to_string()))?;

        let response = response
            .error_for_status()
            .map_err(|e| GatewayError::DownloadFailed(e.to_string()))?;

        let bytes = response
            .bytes_stream()
            .map_err(|e| io::Error::other(e.to_string()));

        Ok(MediaStream::new(
            container,
            attachment_filename(title, "video"),
            bytes,
            CancellationToken::new(),
        ))
    }
}

#[async_trait]
impl PlatformResolver for YouTubeResolver {
    fn platform(&self) -> Platform {
        Platform::Youtube
    }

    async fn get_metadata(&self, video_id: &str) -> VideoMetadata {
        match self.innertube.player(video_id).await {
            Ok(player) => Self::parse_player(video_id, &player),
            Err(e) => {
                tracing::warn!("InnerTube player failed for {}: {}", video_id, e);
                VideoMetadata::failed(
                    Platform::Youtube,
                    video_id,
                    Self::classify_upstream_error(&e.to_string()),
                )
            }
        }
    }

    async fn open_download(&self, request: &DownloadRequest) -> Result<MediaStream, GatewayError> {
        let meta = self.get_metadata(&request.video_id).await;
        if let Some(err) = meta.error {
            return Err(err.into());
        }

        let encoding = if request.quality.is_sentinel() {
            Self::pick_sentinel(&meta.encodings, request.quality, request.container)
        } else {
            select_encoding(&meta.encodings, request.quality, request.container)
        };

        let encoding = encoding.ok_or(GatewayError::FormatNotAvailable {
            quality: request.quality,
            container: request.container,
        })?;

        self.open_encoding(encoding, request.container, &meta.title)
            .await
    }
}
