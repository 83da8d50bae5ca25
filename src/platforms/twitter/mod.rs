use std::path::PathBuf;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::core::filename::attachment_filename;
use crate::core::selection::ytdlp_format_selector;
use crate::core::stream::MediaStream;
use crate::core::ytdlp;
use crate::error::{ErrorKind, GatewayError, ResolveError};
use crate::models::media::{
    derive_quality_levels, DownloadRequest, PlatformEncoding, VideoMetadata,
};
use crate::models::quality::{FormatContainer, QualityLevel};
use crate::platforms::traits::PlatformResolver;
use crate::platforms::Platform;

/// Twitter/X resolver backed by the yt-dlp extraction backend. The
/// backend negotiates muxing itself, so downloads are expressed as a
/// format-selector expression rather than a concrete encoding id.
const YTDLP_MISSING: &str = "yt-dlp binary not found; install it or set VIDGATE_YTDLP_PATH";

pub struct TwitterResolver {
    /// Explicit binary path from configuration; `$PATH` probe otherwise.
    ytdlp_path: Option<PathBuf>,
}

impl TwitterResolver {
    pub fn new(ytdlp_path: Option<PathBuf>) -> Self {
        Self { ytdlp_path }
    }

    /// The username segment is irrelevant to the upstream lookup.
    fn canonical_url(tweet_id: &str) -> String {
        format!("https://twitter.com/i/status/{}", tweet_id)
    }

    /// Maps the yt-dlp error vocabulary onto the error taxonomy. Kept
    /// separate from the YouTube classifier: the vocabularies are not
    /// stable and must not cross-contaminate.
    fn classify_upstream_error(message: &str) -> ResolveError {
        let lower = message.to_lowercase();
        if lower.contains("private video") || lower.contains("protected") {
            ResolveError::new(ErrorKind::PrivateOrUnavailable, "This video is private.")
        } else if lower.contains("video unavailable") {
            ResolveError::new(
                ErrorKind::PrivateOrUnavailable,
                "This video is unavailable.",
            )
        } else if lower.contains("no media found") {
            ResolveError::new(
                ErrorKind::NotFound,
                "No media found in the tweet or the URL is invalid.",
            )
        } else if lower.contains("unable to download webpage") || lower.contains("not found") {
            ResolveError::new(ErrorKind::NotFound, "Tweet not found or inaccessible.")
        } else if lower.contains("unsupported url") {
            ResolveError::new(ErrorKind::InvalidUrl, "The provided URL is not supported.")
        } else {
            ResolveError::new(ErrorKind::Upstream, message)
        }
    }

    fn encoding_from_format(format: &serde_json::Value) -> Option<PlatformEncoding> {
        let ext = format.get("ext").and_then(|v| v.as_str())?;
        let vcodec = format.get("vcodec").and_then(|v| v.as_str()).unwrap_or("none");
        let height = format.get("height").and_then(|v| v.as_u64())? as u32;

        if ext != "mp4" || vcodec == "none" || height == 0 {
            return None;
        }

        let acodec = format.get("acodec").and_then(|v| v.as_str()).unwrap_or("none");
        let has_audio = acodec != "none";

        let mime = if has_audio {
            format!("video/mp4; codecs=\"{}, {}\"", vcodec, acodec)
        } else {
            format!("video/mp4; codecs=\"{}\"", vcodec)
        };

        Some(PlatformEncoding {
            id: format
                .get("format_id")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown")
                .to_string(),
            url: format
                .get("url")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
            mime_type: Some(mime),
            container: Some(FormatContainer::Mp4),
            width: format.get("width").and_then(|v| v.as_u64()).map(|v| v as u32),
            height: Some(height),
            // tbr is kbit/s from yt-dlp.
            bitrate: format
                .get("tbr")
                .and_then(|v| v.as_f64())
                .map(|v| (v * 1000.0) as u64),
            fps: format.get("fps").and_then(|v| v.as_f64()),
            has_audio,
            has_video: true,
            quality_label: format
                .get("format_note")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
                .or(Some(format!("{}p", height))),
        })
    }

    fn parse_info(tweet_id: &str, json: &serde_json::Value) -> VideoMetadata {
        let formats = match json.get("formats").and_then(|v| v.as_array()) {
            Some(f) => f,
            None => {
                return VideoMetadata::failed(
                    Platform::Twitter,
                    tweet_id,
                    ResolveError::new(
                        ErrorKind::NotFound,
                        "No video formats found in the tweet.",
                    ),
                )
            }
        };

        let title = json
            .get("title")
            .or_else(|| json.get("fulltitle"))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .unwrap_or_else(|| format!("Twitter Video {}", tweet_id));

        let duration_seconds = json.get("duration").and_then(|v| v.as_f64()).unwrap_or(0.0);

        let thumbnail_url = json
            .get("thumbnail")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());

        let author = json
            .get("uploader")
            .or_else(|| json.get("channel"))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());

        let encodings: Vec<PlatformEncoding> =
            formats.iter().filter_map(Self::encoding_from_format).collect();

        let mut available_qualities = derive_quality_levels(&encodings);
        if available_qualities.is_empty() && !encodings.is_empty() {
            // Formats exist but none maps to a concrete tier; leave the
            // client something selectable.
            available_qualities.push(QualityLevel::Best);
        }

        VideoMetadata {
            platform: Platform::Twitter,
            id: tweet_id.to_string(),
            title,
            duration_seconds,
            thumbnail_url,
            author,
            available_qualities,
            encodings,
            error: None,
        }
    }

    async fn binary(&self) -> Result<PathBuf, GatewayError> {
        ytdlp::find_ytdlp(self.ytdlp_path.as_deref())
            .await
            .ok_or_else(|| GatewayError::Upstream(YTDLP_MISSING.to_string()))
    }
}

#[async_trait]
impl PlatformResolver for TwitterResolver {
    fn platform(&self) -> Platform {
        Platform::Twitter
    }

    async fn get_metadata(&self, video_id: &str) -> VideoMetadata {
        let bin = match self.binary().await {
            Ok(bin) => bin,
            Err(_) => {
                return VideoMetadata::failed(
                    Platform::Twitter,
                    video_id,
                    ResolveError::new(ErrorKind::Upstream, YTDLP_MISSING),
                )
            }
        };

        let url = Self::canonical_url(video_id);
        match ytdlp::get_video_info(&bin, &url).await {
            Ok(json) => Self::parse_info(video_id, &json),
            Err(e) => {
                tracing::warn!("yt-dlp info failed for tweet {}: {}", video_id, e);
                VideoMetadata::failed(
                    Platform::Twitter,
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

        let bin = self.binary().await?;
        let url = Self::canonical_url(&request.video_id);
        let selector = ytdlp_format_selector(request.quality, request.container);
        tracing::debug!("using format selector {} for {}", selector, url);

        let cancel = CancellationToken::new();
        let stream = ytdlp::stream_download(&bin, &url, &selector, cancel.clone())
            .await
            .map_err(|e| GatewayError::DownloadFailed(e.to_string()))?;

        let fallback = format!("twitter_video_{}", request.video_id);
        Ok(MediaStream::new(
            request.container,
            attachment_filename(&meta.title, &fallback),
            stream,
            cancel,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn canonical_url_ignores_username() {
        assert_eq!(
            TwitterResolver::canonical_url("1410624005669169154"),
            "https://twitter.com/i/status/1410624005669169154"
        );
    }

    #[test]
    fn classifier_maps_each_upstream_phrase() {
        let cases = [
            ("ERROR: Private video, use cookies", ErrorKind::PrivateOrUnavailable),
            ("ERROR: Video unavailable", ErrorKind::PrivateOrUnavailable),
            ("ERROR: No media found in tweet", ErrorKind::NotFound),
            (
                "ERROR: Unable to download webpage: HTTP 404",
                ErrorKind::NotFound,
            ),
            ("ERROR: Unsupported URL: https://x.com/foo", ErrorKind::InvalidUrl),
            ("something completely different", ErrorKind::Upstream),
        ];

        for (message, expected) in cases {
            let err = TwitterResolver::classify_upstream_error(message);
            assert_eq!(err.kind, expected, "wrong kind for {:?}", message);
        }
    }

    #[test]
    fn classifier_preserves_unknown_messages() {
        let raw = "ExtractorError: twitter said 42";
        let err = TwitterResolver::classify_upstream_error(raw);
        assert_eq!(err.message, raw);
    }

    #[test]
    fn parse_info_keeps_only_mp4_video_formats() {
        let json = json!({
            "title": "A rocket launch",
            "duration": 42.5,
            "uploader": "NASA",
            "thumbnail": "https://pbs.twimg.com/thumb.jpg",
            "formats": [
                { "format_id": "hls-audio", "ext": "mp4", "vcodec": "none",
                  "acodec": "mp4a", "height": 0 },
                { "format_id": "http-360", "ext": "mp4", "vcodec": "avc1",
                  "acodec": "mp4a", "width": 480, "height": 360,
                  "tbr": 800.0, "url": "https://video.twimg.com/360.mp4" },
                { "format_id": "http-720", "ext": "mp4", "vcodec": "avc1",
                  "acodec": "mp4a", "width": 1280, "height": 720,
                  "tbr": 2200.0, "url": "https://video.twimg.com/720.mp4" },
                { "format_id": "hls-720", "ext": "m3u8", "vcodec": "avc1",
                  "acodec": "mp4a", "height": 720 }
            ]
        });

        let meta = TwitterResolver::parse_info("123", &json);
        assert!(meta.error.is_none());
        assert_eq!(meta.title, "A rocket launch");
        assert_eq!(meta.author.as_deref(), Some("NASA"));
        assert_eq!(meta.encodings.len(), 2);
        assert_eq!(
            meta.available_qualities,
            vec![QualityLevel::Low, QualityLevel::High]
        );
    }

    #[test]
    fn parse_info_emits_synthetic_best_when_no_tier_maps() {
        let json = json!({
            "formats": [
                { "format_id": "tiny", "ext": "mp4", "vcodec": "avc1",
                  "acodec": "mp4a", "width": 160, "height": 120,
                  "url": "https://video.twimg.com/tiny.mp4" }
            ]
        });

        let meta = TwitterResolver::parse_info("123", &json);
        assert_eq!(meta.encodings.len(), 1);
        assert_eq!(meta.available_qualities, vec![QualityLevel::Best]);
    }

    #[test]
    fn parse_info_without_formats_is_not_found() {
        let meta = TwitterResolver::parse_info("123", &json!({ "title": "text only" }));
        let err = meta.error.expect("missing formats is a failure");
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[test]
    fn parse_info_defaults_title_to_tweet_id() {
        let json = json!({
            "formats": [
                { "format_id": "http-720", "ext": "mp4", "vcodec": "avc1",
                  "acodec": "mp4a", "height": 720,
                  "url": "https://video.twimg.com/720.mp4" }
            ]
        });
        let meta = TwitterResolver::parse_info("998877", &json);
        assert_eq!(meta.title, "Twitter Video 998877");
    }
}
