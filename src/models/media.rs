use serde::{Deserialize, Serialize};

use crate::error::ResolveError;
use crate::models::quality::{sort_levels, FormatContainer, QualityLevel};
use crate::platforms::Platform;

/// Outcome of classifying a raw URL. Produced once per input, immutable,
/// never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoLocator {
    pub platform: Platform,
    pub raw_url: String,
    pub canonical_id: Option<String>,
    pub is_valid: bool,
    pub validation_error: Option<String>,
}

/// One concrete deliverable stream as reported by the upstream platform.
/// Rebuilt on every metadata fetch; never cached across requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformEncoding {
    /// Platform-native identifier (YouTube itag, yt-dlp format_id).
    pub id: String,
    /// Direct media URL when the platform reports one up front.
    pub url: Option<String>,
    pub mime_type: Option<String>,
    pub container: Option<FormatContainer>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub bitrate: Option<u64>,
    pub fps: Option<f64>,
    pub has_audio: bool,
    pub has_video: bool,
    pub quality_label: Option<String>,
}

impl PlatformEncoding {
    /// Abstract quality tier for this encoding, preferring the reported
    /// height and falling back to the textual label.
    pub fn quality_level(&self) -> Option<QualityLevel> {
        if let Some(h) = self.height {
            if let Some(level) = QualityLevel::from_height(h) {
                return Some(level);
            }
        }
        self.quality_label
            .as_deref()
            .and_then(QualityLevel::from_label)
    }
}

/// Normalized per-request metadata aggregate. `error` present means the
/// resolution partially or fully failed; callers must check it before
/// assuming the rest of the object is usable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub platform: Platform,
    pub id: String,
    pub title: String,
    pub duration_seconds: f64,
    pub thumbnail_url: Option<String>,
    pub author: Option<String>,
    pub available_qualities: Vec<QualityLevel>,
    pub encodings: Vec<PlatformEncoding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ResolveError>,
}

impl VideoMetadata {
    /// Shell carrying only the failure, for resolvers reporting an
    /// expected error without raising.
    pub fn failed(platform: Platform, id: &str, error: ResolveError) -> Self {
        Self {
            platform,
            id: id.to_string(),
            title: String::new(),
            duration_seconds: 0.0,
            thumbnail_url: None,
            author: None,
            available_qualities: Vec::new(),
            encodings: Vec::new(),
            error: Some(error),
        }
    }
}

/// The set of abstract quality tiers offered by a list of encodings,
/// deduplicated and sorted ascending. This is the only way
/// `VideoMetadata.available_qualities` gets built.
pub fn derive_quality_levels(encodings: &[PlatformEncoding]) -> Vec<QualityLevel> {
    let mut levels: Vec<QualityLevel> = Vec::new();
    for enc in encodings {
        if !enc.has_video {
            continue;
        }
        if let Some(level) = enc.quality_level() {
            if !levels.contains(&level) {
                levels.push(level);
            }
        }
    }
    sort_levels(&mut levels);
    levels
}

/// Validated download intent: which platform, which video, which tier
/// and container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadRequest {
    pub platform: Platform,
    pub video_id: String,
    pub quality: QualityLevel,
    pub container: FormatContainer,
}
