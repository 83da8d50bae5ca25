use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Cross-platform quality tier. The seven resolution levels are totally
/// ordered via [`QualityLevel::rank`]; `Best` and `Worst` are sentinels
/// resolved by the upstream provider and carry no rank of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QualityLevel {
    #[serde(rename = "240p")]
    Q240p,
    #[serde(rename = "360p")]
    Low,
    #[serde(rename = "480p")]
    Medium,
    #[serde(rename = "720p")]
    High,
    #[serde(rename = "1080p")]
    FullHd,
    #[serde(rename = "1440p")]
    Q1440p,
    #[serde(rename = "2160p")]
    UltraHd,
    #[serde(rename = "best")]
    Best,
    #[serde(rename = "worst")]
    Worst,
}

impl QualityLevel {
    /// Position in the concrete quality order, ascending. Sentinels have none.
    pub fn rank(&self) -> Option<u8> {
        match self {
            QualityLevel::Q240p => Some(0),
            QualityLevel::Low => Some(1),
            QualityLevel::Medium => Some(2),
            QualityLevel::High => Some(3),
            QualityLevel::FullHd => Some(4),
            QualityLevel::Q1440p => Some(5),
            QualityLevel::UltraHd => Some(6),
            QualityLevel::Best | QualityLevel::Worst => None,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(self, QualityLevel::Best | QualityLevel::Worst)
    }

    /// Nominal pixel height of a concrete level.
    pub fn height(&self) -> Option<u32> {
        match self {
            QualityLevel::Q240p => Some(240),
            QualityLevel::Low => Some(360),
            QualityLevel::Medium => Some(480),
            QualityLevel::High => Some(720),
            QualityLevel::FullHd => Some(1080),
            QualityLevel::Q1440p => Some(1440),
            QualityLevel::UltraHd => Some(2160),
            QualityLevel::Best | QualityLevel::Worst => None,
        }
    }

    /// Maps a reported stream height onto the level whose range contains it.
    pub fn from_height(height: u32) -> Option<QualityLevel> {
        if height >= 2160 {
            Some(QualityLevel::UltraHd)
        } else if height >= 1440 {
            Some(QualityLevel::Q1440p)
        } else if height >= 1080 {
            Some(QualityLevel::FullHd)
        } else if height >= 720 {
            Some(QualityLevel::High)
        } else if height >= 480 {
            Some(QualityLevel::Medium)
        } else if height >= 360 {
            Some(QualityLevel::Low)
        } else if height >= 240 {
            Some(QualityLevel::Q240p)
        } else {
            None
        }
    }

    /// Textual fallback when a stream reports a label but no height.
    pub fn from_label(label: &str) -> Option<QualityLevel> {
        // Check descending so "1440p" never matches the "144" of a smaller tier.
        for level in [
            QualityLevel::UltraHd,
            QualityLevel::Q1440p,
            QualityLevel::FullHd,
            QualityLevel::High,
            QualityLevel::Medium,
            QualityLevel::Low,
            QualityLevel::Q240p,
        ] {
            if label.contains(level.as_str()) {
                return Some(level);
            }
        }
        None
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QualityLevel::Q240p => "240p",
            QualityLevel::Low => "360p",
            QualityLevel::Medium => "480p",
            QualityLevel::High => "720p",
            QualityLevel::FullHd => "1080p",
            QualityLevel::Q1440p => "1440p",
            QualityLevel::UltraHd => "2160p",
            QualityLevel::Best => "best",
            QualityLevel::Worst => "worst",
        }
    }
}

impl fmt::Display for QualityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QualityLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "240p" => Ok(QualityLevel::Q240p),
            "360p" => Ok(QualityLevel::Low),
            "480p" => Ok(QualityLevel::Medium),
            "720p" => Ok(QualityLevel::High),
            "1080p" => Ok(QualityLevel::FullHd),
            "1440p" => Ok(QualityLevel::Q1440p),
            "2160p" => Ok(QualityLevel::UltraHd),
            "best" | "highest" => Ok(QualityLevel::Best),
            "worst" | "lowest" => Ok(QualityLevel::Worst),
            other => Err(format!("unknown quality level: {}", other)),
        }
    }
}

/// Sorts concrete levels ascending; sentinels sort after every concrete level.
pub fn sort_levels(levels: &mut [QualityLevel]) {
    levels.sort_by_key(|l| l.rank().unwrap_or(u8::MAX));
}

/// Highest-ranked concrete level in the set.
pub fn best_of(levels: &[QualityLevel]) -> Option<QualityLevel> {
    levels
        .iter()
        .filter(|l| !l.is_sentinel())
        .max_by_key(|l| l.rank())
        .copied()
}

/// Lowest-ranked concrete level in the set.
pub fn worst_of(levels: &[QualityLevel]) -> Option<QualityLevel> {
    levels
        .iter()
        .filter(|l| !l.is_sentinel())
        .min_by_key(|l| l.rank())
        .copied()
}

/// Media container negotiated with the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatContainer {
    Mp4,
    Webm,
}

impl FormatContainer {
    pub fn ext(&self) -> &'static str {
        match self {
            FormatContainer::Mp4 => "mp4",
            FormatContainer::Webm => "webm",
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            FormatContainer::Mp4 => "video/mp4",
            FormatContainer::Webm => "video/webm",
        }
    }

    /// Container implied by a MIME type such as `video/mp4; codecs="avc1..."`.
    pub fn from_mime(mime: &str) -> Option<FormatContainer> {
        let base = mime.split(';').next().unwrap_or(mime).trim();
        match base {
            "video/mp4" | "audio/mp4" => Some(FormatContainer::Mp4),
            "video/webm" | "audio/webm" => Some(FormatContainer::Webm),
            _ => None,
        }
    }
}

impl fmt::Display for FormatContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ext())
    }
}

impl FromStr for FormatContainer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mp4" => Ok(FormatContainer::Mp4),
            "webm" => Ok(FormatContainer::Webm),
            other => Err(format!("unknown format: {}", other)),
        }
    }
}
