//! Concrete-encoding selection for a requested quality/format.
//!
//! One linear pass, no fan-out: the first muxed match wins immediately,
//! the first video-only match is kept as a fallback, and a miss is a
//! miss, with no silent substitution of a different tier.

use crate::models::media::PlatformEncoding;
use crate::models::quality::{FormatContainer, QualityLevel};

/// Picks the encoding matching `quality` + `container`, preferring one
/// that already carries both audio and video over an adaptive
/// (video-only) stream that would need merging.
pub fn select_encoding<'a>(
    encodings: &'a [PlatformEncoding],
    quality: QualityLevel,
    container: FormatContainer,
) -> Option<&'a PlatformEncoding> {
    let mut adaptive_fallback: Option<&PlatformEncoding> = None;

    for enc in encodings {
        if !enc.has_video {
            continue;
        }
        if enc.quality_level() != Some(quality) {
            continue;
        }
        if enc.container != Some(container) {
            continue;
        }
        if enc.has_audio {
            return Some(enc);
        }
        if adaptive_fallback.is_none() {
            adaptive_fallback = Some(enc);
        }
    }

    adaptive_fallback
}

/// yt-dlp format-selector expression for the extraction-backend path.
/// The backend negotiates muxing itself; this only has to express the
/// ceiling: best, worst, or "best video at or under N pixels, preferring
/// the requested container, paired with best audio".
pub fn ytdlp_format_selector(quality: QualityLevel, container: FormatContainer) -> String {
    let ext = container.ext();
    match quality {
        QualityLevel::Best => format!(
            "bestvideo[ext={ext}]+bestaudio[ext=m4a]/best[ext={ext}]/best"
        ),
        QualityLevel::Worst => format!(
            "worstvideo[ext={ext}]+bestaudio[ext=m4a]/worst[ext={ext}]/worst"
        ),
        level => {
            // Concrete levels always carry a height.
            let h = level.height().unwrap_or(1080);
            format!(
                "bestvideo[height<={h}][ext={ext}]+bestaudio[ext=m4a]/best[ext={ext}][height<={h}]/best[height<={h}]"
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enc(
        id: &str,
        height: u32,
        container: FormatContainer,
        audio: bool,
    ) -> PlatformEncoding {
        PlatformEncoding {
            id: id.to_string(),
            url: Some(format!("https://cdn.example/{id}")),
            mime_type: Some(container.mime().to_string()),
            container: Some(container),
            width: None,
            height: Some(height),
            bitrate: None,
            fps: None,
            has_audio: audio,
            has_video: true,
            quality_label: None,
        }
    }

    #[test]
    fn muxed_beats_adaptive_regardless_of_order() {
        let muxed = enc("muxed", 720, FormatContainer::Mp4, true);
        let adaptive = enc("adaptive", 720, FormatContainer::Mp4, false);

        for list in [
            vec![muxed.clone(), adaptive.clone()],
            vec![adaptive.clone(), muxed.clone()],
        ] {
            let picked = select_encoding(&list, QualityLevel::High, FormatContainer::Mp4)
                .expect("a 720p mp4 exists");
            assert_eq!(picked.id, "muxed");
        }
    }

    #[test]
    fn adaptive_webm_never_substitutes_for_mp4() {
        // A muxed 720p mp4 next to an adaptive 720p webm: requesting
        // 720p/mp4 must return the muxed mp4, never the adaptive webm.
        let list = vec![
            enc("adaptive-webm", 720, FormatContainer::Webm, false),
            enc("muxed-mp4", 720, FormatContainer::Mp4, true),
        ];
        let picked = select_encoding(&list, QualityLevel::High, FormatContainer::Mp4).unwrap();
        assert_eq!(picked.id, "muxed-mp4");
    }

    #[test]
    fn adaptive_is_used_when_nothing_muxed_matches() {
        let list = vec![
            enc("muxed-480", 480, FormatContainer::Mp4, true),
            enc("adaptive-1080", 1080, FormatContainer::Mp4, false),
        ];
        let picked = select_encoding(&list, QualityLevel::FullHd, FormatContainer::Mp4).unwrap();
        assert_eq!(picked.id, "adaptive-1080");
    }

    #[test]
    fn first_adaptive_match_is_the_fallback() {
        let list = vec![
            enc("adaptive-a", 1080, FormatContainer::Mp4, false),
            enc("adaptive-b", 1080, FormatContainer::Mp4, false),
        ];
        let picked = select_encoding(&list, QualityLevel::FullHd, FormatContainer::Mp4).unwrap();
        assert_eq!(picked.id, "adaptive-a");
    }

    #[test]
    fn miss_is_a_miss_not_a_substitution() {
        // Only 480p and 2160p exist; a 1080p request must miss.
        let list = vec![
            enc("sd", 480, FormatContainer::Mp4, true),
            enc("uhd", 2160, FormatContainer::Mp4, true),
        ];
        assert!(select_encoding(&list, QualityLevel::FullHd, FormatContainer::Mp4).is_none());
    }

    #[test]
    fn audio_only_entries_are_skipped() {
        let mut audio = enc("audio", 0, FormatContainer::Mp4, true);
        audio.has_video = false;
        audio.height = None;
        let list = vec![audio, enc("video", 720, FormatContainer::Mp4, true)];
        let picked = select_encoding(&list, QualityLevel::High, FormatContainer::Mp4).unwrap();
        assert_eq!(picked.id, "video");
    }

    #[test]
    fn selection_is_deterministic() {
        let list = vec![
            enc("a", 720, FormatContainer::Mp4, false),
            enc("b", 720, FormatContainer::Mp4, true),
            enc("c", 720, FormatContainer::Mp4, true),
        ];
        let first = select_encoding(&list, QualityLevel::High, FormatContainer::Mp4).unwrap();
        let second = select_encoding(&list, QualityLevel::High, FormatContainer::Mp4).unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.id, "b");
    }

    #[test]
    fn selector_expression_best_and_worst() {
        assert_eq!(
            ytdlp_format_selector(QualityLevel::Best, FormatContainer::Mp4),
            "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best"
        );
        assert_eq!(
            ytdlp_format_selector(QualityLevel::Worst, FormatContainer::Mp4),
            "worstvideo[ext=mp4]+bestaudio[ext=m4a]/worst[ext=mp4]/worst"
        );
    }

    #[test]
    fn selector_expression_height_ceiling() {
        assert_eq!(
            ytdlp_format_selector(QualityLevel::High, FormatContainer::Mp4),
            "bestvideo[height<=720][ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4][height<=720]/best[height<=720]"
        );
        assert_eq!(
            ytdlp_format_selector(QualityLevel::UltraHd, FormatContainer::Webm),
            "bestvideo[height<=2160][ext=webm]+bestaudio[ext=m4a]/best[ext=webm][height<=2160]/best[height<=2160]"
        );
    }
}
