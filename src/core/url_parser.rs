//! Pure URL classification: raw string in, `VideoLocator` out. No I/O.

use crate::models::media::VideoLocator;
use crate::platforms::Platform;

const SHORTENER_HOSTS: &[&str] = &[
    "bit.ly",
    "tinyurl.com",
    "goo.gl",
    "t.co",
    "ow.ly",
    "buff.ly",
];

pub fn parse(raw: &str) -> VideoLocator {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return invalid(raw, "URL cannot be empty");
    }

    // Accept protocol-less input the way browsers do.
    let full_url = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let parsed = match url::Url::parse(&full_url) {
        Ok(u) => u,
        Err(_) => return invalid(raw, "Invalid URL format"),
    };

    let host = match parsed.host_str() {
        Some(h) => h.to_lowercase(),
        None => return invalid(raw, "Invalid URL format"),
    };

    if is_shortener_host(&host) {
        return VideoLocator {
            platform: Platform::Unknown,
            raw_url: full_url,
            canonical_id: None,
            is_valid: true,
            validation_error: Some("Shortened URLs need to be expanded first".to_string()),
        };
    }

    let segments: Vec<&str> = parsed
        .path()
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();

    let matched = parse_youtube(&host, &parsed, &segments)
        .or_else(|| parse_twitter(&host, &segments))
        .or_else(|| parse_instagram(&host, &segments))
        .or_else(|| parse_facebook(&host, &parsed, &segments))
        .or_else(|| parse_linkedin(&host, &segments));

    match matched {
        Some((platform, id)) => VideoLocator {
            platform,
            raw_url: full_url,
            canonical_id: Some(id),
            is_valid: true,
            validation_error: None,
        },
        None => invalid(raw, "URL is not from a supported video platform"),
    }
}

fn invalid(raw: &str, reason: &str) -> VideoLocator {
    VideoLocator {
        platform: Platform::Unknown,
        raw_url: raw.to_string(),
        canonical_id: None,
        is_valid: false,
        validation_error: Some(reason.to_string()),
    }
}

pub fn is_shortener_host(host: &str) -> bool {
    SHORTENER_HOSTS
        .iter()
        .any(|s| host == *s || host.ends_with(&format!(".{}", s)))
}

fn host_matches(host: &str, domain: &str) -> bool {
    host == domain || host.ends_with(&format!(".{}", domain))
}

fn is_youtube_id(s: &str) -> bool {
    s.len() == 11
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn parse_youtube(
    host: &str,
    parsed: &url::Url,
    segments: &[&str],
) -> Option<(Platform, String)> {
    if host_matches(host, "youtu.be") {
        let id = segments.first()?;
        return is_youtube_id(id).then(|| (Platform::Youtube, id.to_string()));
    }

    if !host_matches(host, "youtube.com") {
        return None;
    }

    if let Some(v) = parsed
        .query_pairs()
        .find(|(k, _)| k == "v")
        .map(|(_, v)| v.to_string())
    {
        if segments.first() == Some(&"watch") && is_youtube_id(&v) {
            return Some((Platform::Youtube, v));
        }
    }

    if matches!(segments.first(), Some(&"embed") | Some(&"v") | Some(&"shorts")) {
        let id = segments.get(1)?;
        return is_youtube_id(id).then(|| (Platform::Youtube, id.to_string()));
    }

    None
}

fn parse_twitter(host: &str, segments: &[&str]) -> Option<(Platform, String)> {
    if !host_matches(host, "twitter.com") && !host_matches(host, "x.com") {
        return None;
    }

    if segments.len() >= 3 && segments.get(1) == Some(&"status") {
        let id = segments[2];
        if !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()) {
            return Some((Platform::Twitter, id.to_string()));
        }
    }

    None
}

fn parse_instagram(host: &str, segments: &[&str]) -> Option<(Platform, String)> {
    if !host_matches(host, "instagram.com") {
        return None;
    }

    if matches!(
        segments.first(),
        Some(&"p") | Some(&"reel") | Some(&"reels") | Some(&"tv")
    ) {
        let code = segments.get(1)?;
        let ok = !code.is_empty()
            && code
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        return ok.then(|| (Platform::Instagram, code.to_string()));
    }

    None
}

fn parse_facebook(
    host: &str,
    parsed: &url::Url,
    segments: &[&str],
) -> Option<(Platform, String)> {
    if host_matches(host, "fb.watch") {
        let code = segments.first()?;
        return Some((Platform::Facebook, code.to_string()));
    }

    if !host_matches(host, "facebook.com") {
        return None;
    }

    let numeric = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());

    if segments.first() == Some(&"watch") || segments.first() == Some(&"video.php") {
        let v = parsed
            .query_pairs()
            .find(|(k, _)| k == "v")
            .map(|(_, v)| v.to_string())?;
        return numeric(&v).then_some((Platform::Facebook, v));
    }

    if segments.first() == Some(&"reel") {
        let id = segments.get(1)?;
        return numeric(id).then(|| (Platform::Facebook, id.to_string()));
    }

    if segments.len() >= 3 && segments.get(1) == Some(&"videos") {
        let id = segments[2];
        return numeric(id).then(|| (Platform::Facebook, id.to_string()));
    }

    None
}

fn parse_linkedin(host: &str, segments: &[&str]) -> Option<(Platform, String)> {
    if !host_matches(host, "linkedin.com") {
        return None;
    }

    let numeric = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());

    if segments.first() == Some(&"posts") || segments.first() == Some(&"video") {
        if segments.len() >= 3 && numeric(segments[2]) {
            return Some((Platform::Linkedin, segments[2].to_string()));
        }
    }

    if segments.len() >= 4
        && segments.first() == Some(&"feed")
        && segments.get(1) == Some(&"update")
        && numeric(segments[3])
    {
        return Some((Platform::Linkedin, segments[3].to_string()));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expect_id(url: &str, platform: Platform, id: &str) {
        let locator = parse(url);
        assert!(locator.is_valid, "{} should be valid: {:?}", url, locator);
        assert_eq!(locator.platform, platform, "platform mismatch for {}", url);
        assert_eq!(
            locator.canonical_id.as_deref(),
            Some(id),
            "id mismatch for {}",
            url
        );
    }

    #[test]
    fn youtube_url_variants() {
        expect_id(
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            Platform::Youtube,
            "dQw4w9WgXcQ",
        );
        expect_id(
            "https://youtu.be/dQw4w9WgXcQ",
            Platform::Youtube,
            "dQw4w9WgXcQ",
        );
        expect_id(
            "https://m.youtube.com/watch?v=dQw4w9WgXcQ&t=43s",
            Platform::Youtube,
            "dQw4w9WgXcQ",
        );
        expect_id(
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
            Platform::Youtube,
            "dQw4w9WgXcQ",
        );
        expect_id(
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            Platform::Youtube,
            "dQw4w9WgXcQ",
        );
    }

    #[test]
    fn twitter_url_variants() {
        expect_id(
            "https://twitter.com/NASA/status/1410624005669169154",
            Platform::Twitter,
            "1410624005669169154",
        );
        expect_id(
            "https://x.com/NASA/status/1410624005669169154",
            Platform::Twitter,
            "1410624005669169154",
        );
        expect_id(
            "https://mobile.twitter.com/NASA/status/1410624005669169154?s=20",
            Platform::Twitter,
            "1410624005669169154",
        );
    }

    #[test]
    fn instagram_url_variants() {
        expect_id(
            "https://www.instagram.com/p/CuV3xYzN1aB/",
            Platform::Instagram,
            "CuV3xYzN1aB",
        );
        expect_id(
            "https://instagram.com/reel/CuV3xYzN1aB",
            Platform::Instagram,
            "CuV3xYzN1aB",
        );
        expect_id(
            "https://www.instagram.com/tv/CuV3xYzN1aB/",
            Platform::Instagram,
            "CuV3xYzN1aB",
        );
    }

    #[test]
    fn facebook_url_variants() {
        expect_id(
            "https://www.facebook.com/watch/?v=10153231379946729",
            Platform::Facebook,
            "10153231379946729",
        );
        expect_id(
            "https://www.facebook.com/nasa/videos/10153231379946729",
            Platform::Facebook,
            "10153231379946729",
        );
        expect_id(
            "https://fb.watch/abc123XYZ",
            Platform::Facebook,
            "abc123XYZ",
        );
        expect_id(
            "https://www.facebook.com/reel/10153231379946729",
            Platform::Facebook,
            "10153231379946729",
        );
    }

    #[test]
    fn linkedin_url_variants() {
        expect_id(
            "https://www.linkedin.com/posts/some-user/7081234567890",
            Platform::Linkedin,
            "7081234567890",
        );
        expect_id(
            "https://www.linkedin.com/feed/update/urn:li:activity/7081234567890",
            Platform::Linkedin,
            "7081234567890",
        );
        expect_id(
            "https://linkedin.com/video/live/7081234567890",
            Platform::Linkedin,
            "7081234567890",
        );
    }

    #[test]
    fn protocol_less_input_is_coerced() {
        expect_id(
            "www.youtube.com/watch?v=dQw4w9WgXcQ",
            Platform::Youtube,
            "dQw4w9WgXcQ",
        );
        expect_id("youtu.be/dQw4w9WgXcQ", Platform::Youtube, "dQw4w9WgXcQ");
    }

    #[test]
    fn shortened_urls_are_flagged_not_rejected() {
        for url in [
            "https://bit.ly/3xYzAbC",
            "https://t.co/AbCdEf",
            "tinyurl.com/abc123",
        ] {
            let locator = parse(url);
            assert!(locator.is_valid, "{} should be valid", url);
            assert_eq!(locator.platform, Platform::Unknown);
            assert!(locator.canonical_id.is_none());
            assert!(
                locator
                    .validation_error
                    .as_deref()
                    .unwrap_or_default()
                    .contains("expanded"),
                "shortener should explain expansion for {}",
                url
            );
        }
    }

    #[test]
    fn empty_and_whitespace_are_invalid() {
        for raw in ["", "   ", "\t\n"] {
            let locator = parse(raw);
            assert!(!locator.is_valid);
            assert!(locator
                .validation_error
                .as_deref()
                .unwrap_or_default()
                .contains("empty"));
        }
    }

    #[test]
    fn garbage_never_panics() {
        for raw in [
            "not a url at all %%",
            "https://",
            "https://example.com/watch?v=dQw4w9WgXcQ",
            "https://www.youtube.com/",
            "https://twitter.com/NASA",
            "https://twitter.com/NASA/status/notdigits",
        ] {
            let locator = parse(raw);
            assert!(!locator.is_valid, "{} should be invalid", raw);
            assert_eq!(locator.platform, Platform::Unknown);
        }
    }

    #[test]
    fn youtube_id_length_is_enforced() {
        let locator = parse("https://www.youtube.com/watch?v=short");
        assert!(!locator.is_valid);
    }

    #[test]
    fn platform_patterns_do_not_cross_match() {
        // A status-shaped path on the wrong host must not classify as Twitter.
        let locator = parse("https://www.facebook.com/NASA/status/12345");
        assert!(!locator.is_valid);
    }
}
