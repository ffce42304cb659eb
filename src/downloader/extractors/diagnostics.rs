// Failure diagnostics - turn yt-dlp error text into an actionable hint
//
// The error message itself is always shown verbatim; the hint is extra
// text printed under it.

use serde::Serialize;

/// Likely cause of an extractor failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCause {
    UnsupportedUrl,
    PrivateVideo,
    VideoUnavailable,
    AgeRestricted,
    MembersOnly,
    DrmProtected,
    GeoBlocked,
    RateLimited,
    BotDetection,
    Http403Forbidden,
    FormatUnavailable,
    FfmpegMissing,
    NetworkTimeout,
    DiskFull,
}

impl FailureCause {
    /// Short description
    pub fn description(&self) -> &'static str {
        match self {
            Self::UnsupportedUrl => "URL not supported",
            Self::PrivateVideo => "Private video",
            Self::VideoUnavailable => "Video unavailable",
            Self::AgeRestricted => "Age-restricted content",
            Self::MembersOnly => "Members-only content",
            Self::DrmProtected => "DRM-protected content",
            Self::GeoBlocked => "Geographic restriction",
            Self::RateLimited => "Rate limited",
            Self::BotDetection => "Bot detection triggered",
            Self::Http403Forbidden => "Access denied (HTTP 403)",
            Self::FormatUnavailable => "Requested quality not available",
            Self::FfmpegMissing => "ffmpeg not installed",
            Self::NetworkTimeout => "Network timeout",
            Self::DiskFull => "Not enough disk space",
        }
    }

    /// What the user can try next
    pub fn hint(&self) -> &'static str {
        match self {
            Self::UnsupportedUrl => "Check the URL; copy it from the browser address bar.",
            Self::PrivateVideo => "Pass cookies from an account that has access (--cookies or --cookies-from-browser).",
            Self::VideoUnavailable => "The video was removed or made private. Nothing to download.",
            Self::AgeRestricted => "Use cookies from a logged-in browser (--cookies-from-browser chrome).",
            Self::MembersOnly => "Use cookies from a browser logged in as a channel member.",
            Self::DrmProtected => "DRM-protected media cannot be downloaded.",
            Self::GeoBlocked => "Use a proxy in a country where the video is available (--proxy).",
            Self::RateLimited => "Wait 10-15 minutes, or try a different network or proxy.",
            Self::BotDetection => "Use cookies from a logged-in browser, or try again later.",
            Self::Http403Forbidden => "Update yt-dlp (yt-dlp -U) and try again; a proxy may help.",
            Self::FormatUnavailable => "Pick another quality preset (see `presets`), or use best.",
            Self::FfmpegMissing => "Merged formats such as 137+140 need ffmpeg on PATH. Install it or pick a single-file preset.",
            Self::NetworkTimeout => "Check your connection or raise metadata_timeout_secs.",
            Self::DiskFull => "Free some space or choose another output directory.",
        }
    }

    /// Whether retrying unchanged could succeed later
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimited | Self::BotDetection | Self::Http403Forbidden | Self::NetworkTimeout
        )
    }
}

/// Analyze error message and return the likely cause
pub fn diagnose_error(error: &str) -> Option<FailureCause> {
    let lower = error.to_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

    // Most specific first
    if has(&["unsupported url", "is not a valid url"]) {
        return Some(FailureCause::UnsupportedUrl);
    }
    if has(&["drm", "widevine", "playready", "fairplay"]) {
        return Some(FailureCause::DrmProtected);
    }
    if has(&["members only", "members-only", "join this channel"]) {
        return Some(FailureCause::MembersOnly);
    }
    if has(&["sign in to confirm your age", "age-restricted", "age restricted"]) {
        return Some(FailureCause::AgeRestricted);
    }
    if has(&["private video", "video is private"]) {
        return Some(FailureCause::PrivateVideo);
    }
    if has(&["video unavailable", "video has been removed", "no longer available"]) {
        return Some(FailureCause::VideoUnavailable);
    }
    if has(&["not available in your country", "blocked it in your country", "geo restrict"]) {
        return Some(FailureCause::GeoBlocked);
    }
    if has(&["requested format is not available"]) {
        return Some(FailureCause::FormatUnavailable);
    }
    if has(&["ffmpeg is not installed", "ffmpeg not found", "ffprobe and ffmpeg not found"]) {
        return Some(FailureCause::FfmpegMissing);
    }
    if has(&["429", "too many requests", "rate limit"]) {
        return Some(FailureCause::RateLimited);
    }
    if has(&["confirm you're not a bot", "confirm you’re not a bot", "captcha", "unusual traffic"]) {
        return Some(FailureCause::BotDetection);
    }
    if has(&["403", "forbidden"]) {
        return Some(FailureCause::Http403Forbidden);
    }
    if has(&["no space left on device", "disk full"]) {
        return Some(FailureCause::DiskFull);
    }
    if has(&["timed out", "timeout", "connection refused", "network is unreachable"]) {
        return Some(FailureCause::NetworkTimeout);
    }

    None
}
