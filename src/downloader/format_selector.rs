// FormatSelector - quality presets and the selector handed to yt-dlp
//
// The front-end offers preset labels such as "22 (720p)". Only the first
// whitespace-delimited token is a yt-dlp format selector; the rest is
// description for the user. Anything typed by hand is passed through as-is,
// so compound selectors like "137+140" reach yt-dlp untouched.

use serde::Serialize;

use super::models::DownloadRequest;

/// Selector used for audio-only downloads regardless of the user's choice
pub const AUDIO_ONLY_SELECTOR: &str = "bestaudio";

/// Selector used by the metadata preview
pub const PREVIEW_SELECTOR: &str = "best";

/// Quality option for UI display
#[derive(Debug, Clone, Copy, Serialize)]
pub struct QualityPreset {
    /// Display label, e.g. "22 (720p)"
    pub label: &'static str,

    /// yt-dlp format specification
    pub selector: &'static str,

    /// Whether two streams get merged (needs ffmpeg)
    pub is_merged: bool,
}

const PRESETS: &[QualityPreset] = &[
    QualityPreset {
        label: "best (Highest quality available)",
        selector: "best",
        is_merged: false,
    },
    QualityPreset {
        label: "worst (Lowest quality available)",
        selector: "worst",
        is_merged: false,
    },
    QualityPreset {
        label: "18 (360p)",
        selector: "18",
        is_merged: false,
    },
    QualityPreset {
        label: "22 (720p)",
        selector: "22",
        is_merged: false,
    },
    QualityPreset {
        label: "137+140 (1080p + audio)",
        selector: "137+140",
        is_merged: true,
    },
    QualityPreset {
        label: "bv*[height<=1080]+ba/b[height<=1080] (up to 1080p, merged)",
        selector: "bv*[height<=1080]+ba/b[height<=1080]",
        is_merged: true,
    },
    QualityPreset {
        label: "bv*[height<=720]+ba/b[height<=720] (up to 720p, merged)",
        selector: "bv*[height<=720]+ba/b[height<=720]",
        is_merged: true,
    },
    QualityPreset {
        label: "bv*[height<=480]+ba/b[height<=480] (up to 480p, merged)",
        selector: "bv*[height<=480]+ba/b[height<=480]",
        is_merged: true,
    },
];

/// Format selector helpers
pub struct FormatSelector;

impl FormatSelector {
    /// All preset choices, default first
    pub fn presets() -> &'static [QualityPreset] {
        PRESETS
    }

    /// Label of the preset selected when the user picks nothing
    pub fn default_label() -> &'static str {
        PRESETS[0].label
    }

    /// Reduce a preset label or typed selector to the selector itself.
    ///
    /// Returns `None` for an empty or whitespace-only choice.
    pub fn selector_from_choice(choice: &str) -> Option<String> {
        choice.split_whitespace().next().map(str::to_string)
    }

    /// Preset whose selector matches, if the choice came from the list
    pub fn find_preset(choice: &str) -> Option<&'static QualityPreset> {
        let selector = Self::selector_from_choice(choice)?;
        PRESETS.iter().find(|p| p.selector == selector)
    }

    /// Selector actually sent for a transfer
    pub fn transfer_selector(request: &DownloadRequest) -> &str {
        if request.audio_only {
            AUDIO_ONLY_SELECTOR
        } else {
            &request.format_selector
        }
    }
}
