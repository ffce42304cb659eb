// Common data models for the download workflow

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::errors::DownloadError;

/// Shown wherever the extractor could not report a size
pub const UNKNOWN_SIZE: &str = "Unknown";

/// A validated download, owned by the task that executes it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub source_url: String,
    pub output_directory: PathBuf,
    pub format_selector: String,
    pub audio_only: bool,
}

/// Metadata from a preview query, used only for the confirmation prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    pub title: String,
    pub approximate_size_bytes: Option<u64>,
    pub resolved_format: String,
}

impl MediaInfo {
    /// Size in megabytes with two decimals, or "Unknown"
    pub fn size_label(&self) -> String {
        match self.approximate_size_bytes {
            Some(bytes) => format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0)),
            None => UNKNOWN_SIZE.to_string(),
        }
    }
}

/// One search result record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
}

/// Options handed to the extractor for a single transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOptions {
    /// Directory plus `%(title)s.%(ext)s` placeholders
    pub output_template: String,
    pub format_selector: String,
}

/// File the extractor wrote, before any post-processing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    pub path: PathBuf,
}

/// Progress reported while a transfer runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProgressEvent {
    Downloading {
        percent: String,
        total_bytes_label: String,
    },
    Finished,
    Failed {
        message: String,
    },
}

impl ProgressEvent {
    /// Build a `Downloading` event, substituting "Unknown" for a missing total
    pub fn downloading(percent: impl Into<String>, total: Option<String>) -> Self {
        let total_bytes_label = total
            .map(|t| t.trim().to_string())
            .filter(|t| !is_unknown_label(t))
            .unwrap_or_else(|| UNKNOWN_SIZE.to_string());

        Self::Downloading {
            percent: percent.into().trim().to_string(),
            total_bytes_label,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished | Self::Failed { .. })
    }
}

fn is_unknown_label(label: &str) -> bool {
    label.is_empty()
        || label.eq_ignore_ascii_case("na")
        || label.eq_ignore_ascii_case("n/a")
        || label.eq_ignore_ascii_case("none")
        || label.eq_ignore_ascii_case(UNKNOWN_SIZE)
}

/// Terminal outcome of one download request
#[derive(Debug, Clone)]
pub enum DownloadResult {
    Success { final_path: PathBuf },
    Failure { error: DownloadError },
}

impl DownloadResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Failure message, as shown to the user
    pub fn reason(&self) -> Option<String> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error } => Some(error.to_string()),
        }
    }

    pub fn error(&self) -> Option<&DownloadError> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error } => Some(error),
        }
    }
}

impl From<Result<PathBuf, DownloadError>> for DownloadResult {
    fn from(result: Result<PathBuf, DownloadError>) -> Self {
        match result {
            Ok(final_path) => Self::Success { final_path },
            Err(error) => Self::Failure { error },
        }
    }
}

/// Identifies one dispatched download in UI messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DownloadId(pub u64);

impl DownloadId {
    /// First id handed out by the dispatcher
    pub const FIRST: DownloadId = DownloadId(1);
}

impl fmt::Display for DownloadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Message from a background download to the presentation loop
#[derive(Debug, Clone)]
pub enum UiMessage {
    Progress { id: DownloadId, event: ProgressEvent },
    Completed { id: DownloadId, result: DownloadResult },
}

impl UiMessage {
    pub fn id(&self) -> DownloadId {
        match self {
            Self::Progress { id, .. } | Self::Completed { id, .. } => *id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(size: Option<u64>) -> MediaInfo {
        MediaInfo {
            title: "Clip".to_string(),
            approximate_size_bytes: size,
            resolved_format: "18 - 640x360".to_string(),
        }
    }

    #[test]
    fn size_label_in_megabytes() {
        assert_eq!(info(Some(104_857_600)).size_label(), "100.00 MB");
        assert_eq!(info(Some(1_572_864)).size_label(), "1.50 MB");
    }

    #[test]
    fn size_label_unknown() {
        assert_eq!(info(None).size_label(), "Unknown");
    }

    #[test]
    fn downloading_total_falls_back_to_unknown() {
        for missing in [None, Some("NA".to_string()), Some("  ".to_string())] {
            assert_eq!(
                ProgressEvent::downloading(" 12.0%", missing),
                ProgressEvent::Downloading {
                    percent: "12.0%".to_string(),
                    total_bytes_label: "Unknown".to_string(),
                }
            );
        }
    }

    #[test]
    fn result_reason_only_on_failure() {
        let ok = DownloadResult::from(Ok(PathBuf::from("/tmp/a.mp4")));
        assert!(ok.is_success());
        assert!(ok.reason().is_none());

        let failed = DownloadResult::from(Err(DownloadError::TransferFailed("boom".into())));
        assert_eq!(failed.reason().as_deref(), Some("boom"));
    }
}
