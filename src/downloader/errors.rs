// Error types for the download workflow

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// User input field that can be left empty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Url,
    OutputDirectory,
    FormatSelector,
    SearchQuery,
}

impl Field {
    /// Message shown when the field was left empty
    pub fn prompt(&self) -> &'static str {
        match self {
            Self::Url => "Please enter a video URL",
            Self::OutputDirectory => "Please select an output path",
            Self::FormatSelector => "Please select a video quality",
            Self::SearchQuery => "Please enter a search query",
        }
    }
}

/// How loudly the front-end should report an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Input problem, nothing was started
    Warning,
    /// Not a failure, e.g. an empty search
    Info,
    Error,
}

/// Terminal failure of one step of the workflow
#[derive(Debug, Clone, Error)]
pub enum DownloadError {
    /// A required input was empty
    #[error("{}", field.prompt())]
    MissingField { field: Field },

    /// The metadata-only query failed before any transfer
    #[error("{0}")]
    MetadataFetchFailed(String),

    /// The extractor failed while transferring; message is kept verbatim
    #[error("{0}")]
    TransferFailed(String),

    /// The transfer succeeded but the audio rename did not
    #[error("Downloaded to {} but renaming failed: {reason}", downloaded.display())]
    PostProcessingFailed { downloaded: PathBuf, reason: String },

    /// Lucky search came back empty
    #[error("No videos found for \"{query}\"")]
    NoSearchResults { query: String },

    /// The search query itself failed
    #[error("{0}")]
    SearchFailed(String),

    /// yt-dlp could not be started at all
    #[error("Tool not found: {0}")]
    ToolNotFound(String),
}

impl DownloadError {
    pub fn severity(&self) -> Severity {
        match self {
            Self::MissingField { .. } => Severity::Warning,
            Self::NoSearchResults { .. } => Severity::Info,
            _ => Severity::Error,
        }
    }

    /// Stable tag for programmatic matching and JSON output
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingField { .. } => "missing_field",
            Self::MetadataFetchFailed(_) => "metadata_fetch_failed",
            Self::TransferFailed(_) => "transfer_failed",
            Self::PostProcessingFailed { .. } => "post_processing_failed",
            Self::NoSearchResults { .. } => "no_search_results",
            Self::SearchFailed(_) => "search_failed",
            Self::ToolNotFound(_) => "tool_not_found",
        }
    }

    /// Notification title, mirroring the dialog captions of the desktop app
    pub fn title(&self) -> &'static str {
        match self {
            Self::MissingField { .. } => "Input Error",
            Self::NoSearchResults { .. } => "No Results",
            Self::PostProcessingFailed { .. } => "Post-processing Error",
            _ => "Error",
        }
    }
}

/// Failure reported by an extractor implementation
#[derive(Debug, Error)]
pub enum ExtractorError {
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Timed out after {0}s")]
    Timeout(u64),

    /// Non-zero exit; carries the tool's own error text
    #[error("{stderr}")]
    Failed { stderr: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ExtractorError {
    /// Map a preview failure into the workflow taxonomy
    pub fn into_metadata_error(self) -> DownloadError {
        match self {
            Self::Spawn { .. } => DownloadError::ToolNotFound(self.to_string()),
            other => DownloadError::MetadataFetchFailed(other.to_string()),
        }
    }

    /// Map a transfer failure into the workflow taxonomy
    pub fn into_transfer_error(self) -> DownloadError {
        match self {
            Self::Spawn { .. } => DownloadError::ToolNotFound(self.to_string()),
            other => DownloadError::TransferFailed(other.to_string()),
        }
    }

    /// Map a search failure into the workflow taxonomy
    pub fn into_search_error(self) -> DownloadError {
        match self {
            Self::Spawn { .. } => DownloadError::ToolNotFound(self.to_string()),
            other => DownloadError::SearchFailed(other.to_string()),
        }
    }
}
