// Collaborator seams: extractor backend and confirmation prompt

use async_trait::async_trait;

use super::errors::ExtractorError;
use super::models::{DownloadedFile, MediaInfo, ProgressEvent, SearchHit, TransferOptions};

/// Receives progress events while a transfer runs.
///
/// Called from the transfer's own task; implementations must not touch
/// presentation state directly.
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, event: ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    fn on_progress(&self, event: ProgressEvent) {
        self(event)
    }
}

/// Media extraction backend (yt-dlp in production)
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Name of the extractor (for logging)
    fn name(&self) -> &'static str;

    /// Metadata-only query, no transfer
    async fn extract_info(&self, url: &str, format: &str) -> Result<MediaInfo, ExtractorError>;

    /// Transfer the media, reporting `Downloading` events to `progress`
    async fn download(
        &self,
        url: &str,
        options: &TransferOptions,
        progress: &dyn ProgressSink,
    ) -> Result<DownloadedFile, ExtractorError>;

    /// Search and return at most `max_results` hits
    async fn search(&self, query: &str, max_results: usize)
        -> Result<Vec<SearchHit>, ExtractorError>;
}

/// Blocking yes/no prompt owned by the presentation surface
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Answers every prompt the same way (`--yes`, tests)
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

impl Confirm for FixedAnswer {
    fn confirm(&self, _prompt: &str) -> bool {
        self.0
    }
}
