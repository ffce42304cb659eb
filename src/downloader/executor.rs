// Download executor - one transfer plus audio post-processing

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info, warn};

use super::errors::DownloadError;
use super::format_selector::FormatSelector;
use super::models::{DownloadRequest, DownloadResult, ProgressEvent, TransferOptions};
use super::relay::ProgressEmitter;
use super::traits::Extractor;

/// Placeholder appended to the output directory
pub const OUTPUT_FILE_TEMPLATE: &str = "%(title)s.%(ext)s";

/// Runs transfers; holds no per-download state
#[derive(Clone)]
pub struct DownloadExecutor {
    extractor: Arc<dyn Extractor>,
    audio_extension: String,
}

impl DownloadExecutor {
    pub fn new(extractor: Arc<dyn Extractor>, audio_extension: impl Into<String>) -> Self {
        let audio_extension = audio_extension.into();
        Self {
            extractor,
            audio_extension: audio_extension.trim_start_matches('.').to_string(),
        }
    }

    /// Transfer options derived from a request
    pub fn transfer_options(request: &DownloadRequest) -> TransferOptions {
        TransferOptions {
            output_template: request
                .output_directory
                .join(OUTPUT_FILE_TEMPLATE)
                .to_string_lossy()
                .into_owned(),
            format_selector: FormatSelector::transfer_selector(request).to_string(),
        }
    }

    /// Run one request to completion.
    ///
    /// Emits the extractor's `Downloading` events in order, then exactly one
    /// `Finished` or `Failed`.
    pub async fn execute(&self, request: DownloadRequest, emitter: &ProgressEmitter) -> DownloadResult {
        let id = emitter.id();
        let options = Self::transfer_options(&request);
        info!(
            %id,
            url = %request.source_url,
            format = %options.format_selector,
            extractor = self.extractor.name(),
            "starting transfer"
        );

        let downloaded = match self
            .extractor
            .download(&request.source_url, &options, emitter)
            .await
        {
            Ok(file) => file,
            Err(e) => {
                let err = e.into_transfer_error();
                error!(%id, error = %err, "transfer failed");
                emitter.emit(ProgressEvent::Failed {
                    message: err.to_string(),
                });
                return DownloadResult::Failure { error: err };
            }
        };

        let final_path = if request.audio_only {
            match swap_extension(&downloaded.path, &self.audio_extension).await {
                Ok(path) => path,
                Err(err) => {
                    warn!(%id, error = %err, "audio post-processing failed");
                    emitter.emit(ProgressEvent::Failed {
                        message: err.to_string(),
                    });
                    return DownloadResult::Failure { error: err };
                }
            }
        } else {
            downloaded.path
        };

        emitter.emit(ProgressEvent::Finished);
        info!(%id, path = %final_path.display(), "download complete");
        DownloadResult::Success { final_path }
    }
}

/// Rename `<stem>.<ext>` to `<stem>.<extension>` in the same directory.
///
/// Refuses to overwrite an existing target. A file that already carries the
/// extension is left alone.
pub async fn swap_extension(source: &Path, extension: &str) -> Result<PathBuf, DownloadError> {
    let already = source
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case(extension));
    if already {
        return Ok(source.to_path_buf());
    }

    let target = source.with_extension(extension);
    let failed = |reason: String| DownloadError::PostProcessingFailed {
        downloaded: source.to_path_buf(),
        reason,
    };

    if !tokio::fs::try_exists(source)
        .await
        .map_err(|e| failed(e.to_string()))?
    {
        return Err(failed(format!("{} does not exist", source.display())));
    }
    if tokio::fs::try_exists(&target)
        .await
        .map_err(|e| failed(e.to_string()))?
    {
        return Err(failed(format!("{} already exists", target.display())));
    }

    tokio::fs::rename(source, &target)
        .await
        .map_err(|e| failed(e.to_string()))?;
    Ok(target)
}
