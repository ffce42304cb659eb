// Orchestrator - validate, preview, confirm, then hand off to the dispatcher

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

use super::dispatcher::{DownloadDispatcher, DownloadHandle};
use super::errors::DownloadError;
use super::executor::DownloadExecutor;
use super::format_selector::FormatSelector;
use super::models::{MediaInfo, UiMessage};
use super::preview::{confirmation_prompt, fetch_preview};
use super::search::first_hit;
use super::traits::{Confirm, Extractor};
use super::validator::{validate, validate_search, RawInput};

/// Knobs the orchestrator needs from configuration
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    /// Extension given to audio-only downloads
    pub audio_extension: String,
    /// Transfers allowed to run at once
    pub max_concurrent_downloads: usize,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            audio_extension: "mp3".to_string(),
            max_concurrent_downloads: 2,
        }
    }
}

/// How the confirm flow ended
#[derive(Debug)]
pub enum WorkflowOutcome {
    /// The user agreed; the transfer is running in the background
    Dispatched { preview: MediaInfo, handle: DownloadHandle },
    /// The user declined; nothing was started
    Declined { preview: MediaInfo },
}

pub struct Downloader {
    extractor: Arc<dyn Extractor>,
    confirm: Arc<dyn Confirm>,
    dispatcher: DownloadDispatcher,
}

impl Downloader {
    pub fn new(
        extractor: Arc<dyn Extractor>,
        confirm: Arc<dyn Confirm>,
        settings: OrchestratorSettings,
        tx: UnboundedSender<UiMessage>,
    ) -> Self {
        let executor = DownloadExecutor::new(Arc::clone(&extractor), settings.audio_extension);
        Self {
            extractor,
            confirm,
            dispatcher: DownloadDispatcher::new(executor, settings.max_concurrent_downloads, tx),
        }
    }

    /// Validate, show a preview, and dispatch once the user confirms.
    ///
    /// The preview query runs on the caller's task; only the transfer is
    /// moved to the background.
    pub async fn start_download(&self, input: &RawInput) -> Result<WorkflowOutcome, DownloadError> {
        let request = validate(input)?;

        let preview = fetch_preview(self.extractor.as_ref(), &request.source_url).await?;
        // A typed selector that matches a preset is shown with the preset's label.
        let quality = FormatSelector::find_preset(&request.format_selector)
            .map(|preset| preset.label)
            .or(input.format_choice.as_deref())
            .unwrap_or(&request.format_selector);
        let prompt = confirmation_prompt(&preview, quality);

        if !self.ask(prompt).await {
            info!(url = %request.source_url, "download declined");
            return Ok(WorkflowOutcome::Declined { preview });
        }

        let handle = self.dispatcher.dispatch(request);
        Ok(WorkflowOutcome::Dispatched { preview, handle })
    }

    /// Download the first search result without asking
    pub async fn search_and_download(
        &self,
        query: &str,
        output_directory: &str,
        format_choice: Option<&str>,
        audio_only: bool,
    ) -> Result<DownloadHandle, DownloadError> {
        let query = validate_search(query)?;
        // Every field is checked before the search; the query stands in for the URL.
        let mut request = validate(&RawInput {
            url: query.to_string(),
            output_directory: output_directory.to_string(),
            format_choice: format_choice.map(str::to_string),
            audio_only,
        })?;

        let hit = first_hit(self.extractor.as_ref(), query).await?;
        request.source_url = hit.url;

        Ok(self.dispatcher.dispatch(request))
    }

    /// Run the blocking prompt off the async worker
    async fn ask(&self, prompt: String) -> bool {
        let confirm = Arc::clone(&self.confirm);
        match tokio::task::spawn_blocking(move || confirm.confirm(&prompt)).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!(error = %e, "confirmation prompt failed, treating as declined");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downloader::errors::Field;
    use crate::downloader::models::{DownloadResult, SearchHit};
    use crate::downloader::relay::StatusSlot;
    use crate::downloader::test_support::{drain, FakeExtractor, FakeTransfer};
    use crate::downloader::traits::FixedAnswer;
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    /// Records the prompt it was shown
    struct RecordingConfirm {
        answer: bool,
        seen: Mutex<Vec<String>>,
    }

    impl Confirm for RecordingConfirm {
        fn confirm(&self, prompt: &str) -> bool {
            self.seen.lock().unwrap().push(prompt.to_string());
            self.answer
        }
    }

    fn downloader(
        fake: Arc<FakeExtractor>,
        confirm: Arc<dyn Confirm>,
    ) -> (Downloader, mpsc::UnboundedReceiver<UiMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Downloader::new(fake, confirm, OrchestratorSettings::default(), tx),
            rx,
        )
    }

    fn input(url: &str, dir: &str, format: Option<&str>) -> RawInput {
        RawInput {
            url: url.to_string(),
            output_directory: dir.to_string(),
            format_choice: format.map(str::to_string),
            audio_only: false,
        }
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_extractor() {
        let fake = Arc::new(FakeExtractor::new());
        let (downloader, _rx) = downloader(fake.clone(), Arc::new(FixedAnswer(true)));

        for bad in [
            input("", "/tmp", Some("best")),
            input("https://youtu.be/x", "", Some("best")),
            input("https://youtu.be/x", "/tmp", None),
        ] {
            let err = downloader.start_download(&bad).await.unwrap_err();
            assert!(matches!(err, DownloadError::MissingField { .. }));
        }

        assert_eq!(fake.infos(), 0);
        assert_eq!(fake.downloads(), 0);
        assert_eq!(fake.searches(), 0);
    }

    #[tokio::test]
    async fn declined_prompt_skips_download() {
        let fake = Arc::new(FakeExtractor::new());
        let confirm = Arc::new(RecordingConfirm {
            answer: false,
            seen: Mutex::new(Vec::new()),
        });
        let (downloader, mut rx) = downloader(fake.clone(), confirm.clone());

        let outcome = downloader
            .start_download(&input("https://youtu.be/x", "/tmp", Some("22 (720p)")))
            .await
            .unwrap();

        assert!(matches!(outcome, WorkflowOutcome::Declined { .. }));
        assert_eq!(fake.infos(), 1);
        assert_eq!(fake.downloads(), 0);
        assert!(drain(&mut rx).is_empty());

        let seen = confirm.seen.lock().unwrap();
        assert_eq!(
            seen[0],
            "Title: Big Buck Bunny\nSize: 100.00 MB\nQuality: 22 (720p)\nDo you want to download this video?"
        );
    }

    #[tokio::test]
    async fn typed_selector_is_shown_with_preset_label() {
        let fake = Arc::new(FakeExtractor::new());
        let confirm = Arc::new(RecordingConfirm {
            answer: false,
            seen: Mutex::new(Vec::new()),
        });
        let (downloader, _rx) = downloader(fake, confirm.clone());

        downloader
            .start_download(&input("https://youtu.be/x", "/tmp", Some("22")))
            .await
            .unwrap();

        let seen = confirm.seen.lock().unwrap();
        assert!(seen[0].contains("Quality: 22 (720p)\n"));
    }

    #[tokio::test]
    async fn preview_uses_best_not_user_selector() {
        let dir = tempfile::tempdir().unwrap();
        let fake = Arc::new(FakeExtractor::new());
        let (downloader, _rx) = downloader(fake.clone(), Arc::new(FixedAnswer(true)));

        let outcome = downloader
            .start_download(&input(
                "https://youtu.be/x",
                dir.path().to_str().unwrap(),
                Some("137+140 (1080p + audio)"),
            ))
            .await
            .unwrap();

        let WorkflowOutcome::Dispatched { handle, .. } = outcome else {
            panic!("expected dispatch");
        };
        assert!(handle.wait().await.is_success());
        assert_eq!(fake.infos(), 1);
        assert_eq!(fake.downloads(), 1);
        assert_eq!(fake.last_format().as_deref(), Some("137+140"));
    }

    #[tokio::test]
    async fn preview_failure_aborts_before_transfer() {
        let fake = Arc::new(FakeExtractor::new().with_info_error("ERROR: Unsupported URL: ftp://x"));
        let (downloader, _rx) = downloader(fake.clone(), Arc::new(FixedAnswer(true)));

        let err = downloader
            .start_download(&input("ftp://x", "/tmp", Some("best")))
            .await
            .unwrap_err();

        match err {
            DownloadError::MetadataFetchFailed(message) => {
                assert_eq!(message, "ERROR: Unsupported URL: ftp://x")
            }
            other => panic!("expected MetadataFetchFailed, got {:?}", other),
        }
        assert_eq!(fake.downloads(), 0);
    }

    #[tokio::test]
    async fn progress_reaches_slot_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let fake = Arc::new(FakeExtractor::new());
        let (downloader, mut rx) = downloader(fake, Arc::new(FixedAnswer(true)));

        let WorkflowOutcome::Dispatched { handle, .. } = downloader
            .start_download(&input("https://youtu.be/x", dir.path().to_str().unwrap(), Some("best")))
            .await
            .unwrap()
        else {
            panic!("expected dispatch");
        };
        handle.wait().await;

        let mut slot = StatusSlot::new();
        let mut shown = Vec::new();
        for message in drain(&mut rx) {
            if slot.apply(&message) {
                shown.push(slot.text().to_string());
            }
        }
        assert_eq!(shown, vec!["Downloading: 45.2% of 10.00MiB", "Download complete"]);
    }

    #[tokio::test]
    async fn transfer_failure_clears_status() {
        let dir = tempfile::tempdir().unwrap();
        let fake = Arc::new(
            FakeExtractor::new().with_transfer(FakeTransfer::Fails("ERROR: HTTP Error 403: Forbidden".into())),
        );
        let (downloader, mut rx) = downloader(fake, Arc::new(FixedAnswer(true)));

        let WorkflowOutcome::Dispatched { handle, .. } = downloader
            .start_download(&input("https://youtu.be/x", dir.path().to_str().unwrap(), Some("best")))
            .await
            .unwrap()
        else {
            panic!("expected dispatch");
        };
        let result = handle.wait().await;
        assert_eq!(result.reason().as_deref(), Some("ERROR: HTTP Error 403: Forbidden"));

        let mut slot = StatusSlot::new();
        for message in drain(&mut rx) {
            slot.apply(&message);
        }
        assert_eq!(slot.text(), "");
    }

    #[tokio::test]
    async fn lucky_search_without_hits_downloads_nothing() {
        let fake = Arc::new(FakeExtractor::new());
        let (downloader, _rx) = downloader(fake.clone(), Arc::new(FixedAnswer(false)));

        let err = downloader
            .search_and_download("zzzz no such video", "/tmp", Some("best"), false)
            .await
            .unwrap_err();

        assert!(matches!(err, DownloadError::NoSearchResults { .. }));
        assert_eq!(fake.searches(), 1);
        assert_eq!(fake.downloads(), 0);
    }

    #[tokio::test]
    async fn lucky_search_downloads_first_hit_without_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let fake = Arc::new(FakeExtractor::new().with_hits(vec![
            SearchHit {
                title: "First".to_string(),
                url: "https://www.youtube.com/watch?v=first".to_string(),
            },
            SearchHit {
                title: "Second".to_string(),
                url: "https://www.youtube.com/watch?v=second".to_string(),
            },
        ]));
        let confirm = Arc::new(RecordingConfirm {
            answer: false,
            seen: Mutex::new(Vec::new()),
        });
        let (downloader, _rx) = downloader(fake.clone(), confirm.clone());

        let handle = downloader
            .search_and_download("big buck bunny", dir.path().to_str().unwrap(), Some("18 (360p)"), false)
            .await
            .unwrap();
        let result = handle.wait().await;

        assert!(matches!(result, DownloadResult::Success { .. }));
        assert_eq!(
            fake.downloaded_urls(),
            vec!["https://www.youtube.com/watch?v=first".to_string()]
        );
        assert_eq!(fake.infos(), 0);
        assert!(confirm.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn lucky_search_requires_query() {
        let fake = Arc::new(FakeExtractor::new());
        let (downloader, _rx) = downloader(fake.clone(), Arc::new(FixedAnswer(true)));

        let err = downloader
            .search_and_download("  ", "/tmp", Some("best"), false)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DownloadError::MissingField {
                field: Field::SearchQuery
            }
        ));
        assert_eq!(fake.searches(), 0);
    }

    #[tokio::test]
    async fn lucky_search_checks_target_before_searching() {
        let fake = Arc::new(FakeExtractor::new().with_hits(vec![SearchHit {
            title: "First".to_string(),
            url: "https://www.youtube.com/watch?v=first".to_string(),
        }]));
        let (downloader, _rx) = downloader(fake.clone(), Arc::new(FixedAnswer(true)));

        let err = downloader
            .search_and_download("rust", "", Some("best"), false)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DownloadError::MissingField {
                field: Field::OutputDirectory
            }
        ));

        let err = downloader
            .search_and_download("rust", "/tmp", None, false)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DownloadError::MissingField {
                field: Field::FormatSelector
            }
        ));

        assert_eq!(fake.searches(), 0);
        assert_eq!(fake.downloads(), 0);
    }

    #[tokio::test]
    async fn lucky_search_failure_is_search_failed() {
        let fake = Arc::new(
            FakeExtractor::new().with_search_error("ERROR: Unable to download API page: HTTP Error 429"),
        );
        let (downloader, _rx) = downloader(fake.clone(), Arc::new(FixedAnswer(true)));

        let err = downloader
            .search_and_download("rust", "/tmp", Some("best"), false)
            .await
            .unwrap_err();

        match err {
            DownloadError::SearchFailed(message) => {
                assert_eq!(message, "ERROR: Unable to download API page: HTTP Error 429")
            }
            other => panic!("expected SearchFailed, got {:?}", other),
        }
        assert_eq!(fake.searches(), 1);
        assert_eq!(fake.downloads(), 0);
    }

    #[tokio::test]
    async fn identical_requests_download_twice() {
        let dir = tempfile::tempdir().unwrap();
        let fake = Arc::new(FakeExtractor::new());
        let (downloader, _rx) = downloader(fake.clone(), Arc::new(FixedAnswer(true)));
        let same = input("https://youtu.be/x", dir.path().to_str().unwrap(), Some("best"));

        for _ in 0..2 {
            if let WorkflowOutcome::Dispatched { handle, .. } = downloader.start_download(&same).await.unwrap() {
                handle.wait().await;
            }
        }
        assert_eq!(fake.downloads(), 2);
    }
}
