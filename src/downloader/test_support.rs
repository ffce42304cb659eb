// In-memory extractor for workflow tests

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::Semaphore;

use super::errors::ExtractorError;
use super::models::{
    DownloadedFile, MediaInfo, ProgressEvent, SearchHit, TransferOptions, UiMessage,
};
use super::traits::{Extractor, ProgressSink};

/// What a fake transfer does
pub enum FakeTransfer {
    /// Report `events`, then create `file_name` in the output directory
    Writes {
        file_name: String,
        events: Vec<ProgressEvent>,
    },
    /// Fail with this stderr text
    Fails(String),
}

impl FakeTransfer {
    pub fn writes(file_name: &str) -> Self {
        Self::Writes {
            file_name: file_name.to_string(),
            events: vec![ProgressEvent::downloading(
                "45.2%",
                Some("10.00MiB".to_string()),
            )],
        }
    }
}

type ErrorFactory = Box<dyn Fn() -> ExtractorError + Send + Sync>;

pub struct FakeExtractor {
    info: Result<MediaInfo, String>,
    hits: Vec<SearchHit>,
    search_error: Option<String>,
    transfer: FakeTransfer,
    transfer_error: Option<ErrorFactory>,
    gate: Option<Arc<Semaphore>>,

    pub info_calls: AtomicUsize,
    pub download_calls: AtomicUsize,
    pub search_calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    formats: Mutex<Vec<String>>,
    urls: Mutex<Vec<String>>,
}

impl FakeExtractor {
    pub fn new() -> Self {
        Self {
            info: Ok(MediaInfo {
                title: "Big Buck Bunny".to_string(),
                approximate_size_bytes: Some(104_857_600),
                resolved_format: "22 - 1280x720 (720p)".to_string(),
            }),
            hits: Vec::new(),
            search_error: None,
            transfer: FakeTransfer::writes("Big Buck Bunny.mp4"),
            transfer_error: None,
            gate: None,
            info_calls: AtomicUsize::new(0),
            download_calls: AtomicUsize::new(0),
            search_calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
            formats: Mutex::new(Vec::new()),
            urls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_info_error(mut self, message: &str) -> Self {
        self.info = Err(message.to_string());
        self
    }

    pub fn with_hits(mut self, hits: Vec<SearchHit>) -> Self {
        self.hits = hits;
        self
    }

    pub fn with_search_error(mut self, message: &str) -> Self {
        self.search_error = Some(message.to_string());
        self
    }

    pub fn with_transfer(mut self, transfer: FakeTransfer) -> Self {
        self.transfer = transfer;
        self
    }

    pub fn with_transfer_error<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> ExtractorError + Send + Sync + 'static,
    {
        self.transfer_error = Some(Box::new(factory));
        self
    }

    /// Transfers block until a permit is added to `gate`
    pub fn with_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn downloads(&self) -> usize {
        self.download_calls.load(Ordering::SeqCst)
    }

    pub fn infos(&self) -> usize {
        self.info_calls.load(Ordering::SeqCst)
    }

    pub fn searches(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    pub fn last_format(&self) -> Option<String> {
        self.formats.lock().unwrap().last().cloned()
    }

    pub fn downloaded_urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Extractor for FakeExtractor {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn extract_info(&self, _url: &str, format: &str) -> Result<MediaInfo, ExtractorError> {
        self.info_calls.fetch_add(1, Ordering::SeqCst);
        self.formats.lock().unwrap().push(format.to_string());
        self.info.clone().map_err(|stderr| ExtractorError::Failed { stderr })
    }

    async fn download(
        &self,
        url: &str,
        options: &TransferOptions,
        progress: &dyn ProgressSink,
    ) -> Result<DownloadedFile, ExtractorError> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        self.formats.lock().unwrap().push(options.format_selector.clone());
        self.urls.lock().unwrap().push(url.to_string());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(factory) = &self.transfer_error {
            return Err(factory());
        }

        match &self.transfer {
            FakeTransfer::Writes { file_name, events } => {
                for event in events {
                    progress.on_progress(event.clone());
                }
                let dir = Path::new(&options.output_template)
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_default();
                let path = dir.join(file_name);
                tokio::fs::write(&path, b"media").await?;
                Ok(DownloadedFile { path })
            }
            FakeTransfer::Fails(stderr) => Err(ExtractorError::Failed {
                stderr: stderr.clone(),
            }),
        }
    }

    async fn search(
        &self,
        _query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchHit>, ExtractorError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(stderr) = &self.search_error {
            return Err(ExtractorError::Failed {
                stderr: stderr.clone(),
            });
        }
        Ok(self.hits.iter().take(max_results).cloned().collect())
    }
}

/// Everything currently queued on a UI channel
pub fn drain(rx: &mut UnboundedReceiver<UiMessage>) -> Vec<UiMessage> {
    let mut messages = Vec::new();
    while let Ok(message) = rx.try_recv() {
        messages.push(message);
    }
    messages
}
