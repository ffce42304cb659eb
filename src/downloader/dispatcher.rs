// Background dispatch - one tokio task per download, bounded by a semaphore
//
// Requests are accepted immediately; each task waits for a permit before
// starting its transfer, so the caller never blocks on the limit. There is
// no cancellation: once dispatched a transfer runs until it finishes or fails.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use super::errors::DownloadError;
use super::executor::DownloadExecutor;
use super::models::{DownloadId, DownloadRequest, DownloadResult, UiMessage};
use super::relay::ProgressEmitter;

/// Handle to a dispatched download
#[derive(Debug)]
pub struct DownloadHandle {
    id: DownloadId,
    join: JoinHandle<DownloadResult>,
}

impl DownloadHandle {
    pub fn id(&self) -> DownloadId {
        self.id
    }

    /// Wait for the terminal result
    pub async fn wait(self) -> DownloadResult {
        match self.join.await {
            Ok(result) => result,
            Err(e) => {
                error!(id = %self.id, error = %e, "download task did not complete");
                DownloadResult::Failure {
                    error: DownloadError::TransferFailed(format!("download task aborted: {}", e)),
                }
            }
        }
    }
}

pub struct DownloadDispatcher {
    executor: DownloadExecutor,
    permits: Arc<Semaphore>,
    max_concurrent: usize,
    next_id: AtomicU64,
    tx: UnboundedSender<UiMessage>,
}

impl DownloadDispatcher {
    pub fn new(executor: DownloadExecutor, max_concurrent: usize, tx: UnboundedSender<UiMessage>) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            executor,
            permits: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
            next_id: AtomicU64::new(DownloadId::FIRST.0),
            tx,
        }
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Spawn the request on its own task. Must be called inside a tokio runtime.
    pub fn dispatch(&self, request: DownloadRequest) -> DownloadHandle {
        let id = DownloadId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let emitter = ProgressEmitter::new(id, self.tx.clone());
        let executor = self.executor.clone();
        let permits = Arc::clone(&self.permits);

        debug!(%id, url = %request.source_url, "dispatching download");
        let join = tokio::spawn(async move {
            // The semaphore is never closed, so this only fails if it were.
            let _permit = permits.acquire_owned().await.ok();
            let result = executor.execute(request, &emitter).await;
            emitter.complete(result.clone());
            result
        });

        DownloadHandle { id, join }
    }
}
