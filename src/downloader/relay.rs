// Progress relay - background tasks send, the presentation loop renders
//
// A download task never writes presentation state. It holds a
// ProgressEmitter that pushes UiMessages into a channel; the single
// presentation loop drains the channel and applies each message to its
// StatusSlot.

use std::collections::HashSet;

use tokio::sync::mpsc::UnboundedSender;

use super::models::{DownloadId, DownloadResult, ProgressEvent, UiMessage};
use super::traits::ProgressSink;

pub const DOWNLOAD_COMPLETE: &str = "Download complete";

/// Progress emitter helper, one per dispatched download
#[derive(Debug, Clone)]
pub struct ProgressEmitter {
    id: DownloadId,
    tx: UnboundedSender<UiMessage>,
}

impl ProgressEmitter {
    pub fn new(id: DownloadId, tx: UnboundedSender<UiMessage>) -> Self {
        Self { id, tx }
    }

    pub fn id(&self) -> DownloadId {
        self.id
    }

    pub fn emit(&self, event: ProgressEvent) {
        // The receiver is gone only when the front-end is shutting down.
        let _ = self.tx.send(UiMessage::Progress { id: self.id, event });
    }

    pub fn complete(&self, result: DownloadResult) {
        let _ = self.tx.send(UiMessage::Completed {
            id: self.id,
            result,
        });
    }
}

impl ProgressSink for ProgressEmitter {
    fn on_progress(&self, event: ProgressEvent) {
        self.emit(event);
    }
}

/// Render a progress event as status text
pub fn render(event: &ProgressEvent) -> String {
    match event {
        ProgressEvent::Downloading {
            percent,
            total_bytes_label,
        } => format!("Downloading: {} of {}", percent, total_bytes_label),
        ProgressEvent::Finished => DOWNLOAD_COMPLETE.to_string(),
        ProgressEvent::Failed { .. } => String::new(),
    }
}

/// The single shared status line.
///
/// Latest message from any download wins. Once a download has reached
/// `Finished` or `Failed`, stray events tagged with its id are dropped.
///
/// Ids are issued in increasing order from `DownloadId::FIRST`. Every id
/// below `settled_below` is settled; `settled` only holds the ones above it.
#[derive(Debug)]
pub struct StatusSlot {
    text: String,
    settled_below: u64,
    settled: HashSet<DownloadId>,
}

impl Default for StatusSlot {
    fn default() -> Self {
        Self {
            text: String::new(),
            settled_below: DownloadId::FIRST.0,
            settled: HashSet::new(),
        }
    }
}

impl StatusSlot {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_settled(&self, id: DownloadId) -> bool {
        id.0 < self.settled_below || self.settled.contains(&id)
    }

    /// Mark `id` settled; false if it already was
    fn settle(&mut self, id: DownloadId) -> bool {
        if self.is_settled(id) {
            return false;
        }
        self.settled.insert(id);
        while self.settled.remove(&DownloadId(self.settled_below)) {
            self.settled_below += 1;
        }
        true
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// A new request starts; its id may show status again
    ///
    /// Ids already folded below the settled floor stay settled.
    pub fn begin(&mut self, id: DownloadId) {
        self.settled.remove(&id);
        self.text.clear();
    }

    /// Apply one message; returns true when the visible text changed
    pub fn apply(&mut self, message: &UiMessage) -> bool {
        let id = message.id();
        let next = match message {
            UiMessage::Progress { event, .. } => {
                if self.is_settled(id) {
                    return false;
                }
                if event.is_terminal() {
                    self.settle(id);
                }
                render(event)
            }
            UiMessage::Completed { result, .. } => {
                let already_settled = !self.settle(id);
                match result {
                    // Success keeps "Download complete"; a failure always clears.
                    DownloadResult::Success { .. } if already_settled => return false,
                    DownloadResult::Success { .. } => DOWNLOAD_COMPLETE.to_string(),
                    DownloadResult::Failure { .. } => String::new(),
                }
            }
        };

        if next == self.text {
            return false;
        }
        self.text = next;
        true
    }
}
