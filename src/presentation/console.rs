// Terminal surface - prompt, status line and notifications
//
// Everything here runs on the presentation task. Background downloads
// only reach it through the UiMessage channel.

use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::warn;

use crate::downloader::extractors::{diagnose_error, FailureCause};
use crate::downloader::{
    Confirm, DownloadError, DownloadHandle, DownloadResult, MediaInfo, Severity, StatusSlot,
    UiMessage,
};

/// Yes/no prompt on the terminal, defaulting to "no"
pub struct InquireConfirm;

impl Confirm for InquireConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        // Preview lines go above the question itself.
        let (details, question) = match prompt.rsplit_once('\n') {
            Some((details, question)) => (Some(details), question),
            None => (None, prompt),
        };
        if let Some(details) = details {
            eprintln!("{}", details);
        }

        match inquire::Confirm::new(question).with_default(false).prompt() {
            Ok(answer) => answer,
            Err(e) => {
                warn!(error = %e, "prompt aborted");
                false
            }
        }
    }
}

/// Terminal outcome in machine-readable form
#[derive(Debug, Serialize)]
pub struct Report {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<FailureCause>,
}

impl Report {
    pub fn success(title: Option<&MediaInfo>, path: PathBuf) -> Self {
        Self {
            status: "success",
            title: title.map(|t| t.title.clone()),
            path: Some(path),
            error: None,
            message: None,
            cause: None,
        }
    }

    pub fn declined(preview: &MediaInfo) -> Self {
        Self {
            status: "declined",
            title: Some(preview.title.clone()),
            path: None,
            error: None,
            message: None,
            cause: None,
        }
    }

    pub fn failure(error: &DownloadError) -> Self {
        let message = error.to_string();
        Self {
            status: "failure",
            title: None,
            cause: diagnose_error(&message),
            error: Some(error.kind()),
            message: Some(message),
            path: None,
        }
    }
}

pub struct Console {
    rx: UnboundedReceiver<UiMessage>,
    slot: StatusSlot,
    json: bool,
    status_visible: bool,
}

impl Console {
    pub fn new(rx: UnboundedReceiver<UiMessage>, json: bool) -> Self {
        Self {
            rx,
            slot: StatusSlot::new(),
            json,
            status_visible: false,
        }
    }

    /// Render messages until the download finishes, then return its result
    pub async fn follow(&mut self, handle: DownloadHandle) -> DownloadResult {
        self.slot.begin(handle.id());
        let wait = handle.wait();
        tokio::pin!(wait);

        let result = loop {
            tokio::select! {
                Some(message) = self.rx.recv() => self.apply(&message),
                result = &mut wait => break result,
            }
        };

        // The completion message is sent before the task returns.
        while let Ok(message) = self.rx.try_recv() {
            self.apply(&message);
        }
        self.end_status_line();

        result
    }

    fn apply(&mut self, message: &UiMessage) {
        if self.slot.apply(message) {
            self.draw_status();
        }
    }

    fn draw_status(&mut self) {
        let mut err = std::io::stderr().lock();
        let _ = write!(err, "\r\x1b[2K{}", self.slot.text());
        let _ = err.flush();
        self.status_visible = !self.slot.text().is_empty();
    }

    fn end_status_line(&mut self) {
        if self.status_visible {
            eprintln!();
            self.status_visible = false;
        }
    }

    /// Print the final outcome of one request
    pub fn report(&self, report: &Report) {
        if self.json {
            match serde_json::to_string_pretty(report) {
                Ok(text) => println!("{}", text),
                Err(e) => warn!(error = %e, "failed to serialize report"),
            }
            return;
        }

        match report.status {
            "success" => {
                if let Some(path) = &report.path {
                    println!("Saved to {}", path.display());
                }
            }
            "declined" => println!("Download cancelled."),
            _ => {}
        }
    }

    /// Show an error the way its severity asks for
    pub fn notify_error(&self, error: &DownloadError) {
        if self.json {
            self.report(&Report::failure(error));
            return;
        }

        let label = match error.severity() {
            Severity::Warning => "[WARN]",
            Severity::Info => "[INFO]",
            Severity::Error => "[ERROR]",
        };
        eprintln!("{} {}: {}", label, error.title(), error);

        if error.severity() == Severity::Error {
            if let Some(cause) = diagnose_error(&error.to_string()) {
                eprintln!("  {}. {}", cause.description(), cause.hint());
                if cause.is_transient() {
                    eprintln!("  This is usually temporary; the same request may work later.");
                }
            }
        }
    }
}
