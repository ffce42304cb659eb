// Downloader module - validate, preview, confirm, execute, relay

pub mod dispatcher;
pub mod errors;
pub mod executor;
pub mod extractors;
pub mod format_selector;
pub mod models;
pub mod orchestrator;
pub mod preview;
pub mod relay;
pub mod search;
pub mod tools;
pub mod traits;
pub mod utils;
pub mod validator;

#[cfg(test)]
mod test_support;

pub use dispatcher::{DownloadDispatcher, DownloadHandle};
pub use errors::{DownloadError, ExtractorError, Field, Severity};
pub use executor::DownloadExecutor;
pub use format_selector::{FormatSelector, QualityPreset};
pub use models::{
    DownloadId, DownloadRequest, DownloadResult, MediaInfo, ProgressEvent, SearchHit, UiMessage,
};
pub use orchestrator::{Downloader, OrchestratorSettings, WorkflowOutcome};
pub use relay::{ProgressEmitter, StatusSlot};
pub use traits::{Confirm, Extractor, FixedAnswer, ProgressSink};
pub use validator::RawInput;
