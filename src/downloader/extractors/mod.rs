// Extractor implementations
//
// yt-dlp is driven as a subprocess. Progress parsing and failure
// diagnostics live beside it since both read the tool's own output.

mod cli;
mod config;
mod diagnostics;
mod progress;

pub use cli::{final_path_from_output, parse_media_info, parse_search_hits, YtDlpExtractor};
pub use config::ExtractorConfig;
pub use diagnostics::{diagnose_error, FailureCause};
pub use progress::{parse_progress_line, progress_template};
