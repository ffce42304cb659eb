// Parsing of yt-dlp progress output
//
// Downloads run with a progress template that prints one machine-readable
// line per update:
//   [progress]  45.2%|10.00MiB
// The default human-readable line is understood as well:
//   [download]  45.2% of ~ 10.00MiB at  1.20MiB/s ETA 00:07 (frag 3/40)

use regex::Regex;

use crate::downloader::models::ProgressEvent;

pub const PROGRESS_PREFIX: &str = "[progress]";

/// Value for `--progress-template`
pub fn progress_template() -> String {
    format!(
        "download:{} %(progress._percent_str)s|%(progress._total_bytes_str)s",
        PROGRESS_PREFIX
    )
}

lazy_static::lazy_static! {
    static ref ANSI_RE: Regex = Regex::new(r"\x1b\[[0-9;]*m").unwrap();
    static ref DOWNLOAD_RE: Regex = Regex::new(
        r"^\[download\]\s+(\d+(?:\.\d+)?%)(?:\s+of\s+~?\s*(\S+))?"
    ).unwrap();
}

/// Parse one stdout line into a `Downloading` event
pub fn parse_progress_line(line: &str) -> Option<ProgressEvent> {
    let clean = ANSI_RE.replace_all(line.trim(), "");

    if let Some(rest) = clean.strip_prefix(PROGRESS_PREFIX) {
        let (percent, total) = match rest.split_once('|') {
            Some((percent, total)) => (percent, Some(total.to_string())),
            None => (rest, None),
        };
        let percent = percent.trim();
        if percent.is_empty() {
            return None;
        }
        return Some(ProgressEvent::downloading(percent, total));
    }

    let caps = DOWNLOAD_RE.captures(&clean)?;
    let percent = caps.get(1)?.as_str();
    let total = caps.get(2).map(|m| m.as_str().to_string());
    Some(ProgressEvent::downloading(percent, total))
}

/// True for any line the parser consumes
pub fn is_progress_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with(PROGRESS_PREFIX) || DOWNLOAD_RE.is_match(trimmed)
}
