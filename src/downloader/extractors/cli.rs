// CLI extractor - drives the native `yt-dlp` binary
//
// Metadata and search queries run to completion under a timeout and are
// parsed from `-J` JSON. Transfers stream stdout/stderr line by line so
// progress can be relayed while the tool runs.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command as TokioCommand;
use tracing::{debug, info, warn};

use super::config::ExtractorConfig;
use super::progress::{is_progress_line, parse_progress_line, progress_template};
use crate::downloader::errors::ExtractorError;
use crate::downloader::models::{DownloadedFile, MediaInfo, SearchHit, TransferOptions};
use crate::downloader::traits::{Extractor, ProgressSink};
use crate::downloader::utils::{error_text, run_output_with_timeout};

const WATCH_URL_PREFIX: &str = "https://www.youtube.com/watch?v=";

/// Extractor backed by the yt-dlp binary
pub struct YtDlpExtractor {
    config: ExtractorConfig,
}

impl YtDlpExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    fn info_args(&self, url: &str, format: &str) -> Vec<String> {
        let mut args = vec![
            "-J".to_string(),
            "--no-playlist".to_string(),
            "-f".to_string(),
            format.to_string(),
        ];
        args.extend(self.config.common_args());
        args.push(url.to_string());
        args
    }

    fn search_args(&self, query: &str, max_results: usize) -> Vec<String> {
        let mut args = vec!["-J".to_string(), "--flat-playlist".to_string()];
        args.extend(self.config.common_args());
        args.push(format!("ytsearch{}:{}", max_results.max(1), query));
        args
    }

    fn download_args(&self, url: &str, options: &TransferOptions) -> Vec<String> {
        let mut args = vec![
            "-f".to_string(),
            options.format_selector.clone(),
            "-o".to_string(),
            options.output_template.clone(),
            "--no-playlist".to_string(),
            "--newline".to_string(),
            "--no-colors".to_string(),
            "--progress".to_string(),
            "--progress-template".to_string(),
            progress_template(),
            "--print".to_string(),
            "after_move:filepath".to_string(),
        ];
        args.extend(self.config.common_args());
        args.push(url.to_string());
        args
    }
}

#[async_trait]
impl Extractor for YtDlpExtractor {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn extract_info(&self, url: &str, format: &str) -> Result<MediaInfo, ExtractorError> {
        let args = self.info_args(url, format);
        let out =
            run_output_with_timeout(&self.config.ytdlp_path, &args, self.config.timeout_seconds)
                .await?;

        if !out.status.success() {
            return Err(ExtractorError::Failed {
                stderr: error_text(&out.stderr, out.status),
            });
        }

        parse_media_info(&out.stdout)
    }

    async fn download(
        &self,
        url: &str,
        options: &TransferOptions,
        progress: &dyn ProgressSink,
    ) -> Result<DownloadedFile, ExtractorError> {
        let args = self.download_args(url, options);
        info!(url, format = %options.format_selector, "starting yt-dlp transfer");
        debug!(args = %args.join(" "), "yt-dlp arguments");

        let mut child = TokioCommand::new(&self.config.ytdlp_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ExtractorError::Spawn {
                program: self.config.ytdlp_path.display().to_string(),
                source,
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ExtractorError::Parse("stdout was not captured".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ExtractorError::Parse("stderr was not captured".to_string()))?;

        // Progress may land on either stream depending on --quiet handling.
        let (stdout_lines, stderr_lines) =
            tokio::join!(pump(stdout, progress), pump(stderr, progress));
        let stdout_lines = stdout_lines?;
        let stderr_lines = stderr_lines?;

        let status = child.wait().await?;
        if !status.success() {
            let stderr = error_text(stderr_lines.join("\n").as_bytes(), status);
            warn!(url, %status, "yt-dlp transfer failed");
            return Err(ExtractorError::Failed { stderr });
        }

        let path = final_path_from_output(&stdout_lines).ok_or_else(|| {
            ExtractorError::Parse("yt-dlp did not report the output file".to_string())
        })?;
        info!(path = %path.display(), "yt-dlp transfer finished");

        Ok(DownloadedFile { path })
    }

    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchHit>, ExtractorError> {
        let args = self.search_args(query, max_results);
        let out =
            run_output_with_timeout(&self.config.ytdlp_path, &args, self.config.timeout_seconds)
                .await?;

        if !out.status.success() {
            return Err(ExtractorError::Failed {
                stderr: error_text(&out.stderr, out.status),
            });
        }

        parse_search_hits(&out.stdout, max_results)
    }
}

/// Forward progress lines to `sink`; return every other non-empty line
async fn pump<R>(reader: R, sink: &dyn ProgressSink) -> Result<Vec<String>, ExtractorError>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    let mut rest = Vec::new();

    // Raw bytes; titles and locale-encoded messages are not always UTF-8.
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\r', '\n']).to_string();

        if let Some(event) = parse_progress_line(&line) {
            sink.on_progress(event);
        } else if is_progress_line(&line) {
            continue;
        } else if !line.trim().is_empty() {
            debug!(target: "yt-dlp", "{}", line);
            rest.push(line);
        }
    }

    Ok(rest)
}

fn parse_json(stdout: &[u8]) -> Result<Value, ExtractorError> {
    serde_json::from_slice(stdout).map_err(|e| ExtractorError::Parse(format!("Invalid JSON: {}", e)))
}

/// Title, approximate size and resolved format from `-J` output
pub fn parse_media_info(stdout: &[u8]) -> Result<MediaInfo, ExtractorError> {
    let json = parse_json(stdout)?;

    let title = json["title"]
        .as_str()
        .ok_or_else(|| ExtractorError::Parse("No title in JSON".to_string()))?
        .to_string();

    let approximate_size_bytes = json["filesize_approx"]
        .as_u64()
        .or_else(|| json["filesize"].as_u64())
        .or_else(|| json["filesize_approx"].as_f64().map(|f| f as u64));

    let resolved_format = json["format"]
        .as_str()
        .or_else(|| json["format_id"].as_str())
        .unwrap_or("unknown")
        .to_string();

    Ok(MediaInfo {
        title,
        approximate_size_bytes,
        resolved_format,
    })
}

/// Search entries from `-J --flat-playlist ytsearchN:` output
pub fn parse_search_hits(stdout: &[u8], max_results: usize) -> Result<Vec<SearchHit>, ExtractorError> {
    let json = parse_json(stdout)?;
    let entries = match json["entries"].as_array() {
        Some(entries) => entries,
        None => return Ok(Vec::new()),
    };

    let hits = entries
        .iter()
        .filter_map(|entry| {
            let url = entry["webpage_url"]
                .as_str()
                .map(str::to_string)
                .or_else(|| {
                    entry["url"]
                        .as_str()
                        .filter(|u| u.starts_with("http"))
                        .map(str::to_string)
                })
                .or_else(|| entry["id"].as_str().map(|id| format!("{}{}", WATCH_URL_PREFIX, id)))?;
            let title = entry["title"].as_str().unwrap_or("Unknown").to_string();
            Some(SearchHit { title, url })
        })
        .take(max_results)
        .collect();

    Ok(hits)
}

/// The path printed by `--print after_move:filepath` is the last plain line
pub fn final_path_from_output(lines: &[String]) -> Option<PathBuf> {
    lines
        .iter()
        .rev()
        .map(|l| l.trim())
        .find(|l| !l.is_empty() && !l.starts_with('[') && !l.starts_with("WARNING:"))
        .map(PathBuf::from)
}
