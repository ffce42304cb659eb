// Command dispatch for the terminal front-end

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::cli::{Cli, Commands, TargetArgs};
use super::console::{Console, InquireConfirm, Report};
use crate::config::AppConfig;
use crate::downloader::extractors::YtDlpExtractor;
use crate::downloader::tools::{locate_ytdlp, tool_info};
use crate::downloader::{
    Confirm, DownloadError, DownloadHandle, DownloadResult, Downloader, FixedAnswer,
    FormatSelector, MediaInfo, RawInput, Severity, WorkflowOutcome,
};

/// Run one command; `Ok(false)` means the request failed and was reported
pub async fn run(cli: Cli, mut config: AppConfig) -> anyhow::Result<bool> {
    if let Some(path) = cli.ytdlp_path.clone() {
        config.ytdlp_path = Some(path);
    }
    if let Some(proxy) = cli.proxy.clone() {
        config.proxy = Some(proxy);
    }

    match cli.command {
        Commands::Presets => {
            list_presets(cli.json)?;
            Ok(true)
        }
        Commands::Check => check(&config, cli.json).await,
        Commands::Download { url, target, yes } => {
            let confirm: Arc<dyn Confirm> = if yes {
                Arc::new(FixedAnswer(true))
            } else {
                Arc::new(InquireConfirm)
            };
            let (downloader, mut console) = build(&config, confirm, cli.json);

            let input = raw_input(url, &target, &config);
            match downloader.start_download(&input).await {
                Ok(WorkflowOutcome::Dispatched { preview, handle }) => {
                    Ok(finish(&mut console, handle, Some(&preview)).await)
                }
                Ok(WorkflowOutcome::Declined { preview }) => {
                    console.report(&Report::declined(&preview));
                    Ok(true)
                }
                Err(e) => {
                    console.notify_error(&e);
                    Ok(exit_ok(&e))
                }
            }
        }
        Commands::Lucky { query, target } => {
            let (downloader, mut console) = build(&config, Arc::new(FixedAnswer(true)), cli.json);

            let query = query.join(" ");
            let input = raw_input(String::new(), &target, &config);
            let started = downloader
                .search_and_download(
                    &query,
                    &input.output_directory,
                    input.format_choice.as_deref(),
                    input.audio_only,
                )
                .await;

            match started {
                Ok(handle) => Ok(finish(&mut console, handle, None).await),
                Err(e) => {
                    console.notify_error(&e);
                    Ok(exit_ok(&e))
                }
            }
        }
    }
}

/// Informational outcomes such as an empty search are not failures
fn exit_ok(error: &DownloadError) -> bool {
    error.severity() == Severity::Info
}

fn build(config: &AppConfig, confirm: Arc<dyn Confirm>, json: bool) -> (Downloader, Console) {
    let extractor = Arc::new(YtDlpExtractor::new(config.extractor_config()));
    debug!(ytdlp = %extractor.config().ytdlp_path.display(), "extractor ready");

    let (tx, rx) = mpsc::unbounded_channel();
    let downloader = Downloader::new(extractor, confirm, config.orchestrator_settings(), tx);
    (downloader, Console::new(rx, json))
}

/// CLI values first, config defaults for anything left out
fn raw_input(url: String, target: &TargetArgs, config: &AppConfig) -> RawInput {
    RawInput {
        url,
        output_directory: target
            .output
            .clone()
            .unwrap_or_else(|| config.output_dir.to_string_lossy().into_owned()),
        format_choice: Some(
            target
                .format
                .clone()
                .unwrap_or_else(|| config.default_format.clone()),
        ),
        audio_only: target.audio,
    }
}

async fn finish(console: &mut Console, handle: DownloadHandle, preview: Option<&MediaInfo>) -> bool {
    match console.follow(handle).await {
        DownloadResult::Success { final_path } => {
            info!(path = %final_path.display(), "download complete");
            console.report(&Report::success(preview, final_path));
            true
        }
        DownloadResult::Failure { error } => {
            console.notify_error(&error);
            false
        }
    }
}

fn list_presets(json: bool) -> anyhow::Result<()> {
    let presets = FormatSelector::presets();
    if json {
        let text = serde_json::to_string_pretty(presets).context("serializing presets")?;
        println!("{}", text);
        return Ok(());
    }

    for preset in presets {
        let merged = if preset.is_merged { "  (needs ffmpeg)" } else { "" };
        let default = if preset.label == FormatSelector::default_label() {
            "  [default]"
        } else {
            ""
        };
        println!("{}{}{}", preset.label, merged, default);
    }
    Ok(())
}

async fn check(config: &AppConfig, json: bool) -> anyhow::Result<bool> {
    let path = locate_ytdlp(config.ytdlp_path.as_deref());
    let info = tool_info(&path).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&info).context("serializing tool info")?);
    } else {
        match &info.version {
            Some(version) => println!("{} {} ({})", info.name, version, info.path.display()),
            None => println!("{} not found (looked for {})", info.name, info.path.display()),
        }
    }

    Ok(info.is_available)
}
