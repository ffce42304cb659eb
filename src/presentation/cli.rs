use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Command line parameters
#[derive(Parser, Debug)]
#[command(name = "media-downloader")]
#[command(author, version, about = "Download videos with yt-dlp, with a preview and live progress")]
pub struct Cli {
    /// Config file (default: <config dir>/media-downloader/config.toml)
    #[arg(long, global = true, env = "MEDIA_DOWNLOADER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to the yt-dlp binary
    #[arg(long, global = true)]
    pub ytdlp_path: Option<PathBuf>,

    /// Proxy URL passed to yt-dlp
    #[arg(long, global = true)]
    pub proxy: Option<String>,

    /// Print the final result as JSON on stdout
    #[arg(long, global = true)]
    pub json: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Preview a URL, confirm, then download it
    Download {
        /// Video URL
        url: String,

        #[command(flatten)]
        target: TargetArgs,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Download the first search result without asking
    Lucky {
        /// Search query
        #[arg(value_name = "QUERY", num_args = 1.., required = true)]
        query: Vec<String>,

        #[command(flatten)]
        target: TargetArgs,
    },

    /// List the quality presets
    Presets,

    /// Show which yt-dlp binary would be used and its version
    Check,
}

/// Where and how to save
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Output directory (default from config)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Quality preset label or yt-dlp format selector
    #[arg(short, long)]
    pub format: Option<String>,

    /// Download audio only and rename to the audio extension
    #[arg(short, long)]
    pub audio: bool,
}

impl Cli {
    /// `tracing` filter for the -v/-q flags, used when RUST_LOG is unset
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "media_downloader=info,warn",
            1 => "media_downloader=debug,info",
            _ => "trace",
        }
    }
}
