// yt-dlp discovery and version reporting

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use super::utils::run_output_with_timeout;

pub const YTDLP_BINARY: &str = if cfg!(windows) { "yt-dlp.exe" } else { "yt-dlp" };

/// Common install locations checked before PATH
const COMMON_PATHS: &[&str] = &[
    "/opt/homebrew/bin/yt-dlp", // Homebrew on Apple Silicon
    "/usr/local/bin/yt-dlp",    // Homebrew on Intel Mac
    "/usr/bin/yt-dlp",          // System installation
];

#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    pub name: String,
    pub path: PathBuf,
    pub version: Option<String>,
    pub is_available: bool,
}

/// Resolve the yt-dlp executable.
///
/// An explicitly configured path wins. Otherwise the common install
/// locations are tried, then every directory on PATH. Falls back to the
/// bare binary name so the spawn error names what was missing.
pub fn locate_ytdlp(configured: Option<&Path>) -> PathBuf {
    if let Some(path) = configured {
        return path.to_path_buf();
    }

    for path in COMMON_PATHS {
        let path = Path::new(path);
        if path.is_file() {
            debug!(path = %path.display(), "found yt-dlp in common location");
            return path.to_path_buf();
        }
    }

    if let Some(found) = search_path(YTDLP_BINARY) {
        debug!(path = %found.display(), "found yt-dlp on PATH");
        return found;
    }

    PathBuf::from(YTDLP_BINARY)
}

fn search_path(binary: &str) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(binary))
        .find(|candidate| candidate.is_file())
}

/// Ask the binary for its version
pub async fn tool_info(path: &Path) -> ToolInfo {
    let version = match run_output_with_timeout(path, &["--version".to_string()], 15).await {
        Ok(out) if out.status.success() => {
            let text = String::from_utf8_lossy(&out.stdout).trim().to_string();
            (!text.is_empty()).then_some(text)
        }
        _ => None,
    };

    ToolInfo {
        name: "yt-dlp".to_string(),
        path: path.to_path_buf(),
        is_available: version.is_some(),
        version,
    }
}
