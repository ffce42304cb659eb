// Application configuration loaded from TOML

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::downloader::extractors::ExtractorConfig;
use crate::downloader::orchestrator::OrchestratorSettings;
use crate::downloader::tools::locate_ytdlp;

const APP_DIR: &str = "media-downloader";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Settings for one run; every field has a default
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub output_dir: PathBuf,
    pub default_format: String,
    pub audio_extension: String,
    pub max_concurrent_downloads: usize,
    pub ytdlp_path: Option<PathBuf>,
    pub proxy: Option<String>,
    pub cookies_path: Option<PathBuf>,
    pub cookies_from_browser: Option<String>,
    pub metadata_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: dirs::download_dir().unwrap_or_else(|| PathBuf::from(".")),
            default_format: "best".to_string(),
            audio_extension: "mp3".to_string(),
            max_concurrent_downloads: 2,
            ytdlp_path: None,
            proxy: None,
            cookies_path: None,
            cookies_from_browser: None,
            metadata_timeout_secs: 30,
        }
    }
}

impl AppConfig {
    /// `<config_dir>/media-downloader/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load from `path`, or from the default location.
    ///
    /// A missing file yields the defaults. An explicit path that does not
    /// exist is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => match Self::default_path() {
                Some(path) => (path, false),
                None => return Ok(Self::default()),
            },
        };

        match fs::read_to_string(&path) {
            Ok(text) => {
                debug!(path = %path.display(), "loading config");
                Self::from_toml(&text).map_err(|source| ConfigError::Parse { path, source })
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound && !required => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read { path, source }),
        }
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        let config: Self = toml::from_str(text)?;
        Ok(config.normalized())
    }

    fn normalized(mut self) -> Self {
        self.output_dir = expand_tilde(&self.output_dir);
        self.ytdlp_path = self.ytdlp_path.as_deref().map(expand_tilde);
        self.cookies_path = self.cookies_path.as_deref().map(expand_tilde);
        self.max_concurrent_downloads = self.max_concurrent_downloads.max(1);
        self.metadata_timeout_secs = self.metadata_timeout_secs.max(1);
        self.audio_extension = self.audio_extension.trim_start_matches('.').to_string();
        self
    }

    pub fn extractor_config(&self) -> ExtractorConfig {
        ExtractorConfig::default()
            .with_ytdlp_path(locate_ytdlp(self.ytdlp_path.as_deref()))
            .with_proxy(self.proxy.clone())
            .with_cookies_path(self.cookies_path.clone())
            .with_cookies_from_browser(self.cookies_from_browser.clone())
            .with_timeout(self.metadata_timeout_secs)
    }

    pub fn orchestrator_settings(&self) -> OrchestratorSettings {
        OrchestratorSettings {
            audio_extension: self.audio_extension.clone(),
            max_concurrent_downloads: self.max_concurrent_downloads,
        }
    }
}

/// Expand a leading `~/` to the home directory
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Some(text) = path.to_str() else {
        return path.to_path_buf();
    };
    let text = text.trim();

    let rest = text.strip_prefix("~/").or_else(|| text.strip_prefix("~\\"));
    match (rest, dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ if text == "~" => dirs::home_dir().unwrap_or_else(|| PathBuf::from(text)),
        _ => PathBuf::from(text),
    }
}
