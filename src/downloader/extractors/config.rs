// Settings shared by every yt-dlp invocation

use std::path::PathBuf;

/// Configuration for the yt-dlp extractor
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// yt-dlp executable
    pub ytdlp_path: PathBuf,
    /// SOCKS5/HTTP proxy URL
    pub proxy: Option<String>,
    /// Path to cookies.txt file
    pub cookies_path: Option<PathBuf>,
    /// Browser to read cookies from (chrome, firefox, ...)
    pub cookies_from_browser: Option<String>,
    /// Limit for metadata and search queries; transfers are unbounded
    pub timeout_seconds: u64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: PathBuf::from("yt-dlp"),
            proxy: None,
            cookies_path: None,
            cookies_from_browser: None,
            timeout_seconds: 30,
        }
    }
}

impl ExtractorConfig {
    pub fn with_ytdlp_path(mut self, path: PathBuf) -> Self {
        self.ytdlp_path = path;
        self
    }

    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn with_cookies_path(mut self, path: Option<PathBuf>) -> Self {
        self.cookies_path = path;
        self
    }

    pub fn with_cookies_from_browser(mut self, browser: Option<String>) -> Self {
        self.cookies_from_browser = browser;
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds.max(1);
        self
    }

    /// Network and auth flags appended to every command
    pub fn common_args(&self) -> Vec<String> {
        let mut args = vec![
            "--no-warnings".to_string(),
            "--socket-timeout".to_string(),
            self.timeout_seconds.to_string(),
        ];

        if let Some(path) = &self.cookies_path {
            args.push("--cookies".to_string());
            args.push(path.to_string_lossy().into_owned());
        } else if let Some(browser) = &self.cookies_from_browser {
            args.push("--cookies-from-browser".to_string());
            args.push(browser.clone());
        }

        if let Some(proxy) = &self.proxy {
            args.push("--proxy".to_string());
            args.push(proxy.clone());
        }

        args
    }
}
