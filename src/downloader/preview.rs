// Metadata preview shown before the user confirms a download

use tracing::{debug, warn};

use super::errors::DownloadError;
use super::format_selector::PREVIEW_SELECTOR;
use super::models::MediaInfo;
use super::traits::Extractor;

/// Query title and approximate size without transferring anything.
///
/// Always asks for the preview selector, never the user's own choice.
pub async fn fetch_preview(extractor: &dyn Extractor, url: &str) -> Result<MediaInfo, DownloadError> {
    debug!(extractor = extractor.name(), url, "fetching preview");

    extractor
        .extract_info(url, PREVIEW_SELECTOR)
        .await
        .map_err(|e| {
            warn!(url, error = %e, "preview failed");
            e.into_metadata_error()
        })
}

/// Text of the yes/no confirmation prompt
pub fn confirmation_prompt(info: &MediaInfo, quality: &str) -> String {
    format!(
        "Title: {}\nSize: {}\nQuality: {}\nDo you want to download this video?",
        info.title,
        info.size_label(),
        quality
    )
}
