// Input validation - turns raw front-end fields into a DownloadRequest

use std::path::PathBuf;

use super::errors::{DownloadError, Field};
use super::format_selector::FormatSelector;
use super::models::DownloadRequest;

/// Raw values as collected by the presentation surface
#[derive(Debug, Clone, Default)]
pub struct RawInput {
    pub url: String,
    pub output_directory: String,
    /// Preset label or literal selector; `None` when nothing was picked
    pub format_choice: Option<String>,
    pub audio_only: bool,
}

/// Check that every required field is present.
///
/// Only emptiness is checked; a malformed URL is left for the extractor
/// to reject.
pub fn validate(input: &RawInput) -> Result<DownloadRequest, DownloadError> {
    let url = input.url.trim();
    if url.is_empty() {
        return Err(DownloadError::MissingField { field: Field::Url });
    }

    let output_directory = input.output_directory.trim();
    if output_directory.is_empty() {
        return Err(DownloadError::MissingField {
            field: Field::OutputDirectory,
        });
    }

    let format_selector = input
        .format_choice
        .as_deref()
        .and_then(FormatSelector::selector_from_choice)
        .ok_or(DownloadError::MissingField {
            field: Field::FormatSelector,
        })?;

    Ok(DownloadRequest {
        source_url: url.to_string(),
        output_directory: PathBuf::from(output_directory),
        format_selector,
        audio_only: input.audio_only,
    })
}

/// Reject an empty lucky-search query
pub fn validate_search(query: &str) -> Result<&str, DownloadError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(DownloadError::MissingField {
            field: Field::SearchQuery,
        });
    }
    Ok(query)
}
