// Lucky search - resolve a query to the URL of its first result

use tracing::{debug, info};

use super::errors::DownloadError;
use super::models::SearchHit;
use super::traits::Extractor;

/// Only the first result is ever downloaded
pub const LUCKY_MAX_RESULTS: usize = 1;

/// First search hit, or `NoSearchResults`
pub async fn first_hit(extractor: &dyn Extractor, query: &str) -> Result<SearchHit, DownloadError> {
    debug!(extractor = extractor.name(), query, "searching");

    let hits = extractor
        .search(query, LUCKY_MAX_RESULTS)
        .await
        .map_err(|e| e.into_search_error())?;

    let hit = hits.into_iter().next().ok_or_else(|| DownloadError::NoSearchResults {
        query: query.to_string(),
    })?;

    info!(query, title = %hit.title, url = %hit.url, "feeling lucky");
    Ok(hit)
}
