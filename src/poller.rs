use tracing::info;

use crate::config::AppConfig;
use crate::extractor::AvailabilityExtractor;
use crate::fetcher::PageFetcher;
use crate::models::SizeAvailability;
use crate::store::AvailabilityStore;
use crate::tracker;
use crate::utils::error::Result;

/// One full polling pass: fetch and extract every configured product
/// page in order, then diff the combined batch against the store.
///
/// Returns the records that became newly available since the last pass.
pub async fn run_once(config: &AppConfig) -> Result<Vec<SizeAvailability>> {
    let fetcher = PageFetcher::new(&config.scraper)?;
    let extractor = AvailabilityExtractor::new()?;

    let mut records = Vec::new();
    for url in &config.products {
        info!(%url, "checking product page");
        let html = fetcher.fetch(url).await?;
        let mut page_records = extractor.extract(&html)?;
        info!(%url, variants = page_records.len(), "extracted size variants");
        records.append(&mut page_records);
    }

    // The store handle lives only for this pass and is released on every
    // exit path, including failures.
    let store = AvailabilityStore::connect(&config.database.path).await?;
    store.init().await?;
    tracker::detect_transitions(&store, &records).await
}
