use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::config::ScraperConfig;
use crate::utils::error::Result;

/// Thin HTTP collaborator: one GET per product page, body returned as
/// text. Transport errors and non-2xx statuses terminate the run.
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.request_timeout))
            .build()?;

        Ok(Self { client })
    }

    pub async fn fetch(&self, url: &str) -> Result<String> {
        debug!(%url, "fetching product page");
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}
