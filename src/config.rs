use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};
use url::Url;

/// Default set of product pages to poll, in fetch order.
const DEFAULT_PRODUCT_URLS: [&str; 3] = [
    "https://www.marukyu-koyamaen.co.jp/english/shop/products/1161020c1/",
    "https://www.marukyu-koyamaen.co.jp/english/shop/products/1171020c1/",
    "https://www.marukyu-koyamaen.co.jp/english/shop/products/1191040c1/",
];

const DEFAULT_DATABASE_PATH: &str = "matcha-products.db";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub scraper: ScraperConfig,
    /// Product page URLs, fetched sequentially in this order.
    pub products: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    pub request_timeout: u64,
    pub user_agent: String,
}

impl AppConfig {
    /// Build the configuration from hardcoded defaults, letting
    /// environment variables with prefix "MATCHA" override them
    /// (e.g. MATCHA__DATABASE__PATH).
    pub fn from_env() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("database.path", DEFAULT_DATABASE_PATH)?
            .set_default("scraper.request_timeout", 30u64)?
            .set_default("scraper.user_agent", "MatchaWatcher/0.1")?
            .set_default(
                "products",
                DEFAULT_PRODUCT_URLS
                    .iter()
                    .map(|url| url.to_string())
                    .collect::<Vec<String>>(),
            )?
            .add_source(Environment::with_prefix("MATCHA").separator("__"))
            .build()?;

        let config: AppConfig = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.path.is_empty() {
            return Err(ConfigError::Message("Database path must not be empty".into()));
        }

        if self.scraper.request_timeout == 0 {
            return Err(ConfigError::Message(
                "Scraper request_timeout must be greater than 0".into(),
            ));
        }

        if self.products.is_empty() {
            return Err(ConfigError::Message("Product URL list must not be empty".into()));
        }

        for product in &self.products {
            if Url::parse(product).is_err() {
                return Err(ConfigError::Message(format!("Invalid product URL: {product}")));
            }
        }

        Ok(())
    }
}
