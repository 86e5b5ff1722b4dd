use scraper::{Html, Selector};

use crate::models::SizeAvailability;
use crate::utils::error::{AppError, Result};

/// Marker string whose presence inside a size block means the variant is
/// out of stock.
const OUT_OF_STOCK_MARKER: &str = "out-of-stock";

/// Parses a product page into per-size availability records. Pure
/// transform over the HTML text; selectors are parsed once up front.
pub struct AvailabilityExtractor {
    title: Selector,
    size_block: Selector,
    size_label: Selector,
}

impl AvailabilityExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            title: parse_selector("title")?,
            size_block: parse_selector("div.product-form-row")?,
            size_label: parse_selector("dl.pa-pa_size dd")?,
        })
    }

    /// Extract one record per size-option block. The product name is the
    /// first whitespace-delimited token of the page title. A block whose
    /// size label is missing or empty fails the whole run.
    pub fn extract(&self, html: &str) -> Result<Vec<SizeAvailability>> {
        let document = Html::parse_document(html);
        let product_name = self.product_name(&document)?;

        let mut records = Vec::new();
        for block in document.select(&self.size_block) {
            let size = block
                .select(&self.size_label)
                .next()
                .map(|label| label.text().collect::<Vec<_>>().join(" ").trim().to_string())
                .filter(|size| !size.is_empty())
                .ok_or_else(|| AppError::MissingSize {
                    product: product_name.clone(),
                })?;

            // Absence of the marker anywhere in the block means in stock.
            let available = !block.html().contains(OUT_OF_STOCK_MARKER);

            records.push(SizeAvailability::new(product_name.clone(), size, available));
        }

        Ok(records)
    }

    fn product_name(&self, document: &Html) -> Result<String> {
        let title = document
            .select(&self.title)
            .next()
            .map(|element| element.text().collect::<String>())
            .ok_or_else(|| AppError::Parse {
                message: "product page has no <title> element".to_string(),
            })?;

        title
            .split_whitespace()
            .next()
            .map(|token| token.to_string())
            .ok_or_else(|| AppError::Parse {
                message: "product page title is empty".to_string(),
            })
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| AppError::Parse {
        message: format!("Invalid CSS selector '{selector}': {e:?}"),
    })
}
