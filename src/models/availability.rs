use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One size variant as scraped from a product page. No persisted history
/// yet; `available == true` means the size is in stock.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SizeAvailability {
    pub name: String,
    pub size: String,
    pub available: bool,
}

impl SizeAvailability {
    pub fn new(name: impl Into<String>, size: impl Into<String>, available: bool) -> Self {
        Self {
            name: name.into(),
            size: size.into(),
            available,
        }
    }

    /// Natural key of the record.
    pub fn key(&self) -> (&str, &str) {
        (&self.name, &self.size)
    }
}

/// A persisted availability record. At most one row exists per
/// (name, size) pair; `created_at` is set on first observation and never
/// touched again, `last_modified` is overwritten on every observation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct StoredAvailability {
    pub name: String,
    pub size: String,
    pub available: bool,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

impl StoredAvailability {
    pub fn new(record: &SizeAvailability, now: DateTime<Utc>) -> Self {
        Self {
            name: record.name.clone(),
            size: record.size.clone(),
            available: record.available,
            created_at: now,
            last_modified: now,
        }
    }
}
