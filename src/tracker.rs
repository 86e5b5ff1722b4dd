use chrono::Utc;
use tracing::{debug, info};

use crate::models::{SizeAvailability, StoredAvailability};
use crate::store::{AvailabilityStore, Lookup};
use crate::utils::error::{AppError, Result};

/// Edge-triggered state diff over the availability store.
///
/// For every fresh record: look up the stored row by (name, size),
/// report it when availability rose from false to true, and persist the
/// fresh value either way. A first observation is inserted and never
/// reported. A multi-row lookup aborts the run as corrupt state.
///
/// Returns the newly-available subset in input order.
pub async fn detect_transitions(
    store: &AvailabilityStore,
    records: &[SizeAvailability],
) -> Result<Vec<SizeAvailability>> {
    let mut newly_available = Vec::new();

    for record in records {
        let now = Utc::now();

        match store.lookup(&record.name, &record.size).await? {
            Lookup::Found(previous) => {
                if !previous.available && record.available {
                    debug!(name = %record.name, size = %record.size, "became newly available");
                    newly_available.push(record.clone());
                }
                store
                    .update(&record.name, &record.size, record.available, now)
                    .await?;
            }
            Lookup::NotFound => {
                // First observation: no prior state, never an event.
                store.insert(&StoredAvailability::new(record, now)).await?;
            }
            Lookup::Ambiguous => {
                return Err(AppError::CorruptState {
                    name: record.name.clone(),
                    size: record.size.clone(),
                });
            }
        }
    }

    info!(
        checked = records.len(),
        newly_available = newly_available.len(),
        "availability pass complete"
    );

    Ok(newly_available)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store() -> AvailabilityStore {
        let store = AvailabilityStore::in_memory().await.unwrap();
        store.init().await.unwrap();
        store
    }

    fn record(name: &str, size: &str, available: bool) -> SizeAvailability {
        SizeAvailability::new(name, size, available)
    }

    async fn seed(store: &AvailabilityStore, name: &str, size: &str, available: bool) {
        store
            .insert(&StoredAvailability::new(
                &record(name, size, available),
                Utc::now(),
            ))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_first_seen_is_inserted_but_never_an_event() {
        let store = test_store().await;
        let fresh = vec![record("Product A", "20g", true)];

        let events = detect_transitions(&store, &fresh).await.unwrap();

        assert!(events.is_empty());
        match store.lookup("Product A", "20g").await.unwrap() {
            Lookup::Found(row) => assert!(row.available),
            other => panic!("expected Found, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_first_seen_unavailable_is_also_silent() {
        let store = test_store().await;
        let events = detect_transitions(&store, &[record("Product A", "20g", false)])
            .await
            .unwrap();
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_rising_edge_fires_exactly_once() {
        let store = test_store().await;
        seed(&store, "Product A", "20g", false).await;

        let fresh = vec![record("Product A", "20g", true)];
        let events = detect_transitions(&store, &fresh).await.unwrap();

        assert_eq!(events, fresh);
        match store.lookup("Product A", "20g").await.unwrap() {
            Lookup::Found(row) => assert!(row.available),
            other => panic!("expected Found, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_steady_available_is_silent() {
        let store = test_store().await;
        seed(&store, "Product A", "20g", true).await;

        let events = detect_transitions(&store, &[record("Product A", "20g", true)])
            .await
            .unwrap();
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_falling_edge_is_silent_but_persisted() {
        let store = test_store().await;
        seed(&store, "Product A", "20g", true).await;

        let events = detect_transitions(&store, &[record("Product A", "20g", false)])
            .await
            .unwrap();

        assert!(events.is_empty());
        match store.lookup("Product A", "20g").await.unwrap() {
            Lookup::Found(row) => assert!(!row.available),
            other => panic!("expected Found, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_steady_unavailable_is_silent() {
        let store = test_store().await;
        seed(&store, "Product A", "20g", false).await;

        let events = detect_transitions(&store, &[record("Product A", "20g", false)])
            .await
            .unwrap();
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_identical_passes_report_nothing_the_second_time() {
        let store = test_store().await;
        let fresh = vec![
            record("Product A", "20g", true),
            record("Product A", "40g", false),
            record("Product B", "100g", true),
        ];

        let first = detect_transitions(&store, &fresh).await.unwrap();
        let second = detect_transitions(&store, &fresh).await.unwrap();

        // First pass only inserts; second pass sees no change.
        assert!(first.is_empty());
        assert!(second.is_empty());
        assert_eq!(store.all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_output_preserves_input_order() {
        let store = test_store().await;
        seed(&store, "Product B", "100g", false).await;
        seed(&store, "Product A", "20g", false).await;

        let fresh = vec![
            record("Product B", "100g", true),
            record("Product A", "20g", true),
        ];
        let events = detect_transitions(&store, &fresh).await.unwrap();

        assert_eq!(events, fresh);
    }

    #[tokio::test]
    async fn test_duplicate_records_in_one_batch_last_write_wins() {
        let store = test_store().await;
        let fresh = vec![
            record("Product A", "20g", true),
            record("Product A", "20g", false),
        ];

        let events = detect_transitions(&store, &fresh).await.unwrap();

        assert!(events.is_empty());
        let rows = store.all().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].available);
    }

    #[tokio::test]
    async fn test_duplicate_rising_edge_in_one_batch_fires_once() {
        let store = test_store().await;
        seed(&store, "Product A", "20g", false).await;

        // First copy flips the stored state to true, so the second copy
        // sees a steady state.
        let fresh = vec![
            record("Product A", "20g", true),
            record("Product A", "20g", true),
        ];
        let events = detect_transitions(&store, &fresh).await.unwrap();

        assert_eq!(events.len(), 1);
    }

    #[tokio::test]
    async fn test_ambiguous_lookup_aborts_as_corrupt_state() {
        // Build a table without the primary key so two rows can share a
        // natural key, the shape a corrupted store would present.
        let store = AvailabilityStore::in_memory().await.unwrap();
        sqlx::query(
            "CREATE TABLE product (
                name TEXT NOT NULL,
                size TEXT NOT NULL,
                available BOOLEAN NOT NULL,
                created_at TEXT NOT NULL,
                last_modified TEXT NOT NULL
            )",
        )
        .execute(store.pool())
        .await
        .unwrap();
        for available in [false, true] {
            sqlx::query(
                "INSERT INTO product (name, size, available, created_at, last_modified)
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind("Product A")
            .bind("20g")
            .bind(available)
            .bind(Utc::now())
            .bind(Utc::now())
            .execute(store.pool())
            .await
            .unwrap();
        }

        let result = detect_transitions(&store, &[record("Product A", "20g", true)]).await;

        match result {
            Err(AppError::CorruptState { name, size }) => {
                assert_eq!(name, "Product A");
                assert_eq!(size, "20g");
            }
            other => panic!("expected CorruptState, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_mixed_batch_reports_only_rising_edges() {
        let store = test_store().await;
        seed(&store, "Product A", "20g", false).await;
        seed(&store, "Product A", "40g", true).await;
        seed(&store, "Product B", "100g", true).await;

        let fresh = vec![
            record("Product A", "20g", true),  // rising edge
            record("Product A", "40g", true),  // steady
            record("Product B", "100g", false), // falling edge
            record("Product C", "30g", true),  // first seen
        ];
        let events = detect_transitions(&store, &fresh).await.unwrap();

        assert_eq!(events, vec![record("Product A", "20g", true)]);
        assert_eq!(store.all().await.unwrap().len(), 4);
    }
}
