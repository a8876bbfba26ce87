//! Courier catalog: the latest content-database snapshot, swapped atomically.

use std::sync::Arc;

use arc_swap::ArcSwap;
use shipmates_core::{CourierRecord, CourierSnapshot};
use shipmates_notion::{NotionClient, NotionError};
use tokio::sync::Mutex;

/// Read-mostly holder of the current [`CourierSnapshot`].
///
/// Readers never block. A refresh publishes a complete new snapshot in one
/// swap.
#[derive(Debug)]
pub struct CourierCatalog {
    snapshot: ArcSwap<CourierSnapshot>,
    refreshing: Mutex<()>,
}

/// Result of one refresh attempt.
#[derive(Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    Replaced { couriers: usize },
    /// Another refresh was still running; this tick did nothing.
    Skipped,
}

impl CourierCatalog {
    #[must_use]
    pub fn new(couriers: Vec<CourierRecord>) -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(CourierSnapshot::new(couriers)),
            refreshing: Mutex::new(()),
        }
    }

    /// Performs the initial fetch. Startup fails if it does.
    ///
    /// # Errors
    ///
    /// Returns the [`NotionError`] from the first query.
    pub async fn load(client: &NotionClient, database_id: &str) -> Result<Self, NotionError> {
        let couriers = client.fetch_couriers(database_id).await?;
        tracing::info!(count = couriers.len(), "courier catalog loaded");
        Ok(Self::new(couriers))
    }

    #[must_use]
    pub fn current(&self) -> Arc<CourierSnapshot> {
        self.snapshot.load_full()
    }

    pub fn replace(&self, couriers: Vec<CourierRecord>) {
        self.snapshot.store(Arc::new(CourierSnapshot::new(couriers)));
    }

    /// Re-fetches the catalog and swaps it in. On failure the previous
    /// snapshot stays in place.
    ///
    /// # Errors
    ///
    /// Returns the [`NotionError`] of the failed fetch.
    pub async fn refresh(
        &self,
        client: &NotionClient,
        database_id: &str,
    ) -> Result<RefreshOutcome, NotionError> {
        let Ok(_guard) = self.refreshing.try_lock() else {
            return Ok(RefreshOutcome::Skipped);
        };

        let couriers = client.fetch_couriers(database_id).await?;
        let count = couriers.len();
        self.replace(couriers);
        Ok(RefreshOutcome::Replaced { couriers: count })
    }
}
