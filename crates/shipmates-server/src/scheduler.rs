//! Background job scheduler.
//!
//! Registers the recurring courier-catalog refresh and the idle-session
//! sweep at server startup.

use std::sync::Arc;
use std::time::Duration;

use shipmates_notion::NotionClient;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::catalog::{CourierCatalog, RefreshOutcome};
use crate::session::SessionStore;

/// Upper bound on how often idle sessions are swept.
const MAX_PRUNE_INTERVAL_SECS: u64 = 60;

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process. Dropping it stops both jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    catalog: Arc<CourierCatalog>,
    notion: NotionClient,
    sessions: SessionStore,
    config: Arc<shipmates_core::AppConfig>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    register_catalog_refresh_job(&scheduler, catalog, notion, &config).await?;
    register_session_prune_job(&scheduler, sessions, &config).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

/// Re-fetch the courier database every `revalidate_secs` seconds.
///
/// A tick that finds the previous refresh still running is skipped. A
/// failed fetch leaves the current snapshot in place until the next tick.
async fn register_catalog_refresh_job(
    scheduler: &JobScheduler,
    catalog: Arc<CourierCatalog>,
    notion: NotionClient,
    config: &shipmates_core::AppConfig,
) -> Result<(), JobSchedulerError> {
    let notion = Arc::new(notion);
    let database_id: Arc<str> = Arc::from(config.notion_database_id.as_str());
    let interval = Duration::from_secs(config.revalidate_secs);

    let job = Job::new_repeated_async(interval, move |_uuid, _lock| {
        let catalog = Arc::clone(&catalog);
        let notion = Arc::clone(&notion);
        let database_id = Arc::clone(&database_id);

        Box::pin(async move {
            run_catalog_refresh(&catalog, &notion, &database_id).await;
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(
        interval_secs = interval.as_secs(),
        "scheduler: catalog refresh registered"
    );
    Ok(())
}

async fn run_catalog_refresh(catalog: &CourierCatalog, notion: &NotionClient, database_id: &str) {
    match catalog.refresh(notion, database_id).await {
        Ok(RefreshOutcome::Replaced { couriers }) => {
            tracing::debug!(couriers, "scheduler: courier catalog refreshed");
        }
        Ok(RefreshOutcome::Skipped) => {
            tracing::debug!("scheduler: previous catalog refresh still running; skipping");
        }
        Err(e) => {
            let age_secs = (chrono::Utc::now() - catalog.current().fetched_at).num_seconds();
            tracing::error!(
                error = %e,
                snapshot_age_secs = age_secs,
                "scheduler: catalog refresh failed; keeping previous snapshot"
            );
        }
    }
}

/// Drop quote sessions idle for longer than `session_ttl_secs`.
///
/// Sweeps at the TTL itself or every minute, whichever is shorter.
async fn register_session_prune_job(
    scheduler: &JobScheduler,
    sessions: SessionStore,
    config: &shipmates_core::AppConfig,
) -> Result<(), JobSchedulerError> {
    let ttl = Duration::from_secs(config.session_ttl_secs);
    let interval = Duration::from_secs(config.session_ttl_secs.min(MAX_PRUNE_INTERVAL_SECS));

    let job = Job::new_repeated_async(interval, move |_uuid, _lock| {
        let sessions = sessions.clone();

        Box::pin(async move {
            run_session_prune(&sessions, ttl).await;
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(
        interval_secs = interval.as_secs(),
        ttl_secs = ttl.as_secs(),
        "scheduler: session prune registered"
    );
    Ok(())
}

async fn run_session_prune(sessions: &SessionStore, ttl: Duration) -> usize {
    let removed = sessions.prune_idle(ttl).await;
    if removed > 0 {
        let remaining = sessions.len().await;
        tracing::info!(
            removed,
            remaining,
            "scheduler: pruned idle sessions"
        );
    }
    removed
}
