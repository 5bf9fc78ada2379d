// ==========================================
// Wellbeing Waitlist - Service Entry Point
// ==========================================
// Starts the dispatch scheduler against the default database
// and runs until Ctrl-C
// ==========================================

use std::sync::Arc;

use anyhow::{anyhow, Context};
use wellbeing_waitlist::app::{get_default_db_path, AppState};
use wellbeing_waitlist::engine::events::{ChannelEventPublisher, OptionalEventPublisher};
use wellbeing_waitlist::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} v{}", wellbeing_waitlist::APP_NAME, wellbeing_waitlist::VERSION);
    tracing::info!("==================================================");

    let db_path = get_default_db_path();
    tracing::info!("using database: {}", db_path);

    let (publisher, mut events) = ChannelEventPublisher::new();
    let state = AppState::open(
        db_path,
        OptionalEventPublisher::with_publisher(Arc::new(publisher)),
    )
    .map_err(|e| anyhow!(e))
    .context("failed to initialize AppState")?;

    let stats = state.waitlist_api.cache_statistics();
    tracing::info!(
        precomputed = stats.precomputed_count,
        waiting = state.admission_queue.len(),
        "waitlist ready"
    );

    let event_log = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match serde_json::to_string(&event) {
                Ok(json) => tracing::info!(target: "dispatch_events", "{}", json),
                Err(e) => tracing::warn!(error = %e, "cannot serialize dispatch event"),
            }
        }
    });

    let scheduler = state.start_dispatch_scheduler();

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    tracing::info!("shutdown requested");

    scheduler.stop().await;
    // Dropping the state drops the last sender, which ends the event log task.
    drop(state);
    if let Err(e) = event_log.await {
        tracing::warn!(error = %e, "event log task ended abnormally");
    }

    tracing::info!("{} exited", wellbeing_waitlist::APP_NAME);
    Ok(())
}
