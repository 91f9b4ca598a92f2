use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::time::{interval, Duration};
use tracing::{info, warn};

use railbook_order::BookingEngine;
use railbook_shared::models::events::BookingEvent;

/// Background sweep that cancels bookings past the hold window and
/// returns their seats. Runs for the life of the process.
pub async fn run_expiry_sweep(engine: Arc<BookingEngine>, sweep_interval_seconds: u64) {
    let mut ticker = interval(Duration::from_secs(sweep_interval_seconds.max(1)));
    info!(sweep_interval_seconds, "expiry sweep started");
    loop {
        ticker.tick().await;
        let swept = engine.expire_stale(chrono::Utc::now()).await;
        if swept > 0 {
            info!(swept, "expiry sweep released stale holds");
        }
    }
}

/// Drains the engine's event channel into the log. Stands in for the
/// downstream consumers (notifications, reporting feeds) a deployment
/// would attach here.
pub async fn run_event_log(mut events: broadcast::Receiver<BookingEvent>) {
    loop {
        match events.recv().await {
            Ok(event) => info!(?event, "booking event"),
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                warn!(missed, "event log fell behind, events dropped");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
