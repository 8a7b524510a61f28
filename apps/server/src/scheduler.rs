//! Background scheduler for periodic pricing refresh.
//!
//! Re-prices the whole catalogue on a fixed interval until shutdown.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

use crate::main_lib::AppState;
use productsmgmt_core::products::PricingRefreshSummary;

/// Starts the background pricing refresh scheduler.
///
/// The first refresh runs immediately; later ones run every `period`. A slow
/// refresh delays the next tick instead of bunching them up.
pub fn start_pricing_refresh_scheduler(state: Arc<AppState>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Pricing refresh scheduler started ({}s interval)", period.as_secs());

        let mut refresh_interval = interval(period);
        refresh_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            refresh_interval.tick().await;
            run_scheduled_refresh(&state).await;
        }
    })
}

/// Runs a single scheduled refresh. Failures are logged, never propagated.
pub async fn run_scheduled_refresh(state: &Arc<AppState>) -> Option<PricingRefreshSummary> {
    info!("Running scheduled pricing refresh...");

    match state.product_service.refresh_all_pricing().await {
        Ok(summary) => {
            if summary.is_clean() {
                info!("Pricing refresh completed: {} products updated", summary.updated);
            } else {
                warn!(
                    "Pricing refresh completed with problems: {} updated, {} conflicts, {} failed (pairs: {})",
                    summary.updated,
                    summary.conflicts,
                    summary.failed_products,
                    summary.failed_pairs.join(", ")
                );
            }
            Some(summary)
        }
        Err(e) => {
            warn!("Scheduled pricing refresh failed: {}", e);
            None
        }
    }
}
