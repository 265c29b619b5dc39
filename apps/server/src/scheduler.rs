//! Background sweep of expired cache entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::main_lib::AppState;

/// Starts the background cache sweeper.
///
/// Runs [`run_cache_sweep`] every `state.cache_sweep_interval`; the first
/// sweep happens one interval after start.
pub fn start_cache_sweeper(state: Arc<AppState>) -> JoinHandle<()> {
    tokio::spawn(async move {
        // interval() panics on a zero period
        let period = state.cache_sweep_interval.max(Duration::from_secs(1));
        info!("Cache sweeper started ({}s interval)", period.as_secs());

        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick is immediate
        ticker.tick().await;

        loop {
            ticker.tick().await;
            run_cache_sweep(&state);
        }
    })
}

/// Runs a single sweep and returns how many entries were dropped.
pub fn run_cache_sweep(state: &AppState) -> usize {
    let removed = state.indicator_service.cleanup_cache();
    let stats = state.indicator_service.cache_stats();
    debug!(
        "Cache sweep removed {} entries, {} active",
        removed, stats.active_entries
    );
    removed
}
