//! Background eviction of idle abuse-prevention state.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

use super::Gatekeeper;

/// Periodically evicts expired throttle windows and ban records so memory
/// stays bounded by the set of recently active clients.
///
/// Runs until the returned handle is aborted or the runtime shuts down.
pub fn spawn_sweeper(gatekeeper: Arc<Gatekeeper>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let evicted = gatekeeper.sweep();
            if evicted > 0 {
                let (throttled, ban_records) = gatekeeper.tracked();
                debug!(
                    evicted,
                    throttled, ban_records, "Evicted idle abuse-prevention entries"
                );
            }
        }
    })
}
