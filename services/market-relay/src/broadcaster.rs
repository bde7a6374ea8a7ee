//! Live tick broadcaster
//!
//! Every cycle reads `slot0()` once per subscribed pool and fans the same
//! tick frame out to every connection on that pool. A failed read only skips
//! that pool for that cycle; the loop itself never stops on upstream errors.

use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::error::TrySendError;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use types::stream::ServerMessage;

use crate::rpc::PoolStateReader;
use crate::shutdown::Shutdown;
use crate::state::AppState;
use crate::subscriptions::SubscriptionRegistry;

/// Outcome of one broadcast cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub pools_read: usize,
    pub pools_failed: usize,
    pub ticks_sent: usize,
    /// Ticks not delivered because the connection's outbox was full
    pub ticks_dropped: usize,
}

pub struct TickBroadcaster {
    registry: Arc<SubscriptionRegistry>,
    reader: Arc<dyn PoolStateReader>,
    period: Duration,
}

impl TickBroadcaster {
    pub fn new(
        registry: Arc<SubscriptionRegistry>,
        reader: Arc<dyn PoolStateReader>,
        period: Duration,
    ) -> Self {
        Self {
            registry,
            reader,
            period,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            Arc::clone(&state.subscriptions),
            Arc::clone(&state.pool_reader),
            state.config.tick_interval,
        )
    }

    /// Run cycles every `period` until shutdown. The first cycle happens one
    /// full period after start.
    pub async fn run(self, shutdown: Shutdown) {
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval.tick().await;

        let stop = shutdown.wait();
        tokio::pin!(stop);

        info!(period_ms = self.period.as_millis() as u64, "tick broadcaster started");
        loop {
            tokio::select! {
                _ = &mut stop => break,
                _ = interval.tick() => {
                    let report = self.broadcast_once().await;
                    if report.pools_read > 0 || report.pools_failed > 0 {
                        debug!(?report, "broadcast cycle");
                    }
                }
            }
        }
        info!("tick broadcaster stopped");
    }

    /// One cycle: read each subscribed pool once, concurrently, then fan out.
    pub async fn broadcast_once(&self) -> CycleReport {
        let mut report = CycleReport::default();
        let groups = self.registry.by_pool();
        if groups.is_empty() {
            return report;
        }

        let reads = groups.keys().map(|pool| {
            let reader = Arc::clone(&self.reader);
            async move { (pool, reader.slot0(pool).await) }
        });
        let results = join_all(reads).await;
        let ts = types::now_millis();

        for (pool, result) in results {
            let subscribers = &groups[pool];
            let slot0 = match result {
                Ok(slot0) => slot0,
                Err(e) => {
                    warn!(%pool, subscribers = subscribers.len(), error = %e, "slot0 read failed, skipping pool this cycle");
                    report.pools_failed += 1;
                    continue;
                }
            };
            report.pools_read += 1;

            let tick = ServerMessage::Tick {
                pool: pool.clone(),
                tick: slot0.tick,
                price: slot0.price(),
                ts,
            };
            let frame = match serde_json::to_string(&tick) {
                Ok(frame) => frame,
                Err(e) => {
                    warn!(%pool, error = %e, "failed to encode tick");
                    continue;
                }
            };

            for (connection, outbox) in subscribers {
                match outbox.try_send(frame.clone()) {
                    Ok(()) => report.ticks_sent += 1,
                    Err(TrySendError::Full(_)) => {
                        warn!(%connection, %pool, "outbox full, dropping tick");
                        report.ticks_dropped += 1;
                    }
                    // Socket already closing; the close handler removes it.
                    Err(TrySendError::Closed(_)) => {}
                }
            }
        }

        report
    }
}
