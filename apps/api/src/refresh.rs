//! # Dashboard Refresher
//!
//! Keeps a computed admin dashboard in memory so `GET /api/reports/dashboard`
//! is a read, not a full aggregation.
//!
//! ## Generations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  every computation takes a ticket:  begin() → 1, 2, 3 ...               │
//! │                                                                         │
//! │  t0  tick        begin()=7 ───── slow query ─────────► publish(7) ✗     │
//! │  t1  POST /refresh      begin()=8 ── fast ──► publish(8) ✓              │
//! │                                                                         │
//! │  publish(n) succeeds only if n > generation already published, so a     │
//! │  stale computation can never overwrite a fresher snapshot.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The background task ticks every `dashboard.refresh_secs`, also refreshes
//! when asked through [`DashboardCache::request_refresh`], and exits when the
//! shutdown watch channel flips.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use duka_core::analytics::UnifiedReport;
use duka_core::{Period, RecordFilter};
use serde::Serialize;
use tokio::sync::{watch, Notify, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::error::ApiResult;
use crate::reporting::unified_report;
use crate::state::SharedState;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub generation: u64,
    pub computed_at: DateTime<Utc>,
    pub period: Period,
    pub report: UnifiedReport,
}

pub struct DashboardCache {
    period: Period,
    next_generation: AtomicU64,
    latest: RwLock<Option<DashboardSnapshot>>,
    wake: Notify,
}

impl DashboardCache {
    pub fn new(period: Period) -> Self {
        DashboardCache {
            period,
            next_generation: AtomicU64::new(1),
            latest: RwLock::new(None),
            wake: Notify::new(),
        }
    }

    pub fn period(&self) -> Period {
        self.period
    }

    /// Takes the next generation ticket.
    pub fn begin(&self) -> u64 {
        self.next_generation.fetch_add(1, Ordering::SeqCst)
    }

    /// Stores the snapshot unless a newer one is already published.
    pub async fn publish(&self, snapshot: DashboardSnapshot) -> bool {
        let mut latest = self.latest.write().await;

        if let Some(current) = latest.as_ref() {
            if current.generation >= snapshot.generation {
                debug!(
                    stale = snapshot.generation,
                    current = current.generation,
                    "Discarding stale dashboard"
                );
                return false;
            }
        }

        *latest = Some(snapshot);
        true
    }

    pub async fn latest(&self) -> Option<DashboardSnapshot> {
        self.latest.read().await.clone()
    }

    /// Wakes the background task for an early refresh.
    pub fn request_refresh(&self) {
        self.wake.notify_one();
    }
}

/// Computes the dashboard once and publishes it. Returns the snapshot that
/// is current afterwards, which is a newer one if this computation lost the
/// race.
pub async fn refresh_dashboard(state: &SharedState) -> ApiResult<DashboardSnapshot> {
    let cache = &state.dashboard;
    let generation = cache.begin();
    let today = Utc::now().date_naive();

    let filter = RecordFilter::new().with_range(cache.period().resolve(today));
    let report = unified_report(&state.db, &filter).await?;

    let snapshot = DashboardSnapshot {
        generation,
        computed_at: Utc::now(),
        period: cache.period(),
        report,
    };

    if cache.publish(snapshot.clone()).await {
        debug!(generation, "Dashboard published");
        return Ok(snapshot);
    }
    Ok(cache.latest().await.unwrap_or(snapshot))
}

pub struct DashboardRefresher {
    state: SharedState,
    interval: Duration,
}

impl DashboardRefresher {
    pub fn new(state: SharedState) -> Self {
        let interval = Duration::from_secs(state.config.dashboard.refresh_secs);
        DashboardRefresher { state, interval }
    }

    pub fn spawn(self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(interval = ?self.interval, "Dashboard refresher started");

            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = self.state.dashboard.wake.notified() => {}
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                        continue;
                    }
                }

                self.run_once().await;
            }

            info!("Dashboard refresher stopped");
        })
    }

    async fn run_once(&self) {
        let today = Utc::now().date_naive();
        match self.state.db.credits().mark_overdue(today).await {
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Failed to mark overdue credits"),
        }

        if let Err(e) = refresh_dashboard(&self.state).await {
            warn!(error = %e, "Dashboard refresh failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn snapshot(generation: u64) -> DashboardSnapshot {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        DashboardSnapshot {
            generation,
            computed_at: Utc::now(),
            period: Period::Today,
            report: UnifiedReport::compute(None, &[], &[], &[], &[], today),
        }
    }

    #[tokio::test]
    async fn test_generations_increase() {
        let cache = DashboardCache::new(Period::Today);
        let a = cache.begin();
        let b = cache.begin();
        assert!(b > a);
    }

    #[tokio::test]
    async fn test_stale_snapshot_never_overwrites_newer() {
        let cache = DashboardCache::new(Period::Today);
        let slow = cache.begin();
        let fast = cache.begin();

        assert!(cache.publish(snapshot(fast)).await);
        assert!(!cache.publish(snapshot(slow)).await);
        assert_eq!(cache.latest().await.unwrap().generation, fast);

        let next = cache.begin();
        assert!(cache.publish(snapshot(next)).await);
        assert_eq!(cache.latest().await.unwrap().generation, next);
    }

    #[tokio::test]
    async fn test_same_generation_published_once() {
        let cache = DashboardCache::new(Period::All);
        let generation = cache.begin();
        assert!(cache.publish(snapshot(generation)).await);
        assert!(!cache.publish(snapshot(generation)).await);
    }
}
