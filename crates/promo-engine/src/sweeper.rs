//! # Lifecycle Sweeper
//!
//! Time- and budget-driven bulk transitions, run on a fixed interval.
//!
//! ## Sweep Pass
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Sweeper                                         │
//! │                                                                         │
//! │  every `interval` (default 300 s):                                      │
//! │                                                                         │
//! │  1. active, end_date < now              ──►  completed                  │
//! │  2. draft, start_date <= now <= end     ──►  active                     │
//! │  3. active, spent >= budget             ──►  completed                  │
//! │                                                                         │
//! │  Each step is one guarded UPDATE. Running a pass twice at the same      │
//! │  instant changes nothing the second time. No ownership checks.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument};
use ts_rs::TS;

use promo_db::Database;

use crate::config::DEFAULT_SWEEP_INTERVAL;
use crate::error::EngineResult;

/// Rows moved by one sweep pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SweepReport {
    /// Active campaigns past their end date.
    pub completed: u64,
    /// Drafts whose window has opened.
    pub activated: u64,
    /// Active campaigns out of budget.
    pub budget_completed: u64,
}

impl SweepReport {
    pub fn total(&self) -> u64 {
        self.completed + self.activated + self.budget_completed
    }
}

/// Runs sweep passes until told to stop.
pub struct Sweeper {
    db: Database,
    interval: Duration,
    shutdown_rx: mpsc::Receiver<()>,
}

/// Handle for stopping a running sweeper.
#[derive(Clone)]
pub struct SweeperHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl SweeperHandle {
    /// Triggers graceful shutdown. The pass in flight, if any, finishes first.
    pub async fn shutdown(&self) {
        if self.shutdown_tx.send(()).await.is_err() {
            debug!("Sweeper already stopped");
        }
    }
}

impl Sweeper {
    /// Creates a sweeper and its handle. A zero interval falls back to the default.
    pub fn new(db: Database, interval: Duration) -> (Self, SweeperHandle) {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let interval = if interval.is_zero() {
            DEFAULT_SWEEP_INTERVAL
        } else {
            interval
        };

        let sweeper = Sweeper {
            db,
            interval,
            shutdown_rx,
        };

        (sweeper, SweeperHandle { shutdown_tx })
    }

    /// Runs one pass at `now`.
    #[instrument(skip(self), err)]
    pub async fn run_once(&self, now: DateTime<Utc>) -> EngineResult<SweepReport> {
        let campaigns = self.db.campaigns();

        let report = SweepReport {
            completed: campaigns.complete_expired(now).await?,
            activated: campaigns.activate_due(now).await?,
            budget_completed: campaigns.complete_exhausted(now).await?,
        };

        if report.total() > 0 {
            info!(
                completed = report.completed,
                activated = report.activated,
                budget_completed = report.budget_completed,
                "Sweep moved campaigns"
            );
        } else {
            debug!("Sweep found nothing to do");
        }

        Ok(report)
    }

    /// Runs the sweep loop. The first pass happens immediately.
    ///
    /// This should be spawned as a background task.
    pub async fn run(mut self) {
        info!(interval_secs = self.interval.as_secs(), "Sweeper starting");

        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = self.run_once(Utc::now()).await {
                        error!(?e, "Sweep failed");
                    }
                }

                _ = self.shutdown_rx.recv() => {
                    info!("Sweeper shutting down");
                    break;
                }
            }
        }

        info!("Sweeper stopped");
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{self, days_from_now, percentage};
    use chrono::Duration as ChronoDuration;
    use promo_core::{Campaign, CampaignStatus, Money};

    fn stored_campaign(
        seller_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        status: CampaignStatus,
    ) -> Campaign {
        let mut campaign = Campaign::new(
            seller_id,
            "Spring Sale",
            percentage(20),
            Money::from_cents(10_000),
            start,
            end,
            start,
        );
        campaign.status = status;
        campaign
    }

    async fn status_of(db: &Database, id: &str) -> CampaignStatus {
        db.campaigns().get_by_id(id).await.unwrap().unwrap().status
    }

    #[tokio::test]
    async fn test_expired_campaign_completed_once() {
        let engine = test_support::engine().await;
        let db = engine.database();
        let expired = stored_campaign(
            "seller-1",
            days_from_now(-10),
            days_from_now(-1),
            CampaignStatus::Active,
        );
        db.campaigns().create(&expired, None).await.unwrap();

        let (sweeper, _handle) = engine.sweeper();
        let now = Utc::now();

        let first = sweeper.run_once(now).await.unwrap();
        assert_eq!(first.completed, 1);
        assert_eq!(status_of(db, &expired.id).await, CampaignStatus::Completed);

        let second = sweeper.run_once(now).await.unwrap();
        assert_eq!(second, SweepReport::default());
    }

    #[tokio::test]
    async fn test_due_draft_activated() {
        let engine = test_support::engine().await;
        let db = engine.database();
        let due = stored_campaign(
            "seller-1",
            days_from_now(-1),
            days_from_now(5),
            CampaignStatus::Draft,
        );
        let later = stored_campaign(
            "seller-1",
            days_from_now(2),
            days_from_now(5),
            CampaignStatus::Draft,
        );
        // Window closed before anyone started it
        let stale = stored_campaign(
            "seller-1",
            days_from_now(-5),
            days_from_now(-2),
            CampaignStatus::Draft,
        );
        for campaign in [&due, &later, &stale] {
            db.campaigns().create(campaign, None).await.unwrap();
        }

        let (sweeper, _handle) = engine.sweeper();
        let report = sweeper.run_once(Utc::now()).await.unwrap();
        assert_eq!(report.activated, 1);
        assert_eq!(report.completed, 0);

        assert_eq!(status_of(db, &due.id).await, CampaignStatus::Active);
        assert_eq!(status_of(db, &later.id).await, CampaignStatus::Draft);
        assert_eq!(status_of(db, &stale.id).await, CampaignStatus::Draft);
    }

    #[tokio::test]
    async fn test_exhausted_campaign_completed() {
        let engine = test_support::engine().await;
        let db = engine.database();
        let mut spent = stored_campaign(
            "seller-1",
            days_from_now(-1),
            days_from_now(5),
            CampaignStatus::Active,
        );
        spent.spent = spent.budget;
        let mut paused = spent.clone();
        paused.id = "paused-and-spent".to_string();
        paused.status = CampaignStatus::Paused;
        db.campaigns().create(&spent, None).await.unwrap();
        db.campaigns().create(&paused, None).await.unwrap();

        let (sweeper, _handle) = engine.sweeper();
        let report = sweeper.run_once(Utc::now()).await.unwrap();
        assert_eq!(report.budget_completed, 1);
        assert_eq!(status_of(db, &spent.id).await, CampaignStatus::Completed);
        assert_eq!(status_of(db, &paused.id).await, CampaignStatus::Paused);
    }

    #[tokio::test]
    async fn test_run_loop_sweeps_and_stops() {
        let engine = test_support::engine().await;
        let db = engine.database().clone();
        let expired = stored_campaign(
            "seller-1",
            days_from_now(-3),
            Utc::now() - ChronoDuration::minutes(1),
            CampaignStatus::Active,
        );
        db.campaigns().create(&expired, None).await.unwrap();

        let (sweeper, handle) = Sweeper::new(db.clone(), Duration::from_millis(20));
        let task = tokio::spawn(sweeper.run());

        let mut swept = false;
        for _ in 0..100 {
            if status_of(&db, &expired.id).await == CampaignStatus::Completed {
                swept = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(swept);

        handle.shutdown().await;
        tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_zero_interval_falls_back() {
        let engine = test_support::engine().await;
        let (sweeper, _handle) = Sweeper::new(engine.database().clone(), Duration::ZERO);
        assert_eq!(sweeper.interval, DEFAULT_SWEEP_INTERVAL);
    }
}
