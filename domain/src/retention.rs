//! Message retention.
//!
//! Chat history is kept for a fixed 24 hour window. A sweep computes the cutoff
//! (`now - 24h`) and asks the message store to delete everything created strictly
//! before it. Sweeps run on an internal schedule (see [`start_sweeper`]) and can
//! also be triggered on demand; both paths run the same idempotent deletion.
//!
//! The sweeper shares nothing with the realtime relay. A failing store is logged
//! and retried on the next scheduled run.

use crate::error::Error;
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use log::*;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// How long, in hours, a chat message is kept before it becomes eligible for deletion.
pub const RETENTION_WINDOW_HOURS: i64 = 24;

pub fn retention_window() -> TimeDelta {
    TimeDelta::hours(RETENTION_WINDOW_HOURS)
}

/// Messages created strictly before the returned instant are expired.
pub fn cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - retention_window()
}

/// Storage holding persisted chat messages.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Delete every message created strictly before `cutoff`, returning the number deleted.
    async fn delete_messages_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, Error>;
}

/// `MessageStore` backed by the Postgres `messages` table.
pub struct DatabaseMessageStore {
    db: Arc<DatabaseConnection>,
}

impl DatabaseMessageStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MessageStore for DatabaseMessageStore {
    async fn delete_messages_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, Error> {
        Ok(entity_api::message::delete_created_before(&self.db, cutoff).await?)
    }
}

/// Outcome of one successful sweep.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepReport {
    pub cutoff: DateTime<Utc>,
    pub deleted_count: u64,
}

#[derive(Clone)]
pub struct Sweeper {
    store: Arc<dyn MessageStore>,
}

impl Sweeper {
    pub fn new(store: Arc<dyn MessageStore>) -> Self {
        Self { store }
    }

    /// Delete every message older than the retention window, as of now.
    pub async fn sweep(&self) -> Result<SweepReport, Error> {
        self.sweep_at(Utc::now()).await
    }

    /// Same as [`Sweeper::sweep`] with an explicit notion of "now".
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> Result<SweepReport, Error> {
        let cutoff = cutoff(now);
        info!("Deleting messages older than: {}", cutoff.to_rfc3339());

        match self.store.delete_messages_older_than(cutoff).await {
            Ok(deleted_count) => {
                info!("Old messages deleted successfully: {deleted_count} removed");
                Ok(SweepReport {
                    cutoff,
                    deleted_count,
                })
            }
            Err(e) => {
                error!("Error deleting old messages: {e}");
                Err(e)
            }
        }
    }
}

/// Run `sweeper` every `every` until `cancel_token` is cancelled.
///
/// The first sweep runs immediately. Failures are logged and the loop carries on,
/// so the next tick is the retry.
pub async fn start_sweeper(sweeper: Sweeper, every: Duration, cancel_token: CancellationToken) {
    if every.is_zero() {
        error!("Retention sweep interval must be non-zero, scheduled sweeps are disabled");
        return;
    }

    info!(
        "Starting message retention sweeper, running every {}s",
        every.as_secs()
    );

    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                // Errors are already logged by the sweep itself
                let _ = sweeper.sweep().await;
            }
            _ = cancel_token.cancelled() => {
                info!("Retention sweeper received shutdown signal, exiting");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DomainErrorKind, ExternalErrorKind};
    use chrono::TimeZone;
    use std::sync::Mutex;

    /// Store that records requested cutoffs and either deletes `deleted` rows or fails.
    struct FakeStore {
        cutoffs: Mutex<Vec<DateTime<Utc>>>,
        deleted: Option<u64>,
    }

    impl FakeStore {
        fn deleting(deleted: u64) -> Self {
            Self {
                cutoffs: Mutex::new(Vec::new()),
                deleted: Some(deleted),
            }
        }

        fn unavailable() -> Self {
            Self {
                cutoffs: Mutex::new(Vec::new()),
                deleted: None,
            }
        }

        fn calls(&self) -> usize {
            self.cutoffs.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl MessageStore for FakeStore {
        async fn delete_messages_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, Error> {
            self.cutoffs.lock().unwrap().push(cutoff);
            self.deleted.ok_or_else(|| Error {
                source: None,
                error_kind: DomainErrorKind::External(ExternalErrorKind::StoreUnavailable),
            })
        }
    }

    #[test]
    fn cutoff_is_exactly_twenty_four_hours_earlier() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 8, 30, 0).unwrap();
        assert_eq!(
            cutoff(now),
            Utc.with_ymd_and_hms(2024, 3, 9, 8, 30, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn sweep_requests_deletion_before_the_cutoff() {
        let store = Arc::new(FakeStore::deleting(4));
        let sweeper = Sweeper::new(store.clone());
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 8, 30, 0).unwrap();

        let report = sweeper.sweep_at(now).await.unwrap();

        let expected = now - TimeDelta::hours(24);
        assert_eq!(*store.cutoffs.lock().unwrap(), vec![expected]);
        assert_eq!(
            report,
            SweepReport {
                cutoff: expected,
                deleted_count: 4,
            }
        );
    }

    #[tokio::test]
    async fn sweep_reports_an_unavailable_store() {
        let sweeper = Sweeper::new(Arc::new(FakeStore::unavailable()));

        let err = sweeper.sweep().await.unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::StoreUnavailable)
        );
    }

    #[tokio::test]
    async fn a_zero_interval_disables_scheduled_sweeps_instead_of_panicking() {
        let store = Arc::new(FakeStore::deleting(0));

        tokio::time::timeout(
            Duration::from_secs(5),
            start_sweeper(
                Sweeper::new(store.clone()),
                Duration::ZERO,
                CancellationToken::new(),
            ),
        )
        .await
        .expect("sweeper with a zero interval did not return");

        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn scheduled_sweeps_keep_running_after_failures_until_cancelled() {
        let store = Arc::new(FakeStore::unavailable());
        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(start_sweeper(
            Sweeper::new(store.clone()),
            Duration::from_millis(5),
            cancel_token.clone(),
        ));

        tokio::time::timeout(Duration::from_secs(5), async {
            while store.calls() < 3 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("sweeper stopped retrying");

        cancel_token.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("sweeper ignored cancellation")
            .unwrap();
    }
}
