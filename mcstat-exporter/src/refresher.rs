//! Background refresh of the status cache.
//!
//! Every acquisition, whether started by the interval loop or by a scrape,
//! runs through the same mutex so at most one retry loop talks to the
//! server at a time.

use crate::acquirer::StatusAcquirer;
use crate::cache::StatusCache;
use mcstat_query::{StatusRecord, Target};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Default period of the background refresh loop.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(900);

pub struct Refresher {
    acquirer: StatusAcquirer,
    cache: Arc<StatusCache>,
    target: Target,
    interval: Duration,
    in_flight: Arc<Mutex<()>>,
    /// Acquisitions finished so far, successful or not.
    completed: AtomicU64,
}

impl Refresher {
    pub fn new(
        acquirer: StatusAcquirer,
        cache: Arc<StatusCache>,
        target: Target,
        interval: Duration,
    ) -> Self {
        Self {
            acquirer,
            cache,
            target,
            interval,
            in_flight: Arc::new(Mutex::new(())),
            completed: AtomicU64::new(0),
        }
    }

    pub fn cache(&self) -> &Arc<StatusCache> {
        &self.cache
    }

    /// Number of acquisitions that have run to completion.
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Acquire)
    }

    /// Acquire now and store the result.
    ///
    /// If another acquisition is already running this waits for it and
    /// returns the cache it left behind instead of starting a second one.
    /// Returns `None` only when no status has ever been acquired.
    pub async fn refresh(&self) -> Option<Arc<StatusRecord>> {
        let seen = self.completed();
        let _guard = self.in_flight.lock().await;

        if self.completed() != seen {
            debug!("joined an acquisition that finished while waiting");
            return self.cache.read().await;
        }

        self.acquire_and_store().await
    }

    /// Start a detached acquisition unless one is already running.
    /// Returns whether a new acquisition was started.
    pub fn spawn_refresh(self: &Arc<Self>) -> bool {
        let Ok(guard) = Arc::clone(&self.in_flight).try_lock_owned() else {
            debug!("acquisition already in flight, not starting another");
            return false;
        };

        let this = Arc::clone(self);
        tokio::spawn(async move {
            let _guard = guard;
            this.acquire_and_store().await;
        });
        true
    }

    /// Must be called with `in_flight` held.
    async fn acquire_and_store(&self) -> Option<Arc<StatusRecord>> {
        let outcome = self.acquirer.acquire(&self.target).await;
        let current = match outcome {
            Some(record) => Some(self.cache.write(record).await),
            None => {
                warn!(server = %self.target, "no status acquired, keeping previous cache");
                self.cache.read().await
            }
        };
        self.completed.fetch_add(1, Ordering::AcqRel);
        current
    }

    /// Refresh for the lifetime of the process, resting a full interval
    /// after each acquisition ends. The first refresh happens immediately.
    pub async fn run(self: Arc<Self>) {
        info!(
            server = %self.target,
            interval = ?self.interval,
            "status refresher started"
        );
        loop {
            self.refresh().await;
            tokio::time::sleep(self.interval).await;
        }
    }

    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
