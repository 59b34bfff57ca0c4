//! Per-host request limiting
//!
//! The fetcher is shared across concurrent discovery runs, so politeness is
//! enforced per host rather than per run: at most `max_concurrent` requests
//! in flight to one host, and optionally a minimum gap between the starts
//! of two requests to that host. Hosts with nothing in flight are forgotten
//! once too many are tracked.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;

/// Hosts tracked before idle ones are forgotten
const MAX_TRACKED_HOSTS: usize = 256;

/// Concurrency and pacing state for one host
#[derive(Debug)]
struct HostSlot {
    semaphore: Arc<Semaphore>,
    last_start: tokio::sync::Mutex<Option<Instant>>,
}

/// Limits in-flight requests per host
#[derive(Debug)]
pub struct HostLimiter {
    max_concurrent: usize,
    min_interval: Duration,
    hosts: Mutex<HashMap<String, Arc<HostSlot>>>,
}

/// Held for the duration of one request; dropping it frees the slot
#[derive(Debug)]
pub struct HostPermit {
    _permit: Option<OwnedSemaphorePermit>,
}

impl HostLimiter {
    /// Creates a limiter
    ///
    /// # Arguments
    ///
    /// * `max_concurrent` - In-flight requests allowed per host (at least 1)
    /// * `min_interval` - Minimum time between request starts to one host
    pub fn new(max_concurrent: usize, min_interval: Duration) -> Self {
        Self {
            max_concurrent: max_concurrent.max(1),
            min_interval,
            hosts: Mutex::new(HashMap::new()),
        }
    }

    /// Waits until a request to `host` may start
    pub async fn acquire(&self, host: &str) -> HostPermit {
        let slot = self.slot(host);

        let permit = slot.semaphore.clone().acquire_owned().await.ok();

        if !self.min_interval.is_zero() {
            let mut last = slot.last_start.lock().await;
            if let Some(previous) = *last {
                let elapsed = previous.elapsed();
                if elapsed < self.min_interval {
                    tokio::time::sleep(self.min_interval - elapsed).await;
                }
            }
            *last = Some(Instant::now());
        }

        HostPermit { _permit: permit }
    }

    /// Number of requests to `host` that could start right now
    pub fn available(&self, host: &str) -> usize {
        let hosts = self.hosts.lock().unwrap_or_else(|e| e.into_inner());
        hosts
            .get(&host.to_lowercase())
            .map_or(self.max_concurrent, |slot| slot.semaphore.available_permits())
    }

    fn slot(&self, host: &str) -> Arc<HostSlot> {
        let host = host.to_lowercase();
        let mut hosts = self.hosts.lock().unwrap_or_else(|e| e.into_inner());

        if hosts.len() >= MAX_TRACKED_HOSTS && !hosts.contains_key(&host) {
            let before = hosts.len();
            hosts.retain(|_, slot| !self.is_idle(slot));
            tracing::trace!("Forgot {} idle hosts", before - hosts.len());
        }

        hosts
            .entry(host)
            .or_insert_with(|| {
                Arc::new(HostSlot {
                    semaphore: Arc::new(Semaphore::new(self.max_concurrent)),
                    last_start: tokio::sync::Mutex::new(None),
                })
            })
            .clone()
    }

    /// No request in flight or waiting, and no pacing still owed
    fn is_idle(&self, slot: &Arc<HostSlot>) -> bool {
        let paced = self.min_interval.is_zero()
            || slot
                .last_start
                .try_lock()
                .map(|last| (*last).map_or(true, |at| at.elapsed() >= self.min_interval))
                .unwrap_or(false);

        Arc::strong_count(slot) == 1
            && slot.semaphore.available_permits() == self.max_concurrent
            && paced
    }
}
