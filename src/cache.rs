use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::debug;

use crate::store::Snapshot;

struct CachedSnapshot {
    snapshot: Snapshot,
    fetched_at: Instant,
}

/// Time-boxed memo of the last store snapshot. Writers must call
/// [`SnapshotCache::invalidate`] after touching the store.
pub struct SnapshotCache {
    ttl: Duration,
    entry: Option<CachedSnapshot>,
}

impl SnapshotCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entry: None }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn is_fresh(&self) -> bool {
        self.entry
            .as_ref()
            .is_some_and(|entry| entry.fetched_at.elapsed() < self.ttl)
    }

    pub fn get_or_load(&mut self, load: impl FnOnce() -> Result<Snapshot>) -> Result<&Snapshot> {
        let entry = match self.entry.take() {
            Some(entry) if entry.fetched_at.elapsed() < self.ttl => {
                debug!("snapshot cache hit");
                entry
            }
            _ => {
                debug!("snapshot cache miss");
                CachedSnapshot {
                    snapshot: load()?,
                    fetched_at: Instant::now(),
                }
            }
        };
        Ok(&self.entry.insert(entry).snapshot)
    }

    pub fn invalidate(&mut self) {
        if self.entry.take().is_some() {
            debug!("snapshot cache invalidated");
        }
    }
}
