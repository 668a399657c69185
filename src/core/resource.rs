use super::types::{AgentId, ResourceId};
use log::warn;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard};

/// Snapshot of a resource's instrumentation counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceStats {
    /// Number of successful acquisitions so far
    pub acquisitions: u64,
    /// Highest number of simultaneous holders ever observed
    pub peak_holders: usize,
}

/// A single mutually exclusive unit shared by two neighbouring agents.
///
/// `acquire` blocks until the resource is free and hands back a guard;
/// dropping the guard (or calling `release` on it) frees the resource and
/// wakes one waiter. Which waiter wins is left to the platform.
#[derive(Debug)]
pub struct Resource {
    id: ResourceId,
    holder: Mutex<Option<AgentId>>,
    freed: Condvar,
    active: AtomicUsize,
    peak: AtomicUsize,
    acquisitions: AtomicU64,
}

impl Resource {
    pub fn new(id: ResourceId) -> Self {
        Self {
            id,
            holder: Mutex::new(None),
            freed: Condvar::new(),
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            acquisitions: AtomicU64::new(0),
        }
    }

    pub fn id(&self) -> ResourceId {
        self.id
    }

    /// Block until the resource is free, then hold it on behalf of `agent`
    pub fn acquire(&self, agent: AgentId) -> ResourceGuard<'_> {
        let mut holder = self.lock_holder();
        while holder.is_some() {
            holder = self
                .freed
                .wait(holder)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
        *holder = Some(agent);
        drop(holder);

        // Counted outside the state lock so a broken exclusion would show up
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now_active, Ordering::SeqCst);
        self.acquisitions.fetch_add(1, Ordering::Relaxed);

        ResourceGuard {
            resource: self,
            agent,
        }
    }

    fn release_from(&self, agent: AgentId) {
        self.active.fetch_sub(1, Ordering::SeqCst);

        let mut holder = self.lock_holder();
        if *holder != Some(agent) {
            warn!(
                "[Resource {}] released by agent {} but held by {:?}",
                self.id, agent, *holder
            );
        }
        *holder = None;
        drop(holder);
        self.freed.notify_one();
    }

    /// Agent currently holding the resource, if any
    pub fn holder(&self) -> Option<AgentId> {
        *self.lock_holder()
    }

    pub fn stats(&self) -> ResourceStats {
        ResourceStats {
            acquisitions: self.acquisitions.load(Ordering::Relaxed),
            peak_holders: self.peak.load(Ordering::SeqCst),
        }
    }

    // The protected state is a plain Option, so a poisoned lock is still usable
    fn lock_holder(&self) -> MutexGuard<'_, Option<AgentId>> {
        self.holder
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Exclusive hold on a [`Resource`]; releases on drop
#[derive(Debug)]
#[must_use = "the resource is released as soon as the guard is dropped"]
pub struct ResourceGuard<'a> {
    resource: &'a Resource,
    agent: AgentId,
}

impl ResourceGuard<'_> {
    pub fn resource_id(&self) -> ResourceId {
        self.resource.id
    }

    /// Release explicitly; same as dropping the guard
    pub fn release(self) {}
}

impl Drop for ResourceGuard<'_> {
    fn drop(&mut self) {
        self.resource.release_from(self.agent);
    }
}
