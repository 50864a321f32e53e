//! Memoizing loader for sources whose data does not change.

use async_trait::async_trait;
use parking_lot::Mutex;

use super::fan_out::{
    dispatch_all,
    isolate_failure,
};
use super::{
    RegistrationError,
    Source,
    SourceError,
    SourceHandle,
};
use crate::model::Snapshot;

/// Cache state of one source handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheEntryState {
    /// Not registered with the loader
    Unregistered,
    /// Registered, next load dispatches it
    Uncached,
    /// Registered, next load reuses the cached snapshot
    Cached,
}

/// Loads a set of sources assumed to be static, remembering each source's last
/// successful snapshot.
///
/// Only successful loads are cached; a failed source stays uncached and is
/// dispatched again on the next [`Source::load`]. Removing a source purges its
/// entry, so re-adding the same handle forces a genuine reload.
#[derive(Debug, Default)]
pub struct CachingLoader {
    /// Registrations and their cached snapshots
    state: Mutex<CacheState>,
}

/// Registration table.
#[derive(Debug, Default)]
struct CacheState {
    /// Registered sources in registration order
    registrations: Vec<Registration>,
    /// Epoch assigned to the next registration
    next_epoch: u64,
}

/// One registered source.
#[derive(Debug)]
struct Registration {
    /// Source handle (cache key)
    source: SourceHandle,
    /// Distinguishes a re-added handle from its earlier registration
    epoch: u64,
    /// Last successful snapshot
    cached: Option<Snapshot>,
}

/// What a load plans to do for one registration.
#[derive(Debug)]
struct Planned {
    /// Source handle
    source: SourceHandle,
    /// Registration epoch at planning time
    epoch: u64,
    /// Snapshot to reuse instead of dispatching
    cached: Option<Snapshot>,
}

impl CachingLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `source`. Nothing is loaded or evicted.
    ///
    /// Returns `Ok(false)` if the handle is already registered.
    ///
    /// # Errors
    /// Returns [`RegistrationError::SelfReference`] when `source` is this loader.
    pub fn add(&self, source: SourceHandle) -> Result<bool, RegistrationError> {
        if source.points_to(self) {
            return Err(RegistrationError::SelfReference);
        }

        let mut state = self.state.lock();
        if state.registrations.iter().any(|registration| registration.source == source) {
            return Ok(false);
        }
        let epoch = state.next_epoch;
        state.next_epoch += 1;
        state.registrations.push(Registration { source, epoch, cached: None });
        Ok(true)
    }

    /// Unregisters `source` and drops its cached snapshot.
    pub fn remove(&self, source: &SourceHandle) -> bool {
        let mut state = self.state.lock();
        let before = state.registrations.len();
        state.registrations.retain(|registration| &registration.source != source);
        state.registrations.len() != before
    }

    #[must_use]
    pub fn state_of(&self, source: &SourceHandle) -> CacheEntryState {
        self.state
            .lock()
            .registrations
            .iter()
            .find(|registration| &registration.source == source)
            .map_or(CacheEntryState::Unregistered, |registration| {
                if registration.cached.is_some() {
                    CacheEntryState::Cached
                } else {
                    CacheEntryState::Uncached
                }
            })
    }

    #[must_use]
    pub fn sources(&self) -> Vec<SourceHandle> {
        self.state.lock().registrations.iter().map(|registration| registration.source.clone()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().registrations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.lock().registrations.is_empty()
    }

    /// Takes a consistent view of the registrations.
    fn plan(&self) -> Vec<Planned> {
        self.state
            .lock()
            .registrations
            .iter()
            .map(|registration| Planned {
                source: registration.source.clone(),
                epoch: registration.epoch,
                cached: registration.cached.clone(),
            })
            .collect()
    }

    /// Stores a fresh snapshot if the registration it was loaded for still exists.
    fn store(&self, source: &SourceHandle, epoch: u64, snapshot: &Snapshot) {
        let mut state = self.state.lock();
        let registration = state
            .registrations
            .iter_mut()
            .find(|registration| &registration.source == source && registration.epoch == epoch);
        match registration {
            Some(registration) => registration.cached = Some(snapshot.clone()),
            None => {
                tracing::debug!(?source, "Source was removed during load, result not cached");
            }
        }
    }
}

#[async_trait]
impl Source for CachingLoader {
    async fn load(&self) -> Result<Snapshot, SourceError> {
        let plan = self.plan();
        let misses: Vec<SourceHandle> = plan
            .iter()
            .filter(|planned| planned.cached.is_none())
            .map(|planned| planned.source.clone())
            .collect();
        tracing::debug!(
            hits = plan.len() - misses.len(),
            misses = misses.len(),
            "Loading cached translation sources"
        );

        let mut fresh = dispatch_all(&misses).await?.into_iter();
        let mut snapshots = Vec::with_capacity(plan.len());
        for planned in plan {
            if let Some(cached) = planned.cached {
                snapshots.push(cached);
                continue;
            }
            let Some(result) = fresh.next() else {
                continue;
            };
            if let Some(snapshot) = isolate_failure(&planned.source, result) {
                self.store(&planned.source, planned.epoch, &snapshot);
                snapshots.push(snapshot);
            }
        }

        Ok(Snapshot::merge_all(&snapshots))
    }
}
