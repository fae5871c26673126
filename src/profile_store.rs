//! Profile persistence seam.
//!
//! The coordinator only needs `get`/`set` by slot; where profiles actually
//! live (flash, EEPROM, RAM) is the application's business. A fixed-capacity
//! in-memory store is provided for boards that provision profiles at boot
//! and for host-side testing.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::{Mutex, raw::CriticalSectionRawMutex};

use crate::profile::{ClientProfile, MAX_CLIENT_PROFILES, ProfileId};
use crate::{Error, Result};

/// Read/write access to persisted client profiles by numeric slot.
///
/// Calls run on the caller's task context and may block on the store's own
/// primitives; the coordinator treats a failed `get` as "deprioritize, try
/// last" rather than an abort.
pub trait ProfileStore {
    /// Fetch the profile in `id`.
    ///
    /// # Errors
    ///
    /// [`Error::ProfileNotFound`] if the slot is empty or unreadable.
    fn get(&self, id: ProfileId) -> Result<ClientProfile>;

    /// Persist `profile` into `id`.
    ///
    /// # Errors
    ///
    /// [`Error::ProfileStoreFull`] if the store has no such slot.
    fn set(&self, id: ProfileId, profile: &ClientProfile) -> Result<()>;

    /// Number of slots this store serves.
    fn capacity(&self) -> usize {
        MAX_CLIENT_PROFILES
    }
}

/// Fixed-capacity in-memory profile store.
pub struct StaticProfileStore<const N: usize = MAX_CLIENT_PROFILES> {
    slots: Mutex<CriticalSectionRawMutex, RefCell<[Option<ClientProfile>; N]>>,
}

impl<const N: usize> StaticProfileStore<N> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: Mutex::new(RefCell::new([const { None }; N])),
        }
    }

    /// Empty the slot, so the next fetch reports not-found.
    pub fn clear(&self, id: ProfileId) {
        self.slots.lock(|slots| {
            if let Some(slot) = slots.borrow_mut().get_mut(usize::from(id)) {
                *slot = None;
            }
        });
    }
}

impl<const N: usize> Default for StaticProfileStore<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ProfileStore for StaticProfileStore<N> {
    fn get(&self, id: ProfileId) -> Result<ClientProfile> {
        self.slots.lock(|slots| {
            slots
                .borrow()
                .get(usize::from(id))
                .and_then(Clone::clone)
                .ok_or(Error::ProfileNotFound)
        })
    }

    fn set(&self, id: ProfileId, profile: &ClientProfile) -> Result<()> {
        self.slots.lock(|slots| {
            slots
                .borrow_mut()
                .get_mut(usize::from(id))
                .map(|slot| *slot = Some(profile.clone()))
                .ok_or(Error::ProfileStoreFull)
        })
    }

    fn capacity(&self) -> usize {
        N
    }
}
