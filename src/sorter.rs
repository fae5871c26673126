//! Priority ordering of client profiles.
//!
//! Pure transforms over `(profile ID, priority)` pairs; no I/O beyond the
//! store fetches in [`collect_ranks`].

use heapless::Vec;

use crate::profile::{LOWEST_PRECEDENCE, ProfileId};
use crate::profile_store::ProfileStore;

/// One `(profile ID, priority)` pair.
pub type ProfileRank = (ProfileId, u8);

/// Fetch the priority of every slot in `store`, up to `N` slots.
///
/// Slots whose fetch fails are kept with [`LOWEST_PRECEDENCE`] so they are
/// still attempted, after every profile that fetched cleanly.
pub fn collect_ranks<S: ProfileStore, const N: usize>(store: &S) -> Vec<ProfileRank, N> {
    let mut ranks = Vec::new();
    for id in 0..store.capacity().min(N) {
        let Ok(id) = ProfileId::try_from(id) else {
            break;
        };
        let priority = store
            .get(id)
            .map_or(LOWEST_PRECEDENCE, |profile| profile.priority);
        // capacity is bounded by N, push cannot fail
        let _ = ranks.push((id, priority));
    }
    ranks
}

/// Stable in-place sort by ascending priority.
///
/// Equal priorities keep their input order, so ties resolve by ascending
/// profile ID when the input came from [`collect_ranks`].
pub fn sort_by_priority(ranks: &mut [ProfileRank]) {
    // insertion sort: the list is at most MAX_CLIENT_PROFILES long and
    // `core` has no stable slice sort
    for sorted_end in 1..ranks.len() {
        let mut slot = sorted_end;
        while slot > 0 && ranks[slot - 1].1 > ranks[slot].1 {
            ranks.swap(slot - 1, slot);
            slot -= 1;
        }
    }
}
