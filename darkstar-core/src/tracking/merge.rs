//! Merge bookkeeping: which hostile contacts are at visual range of which
//! friendlies.

use std::collections::{HashMap, HashSet};

use crate::trackfile::TrackId;

/// Records friendly -> hostile merge pairs.
///
/// An ID is only ever on one side of the records: recording a pair evicts
/// any conflicting entries first, so the two-sided invariant holds by
/// construction regardless of call order.
#[derive(Debug, Default)]
pub struct MergeTracker {
    /// Friendly track ID -> hostile track IDs currently in the merge.
    merges: HashMap<TrackId, HashSet<TrackId>>,
}

impl MergeTracker {
    pub fn new() -> Self {
        MergeTracker::default()
    }

    /// Record that a friendly and a hostile are in the merge.
    pub fn merged(&mut self, friendly: TrackId, hostile: TrackId) {
        if friendly == hostile {
            return;
        }
        // The friendly may not appear as anyone's hostile, and the hostile
        // may not appear as a friendly key.
        self.remove_hostile(friendly);
        self.merges.remove(&hostile);
        self.merges.entry(friendly).or_default().insert(hostile);
    }

    /// Remove a recorded pair. Unknown pairs are ignored.
    pub fn separated(&mut self, friendly: TrackId, hostile: TrackId) {
        if let Some(hostiles) = self.merges.get_mut(&friendly) {
            hostiles.remove(&hostile);
            if hostiles.is_empty() {
                self.merges.remove(&friendly);
            }
        }
    }

    /// True iff the ID appears on either side of any record.
    pub fn is_merged(&self, id: TrackId) -> bool {
        self.merges.contains_key(&id) || self.merges.values().any(|h| h.contains(&id))
    }

    /// True iff this exact friendly/hostile pair is recorded.
    pub fn contains(&self, friendly: TrackId, hostile: TrackId) -> bool {
        self.merges
            .get(&friendly)
            .is_some_and(|hostiles| hostiles.contains(&hostile))
    }

    /// The IDs on the other side of the merge from the given ID.
    pub fn partners(&self, id: TrackId) -> Vec<TrackId> {
        if let Some(hostiles) = self.merges.get(&id) {
            let mut partners: Vec<TrackId> = hostiles.iter().copied().collect();
            partners.sort_unstable();
            return partners;
        }
        let mut partners: Vec<TrackId> = self
            .merges
            .iter()
            .filter(|(_, hostiles)| hostiles.contains(&id))
            .map(|(friendly, _)| *friendly)
            .collect();
        partners.sort_unstable();
        partners
    }

    /// All recorded pairs, for the surveillance loop's separation pass.
    pub fn pairs(&self) -> Vec<(TrackId, TrackId)> {
        let mut pairs: Vec<(TrackId, TrackId)> = self
            .merges
            .iter()
            .flat_map(|(friendly, hostiles)| hostiles.iter().map(|h| (*friendly, *h)))
            .collect();
        pairs.sort_unstable();
        pairs
    }

    /// Drop every record involving the ID, on either side.
    pub fn remove(&mut self, id: TrackId) {
        self.merges.remove(&id);
        self.remove_hostile(id);
    }

    pub fn reset(&mut self) {
        self.merges.clear();
    }

    fn remove_hostile(&mut self, hostile: TrackId) {
        self.merges.retain(|_, hostiles| {
            hostiles.remove(&hostile);
            !hostiles.is_empty()
        });
    }
}
