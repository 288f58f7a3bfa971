//! Per-entity time-window suppression of repeated calls.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::trackfile::TrackId;

/// Tracks the earliest time a new call about each entity may be emitted.
///
/// Callers must serialize `ready` against `extend`; the controller's
/// single control task provides that ordering.
#[derive(Debug)]
pub struct CooldownTracker {
    cooldown: Duration,
    deadlines: HashMap<TrackId, Instant>,
}

impl CooldownTracker {
    pub fn new(cooldown: Duration) -> Self {
        CooldownTracker {
            cooldown,
            deadlines: HashMap::new(),
        }
    }

    /// True iff no deadline is recorded for the ID, or the recorded
    /// deadline has passed.
    pub fn ready(&self, id: TrackId, now: Instant) -> bool {
        match self.deadlines.get(&id) {
            Some(deadline) => *deadline <= now,
            None => true,
        }
    }

    /// Push the deadline for the ID to `now + cooldown`. Deadlines never
    /// move backwards until removed or reset.
    pub fn extend(&mut self, id: TrackId, now: Instant) {
        let deadline = now + self.cooldown;
        self.deadlines
            .entry(id)
            .and_modify(|existing| {
                if deadline > *existing {
                    *existing = deadline;
                }
            })
            .or_insert(deadline);
    }

    pub fn remove(&mut self, id: TrackId) {
        self.deadlines.remove(&id);
    }

    pub fn reset(&mut self) {
        self.deadlines.clear();
    }
}
