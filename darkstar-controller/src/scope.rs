//! The radar scope contract.
//!
//! The trackfile store is an external, internally-synchronized object.
//! Every query returns a consistent snapshot; callbacks are invoked on the
//! scope's own thread and must be forwarded into the control loop before
//! any controller state is touched.

use std::collections::HashSet;

use darkstar_core::geo::{Bearing, Bullseye, Position};
use darkstar_core::group::Group;
use darkstar_core::threat::ThreatRadii;
use darkstar_core::trackfile::{ContactClass, TrackId, Trackfile};
use darkstar_core::Coalition;

pub type FadedCallback = Box<dyn Fn(Group) + Send + Sync>;
pub type RemovedCallback = Box<dyn Fn(TrackId) + Send + Sync>;
pub type StartedCallback = Box<dyn Fn() + Send + Sync>;

/// Filter for group queries.
#[derive(Debug, Clone, Default)]
pub struct GroupFilter {
    /// Inclusive altitude bounds in feet.
    pub min_altitude_ft: f64,
    pub max_altitude_ft: f64,
    /// Restrict to a platform class.
    pub class: Option<ContactClass>,
    /// Track IDs to leave out of the result entirely.
    pub exclude: HashSet<TrackId>,
}

impl GroupFilter {
    pub fn with_altitude_bounds(min_altitude_ft: f64, max_altitude_ft: f64) -> Self {
        GroupFilter {
            min_altitude_ft,
            max_altitude_ft,
            class: None,
            exclude: HashSet::new(),
        }
    }
}

/// Read-only snapshot view over the trackfile store.
pub trait RadarScope: Send + Sync {
    /// The reference point for the coalition's position calls.
    fn bullseye(&self, coalition: Coalition) -> Bullseye;

    /// Fuzzy-match a spoken callsign against the coalition's trackfiles.
    /// Returns the canonical callsign and the trackfile when found.
    fn find_callsign(&self, callsign: &str, coalition: Coalition) -> Option<(String, Trackfile)>;

    /// The group of the given coalition nearest to a point, subject to the
    /// filter.
    fn find_nearest_group(
        &self,
        from: &Position,
        coalition: Coalition,
        filter: &GroupFilter,
    ) -> Option<Group>;

    /// The group of the given coalition nearest to a point, within a
    /// capture radius. Used to resolve DECLARE and SNAPLOCK targets.
    fn find_group_at(
        &self,
        point: &Position,
        coalition: Coalition,
        radius_nm: f64,
    ) -> Option<Group>;

    /// Groups of the given coalition inside a cone from an apex, ordered
    /// nearest first. Used for SPIKED.
    fn find_groups_in_cone(
        &self,
        apex: &Position,
        bearing: Bearing,
        half_angle_deg: f64,
        max_range_nm: f64,
        coalition: Coalition,
    ) -> Vec<Group>;

    /// Groups threatening the given coalition: each opposing group within
    /// its class threat radius of at least one friendly, with an
    /// approaching aspect, paired with the threatened callsigns.
    fn enumerate_threats(
        &self,
        coalition: Coalition,
        radii: &ThreatRadii,
    ) -> Vec<(Group, Vec<String>)>;

    /// All groups of the given coalition, unordered. Picture candidates.
    fn enumerate_groups(&self, coalition: Coalition) -> Vec<Group>;

    /// All live trackfiles of the given coalition.
    fn live_contacts(&self, coalition: Coalition) -> Vec<Trackfile>;

    /// Register or clear the faded-contact callback.
    fn set_faded_callback(&self, callback: Option<FadedCallback>);

    /// Register or clear the removed-contact callback.
    fn set_removed_callback(&self, callback: Option<RemovedCallback>);

    /// Register or clear the scope-restart callback.
    fn set_started_callback(&self, callback: Option<StartedCallback>);
}

/// A scope callback, forwarded into the control loop as a message.
#[derive(Debug, Clone)]
pub enum ScopeEvent {
    /// A tracked group's updates have stopped.
    Faded(Group),
    /// A trackfile was dropped from the store.
    Removed(TrackId),
    /// The scope was (re)initialized; controller state must reset.
    Started,
}
