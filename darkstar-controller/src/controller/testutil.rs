//! Shared fakes for controller tests.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use darkstar_core::brevity::Frequency;
use darkstar_core::geo::{angle_between, Bearing, Bullseye, Position};
use darkstar_core::group::Group;
use darkstar_core::threat::ThreatRadii;
use darkstar_core::trackfile::{ContactClass, TrackId, Trackfile};
use darkstar_core::Coalition;
use tokio::sync::mpsc;

use super::{Call, Controller, ControllerConfig};
use crate::radio::RadioNetwork;
use crate::scope::{
    FadedCallback, GroupFilter, RadarScope, RemovedCallback, StartedCallback,
};

/// Scripted in-memory scope. The bullseye sits at N41 E41 with zero
/// magnetic variation so test bearings read the same in both references.
pub(crate) struct FakeScope {
    bullseye: Bullseye,
    contacts: Mutex<Vec<Trackfile>>,
    groups: Mutex<Vec<(Coalition, Group)>>,
    threats: Mutex<Vec<(Group, Vec<String>)>>,
    faded: Mutex<Option<FadedCallback>>,
    removed: Mutex<Option<RemovedCallback>>,
    started: Mutex<Option<StartedCallback>>,
}

impl FakeScope {
    pub fn new() -> Arc<Self> {
        Arc::new(FakeScope {
            bullseye: Bullseye::new(Position::new(41.0, 41.0, 0.0), 0.0),
            contacts: Mutex::new(Vec::new()),
            groups: Mutex::new(Vec::new()),
            threats: Mutex::new(Vec::new()),
            faded: Mutex::new(None),
            removed: Mutex::new(None),
            started: Mutex::new(None),
        })
    }

    pub fn add_contact(&self, trackfile: Trackfile) {
        self.contacts.lock().unwrap().push(trackfile);
    }

    pub fn move_contact(&self, id: TrackId, position: Position) {
        for trackfile in self.contacts.lock().unwrap().iter_mut() {
            if trackfile.id == id {
                trackfile.position = position;
            }
        }
    }

    pub fn add_group(&self, coalition: Coalition, group: Group) {
        self.groups.lock().unwrap().push((coalition, group));
    }

    pub fn set_threats(&self, threats: Vec<(Group, Vec<String>)>) {
        *self.threats.lock().unwrap() = threats;
    }

    fn groups_of(&self, coalition: Coalition) -> Vec<Group> {
        self.groups
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| *c == coalition)
            .map(|(_, g)| g.clone())
            .collect()
    }
}

impl RadarScope for FakeScope {
    fn bullseye(&self, _coalition: Coalition) -> Bullseye {
        self.bullseye
    }

    fn find_callsign(&self, callsign: &str, coalition: Coalition) -> Option<(String, Trackfile)> {
        let needle = callsign.to_lowercase();
        self.contacts
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.coalition == coalition && t.callsign.to_lowercase().starts_with(&needle))
            .map(|t| (t.callsign.clone(), t.clone()))
    }

    fn find_nearest_group(
        &self,
        from: &Position,
        coalition: Coalition,
        filter: &GroupFilter,
    ) -> Option<Group> {
        self.groups_of(coalition)
            .into_iter()
            .filter(|g| {
                g.position.altitude_ft >= filter.min_altitude_ft
                    && g.position.altitude_ft <= filter.max_altitude_ft
                    && filter.class.map_or(true, |class| g.class == class)
                    && !g.ids.iter().any(|id| filter.exclude.contains(id))
            })
            .min_by(|a, b| {
                from.lateral_distance_nm(&a.position)
                    .total_cmp(&from.lateral_distance_nm(&b.position))
            })
    }

    fn find_group_at(
        &self,
        point: &Position,
        coalition: Coalition,
        radius_nm: f64,
    ) -> Option<Group> {
        self.groups_of(coalition)
            .into_iter()
            .filter(|g| point.lateral_distance_nm(&g.position) <= radius_nm)
            .min_by(|a, b| {
                point
                    .lateral_distance_nm(&a.position)
                    .total_cmp(&point.lateral_distance_nm(&b.position))
            })
    }

    fn find_groups_in_cone(
        &self,
        apex: &Position,
        bearing: Bearing,
        half_angle_deg: f64,
        max_range_nm: f64,
        coalition: Coalition,
    ) -> Vec<Group> {
        let mut groups: Vec<Group> = self
            .groups_of(coalition)
            .into_iter()
            .filter(|g| {
                let range = apex.lateral_distance_nm(&g.position);
                let offset = angle_between(
                    bearing.degrees(),
                    apex.bearing_to(&g.position).degrees(),
                );
                range <= max_range_nm && offset.abs() <= half_angle_deg
            })
            .collect();
        groups.sort_by(|a, b| {
            apex.lateral_distance_nm(&a.position)
                .total_cmp(&apex.lateral_distance_nm(&b.position))
        });
        groups
    }

    fn enumerate_threats(
        &self,
        _coalition: Coalition,
        _radii: &ThreatRadii,
    ) -> Vec<(Group, Vec<String>)> {
        self.threats.lock().unwrap().clone()
    }

    fn enumerate_groups(&self, coalition: Coalition) -> Vec<Group> {
        self.groups_of(coalition)
    }

    fn live_contacts(&self, coalition: Coalition) -> Vec<Trackfile> {
        self.contacts
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.coalition == coalition)
            .cloned()
            .collect()
    }

    fn set_faded_callback(&self, callback: Option<FadedCallback>) {
        *self.faded.lock().unwrap() = callback;
    }

    fn set_removed_callback(&self, callback: Option<RemovedCallback>) {
        *self.removed.lock().unwrap() = callback;
    }

    fn set_started_callback(&self, callback: Option<StartedCallback>) {
        *self.started.lock().unwrap() = callback;
    }
}

/// Radio fake: one monitored frequency, a settable set of present
/// callsigns.
pub(crate) struct FakeRadio {
    frequencies: Vec<Frequency>,
    present: Mutex<HashSet<String>>,
}

impl FakeRadio {
    pub fn new(present: &[&str]) -> Self {
        FakeRadio {
            frequencies: vec![Frequency::from_mega_hertz(251.0)],
            present: Mutex::new(present.iter().map(|s| s.to_string()).collect()),
        }
    }
}

impl RadioNetwork for FakeRadio {
    fn frequencies(&self) -> Vec<Frequency> {
        self.frequencies.clone()
    }

    fn is_on_frequency(&self, callsign: &str, _frequency: Frequency) -> bool {
        self.present.lock().unwrap().contains(callsign)
    }
}

/// A controller bound to an outbound channel, with everyone on frequency.
pub(crate) fn make_controller(
    coalition: Coalition,
) -> (Controller, Arc<FakeScope>, mpsc::Receiver<Call>) {
    make_controller_with_radio(coalition, Arc::new(FakeRadio::new(&["Eagle 1", "Eagle 1-1"])))
}

pub(crate) fn make_controller_with_radio(
    coalition: Coalition,
    radio: Arc<FakeRadio>,
) -> (Controller, Arc<FakeScope>, mpsc::Receiver<Call>) {
    let scope = FakeScope::new();
    let (mut controller, _handle) =
        Controller::new(ControllerConfig::new(coalition), scope.clone(), radio).unwrap();
    let (tx, rx) = mpsc::channel(32);
    controller.bind(tx);
    (controller, scope, rx)
}

/// Receive one call synchronously, panicking when none is queued.
pub(crate) fn recv_kind(rx: &mut mpsc::Receiver<Call>) -> darkstar_core::brevity::CallKind {
    rx.try_recv().expect("expected an outbound call").kind
}

pub(crate) fn contact(
    id: TrackId,
    callsign: &str,
    coalition: Coalition,
    position: Position,
) -> Trackfile {
    Trackfile {
        id,
        callsign: callsign.to_string(),
        coalition,
        class: ContactClass::Fighter,
        position,
        speed_knots: 420.0,
        track_deg: 90.0,
        fuel_low: false,
        last_seen: 0,
    }
}

pub(crate) fn group_with_id(
    id: TrackId,
    position: Position,
    track_deg: f64,
    speed_knots: f64,
) -> Group {
    let bullseye = Bullseye::new(Position::new(41.0, 41.0, 0.0), 0.0);
    Group {
        ids: vec![id],
        location: bullseye.locate(&position),
        position,
        track_deg,
        speed_knots,
        contacts: 1,
        class: ContactClass::Fighter,
        aspect: None,
        declaration: None,
    }
}
