//! Threat assessment: per-class engagement radii, aspect math, and the
//! priority ordering used for tactical pictures.

use serde::{Deserialize, Serialize};

use crate::geo::{angle_between, Position};
use crate::group::{Aspect, Group};
use crate::trackfile::{ContactClass, Trackfile};

/// Engagement radius per contact class, in nautical miles. A group inside
/// its class radius of a friendly, with an approaching aspect, is a threat.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreatRadii {
    pub fighter_nm: f64,
    pub attack_nm: f64,
    pub bomber_nm: f64,
    pub rotary_nm: f64,
    pub transport_nm: f64,
    pub unknown_nm: f64,
}

impl Default for ThreatRadii {
    fn default() -> Self {
        ThreatRadii {
            fighter_nm: 35.0,
            attack_nm: 25.0,
            bomber_nm: 20.0,
            rotary_nm: 5.0, // helicopters and drones
            transport_nm: 5.0,
            unknown_nm: 15.0,
        }
    }
}

impl ThreatRadii {
    pub fn radius_nm(&self, class: ContactClass) -> f64 {
        match class {
            ContactClass::Fighter => self.fighter_nm,
            ContactClass::Attack => self.attack_nm,
            ContactClass::Bomber => self.bomber_nm,
            ContactClass::Helicopter | ContactClass::Drone => self.rotary_nm,
            ContactClass::Transport => self.transport_nm,
            ContactClass::Unknown => self.unknown_nm,
        }
    }
}

/// Aspect of a target relative to a reference observer: the angle between
/// the target's track and the bearing from the target back to the observer.
pub fn aspect(target: &Position, target_track_deg: f64, reference: &Position) -> Aspect {
    let bearing_to_reference = target.bearing_to(reference).degrees();
    let angle_off = angle_between(target_track_deg, bearing_to_reference);
    Aspect::from_angle_off(angle_off)
}

/// Closing speed of a target toward a reference point in knots, positive
/// when approaching. The reference is treated as stationary; for picture
/// priorities the error is small against fighter closure speeds.
pub fn closure_knots(
    target: &Position,
    target_track_deg: f64,
    target_speed_knots: f64,
    reference: &Position,
) -> f64 {
    let bearing_to_reference = target.bearing_to(reference).degrees();
    let angle_off = angle_between(target_track_deg, bearing_to_reference);
    target_speed_knots * angle_off.to_radians().cos()
}

/// Seconds until a target at `range_nm` reaches the reference at the given
/// closure. None when the target is not closing.
pub fn time_to_merge_s(range_nm: f64, closure_knots: f64) -> Option<f64> {
    if closure_knots <= 0.0 {
        return None;
    }
    Some(range_nm / closure_knots * 3600.0)
}

#[derive(Debug, Clone, Copy)]
struct PriorityKey {
    approaching: bool,
    range_nm: f64,
    time_to_merge_s: f64,
    altitude_ft: f64,
}

/// Order groups for a picture: closest approaching hostile first, ties
/// broken by lowest time-to-merge, then highest altitude.
pub fn sort_by_priority(groups: &mut [Group], friendlies: &[Trackfile]) {
    let keys: Vec<PriorityKey> = groups
        .iter()
        .map(|group| priority_key(group, friendlies))
        .collect();
    let mut order: Vec<usize> = (0..groups.len()).collect();
    order.sort_by(|&a, &b| compare_keys(&keys[a], &keys[b]));
    // Apply the permutation.
    let reordered: Vec<Group> = order.iter().map(|&i| groups[i].clone()).collect();
    for (slot, group) in groups.iter_mut().zip(reordered) {
        *slot = group;
    }
}

fn priority_key(group: &Group, friendlies: &[Trackfile]) -> PriorityKey {
    let nearest = friendlies
        .iter()
        .filter(|friendly| !friendly.is_position_unknown())
        .map(|friendly| {
            (
                friendly,
                group.position.lateral_distance_nm(&friendly.position),
            )
        })
        .min_by(|a, b| a.1.total_cmp(&b.1));

    match nearest {
        Some((friendly, range_nm)) => {
            let closure = closure_knots(
                &group.position,
                group.track_deg,
                group.speed_knots,
                &friendly.position,
            );
            PriorityKey {
                approaching: closure > 0.0,
                range_nm,
                time_to_merge_s: time_to_merge_s(range_nm, closure).unwrap_or(f64::INFINITY),
                altitude_ft: group.position.altitude_ft,
            }
        }
        // Without any positioned friendly, fall back to bullseye range.
        None => PriorityKey {
            approaching: false,
            range_nm: group.location.range_nm,
            time_to_merge_s: f64::INFINITY,
            altitude_ft: group.position.altitude_ft,
        },
    }
}

fn compare_keys(a: &PriorityKey, b: &PriorityKey) -> std::cmp::Ordering {
    b.approaching
        .cmp(&a.approaching)
        .then_with(|| a.range_nm.total_cmp(&b.range_nm))
        .then_with(|| a.time_to_merge_s.total_cmp(&b.time_to_merge_s))
        .then_with(|| b.altitude_ft.total_cmp(&a.altitude_ft))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coalition::Coalition;
    use crate::geo::{Bearing, BullseyePoint};

    fn group_at(id: u64, position: Position, track_deg: f64, speed_knots: f64) -> Group {
        Group {
            ids: vec![id],
            location: BullseyePoint {
                bearing: Bearing::magnetic(90.0),
                range_nm: position.lateral_distance_nm(&Position::new(41.0, 41.0, 0.0)),
            },
            position,
            track_deg,
            speed_knots,
            contacts: 1,
            class: ContactClass::Fighter,
            aspect: None,
            declaration: None,
        }
    }

    fn friendly_at(id: u64, position: Position) -> Trackfile {
        Trackfile {
            id,
            callsign: format!("Eagle {id}"),
            coalition: Coalition::Blue,
            class: ContactClass::Fighter,
            position,
            speed_knots: 400.0,
            track_deg: 90.0,
            fuel_low: false,
            last_seen: 0,
        }
    }

    #[test]
    fn test_radius_by_class() {
        let radii = ThreatRadii::default();
        assert_eq!(radii.radius_nm(ContactClass::Fighter), 35.0);
        assert_eq!(radii.radius_nm(ContactClass::Helicopter), 5.0);
        assert_eq!(radii.radius_nm(ContactClass::Drone), 5.0);
        assert_eq!(radii.radius_nm(ContactClass::Unknown), 15.0);
    }

    #[test]
    fn test_aspect_head_on_and_receding() {
        let reference = Position::new(41.0, 41.0, 20_000.0);
        // Target due east of the reference, tracking west: hot.
        let target = Position::new(41.0, 41.7, 22_000.0);
        assert_eq!(aspect(&target, 270.0, &reference), Aspect::Hot);
        // Same target tracking east: cold.
        assert_eq!(aspect(&target, 90.0, &reference), Aspect::Cold);
        // Tracking north: beam.
        assert_eq!(aspect(&target, 0.0, &reference), Aspect::Beam);
    }

    #[test]
    fn test_closure_and_time_to_merge() {
        let reference = Position::new(41.0, 41.0, 20_000.0);
        let target = Position::new(41.0, 41.7, 22_000.0);
        let closing = closure_knots(&target, 270.0, 480.0, &reference);
        assert!((closing - 480.0).abs() < 5.0, "got {closing}");
        let receding = closure_knots(&target, 90.0, 480.0, &reference);
        assert!(receding < 0.0);

        let t = time_to_merge_s(40.0, 480.0).unwrap();
        assert!((t - 300.0).abs() < 1.0, "got {t}");
        assert!(time_to_merge_s(40.0, -100.0).is_none());
    }

    #[test]
    fn test_priority_prefers_closest_approaching() {
        let friendlies = vec![friendly_at(1, Position::new(41.0, 41.0, 20_000.0))];
        // Far but approaching, near but receding, near and approaching.
        let far_hot = group_at(10, Position::new(41.0, 42.5, 25_000.0), 270.0, 480.0);
        let near_cold = group_at(11, Position::new(41.0, 41.3, 25_000.0), 90.0, 480.0);
        let near_hot = group_at(12, Position::new(41.0, 41.5, 25_000.0), 270.0, 480.0);
        let mut groups = vec![far_hot, near_cold, near_hot];

        sort_by_priority(&mut groups, &friendlies);

        assert_eq!(groups[0].primary_id(), 12);
        assert_eq!(groups[1].primary_id(), 10);
        assert_eq!(groups[2].primary_id(), 11);
    }

    #[test]
    fn test_priority_tie_break_on_altitude() {
        let friendlies = vec![friendly_at(1, Position::new(41.0, 41.0, 20_000.0))];
        let low = group_at(10, Position::new(41.0, 41.5, 15_000.0), 270.0, 480.0);
        let high = group_at(11, Position::new(41.0, 41.5, 30_000.0), 270.0, 480.0);
        let mut groups = vec![low, high];

        sort_by_priority(&mut groups, &friendlies);

        assert_eq!(groups[0].primary_id(), 11);
    }
}
