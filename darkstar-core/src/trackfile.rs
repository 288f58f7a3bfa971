//! Per-aircraft radar records.

use serde::{Deserialize, Serialize};

use crate::coalition::Coalition;
use crate::geo::Position;

/// Stable identifier for a tracked aircraft, assigned by the trackfile
/// store and reused for the lifetime of the track.
pub type TrackId = u64;

/// Broad platform classification of a contact, used to pick threat radii
/// and to filter BOGEY DOPE requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactClass {
    Fighter,
    Attack,
    Bomber,
    Helicopter,
    Drone,
    Transport,
    Unknown,
}

impl Default for ContactClass {
    fn default() -> Self {
        ContactClass::Unknown
    }
}

impl std::fmt::Display for ContactClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fighter => write!(f, "fighter"),
            Self::Attack => write!(f, "attack"),
            Self::Bomber => write!(f, "bomber"),
            Self::Helicopter => write!(f, "helicopter"),
            Self::Drone => write!(f, "drone"),
            Self::Transport => write!(f, "transport"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// The persistent in-memory record of one tracked aircraft.
///
/// Produced by the external trackfile store; the controller only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trackfile {
    pub id: TrackId,
    pub callsign: String,
    pub coalition: Coalition,
    pub class: ContactClass,
    /// Last known position. A zero point means the position is unknown.
    pub position: Position,
    /// Ground speed in knots.
    pub speed_knots: f64,
    /// True track direction in degrees.
    pub track_deg: f64,
    /// Set when the pilot has declared a low fuel state.
    pub fuel_low: bool,
    /// Unix timestamp (ms) of the last radar update.
    pub last_seen: u64,
}

impl Trackfile {
    /// True when the last known point is the zero value, meaning the store
    /// has never seen a usable position for this track.
    pub fn is_position_unknown(&self) -> bool {
        self.position.latitude == 0.0
            && self.position.longitude == 0.0
            && self.position.altitude_ft == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trackfile(position: Position) -> Trackfile {
        Trackfile {
            id: 1,
            callsign: "Eagle 1-1".to_string(),
            coalition: Coalition::Blue,
            class: ContactClass::Fighter,
            position,
            speed_knots: 420.0,
            track_deg: 90.0,
            fuel_low: false,
            last_seen: 0,
        }
    }

    #[test]
    fn test_position_unknown() {
        assert!(trackfile(Position::new(0.0, 0.0, 0.0)).is_position_unknown());
        assert!(!trackfile(Position::new(41.0, 41.0, 20_000.0)).is_position_unknown());
    }
}
