//! Tactical groups: clusters of trackfiles treated as one unit.

use serde::{Deserialize, Serialize};

use crate::geo::{BullseyePoint, Position};
use crate::trackfile::{ContactClass, TrackId};

/// Target aspect relative to a reference observer, derived from the angle
/// between the target's track and the bearing from the target back to the
/// observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aspect {
    Hot,
    Flanking,
    Beam,
    Cold,
}

impl Aspect {
    /// Classify an absolute angle-off in degrees [0, 180].
    pub fn from_angle_off(angle_off_deg: f64) -> Aspect {
        let angle = angle_off_deg.abs();
        if angle < 30.0 {
            Aspect::Hot
        } else if angle < 60.0 {
            Aspect::Flanking
        } else if angle < 110.0 {
            Aspect::Beam
        } else {
            Aspect::Cold
        }
    }

    /// Whether the target is closing on the reference.
    pub fn is_approaching(&self) -> bool {
        matches!(self, Aspect::Hot | Aspect::Flanking)
    }
}

impl std::fmt::Display for Aspect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hot => write!(f, "hot"),
            Self::Flanking => write!(f, "flanking"),
            Self::Beam => write!(f, "beam"),
            Self::Cold => write!(f, "cold"),
        }
    }
}

/// Identity classification of a group, as answered to DECLARE and SNAPLOCK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Declaration {
    Friendly,
    Hostile,
    Neutral,
    /// A group was found but its identity cannot be resolved.
    Bogey,
    /// Opposing groups co-located at merge range; weapons sorting required.
    Furball,
    /// The target is merged with a friendly. Only used for SNAPLOCK.
    Merged,
    /// Nothing found at the queried location.
    Clean,
}

impl std::fmt::Display for Declaration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Friendly => write!(f, "friendly"),
            Self::Hostile => write!(f, "hostile"),
            Self::Neutral => write!(f, "neutral"),
            Self::Bogey => write!(f, "bogey"),
            Self::Furball => write!(f, "furball"),
            Self::Merged => write!(f, "merged"),
            Self::Clean => write!(f, "clean"),
        }
    }
}

/// A cluster of one or more trackfiles treated as a tactical unit.
///
/// Groups are produced by the trackfile store's clustering; the controller
/// annotates aspect and declaration before handing them to the composer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    /// Member track IDs. The first member is the primary ID used for
    /// cooldown bookkeeping.
    pub ids: Vec<TrackId>,
    /// Location relative to the coalition bullseye.
    pub location: BullseyePoint,
    /// Group center position.
    pub position: Position,
    /// Representative true track direction in degrees.
    pub track_deg: f64,
    /// Representative ground speed in knots.
    pub speed_knots: f64,
    /// Number of distinct contacts in the group.
    pub contacts: usize,
    /// Platform class of the leading contact.
    pub class: ContactClass,
    /// Aspect relative to the requesting aircraft, when one exists.
    pub aspect: Option<Aspect>,
    /// Identity classification, when one has been made.
    pub declaration: Option<Declaration>,
}

impl Group {
    /// The ID used to key cooldowns and merge records for this group.
    pub fn primary_id(&self) -> TrackId {
        self.ids.first().copied().unwrap_or_default()
    }

    /// Altitude rounded down to the nearest thousand feet, as spoken in
    /// group calls ("twenty thousand").
    pub fn altitude_band_ft(&self) -> i64 {
        (self.position.altitude_ft / 1000.0).floor() as i64 * 1000
    }
}
