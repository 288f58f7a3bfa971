//! Spherical geometry for position calls.
//!
//! All distances are nautical miles, altitudes are feet, angles are
//! degrees. Bearings carry their reference (magnetic or true) explicitly;
//! everything broadcast to pilots is magnetic.

use serde::{Deserialize, Serialize};

/// Mean earth radius in nautical miles.
pub const EARTH_RADIUS_NM: f64 = 3440.065;

/// Whether a bearing is measured against magnetic or true north.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BearingReference {
    Magnetic,
    True,
}

/// A compass bearing in degrees [0, 360) with an explicit north reference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bearing {
    degrees: f64,
    reference: BearingReference,
}

impl Bearing {
    /// A magnetic bearing, normalized to [0, 360).
    pub fn magnetic(degrees: f64) -> Self {
        Bearing {
            degrees: normalize_degrees(degrees),
            reference: BearingReference::Magnetic,
        }
    }

    /// A true bearing, normalized to [0, 360).
    pub fn true_north(degrees: f64) -> Self {
        Bearing {
            degrees: normalize_degrees(degrees),
            reference: BearingReference::True,
        }
    }

    pub fn degrees(&self) -> f64 {
        self.degrees
    }

    pub fn reference(&self) -> BearingReference {
        self.reference
    }

    pub fn is_magnetic(&self) -> bool {
        self.reference == BearingReference::Magnetic
    }

    /// Convert to a magnetic bearing using the given easterly variation.
    /// Already-magnetic bearings are returned unchanged.
    pub fn to_magnetic(&self, variation_deg: f64) -> Bearing {
        match self.reference {
            BearingReference::Magnetic => *self,
            BearingReference::True => Bearing::magnetic(self.degrees - variation_deg),
        }
    }

    /// Convert to a true bearing using the given easterly variation.
    /// Already-true bearings are returned unchanged.
    pub fn to_true(&self, variation_deg: f64) -> Bearing {
        match self.reference {
            BearingReference::True => *self,
            BearingReference::Magnetic => Bearing::true_north(self.degrees + variation_deg),
        }
    }
}

impl std::fmt::Display for Bearing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Pilots read bearings as three digits; 0 is spoken as 360.
        let mut rounded = self.degrees.round() as i32 % 360;
        if rounded == 0 {
            rounded = 360;
        }
        write!(f, "{:03}", rounded)
    }
}

/// Normalize an angle in degrees to [0, 360).
pub fn normalize_degrees(degrees: f64) -> f64 {
    let normalized = degrees % 360.0;
    if normalized < 0.0 {
        normalized + 360.0
    } else {
        normalized
    }
}

/// Smallest signed difference between two angles, in (-180, 180].
pub fn angle_between(a_deg: f64, b_deg: f64) -> f64 {
    let mut diff = normalize_degrees(b_deg) - normalize_degrees(a_deg);
    if diff > 180.0 {
        diff -= 360.0;
    } else if diff <= -180.0 {
        diff += 360.0;
    }
    diff
}

/// A 3D point: latitude/longitude in degrees, altitude in feet MSL.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude_ft: f64,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64, altitude_ft: f64) -> Self {
        Position {
            latitude,
            longitude,
            altitude_ft,
        }
    }

    /// Great-circle distance to another point in nautical miles, ignoring
    /// altitude.
    pub fn lateral_distance_nm(&self, other: &Position) -> f64 {
        haversine_nm(self.latitude, self.longitude, other.latitude, other.longitude)
    }

    /// Absolute altitude difference in feet.
    pub fn altitude_delta_ft(&self, other: &Position) -> f64 {
        (self.altitude_ft - other.altitude_ft).abs()
    }

    /// Initial true bearing from this point toward another.
    pub fn bearing_to(&self, other: &Position) -> Bearing {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlon = (other.longitude - self.longitude).to_radians();
        let y = dlon.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
        Bearing::true_north(y.atan2(x).to_degrees())
    }

    /// The point reached by travelling `range_nm` along a true bearing,
    /// keeping the given altitude.
    pub fn offset(&self, bearing: Bearing, variation_deg: f64, range_nm: f64, altitude_ft: f64) -> Position {
        let course = bearing.to_true(variation_deg).degrees().to_radians();
        let d = range_nm / EARTH_RADIUS_NM;
        let lat1 = self.latitude.to_radians();
        let lon1 = self.longitude.to_radians();
        let lat2 = (lat1.sin() * d.cos() + lat1.cos() * d.sin() * course.cos()).asin();
        let lon2 = lon1
            + (course.sin() * d.sin() * lat1.cos()).atan2(d.cos() - lat1.sin() * lat2.sin());
        Position {
            latitude: lat2.to_degrees(),
            longitude: lon2.to_degrees(),
            altitude_ft,
        }
    }
}

/// Great-circle distance in nautical miles.
pub fn haversine_nm(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    EARTH_RADIUS_NM * 2.0 * a.sqrt().atan2((1.0 - a).sqrt())
}

/// A position expressed relative to a bullseye: magnetic bearing plus range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BullseyePoint {
    pub bearing: Bearing,
    pub range_nm: f64,
}

/// Per-coalition reference point for position calls.
///
/// The magnetic variation is the theater's easterly declination, supplied
/// by the trackfile store along with the reference position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bullseye {
    pub position: Position,
    pub magnetic_variation_deg: f64,
}

impl Bullseye {
    pub fn new(position: Position, magnetic_variation_deg: f64) -> Self {
        Bullseye {
            position,
            magnetic_variation_deg,
        }
    }

    /// Render a position as a magnetic bearing and range from the bullseye.
    pub fn locate(&self, target: &Position) -> BullseyePoint {
        let bearing = self
            .position
            .bearing_to(target)
            .to_magnetic(self.magnetic_variation_deg);
        BullseyePoint {
            bearing,
            range_nm: self.position.lateral_distance_nm(target),
        }
    }
}
