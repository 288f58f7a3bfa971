//! Brevity request and call payloads.
//!
//! These carry the tactical facts exchanged with the radio layer. Wording
//! belongs to the external composer; nothing here commits to a specific
//! phrase, only to what must be said.

use serde::{Deserialize, Serialize};

use crate::geo::{Bearing, BullseyePoint};
use crate::group::{Declaration, Group};
use crate::trackfile::ContactClass;

/// A radio carrier frequency in hertz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Frequency(u64);

impl Frequency {
    pub fn from_hertz(hertz: u64) -> Self {
        Frequency(hertz)
    }

    pub fn from_mega_hertz(mega_hertz: f64) -> Self {
        Frequency((mega_hertz * 1_000_000.0).round() as u64)
    }

    pub fn hertz(&self) -> u64 {
        self.0
    }

    pub fn mega_hertz(&self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}", self.mega_hertz())
    }
}

// =========================================================================
// Inbound requests
// =========================================================================

/// RADIO CHECK: a liveness check from a pilot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadioCheckRequest {
    pub callsign: String,
}

/// ALPHA CHECK: the pilot asks for their own position from the bullseye.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlphaCheckRequest {
    pub callsign: String,
}

/// BOGEY DOPE: the pilot asks for the nearest opposing group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BogeyDopeRequest {
    pub callsign: String,
    /// Restrict the search to a platform class when the pilot asked for
    /// one ("bogey dope for fighters").
    pub filter_class: Option<ContactClass>,
}

/// DECLARE: the pilot asks for the identity of a contact at a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclareRequest {
    pub callsign: String,
    /// Bearing from the requester to the contact. Magnetic by contract;
    /// handlers log and forward unchanged when it is not.
    pub bearing: Bearing,
    pub range_nm: f64,
    pub altitude_ft: Option<f64>,
}

/// SNAPLOCK: a short-range radar lock the pilot wants classified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnaplockRequest {
    pub callsign: String,
    pub bearing: Bearing,
    pub range_nm: f64,
    pub altitude_ft: Option<f64>,
}

/// SPIKED: the pilot reports a radar warning spike on a bearing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpikedRequest {
    pub callsign: String,
    pub bearing: Bearing,
}

/// PICTURE: the pilot asks for a summary of the tactical situation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PictureRequest {
    pub callsign: String,
}

/// CHECK IN: an ambiguous check-in that needs clarification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInRequest {
    pub callsign: String,
}

/// SHOPPING: an air-to-ground tasking request this controller does not
/// provide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingRequest {
    pub callsign: String,
}

/// TRIPWIRE: a range-monitoring request this controller does not provide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripwireRequest {
    pub callsign: String,
}

/// The wake word was recognized but the request was not understood.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnableToUnderstandRequest {
    pub callsign: Option<String>,
}

/// One inbound request, one variant per brevity verb. Unknown verbs arrive
/// as [`GciRequest::UnableToUnderstand`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "verb", rename_all = "camelCase")]
pub enum GciRequest {
    RadioCheck(RadioCheckRequest),
    AlphaCheck(AlphaCheckRequest),
    BogeyDope(BogeyDopeRequest),
    Declare(DeclareRequest),
    Snaplock(SnaplockRequest),
    Spiked(SpikedRequest),
    Picture(PictureRequest),
    CheckIn(CheckInRequest),
    Shopping(ShoppingRequest),
    Tripwire(TripwireRequest),
    UnableToUnderstand(UnableToUnderstandRequest),
}

// =========================================================================
// Outbound calls
// =========================================================================

/// Why the controller is asking the pilot to re-transmit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SayAgainReason {
    /// The request was heard but was ambiguous.
    Ambiguous,
    /// The verb is recognized but not a service this controller provides.
    Unsupported,
    /// The transmission could not be understood at all.
    Unrecognized,
}

/// GCI services are online on the given frequencies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SunriseCall {
    pub frequencies: Vec<Frequency>,
}

/// Answer to an ALPHA CHECK: the requester's own bullseye position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlphaCheckCall {
    pub callsign: String,
    pub location: BullseyePoint,
}

/// Answer to a BOGEY DOPE. A missing group means the picture is clean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BogeyDopeCall {
    pub callsign: String,
    pub group: Option<Group>,
}

/// Answer to a DECLARE.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclareCall {
    pub callsign: String,
    pub declaration: Declaration,
    pub group: Option<Group>,
}

/// Answer to a SNAPLOCK.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnaplockCall {
    pub callsign: String,
    pub declaration: Declaration,
    pub group: Option<Group>,
}

/// Answer to a SPIKED. A missing group means the spike bearing is clean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpikedCall {
    pub callsign: String,
    pub bearing: Bearing,
    pub group: Option<Group>,
}

/// A tactical picture: threat-priority-ordered groups, possibly empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PictureCall {
    pub groups: Vec<Group>,
}

/// Proactive warning that a group threatens the named friendlies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreatCall {
    pub group: Group,
    pub callsigns: Vec<String>,
}

/// A friendly has merged with opposing contacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedCall {
    pub callsign: String,
}

/// A tracked group's radar updates have stopped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FadedCall {
    pub group: Group,
}

/// Positive acknowledgement of a RADIO CHECK.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadioCheckCall {
    pub callsign: String,
}

/// The requester's callsign is not on scope, or has no known position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NegativeRadarContactCall {
    pub callsign: String,
}

/// Ask the pilot to clarify or re-transmit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SayAgainCall {
    pub callsign: Option<String>,
    pub reason: SayAgainReason,
}

/// One outbound call value. The dispatcher wraps these in an envelope
/// carrying the trace context before publishing them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "call", rename_all = "camelCase")]
pub enum CallKind {
    Sunrise(SunriseCall),
    AlphaCheck(AlphaCheckCall),
    BogeyDope(BogeyDopeCall),
    Declare(DeclareCall),
    Snaplock(SnaplockCall),
    Spiked(SpikedCall),
    Picture(PictureCall),
    Threat(ThreatCall),
    Merged(MergedCall),
    Faded(FadedCall),
    RadioCheck(RadioCheckCall),
    NegativeRadarContact(NegativeRadarContactCall),
    SayAgain(SayAgainCall),
}

impl CallKind {
    /// Short name for logs and counters.
    pub fn name(&self) -> &'static str {
        match self {
            CallKind::Sunrise(_) => "sunrise",
            CallKind::AlphaCheck(_) => "alpha check",
            CallKind::BogeyDope(_) => "bogey dope",
            CallKind::Declare(_) => "declare",
            CallKind::Snaplock(_) => "snaplock",
            CallKind::Spiked(_) => "spiked",
            CallKind::Picture(_) => "picture",
            CallKind::Threat(_) => "threat",
            CallKind::Merged(_) => "merged",
            CallKind::Faded(_) => "faded",
            CallKind::RadioCheck(_) => "radio check",
            CallKind::NegativeRadarContact(_) => "negative radar contact",
            CallKind::SayAgain(_) => "say again",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_conversions() {
        let freq = Frequency::from_mega_hertz(251.0);
        assert_eq!(freq.hertz(), 251_000_000);
        assert_eq!(freq.to_string(), "251.000");
    }

    #[test]
    fn test_request_serde_tagging() {
        let request = GciRequest::RadioCheck(RadioCheckRequest {
            callsign: "Eagle 1-1".to_string(),
        });
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"verb\":\"radioCheck\""), "got {json}");
        let back: GciRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, request);
    }
}
