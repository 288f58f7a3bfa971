//! One handler per brevity verb.
//!
//! Handlers never surface errors: every request produces either a tactical
//! response or a clarification response. Each handler reads the scope
//! through snapshot queries and emits calls through the dispatcher's
//! outbound sink.

use std::time::Instant;

use darkstar_core::brevity::{
    AlphaCheckCall, AlphaCheckRequest, BogeyDopeCall, BogeyDopeRequest, CallKind, CheckInRequest,
    DeclareCall, DeclareRequest, NegativeRadarContactCall, PictureRequest, RadioCheckCall,
    RadioCheckRequest, SayAgainCall, SayAgainReason, ShoppingRequest, SnaplockCall,
    SnaplockRequest, SpikedCall, SpikedRequest, TripwireRequest, UnableToUnderstandRequest,
};
use darkstar_core::geo::{Bearing, Position};
use darkstar_core::group::{Declaration, Group};
use darkstar_core::threat;
use darkstar_core::trackfile::ContactClass;
use darkstar_core::Coalition;

use super::{
    CallsignLookup, Controller, HIGHEST_ALTITUDE_FT, LOWEST_ALTITUDE_FT, MERGE_ENTRY_RANGE_NM,
};
use crate::scope::GroupFilter;
use crate::trace::CallContext;

/// Capture radius when resolving a DECLARE point to a group.
const DECLARE_CAPTURE_RADIUS_NM: f64 = 5.0;
/// Capture radius for a SNAPLOCK, which reports a tight radar lock.
const SNAPLOCK_CAPTURE_RADIUS_NM: f64 = 3.0;
/// SPIKED searches a cone along the reported spike bearing.
const SPIKE_CONE_HALF_ANGLE_DEG: f64 = 15.0;
const SPIKE_CONE_RANGE_NM: f64 = 40.0;

impl Controller {
    /// RADIO CHECK: always answer, regardless of scope state.
    pub(crate) fn handle_radio_check(&mut self, context: &CallContext, request: &RadioCheckRequest) {
        self.transmit(
            context,
            CallKind::RadioCheck(RadioCheckCall {
                callsign: request.callsign.clone(),
            }),
        );
    }

    /// ALPHA CHECK: report the requester's own position from the bullseye.
    pub(crate) fn handle_alpha_check(&mut self, context: &CallContext, request: &AlphaCheckRequest) {
        match self.find_callsign(&request.callsign) {
            CallsignLookup::Found { callsign, trackfile } => {
                let bullseye = self.scope.bullseye(self.config.coalition);
                let location = bullseye.locate(&trackfile.position);
                self.transmit(
                    context,
                    CallKind::AlphaCheck(AlphaCheckCall { callsign, location }),
                );
            }
            CallsignLookup::NoPosition { callsign } => self.negative_contact(context, callsign),
            CallsignLookup::NotFound => {
                self.negative_contact(context, request.callsign.clone());
            }
        }
    }

    /// BOGEY DOPE: nearest opposing group to the requester, skipping
    /// hostiles the requester is already merged with.
    pub(crate) fn handle_bogey_dope(&mut self, context: &CallContext, request: &BogeyDopeRequest) {
        let (callsign, trackfile) = match self.find_callsign(&request.callsign) {
            CallsignLookup::Found { callsign, trackfile } => (callsign, trackfile),
            CallsignLookup::NoPosition { callsign } => {
                return self.negative_contact(context, callsign);
            }
            CallsignLookup::NotFound => {
                return self.negative_contact(context, request.callsign.clone());
            }
        };

        let mut filter = GroupFilter::with_altitude_bounds(LOWEST_ALTITUDE_FT, HIGHEST_ALTITUDE_FT);
        filter.class = request.filter_class;
        filter.exclude = self.merges.partners(trackfile.id).into_iter().collect();

        let mut group = self.scope.find_nearest_group(
            &trackfile.position,
            self.config.coalition.opposing(),
            &filter,
        );
        if let Some(group) = group.as_mut() {
            group.aspect = Some(threat::aspect(
                &group.position,
                group.track_deg,
                &trackfile.position,
            ));
        }
        self.transmit(context, CallKind::BogeyDope(BogeyDopeCall { callsign, group }));
    }

    /// DECLARE: classify the group at the requester's declared point.
    pub(crate) fn handle_declare(&mut self, context: &CallContext, request: &DeclareRequest) {
        self.check_magnetic(context, "DECLARE", request.bearing);
        let (callsign, trackfile) = match self.find_callsign(&request.callsign) {
            CallsignLookup::Found { callsign, trackfile } => (callsign, trackfile),
            CallsignLookup::NoPosition { callsign } => {
                return self.negative_contact(context, callsign);
            }
            CallsignLookup::NotFound => {
                return self.negative_contact(context, request.callsign.clone());
            }
        };

        let point = self.target_point(
            &trackfile.position,
            request.bearing,
            request.range_nm,
            request.altitude_ft,
        );
        let (declaration, mut group) = self.declare_point(&point, DECLARE_CAPTURE_RADIUS_NM);
        if let Some(group) = group.as_mut() {
            group.declaration = Some(declaration);
        }
        self.transmit(
            context,
            CallKind::Declare(DeclareCall {
                callsign,
                declaration,
                group,
            }),
        );
    }

    /// SNAPLOCK: classify a short-range radar lock. A target merged with
    /// any friendly is answered as merged.
    pub(crate) fn handle_snaplock(&mut self, context: &CallContext, request: &SnaplockRequest) {
        self.check_magnetic(context, "SNAPLOCK", request.bearing);
        let (callsign, trackfile) = match self.find_callsign(&request.callsign) {
            CallsignLookup::Found { callsign, trackfile } => (callsign, trackfile),
            CallsignLookup::NoPosition { callsign } => {
                return self.negative_contact(context, callsign);
            }
            CallsignLookup::NotFound => {
                return self.negative_contact(context, request.callsign.clone());
            }
        };

        let point = self.target_point(
            &trackfile.position,
            request.bearing,
            request.range_nm,
            request.altitude_ft,
        );
        let (mut declaration, mut group) =
            self.declare_point(&point, SNAPLOCK_CAPTURE_RADIUS_NM);
        if let Some(group) = group.as_mut() {
            if group.ids.iter().any(|id| self.merges.is_merged(*id)) {
                declaration = Declaration::Merged;
            }
            group.declaration = Some(declaration);
        }
        self.transmit(
            context,
            CallKind::Snaplock(SnaplockCall {
                callsign,
                declaration,
                group,
            }),
        );
    }

    /// SPIKED: nearest opposing group in the cone along the spike bearing.
    pub(crate) fn handle_spiked(&mut self, context: &CallContext, request: &SpikedRequest) {
        self.check_magnetic(context, "SPIKED", request.bearing);
        let (callsign, trackfile) = match self.find_callsign(&request.callsign) {
            CallsignLookup::Found { callsign, trackfile } => (callsign, trackfile),
            CallsignLookup::NoPosition { callsign } => {
                return self.negative_contact(context, callsign);
            }
            CallsignLookup::NotFound => {
                return self.negative_contact(context, request.callsign.clone());
            }
        };

        let groups = self.scope.find_groups_in_cone(
            &trackfile.position,
            request.bearing,
            SPIKE_CONE_HALF_ANGLE_DEG,
            SPIKE_CONE_RANGE_NM,
            self.config.coalition.opposing(),
        );
        let mut group = groups.into_iter().next();
        if let Some(group) = group.as_mut() {
            group.aspect = Some(threat::aspect(
                &group.position,
                group.track_deg,
                &trackfile.position,
            ));
        }
        self.transmit(
            context,
            CallKind::Spiked(SpikedCall {
                callsign,
                bearing: request.bearing,
                group,
            }),
        );
    }

    /// PICTURE on request: always broadcast, even when clean, and reset
    /// the clean-picture suppression.
    pub(crate) fn handle_picture(&mut self, context: &CallContext, _request: &PictureRequest) {
        self.broadcast_picture(context, Instant::now(), true);
    }

    /// CHECK IN: the call was ambiguous; ask for a proper request.
    pub(crate) fn handle_check_in(&mut self, context: &CallContext, request: &CheckInRequest) {
        self.say_again(context, Some(request.callsign.clone()), SayAgainReason::Ambiguous);
    }

    /// SHOPPING is an air-to-ground tasking request, not an air-to-air
    /// call; acknowledge it as unsupported.
    pub(crate) fn handle_shopping(&mut self, context: &CallContext, request: &ShoppingRequest) {
        self.say_again(context, Some(request.callsign.clone()), SayAgainReason::Unsupported);
    }

    /// TRIPWIRE monitoring is not provided; acknowledge it as unsupported.
    pub(crate) fn handle_tripwire(&mut self, context: &CallContext, request: &TripwireRequest) {
        self.say_again(context, Some(request.callsign.clone()), SayAgainReason::Unsupported);
    }

    /// The wake word was heard but the request made no sense.
    pub(crate) fn handle_unable_to_understand(
        &mut self,
        context: &CallContext,
        request: &UnableToUnderstandRequest,
    ) {
        self.say_again(context, request.callsign.clone(), SayAgainReason::Unrecognized);
    }

    fn negative_contact(&mut self, context: &CallContext, callsign: String) {
        self.transmit(
            context,
            CallKind::NegativeRadarContact(NegativeRadarContactCall { callsign }),
        );
    }

    fn say_again(
        &mut self,
        context: &CallContext,
        callsign: Option<String>,
        reason: SayAgainReason,
    ) {
        self.transmit(context, CallKind::SayAgain(SayAgainCall { callsign, reason }));
    }

    /// Bearings from the parser must be magnetic. A true bearing is a
    /// contract violation upstream: log it and carry on with the value
    /// unchanged rather than silently converting.
    fn check_magnetic(&self, context: &CallContext, verb: &str, bearing: Bearing) {
        if !bearing.is_magnetic() {
            log::error!(
                "[{}] {verb} bearing {bearing} should be magnetic",
                context.trace_id
            );
        }
    }

    /// The point a request's bearing/range/altitude describes, measured
    /// from the requester's position.
    fn target_point(
        &self,
        from: &Position,
        bearing: Bearing,
        range_nm: f64,
        altitude_ft: Option<f64>,
    ) -> Position {
        let variation = self.scope.bullseye(self.config.coalition).magnetic_variation_deg;
        from.offset(
            bearing,
            variation,
            range_nm,
            altitude_ft.unwrap_or(from.altitude_ft),
        )
    }

    /// Classify whatever sits at a point, searching both fighting
    /// coalitions and the neutrals.
    fn declare_point(&self, point: &Position, radius_nm: f64) -> (Declaration, Option<Group>) {
        let own = self.config.coalition;
        let friendly = self.scope.find_group_at(point, own, radius_nm);
        let hostile = self.scope.find_group_at(point, own.opposing(), radius_nm);

        match (friendly, hostile) {
            (Some(friendly), Some(hostile)) => {
                if friendly.position.lateral_distance_nm(&hostile.position)
                    <= MERGE_ENTRY_RANGE_NM
                {
                    (Declaration::Furball, Some(hostile))
                } else if point.lateral_distance_nm(&friendly.position)
                    <= point.lateral_distance_nm(&hostile.position)
                {
                    (Declaration::Friendly, Some(friendly))
                } else {
                    (Declaration::Hostile, Some(hostile))
                }
            }
            (Some(friendly), None) => (Declaration::Friendly, Some(friendly)),
            (None, Some(hostile)) => (Declaration::Hostile, Some(hostile)),
            (None, None) => match self.scope.find_group_at(point, Coalition::Neutral, radius_nm) {
                Some(group) if group.class == ContactClass::Unknown => {
                    (Declaration::Bogey, Some(group))
                }
                Some(group) => (Declaration::Neutral, Some(group)),
                None => (Declaration::Clean, None),
            },
        }
    }
}
