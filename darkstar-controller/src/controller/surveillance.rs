//! The periodic surveillance pass: merges, threats, and the automatic
//! tactical picture, in that order.

use std::time::Instant;

use darkstar_core::brevity::{CallKind, MergedCall, PictureCall, ThreatCall};
use darkstar_core::group::Group;
use darkstar_core::threat;

use super::{Controller, MERGE_ENTRY_ALTITUDE_FT, MERGE_ENTRY_RANGE_NM, MERGE_EXIT_RANGE_NM};
use crate::trace::CallContext;

/// Groups included in a picture; pilots cannot absorb more in one call.
const MAX_PICTURE_GROUPS: usize = 3;

impl Controller {
    /// One surveillance tick. `now` is injected so tests can drive
    /// simulated time through the cooldown and schedule logic.
    pub(crate) fn on_tick(&mut self, now: Instant) {
        self.broadcast_merges();
        if self.config.enable_threat_monitoring {
            self.broadcast_threats(now);
        }
        if self.config.enable_automatic_picture && now >= self.picture_deadline {
            self.broadcast_picture(&CallContext::new(), now, false);
        }
    }

    /// Recompute merge records from pairwise distances. Entry requires
    /// both lateral and vertical proximity; exit requires lateral
    /// separation past a wider threshold, so records cannot flap.
    pub(crate) fn broadcast_merges(&mut self) {
        let friendlies = self.scope.live_contacts(self.config.coalition);
        let hostiles = self.scope.live_contacts(self.config.coalition.opposing());

        // Separation pass over the existing records first.
        for (friendly_id, hostile_id) in self.merges.pairs() {
            let friendly = friendlies.iter().find(|t| t.id == friendly_id);
            let hostile = hostiles.iter().find(|t| t.id == hostile_id);
            match (friendly, hostile) {
                (Some(friendly), Some(hostile)) => {
                    let lateral = friendly.position.lateral_distance_nm(&hostile.position);
                    if lateral > MERGE_EXIT_RANGE_NM {
                        log::debug!(
                            "tracks {friendly_id} and {hostile_id} separated at {lateral:.1} NM"
                        );
                        self.merges.separated(friendly_id, hostile_id);
                    }
                }
                // One side is gone from the scope; the record goes with it.
                _ => self.merges.separated(friendly_id, hostile_id),
            }
        }

        // Entry pass. The call is per friendly, on the transition from
        // unmerged to merged; a friendly already in a merge picks up new
        // hostiles silently.
        let mut newly_merged: Vec<String> = Vec::new();
        for friendly in &friendlies {
            if friendly.is_position_unknown() {
                continue;
            }
            let was_merged = self.merges.is_merged(friendly.id);
            for hostile in &hostiles {
                if hostile.is_position_unknown() {
                    continue;
                }
                let lateral = friendly.position.lateral_distance_nm(&hostile.position);
                let vertical = friendly.position.altitude_delta_ft(&hostile.position);
                if lateral <= MERGE_ENTRY_RANGE_NM
                    && vertical <= MERGE_ENTRY_ALTITUDE_FT
                    && !self.merges.contains(friendly.id, hostile.id)
                {
                    log::info!(
                        "tracks {} and {} merged at {lateral:.1} NM",
                        friendly.id,
                        hostile.id
                    );
                    self.merges.merged(friendly.id, hostile.id);
                }
            }
            if !was_merged && self.merges.is_merged(friendly.id) {
                newly_merged.push(friendly.callsign.clone());
            }
        }

        for callsign in newly_merged {
            let context = CallContext::new();
            self.transmit(&context, CallKind::Merged(MergedCall { callsign }));
        }
    }

    /// Warn friendlies about groups inside their class threat radius,
    /// subject to the per-group cooldown and the radio gate.
    pub(crate) fn broadcast_threats(&mut self, now: Instant) {
        let threats = self
            .scope
            .enumerate_threats(self.config.coalition, &self.config.threat_radii);
        for (group, callsigns) in threats {
            let id = group.primary_id();
            if !self.threat_cooldowns.ready(id, now) {
                continue;
            }
            if !self
                .gate
                .should_broadcast(self.config.threat_monitoring_requires_srs, &callsigns)
            {
                self.suppressed_calls += 1;
                log::debug!(
                    "threat call for group {id} withheld: no recipient on frequency ({} withheld so far)",
                    self.suppressed_calls
                );
                continue;
            }
            let context = CallContext::new();
            self.transmit(&context, CallKind::Threat(ThreatCall { group, callsigns }));
            self.threat_cooldowns.extend(id, now);
        }
    }

    /// The current tactical picture: opposing groups in threat-priority
    /// order, capped for readability.
    pub(crate) fn compute_picture(&self) -> Vec<Group> {
        let friendlies = self.scope.live_contacts(self.config.coalition);
        let mut groups = self.scope.enumerate_groups(self.config.coalition.opposing());
        threat::sort_by_priority(&mut groups, &friendlies);
        groups.truncate(MAX_PICTURE_GROUPS);
        groups
    }

    /// Broadcast a picture. Scheduled pictures skip the emission when both
    /// this picture and the previous one were clean, and advance the
    /// schedule; a forced (on-request) picture always goes out and leaves
    /// the periodic schedule alone.
    pub(crate) fn broadcast_picture(&mut self, context: &CallContext, now: Instant, forced: bool) {
        let groups = self.compute_picture();
        let clean = groups.is_empty();
        if !forced && clean && self.was_last_picture_clean {
            log::debug!("[{}] picture still clean, skipping broadcast", context.trace_id);
        } else {
            self.transmit(context, CallKind::Picture(PictureCall { groups }));
            self.was_last_picture_clean = clean;
        }
        if !forced {
            self.advance_picture_deadline(now);
        }
    }

    /// Advance the schedule by whole intervals until it is strictly in the
    /// future. Adding intervals, rather than rebasing on `now`, keeps the
    /// schedule drift-free.
    fn advance_picture_deadline(&mut self, now: Instant) {
        self.picture_deadline += self.config.picture_broadcast_interval;
        while self.picture_deadline <= now {
            self.picture_deadline += self.config.picture_broadcast_interval;
        }
    }
}
