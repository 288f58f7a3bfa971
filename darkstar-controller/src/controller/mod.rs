//! The GCI dispatcher: configuration, controller state, and the control
//! loop that serializes request handling and surveillance.

mod handlers;
mod surveillance;
#[cfg(test)]
pub(crate) mod testutil;

use std::sync::Arc;
use std::time::{Duration, Instant};

use darkstar_core::brevity::{CallKind, FadedCall, GciRequest, SunriseCall};
use darkstar_core::group::Group;
use darkstar_core::threat::ThreatRadii;
use darkstar_core::tracking::{CooldownTracker, MergeTracker};
use darkstar_core::{Coalition, ConfigError, TrackId, Trackfile};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_graceful_shutdown::SubsystemHandle;

use crate::radio::{RadioGate, RadioNetwork};
use crate::scope::{RadarScope, ScopeEvent};
use crate::trace::CallContext;

/// Fixed surveillance tick.
pub(crate) const SURVEILLANCE_INTERVAL: Duration = Duration::from_secs(15);

/// Floor for the configurable broadcast intervals.
const MIN_BROADCAST_INTERVAL: Duration = Duration::from_secs(30);

/// Altitude bounds applied to group queries.
pub(crate) const LOWEST_ALTITUDE_FT: f64 = 0.0;
pub(crate) const HIGHEST_ALTITUDE_FT: f64 = 100_000.0;

/// Merge entry: lateral distance and altitude band a pair must be inside.
pub(crate) const MERGE_ENTRY_RANGE_NM: f64 = 3.0;
pub(crate) const MERGE_ENTRY_ALTITUDE_FT: f64 = 5000.0;
/// Merge exit: a recorded pair separates only beyond this lateral
/// distance, so pairs cannot flap across the entry threshold.
pub(crate) const MERGE_EXIT_RANGE_NM: f64 = 5.0;

/// Inbound queue depth. Requests arrive at voice pace, so a small queue is
/// plenty; scope callbacks dropped on a full queue are logged.
const EVENT_QUEUE_DEPTH: usize = 64;

/// Configuration for one controller, fixed at construction.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Coalition this controller serves.
    pub coalition: Coalition,
    /// Broadcast a tactical picture on a schedule.
    pub enable_automatic_picture: bool,
    /// Interval between automatic picture broadcasts.
    pub picture_broadcast_interval: Duration,
    /// Broadcast threat calls from the surveillance loop.
    pub enable_threat_monitoring: bool,
    /// Minimum interval between threat calls about the same group.
    pub threat_monitoring_cooldown: Duration,
    /// Only broadcast threat calls when a threatened aircraft is on a
    /// monitored frequency.
    pub threat_monitoring_requires_srs: bool,
    /// Per-class engagement radii for the threat scan.
    pub threat_radii: ThreatRadii,
}

impl ControllerConfig {
    pub fn new(coalition: Coalition) -> Self {
        ControllerConfig {
            coalition,
            enable_automatic_picture: true,
            picture_broadcast_interval: Duration::from_secs(300),
            enable_threat_monitoring: true,
            threat_monitoring_cooldown: Duration::from_secs(180),
            threat_monitoring_requires_srs: true,
            threat_radii: ThreatRadii::default(),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.coalition == Coalition::Neutral {
            return Err(ConfigError::NeutralCoalition);
        }
        if self.picture_broadcast_interval < MIN_BROADCAST_INTERVAL {
            return Err(ConfigError::IntervalTooShort {
                name: "picture broadcast interval",
                actual: self.picture_broadcast_interval,
                minimum: MIN_BROADCAST_INTERVAL,
            });
        }
        if self.threat_monitoring_cooldown < MIN_BROADCAST_INTERVAL {
            return Err(ConfigError::IntervalTooShort {
                name: "threat monitoring cooldown",
                actual: self.threat_monitoring_cooldown,
                minimum: MIN_BROADCAST_INTERVAL,
            });
        }
        for (class, radius_nm) in [
            ("fighter", self.threat_radii.fighter_nm),
            ("attack", self.threat_radii.attack_nm),
            ("bomber", self.threat_radii.bomber_nm),
            ("rotary", self.threat_radii.rotary_nm),
            ("transport", self.threat_radii.transport_nm),
            ("unknown", self.threat_radii.unknown_nm),
        ] {
            if radius_nm <= 0.0 {
                return Err(ConfigError::InvalidThreatRadius {
                    class: class.to_string(),
                    radius_nm,
                });
            }
        }
        Ok(())
    }
}

/// Errors that terminate the control loop.
#[derive(Error, Debug)]
pub enum ControllerError {
    /// The voice pipeline dropped its end of the call channel.
    #[error("outbound call channel closed")]
    SinkClosed,
}

/// Errors submitting a request to a controller.
#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("controller event queue closed")]
    QueueClosed,
}

/// Outbound envelope published to the voice pipeline.
#[derive(Debug, Clone)]
pub struct Call {
    pub context: CallContext,
    pub kind: CallKind,
}

/// One unit of work for the control loop.
#[derive(Debug)]
enum InboundEvent {
    Request {
        context: CallContext,
        request: GciRequest,
    },
    Scope(ScopeEvent),
}

#[derive(Debug, PartialEq, Eq)]
enum DispatcherState {
    Uninitialized,
    Running,
    Stopped,
}

/// Cloneable entry point for submitting pilot requests to a controller.
#[derive(Clone)]
pub struct ControllerHandle {
    events: mpsc::Sender<InboundEvent>,
}

impl ControllerHandle {
    /// Queue a request for the control loop. Each request carries its own
    /// context; the trace ID correlates the eventual outbound calls.
    pub async fn submit(
        &self,
        context: CallContext,
        request: GciRequest,
    ) -> Result<(), SubmitError> {
        self.events
            .send(InboundEvent::Request { context, request })
            .await
            .map_err(|_| SubmitError::QueueClosed)
    }
}

/// Result of resolving a spoken callsign against the scope.
pub(crate) enum CallsignLookup {
    NotFound,
    NoPosition { callsign: String },
    Found { callsign: String, trackfile: Trackfile },
}

/// GCI controller for one coalition.
///
/// All mutable state lives here and is touched only from the control loop
/// in [`Controller::run`].
pub struct Controller {
    config: ControllerConfig,
    scope: Arc<dyn RadarScope>,
    radio: Arc<dyn RadioNetwork>,
    gate: RadioGate,
    /// Inbound queue; taken by `run`.
    events: Option<mpsc::Receiver<InboundEvent>>,
    /// Sender side, cloned into the scope-callback forwarders.
    events_tx: mpsc::Sender<InboundEvent>,
    /// Outbound sink, bound by `run`.
    calls: Option<mpsc::Sender<Call>>,
    state: DispatcherState,
    picture_deadline: Instant,
    was_last_picture_clean: bool,
    threat_cooldowns: CooldownTracker,
    merges: MergeTracker,
    /// Calls dropped because the outbound channel was full.
    lost_calls: u64,
    /// Proactive calls withheld by the radio gate.
    suppressed_calls: u64,
    sink_closed: bool,
}

impl Controller {
    /// Build a controller and the handle used to feed it requests.
    pub fn new(
        config: ControllerConfig,
        scope: Arc<dyn RadarScope>,
        radio: Arc<dyn RadioNetwork>,
    ) -> Result<(Self, ControllerHandle), ConfigError> {
        config.validate()?;
        let (events_tx, events) = mpsc::channel(EVENT_QUEUE_DEPTH);
        let handle = ControllerHandle {
            events: events_tx.clone(),
        };
        let controller = Controller {
            gate: RadioGate::new(radio.clone()),
            threat_cooldowns: CooldownTracker::new(config.threat_monitoring_cooldown),
            merges: MergeTracker::new(),
            picture_deadline: Instant::now() + config.picture_broadcast_interval,
            was_last_picture_clean: false,
            events: Some(events),
            events_tx,
            calls: None,
            state: DispatcherState::Uninitialized,
            lost_calls: 0,
            suppressed_calls: 0,
            sink_closed: false,
            config,
            scope,
            radio,
        };
        Ok((controller, handle))
    }

    /// Run the control loop until shutdown is requested. Publishes calls
    /// to the given channel. Call exactly once.
    pub async fn run(
        mut self,
        subsys: SubsystemHandle,
        calls: mpsc::Sender<Call>,
    ) -> Result<(), ControllerError> {
        debug_assert_eq!(self.state, DispatcherState::Uninitialized);
        self.bind(calls);
        self.state = DispatcherState::Running;

        log::info!("{} controller: attaching scope callbacks", self.config.coalition);
        self.attach_callbacks();
        self.broadcast_sunrise();
        self.picture_deadline = Instant::now() + self.config.picture_broadcast_interval;

        let mut events = self.events.take().expect("event queue taken once by run");
        let start = tokio::time::Instant::now() + SURVEILLANCE_INTERVAL;
        let mut ticker = tokio::time::interval_at(start, SURVEILLANCE_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut inbound_open = true;
        loop {
            tokio::select! {
                _ = subsys.on_shutdown_requested() => {
                    log::info!(
                        "{} controller: detaching scope callbacks",
                        self.config.coalition
                    );
                    self.detach_callbacks();
                    break;
                }
                _ = ticker.tick() => {
                    self.on_tick(Instant::now());
                }
                event = events.recv(), if inbound_open => {
                    match event {
                        Some(event) => self.dispatch(event),
                        None => inbound_open = false,
                    }
                }
            }
            if self.sink_closed {
                log::error!(
                    "{} controller: outbound call channel closed, stopping",
                    self.config.coalition
                );
                self.detach_callbacks();
                self.state = DispatcherState::Stopped;
                return Err(ControllerError::SinkClosed);
            }
        }

        if self.lost_calls > 0 {
            log::warn!(
                "{} controller: {} calls were dropped on backpressure",
                self.config.coalition,
                self.lost_calls
            );
        }
        self.state = DispatcherState::Stopped;
        Ok(())
    }

    fn bind(&mut self, calls: mpsc::Sender<Call>) {
        self.calls = Some(calls);
    }

    /// Route one event to its handler. Requests whose context was already
    /// cancelled are dropped without touching the scope.
    fn dispatch(&mut self, event: InboundEvent) {
        match event {
            InboundEvent::Request { context, request } => {
                if context.is_cancelled() {
                    log::debug!("[{}] request cancelled before handling", context.trace_id);
                    return;
                }
                self.handle_request(&context, &request);
            }
            InboundEvent::Scope(ScopeEvent::Faded(group)) => self.handle_faded(group),
            InboundEvent::Scope(ScopeEvent::Removed(id)) => self.handle_removed(id),
            InboundEvent::Scope(ScopeEvent::Started) => self.handle_started(),
        }
    }

    fn handle_request(&mut self, context: &CallContext, request: &GciRequest) {
        match request {
            GciRequest::RadioCheck(request) => self.handle_radio_check(context, request),
            GciRequest::AlphaCheck(request) => self.handle_alpha_check(context, request),
            GciRequest::BogeyDope(request) => self.handle_bogey_dope(context, request),
            GciRequest::Declare(request) => self.handle_declare(context, request),
            GciRequest::Snaplock(request) => self.handle_snaplock(context, request),
            GciRequest::Spiked(request) => self.handle_spiked(context, request),
            GciRequest::Picture(request) => self.handle_picture(context, request),
            GciRequest::CheckIn(request) => self.handle_check_in(context, request),
            GciRequest::Shopping(request) => self.handle_shopping(context, request),
            GciRequest::Tripwire(request) => self.handle_tripwire(context, request),
            GciRequest::UnableToUnderstand(request) => {
                self.handle_unable_to_understand(context, request);
            }
        }
    }

    /// Install forwarders that move scope callbacks onto the control loop.
    /// The callbacks run on the scope's thread and must not touch
    /// controller state directly.
    fn attach_callbacks(&self) {
        let tx = self.events_tx.clone();
        self.scope.set_faded_callback(Some(Box::new(move |group| {
            if tx
                .try_send(InboundEvent::Scope(ScopeEvent::Faded(group)))
                .is_err()
            {
                log::warn!("faded event dropped: controller queue unavailable");
            }
        })));
        let tx = self.events_tx.clone();
        self.scope.set_removed_callback(Some(Box::new(move |id| {
            if tx
                .try_send(InboundEvent::Scope(ScopeEvent::Removed(id)))
                .is_err()
            {
                log::warn!("removed event for track {id} dropped: controller queue unavailable");
            }
        })));
        let tx = self.events_tx.clone();
        self.scope.set_started_callback(Some(Box::new(move || {
            if tx.try_send(InboundEvent::Scope(ScopeEvent::Started)).is_err() {
                log::warn!("scope start event dropped: controller queue unavailable");
            }
        })));
    }

    fn detach_callbacks(&self) {
        self.scope.set_faded_callback(None);
        self.scope.set_removed_callback(None);
        self.scope.set_started_callback(None);
    }

    /// Announce GCI services on every monitored frequency.
    fn broadcast_sunrise(&mut self) {
        let frequencies = self.radio.frequencies();
        let context = CallContext::new();
        log::info!(
            "[{}] {} controller: sunrise on {} frequencies",
            context.trace_id,
            self.config.coalition,
            frequencies.len()
        );
        self.transmit(&context, CallKind::Sunrise(SunriseCall { frequencies }));
    }

    /// Publish a call to the voice pipeline. Cancelled contexts abandon
    /// the emission; a full channel drops the call, since a stale audio
    /// call is worse than a missing one.
    pub(crate) fn transmit(&mut self, context: &CallContext, kind: CallKind) {
        if context.is_cancelled() {
            log::debug!("[{}] context cancelled, abandoning {}", context.trace_id, kind.name());
            return;
        }
        let Some(calls) = self.calls.as_ref() else {
            self.sink_closed = true;
            return;
        };
        match calls.try_send(Call {
            context: context.clone(),
            kind,
        }) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(call)) => {
                self.lost_calls += 1;
                log::warn!(
                    "[{}] outbound channel full, dropping {} ({} lost so far)",
                    call.context.trace_id,
                    call.kind.name(),
                    self.lost_calls
                );
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.sink_closed = true;
            }
        }
    }

    /// Resolve a spoken callsign to a trackfile with a usable position.
    pub(crate) fn find_callsign(&self, callsign: &str) -> CallsignLookup {
        match self.scope.find_callsign(callsign, self.config.coalition) {
            None => {
                log::info!("no trackfile found for callsign {callsign:?}");
                CallsignLookup::NotFound
            }
            Some((found, trackfile)) if trackfile.is_position_unknown() => {
                log::info!("callsign {callsign:?} matched {found:?} but has no known position");
                CallsignLookup::NoPosition { callsign: found }
            }
            Some((found, trackfile)) => {
                log::debug!("callsign {callsign:?} matched {found:?}");
                CallsignLookup::Found {
                    callsign: found,
                    trackfile,
                }
            }
        }
    }

    fn handle_faded(&mut self, group: Group) {
        for id in &group.ids {
            self.merges.remove(*id);
        }
        let context = CallContext::new();
        log::debug!(
            "[{}] group {} faded with {} contacts",
            context.trace_id,
            group.primary_id(),
            group.contacts
        );
        self.transmit(&context, CallKind::Faded(FadedCall { group }));
    }

    fn handle_removed(&mut self, id: TrackId) {
        self.remove(id);
    }

    fn handle_started(&mut self) {
        log::info!("{} controller: scope restarted, resetting state", self.config.coalition);
        self.reset();
        self.picture_deadline = Instant::now() + self.config.picture_broadcast_interval;
        self.was_last_picture_clean = false;
    }

    /// Forget an ID in every tracker.
    fn remove(&mut self, id: TrackId) {
        log::debug!("removing track {id} from controller state");
        self.threat_cooldowns.remove(id);
        self.merges.remove(id);
    }

    fn reset(&mut self) {
        self.threat_cooldowns.reset();
        self.merges.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::testutil::{contact, FakeRadio, FakeScope};
    use super::*;
    use darkstar_core::brevity::RadioCheckRequest;
    use darkstar_core::geo::Position;

    #[test]
    fn test_config_validation() {
        let mut config = ControllerConfig::new(Coalition::Neutral);
        assert_eq!(
            Controller::new(
                config.clone(),
                FakeScope::new(),
                Arc::new(FakeRadio::new(&[]))
            )
            .err(),
            Some(ConfigError::NeutralCoalition)
        );

        config.coalition = Coalition::Blue;
        config.picture_broadcast_interval = Duration::from_secs(10);
        let err = Controller::new(config, FakeScope::new(), Arc::new(FakeRadio::new(&[])))
            .err()
            .unwrap();
        assert!(matches!(err, ConfigError::IntervalTooShort { .. }));
    }

    #[test]
    fn test_transmit_applies_backpressure_by_dropping() {
        let scope = FakeScope::new();
        let (mut controller, _handle) = Controller::new(
            ControllerConfig::new(Coalition::Blue),
            scope,
            Arc::new(FakeRadio::new(&[])),
        )
        .unwrap();
        let (tx, mut rx) = mpsc::channel(1);
        controller.bind(tx);

        let context = CallContext::new();
        controller.handle_radio_check(
            &context,
            &RadioCheckRequest {
                callsign: "Eagle 1".to_string(),
            },
        );
        controller.handle_radio_check(
            &context,
            &RadioCheckRequest {
                callsign: "Eagle 2".to_string(),
            },
        );

        assert_eq!(controller.lost_calls, 1);
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_cancelled_context_abandons_emission() {
        let scope = FakeScope::new();
        let (mut controller, _handle) = Controller::new(
            ControllerConfig::new(Coalition::Blue),
            scope,
            Arc::new(FakeRadio::new(&[])),
        )
        .unwrap();
        let (tx, mut rx) = mpsc::channel(8);
        controller.bind(tx);

        let context = CallContext::new();
        context.cancellation.cancel();
        controller.handle_radio_check(
            &context,
            &RadioCheckRequest {
                callsign: "Eagle 1".to_string(),
            },
        );

        assert!(rx.try_recv().is_err());
        assert_eq!(controller.lost_calls, 0);
    }

    #[test]
    fn test_removed_event_clears_trackers() {
        let scope = FakeScope::new();
        scope.add_contact(contact(1, "Eagle 1", Coalition::Blue, Position::new(41.0, 41.0, 20_000.0)));
        let (mut controller, _handle) = Controller::new(
            ControllerConfig::new(Coalition::Blue),
            scope,
            Arc::new(FakeRadio::new(&[])),
        )
        .unwrap();
        let (tx, _rx) = mpsc::channel(8);
        controller.bind(tx);

        controller.merges.merged(1, 100);
        controller.threat_cooldowns.extend(100, Instant::now());
        controller.dispatch(InboundEvent::Scope(ScopeEvent::Removed(100)));

        assert!(!controller.merges.is_merged(1));
        assert!(controller.threat_cooldowns.ready(100, Instant::now()));
    }

    #[test]
    fn test_started_event_resets_state() {
        let scope = FakeScope::new();
        let (mut controller, _handle) = Controller::new(
            ControllerConfig::new(Coalition::Blue),
            scope,
            Arc::new(FakeRadio::new(&[])),
        )
        .unwrap();
        let (tx, _rx) = mpsc::channel(8);
        controller.bind(tx);

        controller.merges.merged(1, 100);
        controller.was_last_picture_clean = true;
        controller.dispatch(InboundEvent::Scope(ScopeEvent::Started));

        assert!(!controller.merges.is_merged(1));
        assert!(!controller.was_last_picture_clean);
    }
}
