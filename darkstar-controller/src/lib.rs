//! # Darkstar Controller
//!
//! The GCI controller subsystem: a concurrent dispatcher and decision
//! engine that answers pilot brevity requests and autonomously broadcasts
//! situational calls for one coalition.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Controller (per coalition)              │
//! │                                                             │
//! │  requests ──► ControllerHandle ──► event queue ──┐          │
//! │  scope callbacks ──► ScopeEvent ──► event queue ─┤          │
//! │  15 s surveillance tick ─────────────────────────┤          │
//! │                                                  ▼          │
//! │                                         control task        │
//! │                                 (handlers + surveillance,   │
//! │                                  trackers, no locks)        │
//! │                                                  │          │
//! │                                                  ▼          │
//! │                               bounded outbound Call channel │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! All mutable state (cooldown tracker, merge tracker, picture schedule)
//! lives on the single control task, which multiplexes shutdown, the
//! surveillance tick, and the inbound event queue with `tokio::select!`.
//! Scope callbacks fire on the scope's own thread and are forwarded into
//! the queue before touching anything.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use darkstar_controller::controller::{Controller, ControllerConfig};
//! use darkstar_core::Coalition;
//! use tokio::sync::mpsc;
//! use tokio_graceful_shutdown::{SubsystemBuilder, Toplevel};
//!
//! # fn scope_and_radio() -> (Arc<dyn darkstar_controller::scope::RadarScope>, Arc<dyn darkstar_controller::radio::RadioNetwork>) { unimplemented!() }
//! #[tokio::main]
//! async fn main() {
//!     let (scope, radio) = scope_and_radio();
//!     let config = ControllerConfig::new(Coalition::Blue);
//!     let (controller, _handle) = Controller::new(config, scope, radio).unwrap();
//!     let (calls_tx, _calls_rx) = mpsc::channel(64);
//!
//!     Toplevel::new(move |s| async move {
//!         s.start(SubsystemBuilder::new("GciController", move |subsys| {
//!             controller.run(subsys, calls_tx)
//!         }));
//!         // Feed the handle from the voice pipeline; drain the call
//!         // channel into the composer.
//!     })
//!     .catch_signals()
//!     .handle_shutdown_requests(Duration::from_secs(5))
//!     .await
//!     .unwrap();
//! }
//! ```

pub mod controller;
pub mod radio;
pub mod scope;
pub mod trace;

pub use controller::{Call, Controller, ControllerConfig, ControllerHandle};
pub use trace::{CallContext, TraceId};
