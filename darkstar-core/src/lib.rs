//! Darkstar Core - Platform-independent GCI decision logic
//!
//! This crate contains the pure decision logic for a Ground-Controlled
//! Interception (GCI) controller: the data model shared with the radar
//! scope and voice pipeline, the spherical geometry used for position
//! calls, and the trackers that suppress repeated or flapping broadcasts.
//! It has no async or I/O dependencies.
//!
//! # Layout
//!
//! - [`geo`] - positions, bearings, bullseye rendering
//! - [`trackfile`] - per-aircraft radar records
//! - [`group`] - clusters of trackfiles treated as tactical units
//! - [`brevity`] - request and call payloads exchanged with the radio layer
//! - [`tracking`] - cooldown and merge trackers
//! - [`threat`] - threat radii, aspect math, picture priority ordering
//!
//! # Example
//!
//! ```rust
//! use darkstar_core::geo::{Bullseye, Position};
//!
//! let bullseye = Bullseye::new(Position::new(41.0, 41.0, 0.0), 6.0);
//! let target = Position::new(41.5, 41.0, 22_000.0);
//! let point = bullseye.locate(&target);
//! assert!(point.bearing.is_magnetic());
//! ```

pub mod brevity;
pub mod coalition;
pub mod error;
pub mod geo;
pub mod group;
pub mod threat;
pub mod trackfile;
pub mod tracking;

// Re-export commonly used types
pub use coalition::Coalition;
pub use error::ConfigError;
pub use trackfile::{ContactClass, TrackId, Trackfile};
