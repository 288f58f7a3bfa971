//! The voice-radio contract and the broadcast gate.

use std::sync::Arc;

use darkstar_core::brevity::Frequency;

/// The simulated-radio substrate, as seen by the controller.
///
/// Implementations track which clients are tuned where; a client counts as
/// present on a frequency when it has been heard within the liveness
/// window (30 s by contract).
pub trait RadioNetwork: Send + Sync {
    /// The frequencies this controller transmits on.
    fn frequencies(&self) -> Vec<Frequency>;

    /// Whether a client with the given callsign is currently tuned to the
    /// frequency.
    fn is_on_frequency(&self, callsign: &str, frequency: Frequency) -> bool;
}

/// Decides whether the intended recipients of a call can hear it.
#[derive(Clone)]
pub struct RadioGate {
    radio: Arc<dyn RadioNetwork>,
}

impl RadioGate {
    pub fn new(radio: Arc<dyn RadioNetwork>) -> Self {
        RadioGate { radio }
    }

    /// True when the call should go out: immediately when enforcement is
    /// disabled for the call type, otherwise iff at least one target
    /// callsign is tuned to at least one monitored frequency.
    pub fn should_broadcast(&self, enforce: bool, targets: &[String]) -> bool {
        if !enforce {
            return true;
        }
        let frequencies = self.radio.frequencies();
        targets.iter().any(|callsign| {
            frequencies
                .iter()
                .any(|frequency| self.radio.is_on_frequency(callsign, *frequency))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    struct FakeRadio {
        frequencies: Vec<Frequency>,
        on_frequency: Mutex<HashSet<String>>,
    }

    impl RadioNetwork for FakeRadio {
        fn frequencies(&self) -> Vec<Frequency> {
            self.frequencies.clone()
        }

        fn is_on_frequency(&self, callsign: &str, _frequency: Frequency) -> bool {
            self.on_frequency.lock().unwrap().contains(callsign)
        }
    }

    fn gate(present: &[&str]) -> RadioGate {
        RadioGate::new(Arc::new(FakeRadio {
            frequencies: vec![Frequency::from_mega_hertz(251.0)],
            on_frequency: Mutex::new(present.iter().map(|s| s.to_string()).collect()),
        }))
    }

    #[test]
    fn test_enforcement_disabled_always_passes() {
        let gate = gate(&[]);
        assert!(gate.should_broadcast(false, &["Eagle 1".to_string()]));
    }

    #[test]
    fn test_enforced_requires_a_present_target() {
        let gate = gate(&["Eagle 1"]);
        assert!(gate.should_broadcast(true, &["Eagle 1".to_string()]));
        assert!(!gate.should_broadcast(true, &["Ghost 4".to_string()]));
        assert!(gate.should_broadcast(
            true,
            &["Ghost 4".to_string(), "Eagle 1".to_string()]
        ));
        assert!(!gate.should_broadcast(true, &[]));
    }
}
