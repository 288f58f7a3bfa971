//! Trace identity and cancellation for requests and ticks.

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Correlates every outbound call with the request or surveillance tick
/// that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    pub fn new() -> Self {
        TraceId(Uuid::new_v4())
    }
}

impl Default for TraceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TraceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Per-request context flowing from the voice pipeline through the
/// controller into the composer.
///
/// Cancelling the token makes the owning handler abandon emission; it
/// never terminates the control loop.
#[derive(Debug, Clone)]
pub struct CallContext {
    pub trace_id: TraceId,
    pub cancellation: CancellationToken,
}

impl CallContext {
    pub fn new() -> Self {
        CallContext {
            trace_id: TraceId::new(),
            cancellation: CancellationToken::new(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

impl Default for CallContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_ids_are_unique() {
        assert_ne!(TraceId::new(), TraceId::new());
    }

    #[test]
    fn test_cancellation_is_per_context() {
        let a = CallContext::new();
        let b = CallContext::new();
        a.cancellation.cancel();
        assert!(a.is_cancelled());
        assert!(!b.is_cancelled());
    }
}
