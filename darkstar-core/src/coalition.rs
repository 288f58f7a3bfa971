//! Coalition tags for contacts and controllers.

use serde::{Deserialize, Serialize};

/// Coalition a contact or controller belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Coalition {
    Red,
    Blue,
    /// Contacts that belong to neither fighting side. A controller is never
    /// constructed for the neutral coalition.
    Neutral,
}

impl Coalition {
    /// The coalition this one fights against. Neutral opposes nobody and
    /// maps to itself.
    pub fn opposing(&self) -> Coalition {
        match self {
            Coalition::Red => Coalition::Blue,
            Coalition::Blue => Coalition::Red,
            Coalition::Neutral => Coalition::Neutral,
        }
    }
}

impl std::fmt::Display for Coalition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Red => write!(f, "red"),
            Self::Blue => write!(f, "blue"),
            Self::Neutral => write!(f, "neutral"),
        }
    }
}
