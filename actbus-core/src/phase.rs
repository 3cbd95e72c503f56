//! Execution phases.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse execution ordering among registrations.
///
/// Dispatch always visits phases in [`Phase::ORDER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Cross-cutting work that runs ahead of the primary handlers.
    Before,
    /// The primary handlers.
    #[default]
    Main,
    /// Cross-cutting work that runs once the primary handlers are done.
    After,
}

impl Phase {
    /// The fixed visiting order.
    pub const ORDER: [Phase; 3] = [Phase::Before, Phase::Main, Phase::After];

    /// Position of this phase in [`Phase::ORDER`].
    pub const fn index(self) -> usize {
        match self {
            Phase::Before => 0,
            Phase::Main => 1,
            Phase::After => 2,
        }
    }

    /// Lowercase name, as used in configuration files.
    pub const fn as_str(self) -> &'static str {
        match self {
            Phase::Before => "before",
            Phase::Main => "main",
            Phase::After => "after",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
