//! The four governance actions and their precedence ordering.
//!
//! Every evaluation resolves to exactly one `DecisionAction`. When several
//! contributors propose different actions, the highest-precedence proposal
//! wins: STOP > ESCALATE > RESTRICT > ALLOW.

use serde::{Deserialize, Serialize};

/// A governance action proposed by a policy rule or gate, or resolved as the
/// final outcome of an evaluation.
///
/// Variant order is the precedence order, lowest first, so the derived `Ord`
/// agrees with [`DecisionAction::precedence`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionAction {
    /// Proceed with the requested action unchanged.
    Allow,

    /// Proceed, but with reduced scope: hedged answer, partial data, or a
    /// pointer to a verified channel.
    Restrict,

    /// Suspend and route to a human reviewer before anything executes.
    Escalate,

    /// Refuse outright. Nothing downstream may execute.
    Stop,
}

impl DecisionAction {
    /// Numeric precedence: ALLOW 0, RESTRICT 1, ESCALATE 2, STOP 3.
    ///
    /// Also used as the CLI exit code for a completed evaluation.
    pub fn precedence(self) -> u8 {
        match self {
            Self::Allow => 0,
            Self::Restrict => 1,
            Self::Escalate => 2,
            Self::Stop => 3,
        }
    }

    /// True when `self` outranks `other` and would replace it during
    /// precedence resolution.
    pub fn dominates(self, other: Self) -> bool {
        self.precedence() > other.precedence()
    }

    /// The canonical wire spelling (`"ALLOW"`, `"RESTRICT"`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "ALLOW",
            Self::Restrict => "RESTRICT",
            Self::Escalate => "ESCALATE",
            Self::Stop => "STOP",
        }
    }
}

impl std::fmt::Display for DecisionAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
