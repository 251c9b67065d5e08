/// Per-target state definitions for tracking crawl progress
///
/// This module defines all possible states a crawl target can be in.
use std::fmt;

/// Represents the current state of a crawl target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetState {
    // ===== Active States =====
    /// Target is in the frontier waiting for a worker
    Pending,

    /// A worker is fetching and processing the target
    InFlight,

    // ===== Terminal States =====
    /// Page was fetched and its text saved
    Succeeded,

    /// Fetch or save failed
    Failed,

    /// Page was fetched but not saved (too little text, or the crawl was
    /// cancelled while the fetch was running)
    Skipped,
}

impl TargetState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending | Self::InFlight)
    }

    /// Returns true if this represents a saved page
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    /// Returns true if `next` is a legal successor of this state
    pub fn can_transition_to(&self, next: TargetState) -> bool {
        match self {
            Self::Pending => next == Self::InFlight,
            Self::InFlight => next.is_terminal(),
            _ => false,
        }
    }

    /// Short lowercase label used in logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InFlight => "in_flight",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

impl fmt::Display for TargetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
