/*!
 * Isolate State
 * Lifecycle stages of an isolate as seen by the executive
 */

use serde::{Deserialize, Serialize};

/// Isolate lifecycle state
///
/// Transitions are monotonic except `Running <-> Initialized`, which tracks
/// whether any application is currently hosted. `Initialized` is reached
/// exactly once, only on receipt of the isolate's self-reported initialized
/// notification. `FailedToInitialize` and `Terminated` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IsolateState {
    /// Proxy exists but the isolate has not yet reported initialized
    Created,
    /// The isolate reported initialized and can accept commands
    Initialized,
    /// At least one application is hosted
    Running,
    /// The isolate never reported initialized within the bound
    FailedToInitialize,
    /// The isolate has been destroyed
    Terminated,
}

impl IsolateState {
    /// Explicit "active" predicate; replaces the reference design's numeric
    /// state comparison
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Initialized | Self::Running)
    }

    #[inline]
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::FailedToInitialize | Self::Terminated)
    }

    /// Whether a transition to `next` is legal
    #[must_use]
    pub const fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (*self, next),
            (Self::Created, Self::Initialized)
                | (Self::Created, Self::FailedToInitialize)
                | (Self::Created, Self::Terminated)
                | (Self::Initialized, Self::Running)
                | (Self::Initialized, Self::Terminated)
                | (Self::Running, Self::Initialized)
                | (Self::Running, Self::Terminated)
        )
    }
}
