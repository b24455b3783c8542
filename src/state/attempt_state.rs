/// Attempt state tracking for a single page's retry loop
///
/// This module defines the states a page moves through while it is being
/// fetched, and the counter that drives the retry decision.
use std::fmt;

/// Phase of a page's attempt loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttemptPhase {
    // ===== Active States =====
    /// An attempt is in flight or about to start
    Attempting,

    // ===== Terminal States =====
    /// An attempt completed without a page-level error
    Succeeded,

    /// Every allowed attempt failed
    Exhausted,
}

impl AttemptPhase {
    /// Returns true if the loop has finished
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Attempting)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Attempting => "attempting",
            Self::Succeeded => "succeeded",
            Self::Exhausted => "exhausted",
        }
    }
}

impl fmt::Display for AttemptPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-page attempt counter
///
/// Created when a page's attempt loop starts and discarded when the loop
/// returns. `attempt_index` is 1-based and names the attempt currently in
/// flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptState {
    pub page_number: u32,
    pub attempt_index: u32,
    pub max_attempts: u32,
    phase: AttemptPhase,
}

impl AttemptState {
    /// Starts a loop at attempt 1
    pub fn new(page_number: u32, max_attempts: u32) -> Self {
        Self {
            page_number,
            attempt_index: 1,
            max_attempts: max_attempts.max(1),
            phase: AttemptPhase::Attempting,
        }
    }

    pub fn phase(&self) -> AttemptPhase {
        self.phase
    }

    /// Marks the current attempt as successful
    ///
    /// Has no effect once the loop is terminal.
    pub fn succeed(&mut self) {
        if !self.phase.is_terminal() {
            self.phase = AttemptPhase::Succeeded;
        }
    }

    /// Records a failed attempt
    ///
    /// Moves to the next attempt when the retry budget allows it and returns
    /// true; otherwise moves to `Exhausted` and returns false.
    pub fn fail(&mut self, can_retry: bool) -> bool {
        if self.phase.is_terminal() {
            return false;
        }

        if can_retry {
            self.attempt_index += 1;
            true
        } else {
            self.phase = AttemptPhase::Exhausted;
            false
        }
    }

    /// Number of attempts made so far, counting the one in flight
    pub fn attempts_made(&self) -> u32 {
        self.attempt_index
    }
}
