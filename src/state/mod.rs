//! State module for tracking harvest progress
//!
//! # Components
//!
//! - `AttemptState`: Tracks one page's attempt counter while it is retried
//! - `AttemptPhase`: Attempting, or one of the terminal outcomes

mod attempt_state;

// Re-export main types
pub use attempt_state::{AttemptPhase, AttemptState};
