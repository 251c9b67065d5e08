//! State management module
//!
//! This module contains state tracking for individual crawl targets and for
//! the crawl run as a whole.

mod engine_state;
mod page_state;

pub use engine_state::EngineState;
pub use page_state::TargetState;
