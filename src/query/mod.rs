//! Ad-hoc queries over trace events.
//!
//! This module handles:
//! - Predicate composition over events (`EventFilter`)
//! - Selecting matching events from a trace
//! - Finding goroutines by the code they start in

pub mod filter;
pub mod goroutines;

pub use filter::{select_events, EventFilter};
pub use goroutines::goroutines_matching;
