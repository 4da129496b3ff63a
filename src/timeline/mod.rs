//! Goroutine timeline reconstruction.
//!
//! This module handles:
//! - Duration buckets per goroutine (`goroutine_stats`)
//! - Owned event subsequences per goroutine (`build_timelines`)

pub mod builder;
pub mod stats;

pub use builder::{build_timelines, Timelines};
pub use stats::goroutine_stats;

use crate::model::Trace;

/// Run both passes over a trace
pub fn analyze(trace: &Trace) -> Timelines {
    let stats = goroutine_stats(trace);
    build_timelines(trace, &stats)
}
