//! Aggregation of trace events into profiles and metrics.
//!
//! This module transforms the event stream into:
//! - Per-kind profiles of weighted call stacks (io, block, syscall, sched)
//! - Collapsed stack format (for external flamegraph tools)
//! - Hot path analysis and delay distribution statistics

pub mod metrics;
pub mod profile;
pub mod stack_builder;

// Re-export main types and functions
pub use metrics::{calculate_delay_distribution, calculate_hot_paths, format_ns, DelayDistribution};
pub use profile::{compute_profile, Profile, Sample};
pub use stack_builder::{build_collapsed_stacks, CollapsedStack};
