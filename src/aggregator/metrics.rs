//! Calculate hot paths and delay statistics from profiles.
//!
//! Hot paths are the call stacks that accumulate the most delay.
//! These are the first places to look when a goroutine spends its life
//! waiting instead of running.

use super::profile::{Profile, Sample};
use crate::output::schema::HotPath;
use log::debug;
use serde::{Deserialize, Serialize};

/// Calculate hot paths from a profile
///
/// **Public** - main entry point for metrics calculation
///
/// # Arguments
/// * `profile` - Profile with samples sorted by duration
/// * `top_n` - Number of top paths to return (e.g., 20)
///
/// # Returns
/// Vector of hot paths, sorted by duration (descending)
pub fn calculate_hot_paths(profile: &Profile, top_n: usize) -> Vec<HotPath> {
    debug!(
        "Calculating top {} hot paths from {} samples",
        top_n,
        profile.samples.len()
    );

    let total = profile.total_duration();

    // Samples are already sorted by duration in compute_profile
    profile
        .samples
        .iter()
        .take(top_n)
        .map(|sample| create_hot_path(sample, total))
        .collect()
}

/// Create a HotPath from a Sample
fn create_hot_path(sample: &Sample, total_ns: i64) -> HotPath {
    let percentage = if total_ns > 0 {
        (sample.duration_ns as f64 / total_ns as f64) * 100.0
    } else {
        0.0
    };

    let top = sample.stack.first();
    HotPath {
        stack: sample.folded_stack(),
        duration_ns: sample.duration_ns,
        count: sample.count,
        percentage,
        location: top.map(|f| format!("{}:{}", f.file, f.line)),
    }
}

/// Calculate delay distribution statistics
///
/// **Public** - provides summary statistics
///
/// # Arguments
/// * `profile` - Profile to summarize
///
/// # Returns
/// Statistics about how delay is spread across stacks
pub fn calculate_delay_distribution(profile: &Profile) -> DelayDistribution {
    let samples = &profile.samples;
    if samples.is_empty() {
        return DelayDistribution::default();
    }

    let total = profile.total_duration();
    let count = samples.len();
    let mean = total / count as i64;

    let mut durations: Vec<i64> = samples.iter().map(|s| s.duration_ns).collect();
    durations.sort_unstable();
    let median = durations[durations.len() / 2];

    // Top 10% of stacks (samples are sorted heaviest first)
    let top_count = (count as f64 * 0.1).ceil() as usize;
    let top_ns = samples
        .iter()
        .take(top_count)
        .fold(0i64, |acc, s| acc.saturating_add(s.duration_ns));

    DelayDistribution {
        total_ns: total,
        stack_count: count,
        sample_count: profile.total_count(),
        mean_ns_per_stack: mean,
        median_ns_per_stack: median,
        top_10_percent_ns: top_ns,
        top_10_percent_percentage: if total > 0 {
            (top_ns as f64 / total as f64) * 100.0
        } else {
            0.0
        },
    }
}

/// Delay distribution statistics
///
/// **Public** - returned from calculate_delay_distribution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DelayDistribution {
    /// Total delay across all stacks
    pub total_ns: i64,

    /// Number of unique stacks
    pub stack_count: usize,

    /// Number of paired begin/end events behind those stacks
    pub sample_count: u64,

    pub mean_ns_per_stack: i64,

    pub median_ns_per_stack: i64,

    /// Delay attributed to the heaviest 10% of stacks
    pub top_10_percent_ns: i64,

    /// Percentage of total delay in the top 10%
    pub top_10_percent_percentage: f64,
}

impl DelayDistribution {
    /// Check if delay is highly concentrated
    ///
    /// Returns true if top 10% of stacks account for >80% of delay
    pub fn is_highly_concentrated(&self) -> bool {
        self.top_10_percent_percentage > 80.0
    }

    /// Get human-readable summary
    ///
    /// **Public** - for logging and the `profile` command
    pub fn summary(&self) -> String {
        format!(
            "Total: {} | Stacks: {} | Samples: {} | Mean: {} | Median: {} | Top 10%: {:.1}%",
            format_ns(self.total_ns),
            self.stack_count,
            self.sample_count,
            format_ns(self.mean_ns_per_stack),
            format_ns(self.median_ns_per_stack),
            self.top_10_percent_percentage
        )
    }
}

/// Render nanoseconds with a readable unit
pub fn format_ns(ns: i64) -> String {
    let abs = ns.unsigned_abs();
    if abs >= 1_000_000_000 {
        format!("{:.2}s", ns as f64 / 1e9)
    } else if abs >= 1_000_000 {
        format!("{:.2}ms", ns as f64 / 1e6)
    } else if abs >= 1_000 {
        format!("{:.2}µs", ns as f64 / 1e3)
    } else {
        format!("{}ns", ns)
    }
}
