//! Output JSON schema definitions for profile reports.
//!
//! This module defines the structure of JSON files we write to disk.
//! Schema is versioned to allow future evolution.

use crate::aggregator::{
    calculate_delay_distribution, calculate_hot_paths, DelayDistribution, Profile,
};
use crate::model::{Frame, ProfileKind};
use crate::utils::config::SCHEMA_VERSION;
use serde::{Deserialize, Serialize};

/// Top-level report structure written to JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileReport {
    /// Schema version for compatibility checking
    pub version: String,

    /// Which profile this is (io, block, syscall, sched)
    pub kind: ProfileKind,

    /// Snapshot or dump the profile was computed from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Total delay across all samples, in nanoseconds
    pub total_duration_ns: i64,

    /// Number of paired begin/end events
    pub total_samples: u64,

    pub distribution: DelayDistribution,

    /// Top hot paths (ranked by delay)
    pub hot_paths: Vec<HotPath>,

    /// Every distinct stack
    pub samples: Vec<SampleRecord>,

    /// Begin events skipped during aggregation
    pub diagnostics_count: usize,

    /// Timestamp when the report was generated
    pub generated_at: String,
}

/// A hot path in the profile (folded stack with its delay)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotPath {
    /// Collapsed stack, root first (e.g., "main.main;main.worker;runtime.chanrecv1")
    pub stack: String,

    pub duration_ns: i64,

    pub count: u64,

    /// Percentage of total delay
    pub percentage: f64,

    /// File and line of the innermost frame
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// One sample with its full stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleRecord {
    /// Innermost frame first
    pub stack: Vec<Frame>,
    pub count: u64,
    pub duration_ns: i64,
}

impl ProfileReport {
    /// Build a report for `profile`, stamped with the current time
    pub fn from_profile(profile: &Profile, top_n: usize, source: Option<String>) -> Self {
        Self {
            version: SCHEMA_VERSION.to_string(),
            kind: profile.kind,
            source,
            total_duration_ns: profile.total_duration(),
            total_samples: profile.total_count(),
            distribution: calculate_delay_distribution(profile),
            hot_paths: calculate_hot_paths(profile, top_n),
            samples: profile
                .samples
                .iter()
                .map(|s| SampleRecord {
                    stack: s.stack.clone(),
                    count: s.count,
                    duration_ns: s.duration_ns,
                })
                .collect(),
            diagnostics_count: profile.diagnostics.len(),
            generated_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
