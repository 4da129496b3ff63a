//! Output writers for profile reports and goroutine views.
//!
//! This module handles writing data to disk and terminals in various formats:
//! - JSON profile reports (versioned schema)
//! - Folded stacks for external flamegraph renderers
//! - Gzipped pprof profiles
//! - Text descriptions of goroutines and profiles

pub mod folded;
pub mod json;
pub mod perftools;
pub mod pprof;
pub mod schema;
pub mod text;

// Re-export main functions
pub use folded::{write_folded, write_folded_to};
pub use json::{read_report, report_to_string, write_report};
pub use pprof::{build_pprof, read_pprof, write_pprof, write_pprof_to};
pub use schema::{HotPath, ProfileReport, SampleRecord};
pub use text::{describe_goroutine, goroutine_summary_line, profile_text_summary};
