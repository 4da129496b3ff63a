//! Trace dump parsing.
//!
//! This module handles:
//! - Reading the JSON dump of pre-decoded events and frames
//! - Accepting both the full dump and a bare event array
//! - Validating handles and timestamp order before use

pub mod dump;

// Re-export main functions
pub use dump::{parse_trace_json, parse_trace_value, read_trace_json};
