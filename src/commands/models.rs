//! Argument structs shared between the CLI and command implementations.

use crate::model::ProfileKind;
use crate::utils::config::DEFAULT_TOP_PATHS;
use std::path::PathBuf;

/// Arguments for the pack command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct PackArgs {
    /// JSON dump produced by the external decoder
    pub input: PathBuf,

    /// Snapshot file to write
    pub output: PathBuf,
}

/// Arguments for the profile command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct ProfileArgs {
    pub kind: ProfileKind,

    /// Output path for JSON report (optional)
    pub output_json: Option<PathBuf>,

    /// Output path for folded stacks (optional)
    pub output_folded: Option<PathBuf>,

    /// Output path for a gzipped pprof profile (optional)
    pub output_pprof: Option<PathBuf>,

    /// Number of top hot paths to include in the report
    pub top_paths: usize,

    /// Print text summary to stdout
    pub print_summary: bool,
}

impl Default for ProfileArgs {
    fn default() -> Self {
        Self {
            kind: ProfileKind::Block,
            output_json: None,
            output_folded: None,
            output_pprof: None,
            top_paths: DEFAULT_TOP_PATHS,
            print_summary: false,
        }
    }
}

/// Arguments for the events command
#[derive(Debug, Clone, Default)]
pub struct EventsArgs {
    /// Goroutines whose events to keep; empty keeps all
    pub goroutines: Vec<u64>,

    /// Regex over stack function names
    pub func: Option<String>,

    /// Regex over stack file paths
    pub file: Option<String>,

    /// Print each event's stack under it
    pub stacks: bool,

    /// Stop after this many events
    pub limit: Option<usize>,
}
