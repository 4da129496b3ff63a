//! Go Trace Studio CLI
//!
//! Goroutine timelines and blocking profiles for Go execution traces.
//! Packs decoded traces into binary snapshots and analyses them.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use gotrace_studio::commands::{
    display_schema, display_version, execute_events, execute_goroutine, execute_goroutines,
    execute_info, execute_pack, execute_profile, validate_pack_args, validate_profile_args,
    validate_report_file, EventsArgs, PackArgs, ProfileArgs,
};
use gotrace_studio::model::ProfileKind;
use gotrace_studio::session::TraceSession;
use gotrace_studio::utils::config::{SessionConfig, DEFAULT_TOP_PATHS};

/// Go Trace Studio - goroutine analysis for Go execution traces
#[derive(Parser, Debug)]
#[command(name = "gotrace")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Trace snapshot to analyse
    #[arg(short, long, global = true, env = "GOTRACE_SNAPSHOT")]
    snapshot: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Pack a JSON trace dump into a binary snapshot
    Pack {
        /// JSON dump of decoded events and frames
        #[arg(short, long)]
        input: PathBuf,

        /// Snapshot file to write
        #[arg(short, long, default_value = "trace.snap")]
        output: PathBuf,
    },

    /// Summarise the snapshot
    Info,

    /// Aggregate a blocking or latency profile
    Profile {
        /// Profile kind: io, block, syscall or sched
        kind: ProfileKind,

        /// Output path for JSON report
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output path for folded stacks
        #[arg(short, long)]
        folded: Option<PathBuf>,

        /// Output path for a gzipped pprof profile
        #[arg(long)]
        pprof: Option<PathBuf>,

        /// Number of top hot paths to include
        #[arg(long, default_value_t = DEFAULT_TOP_PATHS)]
        top_paths: usize,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,
    },

    /// Describe one goroutine and its events
    Goroutine {
        /// Goroutine id
        id: u64,
    },

    /// List goroutines
    Goroutines {
        /// Only goroutines whose entry frame contains this text
        filter: Option<String>,
    },

    /// Select events by goroutine and stack
    Events {
        /// Goroutine ids (comma separated or repeated)
        #[arg(short, long = "goroutine", value_delimiter = ',')]
        goroutines: Vec<u64>,

        /// Regex matched against stack function names
        #[arg(long = "func")]
        func: Option<String>,

        /// Regex matched against stack file paths
        #[arg(long)]
        file: Option<String>,

        /// Print stacks under each event
        #[arg(long)]
        stacks: bool,

        /// Maximum number of events to print
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Validate a profile report JSON file
    Validate {
        /// Path to report JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Pack { input, output } => {
            let args = PackArgs { input, output };
            validate_pack_args(&args)?;
            execute_pack(&args)?;
        }

        Commands::Info => {
            execute_info(&open_session(cli.snapshot)?)?;
        }

        Commands::Profile {
            kind,
            output,
            folded,
            pprof,
            top_paths,
            summary,
        } => {
            let args = ProfileArgs {
                kind,
                output_json: output,
                output_folded: folded,
                output_pprof: pprof,
                top_paths,
                print_summary: summary,
            };

            // Validate args before loading anything
            validate_profile_args(&args)?;

            execute_profile(&open_session(cli.snapshot)?, &args)?;
        }

        Commands::Goroutine { id } => {
            execute_goroutine(&open_session(cli.snapshot)?, id)?;
        }

        Commands::Goroutines { filter } => {
            execute_goroutines(&open_session(cli.snapshot)?, filter.as_deref())?;
        }

        Commands::Events {
            goroutines,
            func,
            file,
            stacks,
            limit,
        } => {
            let args = EventsArgs {
                goroutines,
                func,
                file,
                stacks,
                limit,
            };
            execute_events(&open_session(cli.snapshot)?, &args)?;
        }

        Commands::Validate { file } => {
            validate_report_file(&file)?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}

/// Session over the snapshot named by `--snapshot` or the environment
///
/// **Private** - loading is deferred to the first command that needs it
fn open_session(snapshot: Option<PathBuf>) -> Result<TraceSession> {
    let config = SessionConfig::from_optional(snapshot).context("Cannot open a trace session")?;
    Ok(TraceSession::from_config(config))
}
