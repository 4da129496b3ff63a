//! Pack command implementation.
//!
//! The pack command:
//! 1. Reads the JSON dump of decoded events
//! 2. Computes per-goroutine statistics
//! 3. Writes a binary snapshot

use super::models::PackArgs;
use crate::codec::write_snapshot;
use crate::parser::read_trace_json;
use crate::timeline::goroutine_stats;
use anyhow::{Context, Result};
use log::{debug, info};
use std::time::Instant;

/// Execute the pack command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Dump parsing or validation errors
/// * Snapshot write errors
pub fn execute_pack(args: &PackArgs) -> Result<()> {
    let start_time = Instant::now();

    info!("Step 1/3: Reading trace dump...");
    let trace = read_trace_json(&args.input)
        .with_context(|| format!("Failed to read trace dump {}", args.input.display()))?;

    debug!("Dump has {} events and {} frames", trace.len(), trace.frames().len());

    info!("Step 2/3: Computing goroutine statistics...");
    let goroutines = goroutine_stats(&trace);

    info!("Step 3/3: Writing snapshot...");
    write_snapshot(&args.output, &trace, &goroutines)
        .with_context(|| format!("Failed to write snapshot {}", args.output.display()))?;

    info!("✓ Snapshot written to: {}", args.output.display());
    println!(
        "Packed {} events, {} frames, {} goroutines into {}",
        trace.len(),
        trace.frames().len(),
        goroutines.len(),
        args.output.display()
    );

    let elapsed = start_time.elapsed();
    info!("Pack completed in {:.2}s", elapsed.as_secs_f64());

    Ok(())
}

/// Validate pack arguments
///
/// **Public** - can be called before execute_pack for early validation
pub fn validate_pack_args(args: &PackArgs) -> Result<()> {
    if !args.input.is_file() {
        anyhow::bail!("Trace dump not found: {}", args.input.display());
    }

    if args.output.as_os_str().is_empty() {
        anyhow::bail!("Snapshot output path cannot be empty");
    }

    if args.output == args.input {
        anyhow::bail!("Snapshot output would overwrite the input dump");
    }

    Ok(())
}
