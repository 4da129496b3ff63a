//! Profile command implementation.
//!
//! The profile command:
//! 1. Loads the snapshot through the session
//! 2. Aggregates one profile kind
//! 3. Calculates metrics
//! 4. Writes the requested outputs

use super::models::ProfileArgs;
use crate::aggregator::calculate_delay_distribution;
use crate::output::{profile_text_summary, write_folded, write_pprof, write_report, ProfileReport};
use crate::session::TraceSession;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::path::PathBuf;
use std::time::Instant;

/// Execute the profile command
///
/// **Public** - main entry point called from main.rs
///
/// # Arguments
/// * `session` - Session over the snapshot to profile
/// * `args` - Profile command arguments
///
/// # Errors
/// * Snapshot load failures
/// * Report, folded or pprof file write errors
pub fn execute_profile(session: &TraceSession, args: &ProfileArgs) -> Result<()> {
    let start_time = Instant::now();

    info!("Step 1/4: Loading snapshot...");
    session.snapshot().context("Failed to load trace snapshot")?;

    info!("Step 2/4: Aggregating {} profile...", args.kind);
    let profile = session
        .profile(args.kind)
        .context("Failed to compute profile")?;

    debug!("Profile has {} distinct stacks", profile.samples.len());
    if !profile.diagnostics.is_empty() {
        warn!(
            "{} begin events were skipped; run with --verbose for details",
            profile.diagnostics.len()
        );
        for diagnostic in &profile.diagnostics {
            debug!("  {}", diagnostic);
        }
    }

    info!("Step 3/4: Calculating metrics...");
    let distribution = calculate_delay_distribution(profile);
    info!("Delay distribution: {}", distribution.summary());
    if distribution.is_highly_concentrated() {
        info!("Delay is concentrated in a few stacks");
    }

    info!("Step 4/4: Writing outputs...");
    if let Some(path) = &args.output_json {
        let source = session.source().map(|p| p.display().to_string());
        let report = ProfileReport::from_profile(profile, args.top_paths, source);
        write_report(&report, path).context("Failed to write profile report")?;
        info!("✓ Report written to: {}", path.display());
    }

    if let Some(path) = &args.output_folded {
        if profile.is_empty() {
            warn!("No {} samples; skipping folded output", args.kind);
        } else {
            write_folded(profile, path).context("Failed to write folded stacks")?;
            info!("✓ Folded stacks written to: {}", path.display());
        }
    }

    if let Some(path) = &args.output_pprof {
        if profile.is_empty() {
            warn!("No {} samples; skipping pprof output", args.kind);
        } else {
            write_pprof(profile, path).context("Failed to write pprof profile")?;
            info!("✓ pprof profile written to: {}", path.display());
        }
    }

    let no_outputs =
        args.output_json.is_none() && args.output_folded.is_none() && args.output_pprof.is_none();
    if args.print_summary || no_outputs {
        println!("\n{}", "=".repeat(83));
        println!("{} PROFILE SUMMARY", args.kind.name().to_uppercase());
        println!("{}", "=".repeat(83));
        println!("Samples:       {}", profile.total_count());
        println!("Unique Stacks: {}", profile.samples.len());
        println!("Total Delay:   {}", crate::aggregator::format_ns(profile.total_duration()));
        println!("Skipped:       {}", profile.diagnostics.len());
        println!("\n{}", profile_text_summary(profile, args.top_paths.min(10)));
        println!("{}", "=".repeat(83));
    }

    let elapsed = start_time.elapsed();
    info!("Profile completed in {:.2}s", elapsed.as_secs_f64());

    Ok(())
}

/// Validate profile arguments
///
/// **Public** - can be called before execute_profile for early validation
pub fn validate_profile_args(args: &ProfileArgs) -> Result<()> {
    if args.top_paths == 0 {
        anyhow::bail!("top_paths must be greater than 0");
    }

    if args.top_paths > 1000 {
        anyhow::bail!("top_paths is too large (max 1000)");
    }

    let paths: Vec<&PathBuf> = [&args.output_json, &args.output_folded, &args.output_pprof]
        .into_iter()
        .flatten()
        .collect();
    for (i, path) in paths.iter().enumerate() {
        if paths[i + 1..].contains(path) {
            anyhow::bail!("Output files cannot share a path: {}", path.display());
        }
    }

    Ok(())
}
