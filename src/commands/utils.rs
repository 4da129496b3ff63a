//! Small commands: report validation, schema display and version info.

use anyhow::{Context, Result};
use std::path::Path;
use crate::output::read_report;
use crate::utils::config::{SCHEMA_VERSION, SNAPSHOT_ENV_VAR};

/// Validate a profile report JSON file
pub fn validate_report_file(file_path: &Path) -> Result<()> {
    println!("Validating report: {}", file_path.display());

    let report = read_report(file_path)
        .with_context(|| format!("Failed to read report {}", file_path.display()))?;

    if report.version != SCHEMA_VERSION {
        anyhow::bail!(
            "Report schema v{} does not match supported v{}",
            report.version,
            SCHEMA_VERSION
        );
    }

    println!("✓ Valid report JSON");
    println!("  Version: {}", report.version);
    println!("  Kind: {}", report.kind);
    if let Some(source) = &report.source {
        println!("  Source: {}", source);
    }
    println!("  Total Delay: {} ns", report.total_duration_ns);
    println!("  Samples: {}", report.total_samples);
    println!("  Hot Paths: {}", report.hot_paths.len());

    Ok(())
}

/// Display schema information
pub fn display_schema(show_details: bool) {
    println!("Go Trace Studio Profile Report Schema");
    println!("Current Version: {}", SCHEMA_VERSION);
    println!();

    if show_details {
        println!("Schema Structure:");
        println!("  version: string            - Schema version (e.g., '1.0.0')");
        println!("  kind: string               - io | block | syscall | sched");
        println!("  source: string?            - Snapshot the profile came from");
        println!("  total_duration_ns: number  - Total delay across samples");
        println!("  total_samples: number      - Paired begin/end events");
        println!("  distribution: object       - Delay spread across stacks");
        println!("  hot_paths: array           - Top delay paths");
        println!("    stack: string            - Folded stack, root first");
        println!("    duration_ns: number      - Delay on this path");
        println!("    count: number            - Samples on this path");
        println!("    percentage: number       - Percentage of total delay");
        println!("    location: string?        - Innermost file:line");
        println!("  samples: array             - Every distinct stack");
        println!("  diagnostics_count: number  - Begin events skipped");
        println!("  generated_at: string      - ISO 8601 timestamp");
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
pub fn display_version() {
    println!("Go Trace Studio v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Goroutine timelines and blocking profiles for Go execution traces.");
    println!("Snapshot path defaults to ${}.", SNAPSHOT_ENV_VAR);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::Profile;
    use crate::model::ProfileKind;
    use crate::output::{write_report, ProfileReport};

    #[test]
    fn test_validate_report_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("r.json");
        let profile = Profile {
            kind: ProfileKind::Sched,
            samples: vec![],
            diagnostics: vec![],
        };
        write_report(&ProfileReport::from_profile(&profile, 5, None), &path).unwrap();
        assert!(validate_report_file(&path).is_ok());
    }

    #[test]
    fn test_validate_rejects_other_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("r.json");
        let profile = Profile {
            kind: ProfileKind::Io,
            samples: vec![],
            diagnostics: vec![],
        };
        let mut report = ProfileReport::from_profile(&profile, 5, None);
        report.version = "0.0.1".to_string();
        write_report(&report, &path).unwrap();
        assert!(validate_report_file(&path).is_err());
    }
}
