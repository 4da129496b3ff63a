//! Folded stack output writer.
//!
//! One `root;caller;callee weight` line per path, the input format of
//! external flamegraph renderers.

use crate::aggregator::{build_collapsed_stacks, Profile};
use crate::utils::error::OutputError;
use super::json::{create_parent_dirs, validate_output_path};
use log::info;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write a profile as folded stacks
///
/// **Public** - main entry point for folded output
///
/// # Errors
/// * `OutputError::EmptyProfile` - the profile has no samples
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
pub fn write_folded(profile: &Profile, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    if profile.is_empty() {
        return Err(OutputError::EmptyProfile);
    }

    info!("Writing folded {} stacks to: {}", profile.kind, output_path.display());

    validate_output_path(output_path)?;
    create_parent_dirs(output_path)?;

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    let mut writer = BufWriter::new(file);
    write_folded_to(profile, &mut writer)?;
    writer.flush().map_err(OutputError::WriteFailed)?;

    Ok(())
}

/// Write folded lines to any writer
pub fn write_folded_to<W: Write>(profile: &Profile, writer: &mut W) -> Result<(), OutputError> {
    for stack in build_collapsed_stacks(profile) {
        writeln!(writer, "{}", stack.to_line()).map_err(OutputError::WriteFailed)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::Sample;
    use crate::model::{Frame, ProfileKind};

    fn profile() -> Profile {
        Profile {
            kind: ProfileKind::Io,
            samples: vec![Sample {
                stack: vec![
                    Frame::new(2, "net.(*conn).Read", "net.go", 183),
                    Frame::new(1, "main.serve", "main.go", 30),
                ],
                count: 2,
                duration_ns: 700,
            }],
            diagnostics: vec![],
        }
    }

    #[test]
    fn test_write_folded_to_buffer() {
        let mut buf = Vec::new();
        write_folded_to(&profile(), &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "main.serve;net.(*conn).Read 700\n");
    }

    #[test]
    fn test_write_folded_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/io.folded");
        write_folded(&profile(), &path).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().ends_with(" 700\n"));
    }

    #[test]
    fn test_empty_profile_rejected() {
        let empty = Profile {
            kind: ProfileKind::Sched,
            samples: vec![],
            diagnostics: vec![],
        };
        let dir = tempfile::tempdir().unwrap();
        let err = write_folded(&empty, dir.path().join("x.folded")).unwrap_err();
        assert!(matches!(err, OutputError::EmptyProfile));
    }
}
