//! pprof output writer.
//!
//! Writes a profile as a gzipped `perftools.profiles.Profile`, readable by
//! `go tool pprof` and other pprof viewers. Every sample carries two values:
//! contentions (count) and delay (nanoseconds).

use super::json::{create_parent_dirs, validate_output_path};
use super::perftools;
use crate::aggregator::Profile;
use crate::model::Frame;
use crate::utils::error::OutputError;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::{debug, info};
use prost::Message;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Interning tables for one pprof message
#[derive(Default)]
struct PprofBuilder {
    profile: perftools::Profile,
    strings: HashMap<String, i64>,
    functions: HashMap<(String, String), u64>,
    locations: HashMap<Frame, u64>,
}

impl PprofBuilder {
    fn new() -> Self {
        let mut builder = Self::default();
        // string_table[0] must be ""
        builder.string("");
        builder
    }

    fn string(&mut self, s: &str) -> i64 {
        if let Some(id) = self.strings.get(s) {
            return *id;
        }
        let id = self.profile.string_table.len() as i64;
        self.profile.string_table.push(s.to_string());
        self.strings.insert(s.to_string(), id);
        id
    }

    fn value_type(&mut self, ty: &str, unit: &str) -> perftools::ValueType {
        perftools::ValueType {
            r#type: self.string(ty),
            unit: self.string(unit),
        }
    }

    fn function(&mut self, frame: &Frame) -> u64 {
        let key = (frame.func.clone(), frame.file.clone());
        if let Some(id) = self.functions.get(&key) {
            return *id;
        }
        let id = self.profile.function.len() as u64 + 1;
        let name = self.string(&frame.func);
        let filename = self.string(&frame.file);
        self.profile.function.push(perftools::Function {
            id,
            name,
            system_name: name,
            filename,
            start_line: 0,
        });
        self.functions.insert(key, id);
        id
    }

    fn location(&mut self, frame: &Frame) -> u64 {
        if let Some(id) = self.locations.get(frame) {
            return *id;
        }
        let id = self.profile.location.len() as u64 + 1;
        let function_id = self.function(frame);
        self.profile.location.push(perftools::Location {
            id,
            mapping_id: 0,
            address: frame.pc,
            line: vec![perftools::Line {
                function_id,
                line: frame.line,
            }],
            is_folded: false,
        });
        self.locations.insert(frame.clone(), id);
        id
    }
}

/// Convert a profile into a pprof message
///
/// **Public** - used by `write_pprof` and tests
///
/// # Algorithm
/// 1. Declare sample types contentions/count and delay/nanoseconds
/// 2. Give each distinct frame a location and each (function, file) a
///    function entry, numbered from 1 in first-use order
/// 3. Emit one sample per profile sample, leaf location first, valued
///    [count, duration]
pub fn build_pprof(profile: &Profile) -> perftools::Profile {
    let mut builder = PprofBuilder::new();

    let sample_type = vec![
        builder.value_type("contentions", "count"),
        builder.value_type("delay", "nanoseconds"),
    ];
    let period_type = builder.value_type("trace", "count");

    for sample in &profile.samples {
        let location_id = sample.stack.iter().map(|f| builder.location(f)).collect();
        builder.profile.sample.push(perftools::Sample {
            location_id,
            value: vec![
                i64::try_from(sample.count).unwrap_or(i64::MAX),
                sample.duration_ns,
            ],
            label: vec![],
        });
    }

    let comment = builder.string(profile.kind.description());

    let mut out = builder.profile;
    out.sample_type = sample_type;
    out.period_type = Some(period_type);
    out.period = 1;
    out.comment = vec![comment];
    out.time_nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0);

    debug!(
        "Built pprof {} profile: {} samples, {} locations, {} functions",
        profile.kind,
        out.sample.len(),
        out.location.len(),
        out.function.len()
    );
    out
}

/// Write a profile as gzipped pprof
///
/// **Public** - main entry point for pprof output
///
/// # Errors
/// * `OutputError::EmptyProfile` - the profile has no samples
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
pub fn write_pprof(profile: &Profile, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    if profile.is_empty() {
        return Err(OutputError::EmptyProfile);
    }

    info!("Writing pprof {} profile to: {}", profile.kind, output_path.display());

    validate_output_path(output_path)?;
    create_parent_dirs(output_path)?;

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    let mut writer = BufWriter::new(file);
    write_pprof_to(profile, &mut writer)?;
    writer.flush().map_err(OutputError::WriteFailed)?;

    Ok(())
}

/// Write gzipped pprof bytes to any writer
pub fn write_pprof_to<W: Write>(profile: &Profile, writer: W) -> Result<(), OutputError> {
    let bytes = build_pprof(profile).encode_to_vec();
    let mut encoder = GzEncoder::new(writer, Compression::default());
    encoder.write_all(&bytes).map_err(OutputError::WriteFailed)?;
    encoder.finish().map_err(OutputError::WriteFailed)?;
    Ok(())
}

/// Read a gzipped pprof file
///
/// **Public** - useful for validation and testing
///
/// # Errors
/// * `OutputError::WriteFailed` - File read error (reusing WriteFailed for I/O)
/// * `OutputError::PprofDecode` - not a valid profile message
pub fn read_pprof(input_path: impl AsRef<Path>) -> Result<perftools::Profile, OutputError> {
    let input_path = input_path.as_ref();
    debug!("Reading pprof profile from: {}", input_path.display());

    let file = File::open(input_path).map_err(OutputError::WriteFailed)?;
    let mut bytes = Vec::new();
    GzDecoder::new(BufReader::new(file))
        .read_to_end(&mut bytes)
        .map_err(OutputError::WriteFailed)?;

    Ok(perftools::Profile::decode(bytes.as_slice())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::Sample;
    use crate::model::ProfileKind;
    use pretty_assertions::assert_eq;

    fn profile() -> Profile {
        let lock = Frame::new(0x10, "sync.(*Mutex).Lock", "sync/mutex.go", 81);
        Profile {
            kind: ProfileKind::Block,
            samples: vec![
                Sample {
                    stack: vec![lock.clone(), Frame::new(0x20, "main.update", "main.go", 42)],
                    count: 3,
                    duration_ns: 900,
                },
                Sample {
                    stack: vec![lock, Frame::new(0x30, "main.flush", "main.go", 60)],
                    count: 1,
                    duration_ns: 100,
                },
            ],
            diagnostics: vec![],
        }
    }

    fn string<'a>(p: &'a perftools::Profile, index: i64) -> &'a str {
        &p.string_table[index as usize]
    }

    #[test]
    fn test_build_pprof_tables() {
        let p = build_pprof(&profile());

        assert_eq!(p.string_table[0], "");
        let types: Vec<(&str, &str)> = p
            .sample_type
            .iter()
            .map(|t| (string(&p, t.r#type), string(&p, t.unit)))
            .collect();
        assert_eq!(types, vec![("contentions", "count"), ("delay", "nanoseconds")]);

        // The shared leaf frame gets one location
        assert_eq!(p.location.len(), 3);
        assert_eq!(p.function.len(), 3);
        assert_eq!(p.sample[0].location_id[0], p.sample[1].location_id[0]);
        assert_eq!(p.sample[0].value, vec![3, 900]);
        assert_eq!(p.sample[1].value, vec![1, 100]);
    }

    #[test]
    fn test_write_and_read_pprof() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/block.pb.gz");

        write_pprof(&profile(), &path).unwrap();
        let p = read_pprof(&path).unwrap();

        let leaf = &p.location[(p.sample[0].location_id[0] - 1) as usize];
        let func = &p.function[(leaf.line[0].function_id - 1) as usize];
        assert_eq!(string(&p, func.name), "sync.(*Mutex).Lock");
        assert_eq!(string(&p, func.filename), "sync/mutex.go");
        assert_eq!(leaf.line[0].line, 81);
        assert_eq!(leaf.address, 0x10);

        let total: i64 = p.sample.iter().map(|s| s.value[1]).sum();
        assert_eq!(total, 1000);
    }

    #[test]
    fn test_empty_profile_rejected() {
        let empty = Profile {
            kind: ProfileKind::Io,
            samples: vec![],
            diagnostics: vec![],
        };
        let dir = tempfile::tempdir().unwrap();
        let err = write_pprof(&empty, dir.path().join("io.pb.gz")).unwrap_err();
        assert!(matches!(err, OutputError::EmptyProfile));
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.pb.gz");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(&[0xff, 0xff, 0xff]).unwrap();
        encoder.finish().unwrap();

        assert!(matches!(read_pprof(&path), Err(OutputError::PprofDecode(_))));
    }
}
