//! Binary snapshot codec.
//!
//! This module handles:
//! - Wire primitives (varints, zigzag, little-endian fields)
//! - Record layouts for header, events, frames and goroutines
//! - Frame/link flattening on encode and resolution on decode
//! - Sliding-window streaming reads

pub mod marshal;
pub mod records;
pub mod unmarshal;
pub mod varint;
pub mod window;

pub use marshal::{marshal, marshal_to_vec};
pub use unmarshal::{unmarshal, unmarshal_slice};

use crate::model::{GoroutineMap, Trace};
use crate::utils::error::CodecError;
use log::info;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// A decoded snapshot: the event arena plus per-goroutine statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub trace: Trace,
    pub goroutines: GoroutineMap,
}

impl Snapshot {
    pub fn new(trace: Trace, goroutines: GoroutineMap) -> Self {
        Self { trace, goroutines }
    }
}

/// Encode a snapshot to a file, replacing any existing file
pub fn write_snapshot(
    path: impl AsRef<Path>,
    trace: &Trace,
    goroutines: &GoroutineMap,
) -> Result<(), CodecError> {
    let path = path.as_ref();
    let writer = BufWriter::new(File::create(path)?);
    marshal(writer, trace, goroutines)?;

    info!(
        "Wrote snapshot {} ({} events, {} goroutines)",
        path.display(),
        trace.len(),
        goroutines.len()
    );
    Ok(())
}

/// Decode a snapshot file
pub fn read_snapshot(path: impl AsRef<Path>) -> Result<Snapshot, CodecError> {
    let path = path.as_ref();
    let snapshot = unmarshal(BufReader::new(File::open(path)?))?;

    info!(
        "Read snapshot {} ({} events, {} frames, {} goroutines)",
        path.display(),
        snapshot.trace.len(),
        snapshot.trace.frames().len(),
        snapshot.goroutines.len()
    );
    Ok(snapshot)
}
