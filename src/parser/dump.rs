//! Reader for the JSON dump produced by an external trace decoder.
//!
//! The dump is the input boundary of the crate: events and frames already
//! decoded from the runtime's native trace format, with stacks given as
//! frame-table indices and links as event indices.

use crate::model::{Event, Frame, Trace};
use crate::utils::error::ParseError;
use log::{debug, info};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Layout of the JSON dump
#[derive(Debug, Deserialize)]
struct TraceDump {
    #[serde(default)]
    frames: Vec<Frame>,
    events: Vec<Event>,
}

/// Parse a JSON dump value into a validated trace
///
/// **Public** - main entry point for parsing
///
/// Two shapes are accepted:
/// - `{"frames": [...], "events": [...]}`
/// - a bare array of events without stacks
///
/// # Errors
/// * `ParseError::JsonError` - the value does not match either shape
/// * `ParseError::InvalidTrace` - a handle is dangling or events are out of
///   timestamp order
pub fn parse_trace_value(raw: serde_json::Value) -> Result<Trace, ParseError> {
    let dump = match raw {
        serde_json::Value::Object(_) => serde_json::from_value::<TraceDump>(raw)?,
        serde_json::Value::Array(_) => {
            debug!("Dump is a bare event array; no frame table");
            TraceDump {
                frames: Vec::new(),
                events: serde_json::from_value(raw)?,
            }
        }
        _ => {
            return Err(ParseError::InvalidTrace(
                "dump must be a JSON object or array".to_string(),
            ))
        }
    };

    debug!(
        "Parsed dump: {} events, {} frames",
        dump.events.len(),
        dump.frames.len()
    );
    Trace::new(dump.events, dump.frames)
}

/// Parse a JSON dump held in a string
pub fn parse_trace_json(raw: &str) -> Result<Trace, ParseError> {
    parse_trace_value(serde_json::from_str(raw)?)
}

/// Read and validate a JSON dump file
pub fn read_trace_json(path: impl AsRef<Path>) -> Result<Trace, ParseError> {
    let path = path.as_ref();
    info!("Reading trace dump: {}", path.display());

    let reader = BufReader::new(File::open(path)?);
    let raw: serde_json::Value = serde_json::from_reader(reader)?;
    parse_trace_value(raw)
}
