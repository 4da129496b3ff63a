//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while encoding or decoding a binary snapshot
///
/// Everything except `Io` is a format error. `FrameIndex` and `LinkIndex`
/// are the reference errors: the record itself was well formed but points
/// outside its table.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("I/O failure while streaming snapshot: {0}")]
    Io(#[from] std::io::Error),

    #[error("truncated input while reading {context}: needed {needed} bytes, {available} available")]
    Truncated {
        context: &'static str,
        needed: usize,
        available: usize,
    },

    #[error("length prefix {length} for {context} exceeds the remaining {remaining} bytes")]
    LengthOverflow {
        context: &'static str,
        length: u64,
        remaining: usize,
    },

    #[error("malformed varint in {context}")]
    InvalidVarint { context: &'static str },

    #[error("unknown event type code {0}")]
    UnknownEventType(u8),

    #[error("string in {context} is not valid UTF-8")]
    InvalidUtf8 { context: &'static str },

    #[error("header declares a negative {context} count ({count})")]
    NegativeCount { context: &'static str, count: i64 },

    #[error("{0} unexpected bytes after the last record")]
    TrailingBytes(usize),

    #[error("event {event} references frame index {index}, but the frame table has {len} entries")]
    FrameIndex { event: usize, index: i64, len: usize },

    #[error("event {event} links to event index {index}, but the event table has {len} entries")]
    LinkIndex { event: usize, index: i64, len: usize },

    #[error("event {event} at ts {ts} precedes the previous event at ts {previous}")]
    OutOfOrder { event: usize, ts: i64, previous: i64 },
}

impl CodecError {
    /// Whether this error means an index pointed outside its table
    pub fn is_reference_error(&self) -> bool {
        matches!(self, CodecError::FrameIndex { .. } | CodecError::LinkIndex { .. })
    }

    /// Whether this error is a format error (everything but I/O)
    pub fn is_format_error(&self) -> bool {
        !matches!(self, CodecError::Io(_))
    }
}

/// Errors raised while resolving configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no trace snapshot given: pass --snapshot or set {0}")]
    MissingSnapshotPath(&'static str),
}

/// Errors that can occur while loading a trace into a session
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to open trace snapshot {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode trace snapshot {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    #[error("trace loader lock poisoned by a panicking thread")]
    Poisoned,
}

/// Errors that can occur while reading the parser's JSON interchange dump
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("JSON deserialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid trace: {0}")]
    InvalidTrace(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors that can occur while building event queries
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("invalid {field} pattern {pattern:?}: {source}")]
    InvalidPattern {
        field: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),

    #[error("Empty profile: no samples to write")]
    EmptyProfile,

    #[error("Failed to decode pprof profile: {0}")]
    PprofDecode(#[from] prost::DecodeError),
}
