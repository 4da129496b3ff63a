//! Call stack frames.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One call-stack entry
///
/// Frames are owned by the trace arena and referenced through `FrameId`.
/// Two events sharing a `FrameId` share the frame; equal content under two
/// ids stays two frames.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Frame {
    /// Program counter
    #[serde(default)]
    pub pc: u64,

    /// Function name
    #[serde(rename = "fn")]
    pub func: String,

    /// Source file path
    #[serde(default)]
    pub file: String,

    /// Source line
    #[serde(default)]
    pub line: i64,
}

impl Frame {
    pub fn new(pc: u64, func: impl Into<String>, file: impl Into<String>, line: i64) -> Self {
        Self {
            pc,
            func: func.into(),
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:\t{}:{}", self.func, self.file, self.line)
    }
}

/// Handle of a frame in the trace arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameId(pub(crate) usize);

impl FrameId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}
