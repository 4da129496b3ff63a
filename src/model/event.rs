//! Trace events.

use super::frame::FrameId;
use super::kind::EventType;
use serde::{Deserialize, Serialize};

/// Base of the sentinel processor ids
pub const FAKE_P: i32 = 1_000_000;
/// Depicts timer unblocks
pub const TIMER_P: i32 = FAKE_P + 1;
/// Depicts network unblocks
pub const NETPOLL_P: i32 = FAKE_P + 2;
/// Depicts returns from syscalls
pub const SYSCALL_P: i32 = FAKE_P + 3;
/// Depicts GC state
pub const GC_P: i32 = FAKE_P + 4;

/// Where an event happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcSlot {
    Logical(i32),
    Fake,
    Timer,
    Netpoll,
    Syscall,
    Gc,
}

/// Handle of an event in the trace arena
///
/// The handle is the event's position in the globally ordered sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub(crate) usize);

impl EventId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// One timestamped occurrence in the trace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Offset in the source capture, diagnostics only
    #[serde(default)]
    pub off: i32,

    #[serde(rename = "type")]
    pub ty: EventType,

    /// Timestamp in nanoseconds
    pub ts: i64,

    /// Processor slot or one of the sentinel ids
    #[serde(default)]
    pub p: i32,

    /// Goroutine on which the event happened
    #[serde(default)]
    pub g: u64,

    #[serde(default)]
    pub stk_id: u64,

    /// Stack, innermost frame first
    #[serde(default)]
    pub stk: Vec<FrameId>,

    /// Kind-specific arguments
    #[serde(default)]
    pub args: [u64; 3],

    /// Paired event, see `LinkRole` for its meaning per kind
    #[serde(default)]
    pub link: Option<EventId>,
}

impl Event {
    pub fn new(ty: EventType, ts: i64, g: u64) -> Self {
        Self {
            off: 0,
            ty,
            ts,
            p: 0,
            g,
            stk_id: 0,
            stk: Vec::new(),
            args: [0; 3],
            link: None,
        }
    }

    pub fn with_p(mut self, p: i32) -> Self {
        self.p = p;
        self
    }

    pub fn with_args(mut self, args: [u64; 3]) -> Self {
        self.args = args;
        self
    }

    pub fn with_stack(mut self, stk_id: u64, stk: Vec<FrameId>) -> Self {
        self.stk_id = stk_id;
        self.stk = stk;
        self
    }

    pub fn with_link(mut self, link: EventId) -> Self {
        self.link = Some(link);
        self
    }

    pub fn with_off(mut self, off: i32) -> Self {
        self.off = off;
        self
    }

    pub fn proc_slot(&self) -> ProcSlot {
        match self.p {
            FAKE_P => ProcSlot::Fake,
            TIMER_P => ProcSlot::Timer,
            NETPOLL_P => ProcSlot::Netpoll,
            SYSCALL_P => ProcSlot::Syscall,
            GC_P => ProcSlot::Gc,
            p => ProcSlot::Logical(p),
        }
    }

    pub fn has_stack(&self) -> bool {
        !self.stk.is_empty()
    }
}
