//! The closed taxonomy of trace event kinds.
//!
//! Every decision that depends on an event's type lives in one table:
//! which goroutine duration bucket a kind opens or closes, which goroutine
//! timelines it belongs to, what its link points at, and which profile it
//! starts a sample for. Code elsewhere asks the table instead of matching
//! on kinds directly.

use crate::utils::error::CodecError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Event kind, with its on-wire code as discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum EventType {
    None = 0,
    Batch = 1,
    Frequency = 2,
    Stack = 3,
    Gomaxprocs = 4,
    ProcStart = 5,
    ProcStop = 6,
    GCStart = 7,
    GCDone = 8,
    GCScanStart = 9,
    GCScanDone = 10,
    GCSweepStart = 11,
    GCSweepDone = 12,
    GoCreate = 13,
    GoStart = 14,
    GoEnd = 15,
    GoStop = 16,
    GoSched = 17,
    GoPreempt = 18,
    GoSleep = 19,
    GoBlock = 20,
    GoUnblock = 21,
    GoBlockSend = 22,
    GoBlockRecv = 23,
    GoBlockSelect = 24,
    GoBlockSync = 25,
    GoBlockCond = 26,
    GoBlockNet = 27,
    GoSysCall = 28,
    GoSysExit = 29,
    GoSysBlock = 30,
    GoWaiting = 31,
    GoInSyscall = 32,
    HeapAlloc = 33,
    NextGC = 34,
    TimerGoroutine = 35,
    FutileWakeup = 36,
    String = 37,
    GoStartLocal = 38,
    GoUnblockLocal = 39,
    GoSysExitLocal = 40,
    GoStartLabel = 41,
    GoBlockGC = 42,
}

/// Number of known event kinds
pub const EVENT_KIND_COUNT: usize = 43;

const ALL_KINDS: [EventType; EVENT_KIND_COUNT] = [
    EventType::None,
    EventType::Batch,
    EventType::Frequency,
    EventType::Stack,
    EventType::Gomaxprocs,
    EventType::ProcStart,
    EventType::ProcStop,
    EventType::GCStart,
    EventType::GCDone,
    EventType::GCScanStart,
    EventType::GCScanDone,
    EventType::GCSweepStart,
    EventType::GCSweepDone,
    EventType::GoCreate,
    EventType::GoStart,
    EventType::GoEnd,
    EventType::GoStop,
    EventType::GoSched,
    EventType::GoPreempt,
    EventType::GoSleep,
    EventType::GoBlock,
    EventType::GoUnblock,
    EventType::GoBlockSend,
    EventType::GoBlockRecv,
    EventType::GoBlockSelect,
    EventType::GoBlockSync,
    EventType::GoBlockCond,
    EventType::GoBlockNet,
    EventType::GoSysCall,
    EventType::GoSysExit,
    EventType::GoSysBlock,
    EventType::GoWaiting,
    EventType::GoInSyscall,
    EventType::HeapAlloc,
    EventType::NextGC,
    EventType::TimerGoroutine,
    EventType::FutileWakeup,
    EventType::String,
    EventType::GoStartLocal,
    EventType::GoUnblockLocal,
    EventType::GoSysExitLocal,
    EventType::GoStartLabel,
    EventType::GoBlockGC,
];

/// How a kind moves a goroutine between duration buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// No effect on goroutine statistics
    Nothing,
    /// New goroutine registered (target id in args[0])
    Create,
    /// Goroutine starts executing
    Start,
    /// Goroutine ends or stops for good
    Finish,
    /// Blocked on a channel, select, mutex or condition variable
    BlockSync,
    /// Blocked on the network poller
    BlockNet,
    /// Blocked assisting the garbage collector
    BlockGc,
    /// Sleep or generic block
    BlockOther,
    /// Preempted or yielded; waits for the scheduler
    Yield,
    /// Target goroutine (args[0]) made runnable
    Unblock,
    /// Entered a blocking syscall
    SyscallBlock,
    /// Returned from a syscall
    SyscallExit,
    SweepStart,
    SweepDone,
    GcStart,
    GcDone,
}

/// Which goroutine timelines a kind is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineRole {
    Ignored,
    /// Belongs to the goroutine in the event's `g` field
    Owned,
    /// Belongs to the created goroutine (args[0]) and to its creator
    Creation,
    /// Belongs to every goroutine alive at the event's timestamp
    GcPhase,
}

/// What an event's link points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkRole {
    Unlinked,
    /// End of the same GC phase
    PhaseEnd,
    /// First start of the created goroutine
    FirstStart,
    /// The end, stop or blocking event that closes this run
    RunEnd,
    /// The start that follows
    NextStart,
    /// The unblock that wakes this goroutine
    Unblock,
    /// The matching syscall exit
    SyscallExit,
}

/// The four blocking/latency profile views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    /// Network blocking
    Io,
    /// Synchronization blocking
    Block,
    /// Syscall blocking
    Syscall,
    /// Scheduler latency
    Sched,
}

impl ProfileKind {
    pub const ALL: [ProfileKind; 4] = [
        ProfileKind::Io,
        ProfileKind::Block,
        ProfileKind::Syscall,
        ProfileKind::Sched,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ProfileKind::Io => "io",
            ProfileKind::Block => "block",
            ProfileKind::Syscall => "syscall",
            ProfileKind::Sched => "sched",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ProfileKind::Io => "Network blocking profile",
            ProfileKind::Block => "Synchronization blocking profile",
            ProfileKind::Syscall => "Syscall blocking profile",
            ProfileKind::Sched => "Scheduler latency profile",
        }
    }

    /// Whether `end` is an acceptable link target for a sample of this kind
    pub fn accepts_end(self, end: EventType) -> bool {
        match self {
            ProfileKind::Io | ProfileKind::Block => {
                matches!(end, EventType::GoUnblock | EventType::GoUnblockLocal)
            }
            ProfileKind::Syscall => {
                matches!(end, EventType::GoSysExit | EventType::GoSysExitLocal)
            }
            ProfileKind::Sched => matches!(
                end,
                EventType::GoStart | EventType::GoStartLocal | EventType::GoStartLabel
            ),
        }
    }

    /// Index into per-kind arrays
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProfileKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "io" => Ok(ProfileKind::Io),
            "block" => Ok(ProfileKind::Block),
            "syscall" => Ok(ProfileKind::Syscall),
            "sched" => Ok(ProfileKind::Sched),
            other => Err(format!(
                "unknown profile kind '{}' (expected io, block, syscall or sched)",
                other
            )),
        }
    }
}

/// Everything the analysis needs to know about one event kind
#[derive(Debug, Clone, Copy)]
pub struct KindInfo {
    pub name: &'static str,
    pub transition: Transition,
    pub timeline: TimelineRole,
    pub link: LinkRole,
    pub profile: Option<ProfileKind>,
}

const fn kind(
    name: &'static str,
    transition: Transition,
    timeline: TimelineRole,
    link: LinkRole,
    profile: Option<ProfileKind>,
) -> KindInfo {
    KindInfo {
        name,
        transition,
        timeline,
        link,
        profile,
    }
}

const fn plain(name: &'static str) -> KindInfo {
    kind(name, Transition::Nothing, TimelineRole::Ignored, LinkRole::Unlinked, None)
}

use LinkRole as L;
use TimelineRole as R;
use Transition as T;

// Indexed by wire code; order must match `EventType`.
static KIND_TABLE: [KindInfo; EVENT_KIND_COUNT] = [
    plain("None"),
    plain("Batch"),
    plain("Frequency"),
    plain("Stack"),
    plain("Gomaxprocs"),
    plain("ProcStart"),
    plain("ProcStop"),
    kind("GCStart", T::GcStart, R::GcPhase, L::PhaseEnd, None),
    kind("GCDone", T::GcDone, R::GcPhase, L::Unlinked, None),
    kind("GCScanStart", T::Nothing, R::Ignored, L::PhaseEnd, None),
    plain("GCScanDone"),
    kind("GCSweepStart", T::SweepStart, R::GcPhase, L::PhaseEnd, None),
    kind("GCSweepDone", T::SweepDone, R::GcPhase, L::Unlinked, None),
    kind("GoCreate", T::Create, R::Creation, L::FirstStart, Some(ProfileKind::Sched)),
    kind("GoStart", T::Start, R::Owned, L::RunEnd, None),
    kind("GoEnd", T::Finish, R::Owned, L::Unlinked, None),
    kind("GoStop", T::Finish, R::Owned, L::Unlinked, None),
    kind("GoSched", T::Yield, R::Owned, L::NextStart, None),
    kind("GoPreempt", T::Yield, R::Owned, L::NextStart, None),
    kind("GoSleep", T::BlockOther, R::Owned, L::Unblock, None),
    kind("GoBlock", T::BlockOther, R::Owned, L::Unblock, None),
    kind("GoUnblock", T::Unblock, R::Owned, L::NextStart, Some(ProfileKind::Sched)),
    kind("GoBlockSend", T::BlockSync, R::Owned, L::Unblock, Some(ProfileKind::Block)),
    kind("GoBlockRecv", T::BlockSync, R::Owned, L::Unblock, Some(ProfileKind::Block)),
    kind("GoBlockSelect", T::BlockSync, R::Owned, L::Unblock, Some(ProfileKind::Block)),
    kind("GoBlockSync", T::BlockSync, R::Owned, L::Unblock, Some(ProfileKind::Block)),
    kind("GoBlockCond", T::BlockSync, R::Owned, L::Unblock, Some(ProfileKind::Block)),
    kind("GoBlockNet", T::BlockNet, R::Owned, L::Unblock, Some(ProfileKind::Io)),
    kind("GoSysCall", T::Nothing, R::Owned, L::SyscallExit, Some(ProfileKind::Syscall)),
    kind("GoSysExit", T::SyscallExit, R::Owned, L::NextStart, None),
    kind("GoSysBlock", T::SyscallBlock, R::Owned, L::Unlinked, None),
    kind("GoWaiting", T::Nothing, R::Owned, L::Unlinked, None),
    kind("GoInSyscall", T::Nothing, R::Owned, L::Unlinked, None),
    plain("HeapAlloc"),
    plain("NextGC"),
    plain("TimerGoroutine"),
    plain("FutileWakeup"),
    plain("String"),
    kind("GoStartLocal", T::Start, R::Owned, L::RunEnd, None),
    kind("GoUnblockLocal", T::Unblock, R::Owned, L::NextStart, Some(ProfileKind::Sched)),
    kind("GoSysExitLocal", T::SyscallExit, R::Owned, L::NextStart, None),
    kind("GoStartLabel", T::Start, R::Owned, L::RunEnd, None),
    kind("GoBlockGC", T::BlockGc, R::Owned, L::Unblock, Some(ProfileKind::Block)),
];

impl EventType {
    /// Table entry for this kind
    pub fn info(self) -> &'static KindInfo {
        &KIND_TABLE[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn transition(self) -> Transition {
        self.info().transition
    }

    pub fn timeline_role(self) -> TimelineRole {
        self.info().timeline
    }

    pub fn link_role(self) -> LinkRole {
        self.info().link
    }

    /// Profile for which this kind begins a sample, if any
    pub fn profile_kind(self) -> Option<ProfileKind> {
        self.info().profile
    }

    pub fn is_gc_phase(self) -> bool {
        self.timeline_role() == TimelineRole::GcPhase
    }

    /// Iterate over every known kind in code order
    pub fn all() -> impl Iterator<Item = EventType> {
        ALL_KINDS.iter().copied()
    }
}

impl TryFrom<u8> for EventType {
    type Error = CodecError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        ALL_KINDS
            .get(code as usize)
            .copied()
            .ok_or(CodecError::UnknownEventType(code))
    }
}

impl From<EventType> for u8 {
    fn from(ty: EventType) -> u8 {
        ty as u8
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
