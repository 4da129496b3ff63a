//! Trace data model.
//!
//! This module defines:
//! - Events, frames and their arena (`Trace`)
//! - The closed event-kind table
//! - Goroutine statistics and descriptors
//! - Diagnostics for anomalies skipped during analysis

pub mod diagnostic;
pub mod event;
pub mod frame;
pub mod goroutine;
pub mod kind;
pub mod trace;

// Re-export main types
pub use diagnostic::Diagnostic;
pub use event::{Event, EventId, ProcSlot, FAKE_P, GC_P, NETPOLL_P, SYSCALL_P, TIMER_P};
pub use frame::{Frame, FrameId};
pub use goroutine::{GoroutineDescriptor, GoroutineMap, GoroutineStats};
pub use kind::{EventType, KindInfo, LinkRole, ProfileKind, TimelineRole, Transition};
pub use trace::{Trace, TraceBuilder};
