//! Non-fatal anomalies found while analysing a trace.

use super::event::EventId;
use super::kind::ProfileKind;
use serde::Serialize;
use std::fmt;

/// An anomaly that was skipped over rather than aborting the analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A profile begin event without a link to a matching end event
    UnmatchedPair { event: EventId, profile: ProfileKind },
    /// A paired sample whose end precedes its begin
    NegativeDuration { event: EventId, duration: i64 },
    /// A paired sample whose duration does not fit in an i64
    DurationOverflow { event: EventId },
    /// A profile begin event with no captured stack
    MissingStack { event: EventId },
    /// An event naming a goroutine that was never created
    UnknownGoroutine { event: EventId, goroutine: u64 },
}

impl Diagnostic {
    /// The event the anomaly was found at
    pub fn event(&self) -> EventId {
        match *self {
            Diagnostic::UnmatchedPair { event, .. }
            | Diagnostic::NegativeDuration { event, .. }
            | Diagnostic::DurationOverflow { event }
            | Diagnostic::MissingStack { event }
            | Diagnostic::UnknownGoroutine { event, .. } => event,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnmatchedPair { event, profile } => {
                write!(f, "event {} begins a {} sample but has no matching end", event.index(), profile)
            }
            Diagnostic::NegativeDuration { event, duration } => {
                write!(f, "event {} pairs with an earlier event ({} ns)", event.index(), duration)
            }
            Diagnostic::DurationOverflow { event } => {
                write!(f, "event {} pairs with an end too far away to measure", event.index())
            }
            Diagnostic::MissingStack { event } => {
                write!(f, "event {} has no captured stack", event.index())
            }
            Diagnostic::UnknownGoroutine { event, goroutine } => {
                write!(f, "event {} names unknown goroutine {}", event.index(), goroutine)
            }
        }
    }
}
