//! The trace arena.
//!
//! One vector owns every event and one owns every frame. Stacks and links
//! are typed handles into those vectors, so the pointer graph of the
//! original capture becomes plain indices.

use super::event::{Event, EventId};
use super::frame::{Frame, FrameId};
use crate::utils::error::ParseError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// All events and frames of one capture
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    #[serde(default)]
    frames: Vec<Frame>,
    #[serde(default)]
    events: Vec<Event>,
}

impl Trace {
    /// Build a trace, checking every handle and the timestamp order
    ///
    /// # Errors
    /// * `ParseError::InvalidTrace` - dangling frame/link handle or
    ///   events out of timestamp order
    pub fn new(events: Vec<Event>, frames: Vec<Frame>) -> Result<Self, ParseError> {
        let trace = Self { frames, events };
        trace.validate()?;
        Ok(trace)
    }

    /// Build without validation; handles must already be in range and
    /// timestamps non-decreasing
    pub(crate) fn from_parts_unchecked(events: Vec<Event>, frames: Vec<Frame>) -> Self {
        Self { frames, events }
    }

    /// Check handle validity and timestamp order
    pub fn validate(&self) -> Result<(), ParseError> {
        let mut last_ts = i64::MIN;
        for (i, ev) in self.events.iter().enumerate() {
            if ev.ts < last_ts {
                return Err(ParseError::InvalidTrace(format!(
                    "event {} at ts {} precedes previous event at ts {}",
                    i, ev.ts, last_ts
                )));
            }
            last_ts = ev.ts;

            if let Some(f) = ev.stk.iter().find(|f| f.0 >= self.frames.len()) {
                return Err(ParseError::InvalidTrace(format!(
                    "event {} references frame {} of {}",
                    i,
                    f.0,
                    self.frames.len()
                )));
            }
            if let Some(link) = ev.link {
                if link.0 >= self.events.len() {
                    return Err(ParseError::InvalidTrace(format!(
                        "event {} links to event {} of {}",
                        i,
                        link.0,
                        self.events.len()
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Resolve an event handle
    ///
    /// Handles come from this trace, so they are always in range.
    pub fn event(&self, id: EventId) -> &Event {
        &self.events[id.0]
    }

    pub fn get_event(&self, id: EventId) -> Option<&Event> {
        self.events.get(id.0)
    }

    pub fn frame(&self, id: FrameId) -> &Frame {
        &self.frames[id.0]
    }

    /// The event `ev` links to, if any
    pub fn link(&self, ev: &Event) -> Option<&Event> {
        ev.link.map(|id| self.event(id))
    }

    /// Frames of an event's stack, innermost first
    pub fn stack<'a>(&'a self, ev: &'a Event) -> impl Iterator<Item = &'a Frame> + 'a {
        ev.stk.iter().map(move |id| self.frame(*id))
    }

    /// Events with their handles, in timestamp order
    pub fn iter(&self) -> impl Iterator<Item = (EventId, &Event)> {
        self.events.iter().enumerate().map(|(i, ev)| (EventId(i), ev))
    }

    /// Timestamp of the last event, or 0 for an empty trace
    pub fn last_ts(&self) -> i64 {
        self.events.last().map(|ev| ev.ts).unwrap_or(0)
    }

    /// Whether two traces describe the same capture
    ///
    /// Events must match field by field. Stacks are compared by resolved
    /// frame content, and two stack slots must share a frame identity in
    /// `self` exactly when they share one in `other`. Arena order and
    /// frames no event references are ignored.
    pub fn is_equivalent(&self, other: &Trace) -> bool {
        if self.events.len() != other.events.len() {
            return false;
        }

        let mut forward: HashMap<FrameId, FrameId> = HashMap::new();
        let mut backward: HashMap<FrameId, FrameId> = HashMap::new();

        for (a, b) in self.events.iter().zip(&other.events) {
            let same_fields = a.off == b.off
                && a.ty == b.ty
                && a.ts == b.ts
                && a.p == b.p
                && a.g == b.g
                && a.stk_id == b.stk_id
                && a.args == b.args
                && a.link == b.link
                && a.stk.len() == b.stk.len();
            if !same_fields {
                return false;
            }

            for (&fa, &fb) in a.stk.iter().zip(&b.stk) {
                if self.frames.get(fa.0) != other.frames.get(fb.0) {
                    return false;
                }
                if *forward.entry(fa).or_insert(fb) != fb || *backward.entry(fb).or_insert(fa) != fa {
                    return false;
                }
            }
        }
        true
    }

    pub fn into_parts(self) -> (Vec<Event>, Vec<Frame>) {
        (self.events, self.frames)
    }
}

/// Incremental trace construction for parsers
///
/// Frames are interned by content with `intern_frame`; `push_frame` keeps a
/// distinct identity even for equal content.
#[derive(Debug, Default)]
pub struct TraceBuilder {
    frames: Vec<Frame>,
    interned: HashMap<Frame, FrameId>,
    events: Vec<Event>,
}

impl TraceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the handle of an equal frame, adding it if unseen
    pub fn intern_frame(&mut self, frame: Frame) -> FrameId {
        if let Some(id) = self.interned.get(&frame) {
            return *id;
        }
        let id = self.push_frame(frame.clone());
        self.interned.insert(frame, id);
        id
    }

    /// Add a frame with a fresh identity
    pub fn push_frame(&mut self, frame: Frame) -> FrameId {
        self.frames.push(frame);
        FrameId(self.frames.len() - 1)
    }

    pub fn push_event(&mut self, event: Event) -> EventId {
        self.events.push(event);
        EventId(self.events.len() - 1)
    }

    /// Point `from`'s link at `to`; either may be added later than the other
    pub fn set_link(&mut self, from: EventId, to: EventId) {
        if let Some(ev) = self.events.get_mut(from.0) {
            ev.link = Some(to);
        }
    }

    pub fn build(self) -> Result<Trace, ParseError> {
        Trace::new(self.events, self.frames)
    }
}
