//! Composable event predicates.

use crate::model::{Event, EventId, Trace, Transition};
use crate::utils::error::QueryError;
use log::debug;
use regex::Regex;
use std::collections::BTreeSet;

/// A predicate over events of one trace
///
/// Filters hold no state and can be shared freely between threads.
#[derive(Debug, Clone)]
pub enum EventFilter {
    /// Matches every event
    All,
    /// Some frame's function matches `func`, or some frame's file matches `file`
    StackContains {
        func: Option<Regex>,
        file: Option<Regex>,
    },
    /// Events of one goroutine, including who created and who unblocked it
    ForGoroutine(u64),
    ForGoroutines(BTreeSet<u64>),
    And(Box<EventFilter>, Box<EventFilter>),
    Or(Box<EventFilter>, Box<EventFilter>),
    Not(Box<EventFilter>),
}

fn compile(field: &'static str, pattern: Option<&str>) -> Result<Option<Regex>, QueryError> {
    match pattern.filter(|p| !p.is_empty()) {
        None => Ok(None),
        Some(p) => Regex::new(p)
            .map(Some)
            .map_err(|source| QueryError::InvalidPattern {
                field,
                pattern: p.to_string(),
                source,
            }),
    }
}

impl EventFilter {
    pub fn all() -> Self {
        EventFilter::All
    }

    /// Match events whose stack has a frame matching either pattern
    ///
    /// Absent or empty patterns are ignored; with both absent every event
    /// matches.
    ///
    /// # Errors
    /// * `QueryError::InvalidPattern` - a pattern is not a valid regex
    pub fn stack_contains(func: Option<&str>, file: Option<&str>) -> Result<Self, QueryError> {
        let func = compile("function", func)?;
        let file = compile("file", file)?;
        if func.is_none() && file.is_none() {
            return Ok(EventFilter::All);
        }
        Ok(EventFilter::StackContains { func, file })
    }

    pub fn for_goroutine(id: u64) -> Self {
        EventFilter::ForGoroutine(id)
    }

    /// Union of `for_goroutine` over `ids`; an empty set matches nothing
    pub fn for_goroutines(ids: impl IntoIterator<Item = u64>) -> Self {
        EventFilter::ForGoroutines(ids.into_iter().collect())
    }

    pub fn and(self, other: EventFilter) -> Self {
        EventFilter::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: EventFilter) -> Self {
        EventFilter::Or(Box::new(self), Box::new(other))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        EventFilter::Not(Box::new(self))
    }

    /// Test the event behind `id`
    pub fn matches(&self, trace: &Trace, id: EventId) -> bool {
        trace
            .get_event(id)
            .is_some_and(|ev| self.matches_event(trace, ev))
    }

    fn matches_event(&self, trace: &Trace, ev: &Event) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::StackContains { func, file } => trace.stack(ev).any(|frame| {
                func.as_ref().is_some_and(|re| re.is_match(&frame.func))
                    || file.as_ref().is_some_and(|re| re.is_match(&frame.file))
            }),
            EventFilter::ForGoroutine(g) => involves(trace, ev, *g),
            EventFilter::ForGoroutines(ids) => ids.iter().any(|g| involves(trace, ev, *g)),
            EventFilter::And(a, b) => a.matches_event(trace, ev) && b.matches_event(trace, ev),
            EventFilter::Or(a, b) => a.matches_event(trace, ev) || b.matches_event(trace, ev),
            EventFilter::Not(a) => !a.matches_event(trace, ev),
        }
    }
}

/// Whether `ev` runs on `g`, created `g` or unblocked `g`
fn involves(trace: &Trace, ev: &Event, g: u64) -> bool {
    if ev.g == g {
        return true;
    }
    match ev.ty.transition() {
        Transition::Create => trace.link(ev).is_some_and(|start| start.g == g),
        Transition::Unblock => ev.args[0] == g,
        _ => false,
    }
}

/// Handles of every matching event, in trace order
///
/// **Public** - main entry point for ad-hoc queries
pub fn select_events(trace: &Trace, filter: &EventFilter) -> Vec<EventId> {
    let selected: Vec<EventId> = trace
        .iter()
        .filter(|(_, ev)| filter.matches_event(trace, ev))
        .map(|(id, _)| id)
        .collect();

    debug!("Selected {} of {} events", selected.len(), trace.len());
    selected
}
