//! Per-goroutine event subsequences.

use crate::model::{
    Diagnostic, EventId, GoroutineDescriptor, GoroutineMap, TimelineRole, Trace,
};
use log::{debug, warn};
use std::collections::BTreeMap;

/// Descriptors for every goroutine, plus anything skipped on the way
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timelines {
    pub descriptors: BTreeMap<u64, GoroutineDescriptor>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Timelines {
    pub fn get(&self, id: u64) -> Option<&GoroutineDescriptor> {
        self.descriptors.get(&id)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GoroutineDescriptor> {
        self.descriptors.values()
    }
}

/// Attach each event (and its link) to the goroutines that own it
///
/// **Public** - second pass of timeline reconstruction
///
/// # Arguments
/// * `trace` - the full, time-ordered event arena
/// * `stats` - per-goroutine statistics; one descriptor is built per entry
///
/// # Ownership rules
/// - goroutine-owned kinds belong to `g`
/// - a create belongs to the created goroutine (args[0]) and to its creator
/// - GC phase events belong to every goroutine alive at their timestamp
///
/// Each list is sorted by (timestamp, position) and deduplicated.
pub fn build_timelines(trace: &Trace, stats: &GoroutineMap) -> Timelines {
    let mut lists: BTreeMap<u64, Vec<EventId>> = stats.keys().map(|id| (*id, Vec::new())).collect();
    let mut diagnostics = Vec::new();

    for (id, ev) in trace.iter() {
        let mut attach = |g: u64, diagnostics: &mut Vec<Diagnostic>| match lists.get_mut(&g) {
            Some(list) => {
                list.push(id);
                if let Some(link) = ev.link {
                    list.push(link);
                }
            }
            None if g != 0 => {
                warn!("Event {} ({}) names unknown goroutine {}", id.index(), ev.ty, g);
                diagnostics.push(Diagnostic::UnknownGoroutine { event: id, goroutine: g });
            }
            None => {}
        };

        match ev.ty.timeline_role() {
            TimelineRole::Ignored => {}
            TimelineRole::Owned => attach(ev.g, &mut diagnostics),
            TimelineRole::Creation => {
                attach(ev.args[0], &mut diagnostics);
                if ev.g != ev.args[0] {
                    attach(ev.g, &mut diagnostics);
                }
            }
            TimelineRole::GcPhase => {
                for (g, s) in stats {
                    if s.alive_at(ev.ts) {
                        attach(*g, &mut diagnostics);
                    }
                }
            }
        }
    }

    let descriptors: BTreeMap<u64, GoroutineDescriptor> = lists
        .into_iter()
        .filter_map(|(g, mut events)| {
            let s = stats.get(&g)?;
            sort_dedup(trace, &mut events);
            Some((g, GoroutineDescriptor::new(s.clone(), events)))
        })
        .collect();

    debug!(
        "Built {} goroutine timelines ({} diagnostics)",
        descriptors.len(),
        diagnostics.len()
    );

    Timelines {
        descriptors,
        diagnostics,
    }
}

/// Sort by (ts, position), then drop adjacent repeats in one pass
fn sort_dedup(trace: &Trace, events: &mut Vec<EventId>) {
    events.sort_by_key(|id| (trace.event(*id).ts, *id));
    events.dedup();
}
