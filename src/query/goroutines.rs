//! Goroutine lookup by where they started.

use crate::model::{GoroutineDescriptor, Trace, Transition};
use crate::timeline::Timelines;

/// Goroutines whose first owned event has a frame containing `substring`
///
/// The first owned event is usually the goroutine's creation; in that case
/// the stack of the linked first start is searched instead, since it shows
/// the goroutine's own entry point. Function names and file paths are
/// both searched. An empty substring lists every goroutine.
pub fn goroutines_matching<'a>(
    trace: &Trace,
    timelines: &'a Timelines,
    substring: &str,
) -> Vec<&'a GoroutineDescriptor> {
    timelines
        .iter()
        .filter(|desc| substring.is_empty() || starts_in(trace, desc, substring))
        .collect()
}

fn starts_in(trace: &Trace, desc: &GoroutineDescriptor, substring: &str) -> bool {
    let Some(first) = desc.events().first() else {
        return false;
    };
    let mut ev = trace.event(*first);
    if ev.ty.transition() == Transition::Create {
        if let Some(start) = trace.link(ev) {
            ev = start;
        }
    }
    trace
        .stack(ev)
        .any(|f| f.func.contains(substring) || f.file.contains(substring))
}
