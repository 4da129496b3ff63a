//! Blocking and latency profiles.
//!
//! Each profile kind pairs a begin event with the end event it links to
//! and charges the elapsed time to the stack captured at the begin event.
//! Samples with equal stack content merge, whatever their frame identity.

use crate::model::{Diagnostic, EventId, Frame, ProfileKind, Trace};
use log::{debug, warn};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

/// One distinct call stack with its accumulated cost
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sample {
    /// Innermost frame first
    pub stack: Vec<Frame>,
    pub count: u64,
    pub duration_ns: i64,
}

impl Sample {
    /// Function names joined root-first with `;`
    pub fn folded_stack(&self) -> String {
        self.stack
            .iter()
            .rev()
            .map(|f| f.func.as_str())
            .collect::<Vec<_>>()
            .join(";")
    }
}

/// Samples for one profile kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub kind: ProfileKind,
    /// Sorted by duration descending, then by stack
    pub samples: Vec<Sample>,
    #[serde(skip)]
    pub diagnostics: Vec<Diagnostic>,
}

impl Profile {
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn total_duration(&self) -> i64 {
        self.samples
            .iter()
            .fold(0i64, |acc, s| acc.saturating_add(s.duration_ns))
    }

    pub fn total_count(&self) -> u64 {
        self.samples.iter().map(|s| s.count).sum()
    }
}

/// Content of a frame that takes part in stack equality
type FrameKey<'a> = (&'a str, &'a str, i64);

fn frame_key(f: &Frame) -> FrameKey<'_> {
    (f.func.as_str(), f.file.as_str(), f.line)
}

fn compare_stacks(a: &[Frame], b: &[Frame]) -> Ordering {
    a.iter().map(frame_key).cmp(b.iter().map(frame_key))
}

/// Compute the profile of one kind over a whole trace
///
/// **Public** - main entry point for profile aggregation
///
/// # Algorithm
/// 1. Keep events whose kind begins a sample of `kind`
/// 2. Require a link to an acceptable end event (else `UnmatchedPair`)
/// 3. Require a captured stack (else `MissingStack`)
/// 4. Duration is end.ts - begin.ts; negative or overflowing drops the sample
/// 5. Merge by stack content, summing count and duration
pub fn compute_profile(trace: &Trace, kind: ProfileKind) -> Profile {
    let mut diagnostics = Vec::new();
    let mut index: HashMap<Vec<FrameKey<'_>>, usize> = HashMap::new();
    let mut acc: Vec<(EventId, i64, u64)> = Vec::new();

    for (id, ev) in trace.iter() {
        if ev.ty.profile_kind() != Some(kind) {
            continue;
        }

        let end = match trace.link(ev) {
            Some(end) if kind.accepts_end(end.ty) => end,
            _ => {
                diagnostics.push(Diagnostic::UnmatchedPair { event: id, profile: kind });
                continue;
            }
        };

        if !ev.has_stack() {
            diagnostics.push(Diagnostic::MissingStack { event: id });
            continue;
        }

        let Some(duration) = end.ts.checked_sub(ev.ts) else {
            diagnostics.push(Diagnostic::DurationOverflow { event: id });
            continue;
        };
        if duration < 0 {
            diagnostics.push(Diagnostic::NegativeDuration { event: id, duration });
            continue;
        }

        let key: Vec<FrameKey<'_>> = trace.stack(ev).map(frame_key).collect();
        let slot = *index.entry(key).or_insert_with(|| {
            acc.push((id, 0, 0));
            acc.len() - 1
        });
        let (_, total, count) = &mut acc[slot];
        *total = total.saturating_add(duration);
        *count += 1;
    }

    let mut samples: Vec<Sample> = acc
        .into_iter()
        .map(|(first, duration_ns, count)| Sample {
            stack: trace.stack(trace.event(first)).cloned().collect(),
            count,
            duration_ns,
        })
        .collect();

    samples.sort_by(|a, b| {
        b.duration_ns
            .cmp(&a.duration_ns)
            .then_with(|| compare_stacks(&a.stack, &b.stack))
    });

    if !diagnostics.is_empty() {
        warn!(
            "{} profile: skipped {} begin events (see diagnostics)",
            kind,
            diagnostics.len()
        );
    }
    debug!("{} profile: {} distinct stacks", kind, samples.len());

    Profile {
        kind,
        samples,
        diagnostics,
    }
}
