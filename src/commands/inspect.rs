//! Read-only views over a loaded snapshot.
//!
//! `info`, `goroutine`, `goroutines` and `events` all load through the
//! session and print to stdout; none of them write files.

use super::models::EventsArgs;
use crate::aggregator::format_ns;
use crate::model::{EventType, Trace};
use crate::output::{describe_goroutine, goroutine_summary_line};
use crate::query::{goroutines_matching, select_events, EventFilter};
use crate::session::TraceSession;
use anyhow::{Context, Result};
use log::debug;
use std::collections::BTreeMap;

/// Print counts, time span and the busiest event kinds
pub fn execute_info(session: &TraceSession) -> Result<()> {
    let snapshot = session.snapshot().context("Failed to load trace snapshot")?;
    let trace = &snapshot.trace;

    println!("Events:     {}", trace.len());
    println!("Frames:     {}", trace.frames().len());
    println!("Goroutines: {}", snapshot.goroutines.len());

    if let (Some(first), Some(last)) = (trace.events().first(), trace.events().last()) {
        println!(
            "Time span:  {} .. {} ({})",
            first.ts,
            last.ts,
            format_ns(last.ts.saturating_sub(first.ts))
        );
    }

    let counts = kind_counts(trace);
    if !counts.is_empty() {
        println!();
        println!("Event kinds:");
        let mut by_count: Vec<_> = counts.into_iter().collect();
        by_count.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        for (ty, count) in by_count {
            println!("  {:<22} {:>10}", ty.name(), count);
        }
    }

    Ok(())
}

fn kind_counts(trace: &Trace) -> BTreeMap<EventType, usize> {
    let mut counts = BTreeMap::new();
    for ev in trace.events() {
        *counts.entry(ev.ty).or_insert(0) += 1;
    }
    counts
}

/// Print the full description of one goroutine
///
/// # Errors
/// * Snapshot load failures
/// * No goroutine with that id
pub fn execute_goroutine(session: &TraceSession, id: u64) -> Result<()> {
    let trace = session.trace().context("Failed to load trace snapshot")?;
    let timelines = session.timelines().context("Failed to build timelines")?;

    let Some(desc) = timelines.get(id) else {
        anyhow::bail!("No goroutine with id {} in this trace", id);
    };

    print!("{}", describe_goroutine(trace, desc));
    Ok(())
}

/// List goroutines, optionally only those starting in a matching frame
pub fn execute_goroutines(session: &TraceSession, filter: Option<&str>) -> Result<()> {
    let trace = session.trace().context("Failed to load trace snapshot")?;
    let timelines = session.timelines().context("Failed to build timelines")?;

    let matching = goroutines_matching(trace, timelines, filter.unwrap_or(""));
    debug!("{} of {} goroutines match", matching.len(), timelines.len());

    for desc in &matching {
        println!("{}", goroutine_summary_line(desc));
    }
    println!("{} goroutines", matching.len());
    Ok(())
}

/// Build the event filter described by the command-line arguments
///
/// Goroutine ids and stack patterns combine with AND.
pub fn build_filter(args: &EventsArgs) -> Result<EventFilter> {
    let stack = EventFilter::stack_contains(args.func.as_deref(), args.file.as_deref())
        .context("Invalid stack pattern")?;

    Ok(if args.goroutines.is_empty() {
        stack
    } else {
        EventFilter::for_goroutines(args.goroutines.iter().copied()).and(stack)
    })
}

/// Print events matching the filter, in trace order
pub fn execute_events(session: &TraceSession, args: &EventsArgs) -> Result<()> {
    let filter = build_filter(args)?;
    let trace = session.trace().context("Failed to load trace snapshot")?;

    let selected = select_events(trace, &filter);
    let shown = args.limit.unwrap_or(selected.len()).min(selected.len());

    for id in &selected[..shown] {
        let ev = trace.event(*id);
        print!("{:>8}  {:>14}  P{:<8} G{:<8} {}", id.index(), ev.ts, ev.p, ev.g, ev.ty);
        if let Some(link) = ev.link {
            print!(" -> #{}", link.index());
        }
        println!();
        if args.stacks {
            for frame in trace.stack(ev) {
                println!("\t\t{}", frame);
            }
        }
    }

    if shown < selected.len() {
        println!("... {} more events", selected.len() - shown);
    }
    println!("{} events matched", selected.len());
    Ok(())
}
