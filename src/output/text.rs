//! Plain text views for terminals.
//!
//! - Full description of one goroutine with its events and stacks
//! - One line per goroutine for listings
//! - Hot path table for a profile

use crate::aggregator::{build_collapsed_stacks, format_ns, Profile};
use crate::model::{GoroutineDescriptor, GoroutineStats, Trace};
use std::fmt::Write;

/// Render a goroutine's statistics followed by its event list
///
/// **Public** - used by the `goroutine` command
///
/// Each event is printed as `ts (g) Name`, followed by `-> ts (g) Name` when
/// it has a link, then one indented line per stack frame.
pub fn describe_goroutine(trace: &Trace, desc: &GoroutineDescriptor) -> String {
    let mut buf = String::new();
    let _ = writeln!(buf, "{}", stats_line(&desc.stats));
    let _ = writeln!(buf, "Events:");

    for id in desc.events() {
        let Some(ev) = trace.get_event(*id) else {
            continue;
        };
        let _ = write!(buf, "\t{} ({}) {}", ev.ts, ev.g, ev.ty);
        if let Some(link) = trace.link(ev) {
            let _ = write!(buf, " -> {} ({}) {}", link.ts, link.g, link.ty);
        }
        buf.push('\n');
        for frame in trace.stack(ev) {
            let _ = writeln!(buf, "\t\t{}", frame);
        }
    }
    buf
}

fn stats_line(s: &GoroutineStats) -> String {
    format!(
        "{{id:{} name:{} pc:{} creation:{} start:{} end:{} exec:{} sched_wait:{} io:{} block:{} syscall:{} gc:{} sweep:{} total:{}}}",
        s.id,
        s.name,
        s.pc,
        s.creation_time,
        s.start_time,
        s.end_time,
        s.exec_time,
        s.sched_wait_time,
        s.io_time,
        s.block_time,
        s.syscall_time,
        s.gc_time,
        s.sweep_time,
        s.total_time,
    )
}

/// One listing line: id, name, event count and lifetime
pub fn goroutine_summary_line(desc: &GoroutineDescriptor) -> String {
    let s = &desc.stats;
    let name = if s.name.is_empty() { "?" } else { s.name.as_str() };
    format!(
        "{:>8}  {:<40}  {:>6} events  total {}",
        s.id,
        name,
        desc.events().len(),
        format_ns(s.total_time)
    )
}

/// Hot path table for a profile, heaviest folded paths first
///
/// **Public** - printed by `profile --summary`
pub fn profile_text_summary(profile: &Profile, max_lines: usize) -> String {
    let stacks = build_collapsed_stacks(profile);
    let total = profile.total_duration().max(1) as f64;

    let mut lines = Vec::new();
    lines.push(format!("{} profile: {}", profile.kind, profile.kind.description()));
    lines.push(format!("{:<60}  {:>12}  {:>7}", "Stack (innermost last)", "Delay", "%"));
    lines.push("-".repeat(83));

    for stack in stacks.iter().take(max_lines) {
        let percentage = stack.weight as f64 / total * 100.0;

        // Keep the innermost end visible
        let display_stack = if stack.stack.chars().count() > 60 {
            let tail: String = stack
                .stack
                .chars()
                .rev()
                .take(57)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            format!("...{}", tail)
        } else {
            stack.stack.clone()
        };

        lines.push(format!(
            "{:<60}  {:>12}  {:>6.1}%",
            display_stack,
            format_ns(stack.weight as i64),
            percentage
        ));
    }

    if stacks.len() > max_lines {
        lines.push(format!("... {} more paths", stacks.len() - max_lines));
    }

    lines.join("\n")
}
