//! Per-goroutine duration buckets.
//!
//! Every goroutine is in at most one of a handful of states at a time:
//! running, waiting for the scheduler, blocked on sync, blocked on the
//! network, in a syscall or sweeping. Each transition closes the interval
//! of the state being left and adds it to that state's bucket.

use crate::model::{Event, GoroutineMap, GoroutineStats, Trace, Transition};
use log::debug;
use std::collections::BTreeMap;

/// Start timestamps of the intervals still open for one goroutine
#[derive(Debug, Default, Clone, Copy)]
struct OpenIntervals {
    running: Option<i64>,
    sched_wait: Option<i64>,
    sync_block: Option<i64>,
    net_block: Option<i64>,
    syscall: Option<i64>,
    sweep: Option<i64>,
}

/// Add the span `from..to` to a bucket, saturating at the i64 bounds
fn add_span(bucket: &mut i64, from: i64, to: i64) {
    *bucket = bucket.saturating_add(to.saturating_sub(from));
}

#[derive(Debug)]
struct Tracker {
    stats: GoroutineStats,
    open: OpenIntervals,
    ended: bool,
}

impl Tracker {
    fn new(id: u64, ts: i64) -> Self {
        Self {
            stats: GoroutineStats::new(id, ts),
            // A new goroutine waits to be scheduled.
            open: OpenIntervals {
                sched_wait: Some(ts),
                ..OpenIntervals::default()
            },
            ended: false,
        }
    }

    fn stop_running(&mut self, ts: i64) {
        if let Some(since) = self.open.running.take() {
            add_span(&mut self.stats.exec_time, since, ts);
        }
    }

    fn close_all(&mut self, ts: i64) {
        self.stop_running(ts);
        let open = std::mem::take(&mut self.open);
        let s = &mut self.stats;
        if let Some(since) = open.sched_wait {
            add_span(&mut s.sched_wait_time, since, ts);
        }
        if let Some(since) = open.sync_block {
            add_span(&mut s.block_time, since, ts);
        }
        if let Some(since) = open.net_block {
            add_span(&mut s.io_time, since, ts);
        }
        if let Some(since) = open.syscall {
            add_span(&mut s.syscall_time, since, ts);
        }
        if let Some(since) = open.sweep {
            add_span(&mut s.sweep_time, since, ts);
        }
    }
}

fn start(t: &mut Tracker, trace: &Trace, ev: &Event) {
    if t.stats.pc == 0 {
        if let Some(top) = trace.stack(ev).next() {
            t.stats.pc = top.pc;
            t.stats.name = top.func.clone();
        }
    }
    if t.stats.start_time == 0 {
        t.stats.start_time = ev.ts;
    }
    if let Some(since) = t.open.sched_wait.take() {
        add_span(&mut t.stats.sched_wait_time, since, ev.ts);
    }
    t.open.running = Some(ev.ts);
}

/// Compute duration buckets for every goroutine created in the trace
///
/// **Public** - first pass of timeline reconstruction
///
/// # Algorithm
/// 1. A create event registers the goroutine in args[0]
/// 2. Each transition closes the interval it ends and opens the next one
/// 3. GC done charges the whole GC phase to every goroutine not yet ended
/// 4. At the last timestamp every open interval is closed
///
/// Events for goroutines that were never created are ignored here; the
/// timeline builder reports them.
pub fn goroutine_stats(trace: &Trace) -> GoroutineMap {
    let mut gs: BTreeMap<u64, Tracker> = BTreeMap::new();
    let mut gc_start: Option<i64> = None;
    let mut skipped = 0usize;

    for ev in trace.events() {
        let ts = ev.ts;
        match ev.ty.transition() {
            Transition::Nothing => {}
            Transition::Create => {
                let id = ev.args[0];
                gs.insert(id, Tracker::new(id, ts));
            }
            Transition::GcStart => gc_start = Some(ts),
            Transition::GcDone => {
                let phase_start = gc_start.take().unwrap_or(ts);
                for t in gs.values_mut().filter(|t| !t.ended) {
                    add_span(&mut t.stats.gc_time, phase_start.max(t.stats.creation_time), ts);
                }
            }
            Transition::Unblock => match gs.get_mut(&ev.args[0]) {
                Some(t) => {
                    if let Some(since) = t.open.net_block.take() {
                        add_span(&mut t.stats.io_time, since, ts);
                    }
                    if let Some(since) = t.open.sync_block.take() {
                        add_span(&mut t.stats.block_time, since, ts);
                    }
                    t.open.sched_wait.get_or_insert(ts);
                }
                None => skipped += 1,
            },
            transition => {
                let Some(t) = gs.get_mut(&ev.g) else {
                    // Sweeps also run on system goroutines outside the trace.
                    if !matches!(transition, Transition::SweepStart | Transition::SweepDone) {
                        skipped += 1;
                    }
                    continue;
                };
                match transition {
                    Transition::Start => start(t, trace, ev),
                    Transition::Finish => {
                        t.stop_running(ts);
                        t.stats.end_time = ts;
                        t.stats.total_time = ts.saturating_sub(t.stats.creation_time);
                        t.ended = true;
                    }
                    Transition::BlockSync => {
                        t.stop_running(ts);
                        t.open.sync_block = Some(ts);
                    }
                    Transition::BlockNet => {
                        t.stop_running(ts);
                        t.open.net_block = Some(ts);
                    }
                    Transition::BlockGc | Transition::BlockOther => t.stop_running(ts),
                    Transition::Yield => {
                        t.stop_running(ts);
                        t.open.sched_wait = Some(ts);
                    }
                    Transition::SyscallBlock => {
                        t.stop_running(ts);
                        t.open.syscall = Some(ts);
                    }
                    Transition::SyscallExit => {
                        if let Some(since) = t.open.syscall.take() {
                            add_span(&mut t.stats.syscall_time, since, ts);
                        }
                        t.open.sched_wait.get_or_insert(ts);
                    }
                    Transition::SweepStart => t.open.sweep = Some(ts),
                    Transition::SweepDone => {
                        if let Some(since) = t.open.sweep.take() {
                            add_span(&mut t.stats.sweep_time, since, ts);
                        }
                    }
                    Transition::Nothing
                    | Transition::Create
                    | Transition::GcStart
                    | Transition::GcDone
                    | Transition::Unblock => {}
                }
            }
        }
    }

    let last_ts = trace.last_ts();
    for t in gs.values_mut() {
        if !t.ended {
            t.close_all(last_ts);
            t.stats.end_time = last_ts;
            t.stats.total_time = last_ts.saturating_sub(t.stats.creation_time);
        }
    }

    if skipped > 0 {
        debug!("{} transitions named goroutines never created in this trace", skipped);
    }
    debug!("Computed statistics for {} goroutines", gs.len());

    gs.into_iter().map(|(id, t)| (id, t.stats)).collect()
}
