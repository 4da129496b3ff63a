//! Goroutine descriptors.

use super::event::EventId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lifetime statistics for one goroutine
///
/// This is the part of a descriptor that is persisted in snapshots. All
/// times are nanoseconds; the seven buckets do not overlap.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoroutineStats {
    pub id: u64,
    pub name: String,
    /// Entry program counter
    pub pc: u64,
    pub creation_time: i64,
    pub start_time: i64,
    pub end_time: i64,
    pub exec_time: i64,
    pub sched_wait_time: i64,
    pub io_time: i64,
    pub block_time: i64,
    pub syscall_time: i64,
    pub gc_time: i64,
    pub sweep_time: i64,
    pub total_time: i64,
}

impl GoroutineStats {
    pub fn new(id: u64, creation_time: i64) -> Self {
        Self {
            id,
            creation_time,
            ..Default::default()
        }
    }

    /// Whether `ts` falls within [creation_time, end_time]
    pub fn alive_at(&self, ts: i64) -> bool {
        self.creation_time <= ts && ts <= self.end_time
    }
}

/// Goroutine statistics keyed by goroutine id
pub type GoroutineMap = BTreeMap<u64, GoroutineStats>;

/// Statistics plus the goroutine's own event subsequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoroutineDescriptor {
    pub stats: GoroutineStats,
    events: Vec<EventId>,
}

impl GoroutineDescriptor {
    /// `events` must already be sorted by timestamp and duplicate free
    pub(crate) fn new(stats: GoroutineStats, events: Vec<EventId>) -> Self {
        Self { stats, events }
    }

    pub fn id(&self) -> u64 {
        self.stats.id
    }

    /// Owned events, ordered by timestamp
    pub fn events(&self) -> &[EventId] {
        &self.events
    }
}
