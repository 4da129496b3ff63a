//! Snapshot encoding.
//!
//! Before anything is written, the frames reachable from events are
//! flattened into one table by identity (`FrameId`), in first-encounter
//! order. Events keep their arena positions, so a link is written as the
//! linked event's position.

use super::records::{encode_frame, encode_goroutine, EventRecord, Header, NO_LINK};
use crate::model::{Event, FrameId, GoroutineMap, Trace};
use crate::utils::error::CodecError;
use log::debug;
use std::io::Write;

/// Frames reachable from events, deduplicated by identity
#[derive(Debug)]
pub(crate) struct FrameTable {
    /// Arena id -> table position
    positions: Vec<Option<usize>>,
    /// Table position -> arena id
    order: Vec<FrameId>,
}

impl FrameTable {
    pub(crate) fn flatten(trace: &Trace) -> Result<Self, CodecError> {
        let arena_len = trace.frames().len();
        let mut positions = vec![None; arena_len];
        let mut order = Vec::new();

        for (i, ev) in trace.events().iter().enumerate() {
            for id in &ev.stk {
                let slot = positions.get_mut(id.index()).ok_or(CodecError::FrameIndex {
                    event: i,
                    index: id.index() as i64,
                    len: arena_len,
                })?;
                if slot.is_none() {
                    *slot = Some(order.len());
                    order.push(*id);
                }
            }
        }

        Ok(Self { positions, order })
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    fn position(&self, id: FrameId) -> i64 {
        // Every id in an event stack was registered by `flatten`.
        self.positions[id.index()].map(|p| p as i64).unwrap_or(NO_LINK)
    }
}

fn to_record(index: usize, ev: &Event, frames: &FrameTable, event_count: usize) -> Result<EventRecord, CodecError> {
    let link = match ev.link {
        None => NO_LINK,
        Some(id) if id.index() < event_count => id.index() as i64,
        Some(id) => {
            return Err(CodecError::LinkIndex {
                event: index,
                index: id.index() as i64,
                len: event_count,
            })
        }
    };

    Ok(EventRecord {
        ty: ev.ty,
        ts: ev.ts,
        p: ev.p,
        g: ev.g,
        stk_id: ev.stk_id,
        stk: ev.stk.iter().map(|id| frames.position(*id)).collect(),
        args: ev.args,
        link,
        off: ev.off,
    })
}

/// Write a snapshot of `trace` and `goroutines` to `writer`
///
/// **Public** - main entry point for encoding
///
/// Goroutines are written in ascending id order. The writer is not
/// buffered here; pass a `BufWriter` for files.
///
/// # Errors
/// * `CodecError::Io` - the writer failed
/// * `CodecError::FrameIndex` / `CodecError::LinkIndex` - a handle in the
///   trace does not resolve
pub fn marshal<W: Write>(
    mut writer: W,
    trace: &Trace,
    goroutines: &GoroutineMap,
) -> Result<(), CodecError> {
    let frames = FrameTable::flatten(trace)?;
    let event_count = trace.len();

    debug!(
        "Encoding snapshot: {} events, {} frames ({} in arena), {} goroutines",
        event_count,
        frames.len(),
        trace.frames().len(),
        goroutines.len()
    );

    let mut buf = Vec::with_capacity(256);
    Header {
        events: event_count as i64,
        frames: frames.len() as i64,
        goroutines: goroutines.len() as i64,
    }
    .encode(&mut buf);
    writer.write_all(&buf)?;

    for (i, ev) in trace.events().iter().enumerate() {
        buf.clear();
        to_record(i, ev, &frames, event_count)?.encode(&mut buf);
        writer.write_all(&buf)?;
    }

    for id in &frames.order {
        buf.clear();
        encode_frame(&mut buf, trace.frame(*id));
        writer.write_all(&buf)?;
    }

    for g in goroutines.values() {
        buf.clear();
        encode_goroutine(&mut buf, g);
        writer.write_all(&buf)?;
    }

    writer.flush()?;
    Ok(())
}

/// Encode a snapshot into memory
pub fn marshal_to_vec(trace: &Trace, goroutines: &GoroutineMap) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::new();
    marshal(&mut out, trace, goroutines)?;
    Ok(out)
}
