//! Snapshot decoding.
//!
//! Pass one reads every record linearly, keeping raw frame and link
//! indices. Pass two range-checks those indices against the complete
//! tables and turns them into handles; links may point forward. Events
//! must also arrive in non-decreasing timestamp order.

use super::records::{decode_frame, decode_goroutine, EventRecord, Header, NO_LINK};
use super::varint::WireReader;
use super::window::SlidingWindow;
use super::Snapshot;
use crate::model::{Event, EventId, Frame, FrameId, GoroutineMap, GoroutineStats, Trace};
use crate::utils::config::{MAX_PREALLOC_RECORDS, RECORD_WINDOW_HINT};
use crate::utils::error::CodecError;
use log::{debug, warn};
use std::io::Read;

/// Decode one record, widening the window until it fits or input ends
fn next_record<R, T, F>(window: &mut SlidingWindow<R>, decode: F) -> Result<T, CodecError>
where
    R: Read,
    F: Fn(&mut WireReader<'_>) -> Result<T, CodecError>,
{
    let mut want = RECORD_WINDOW_HINT;
    loop {
        let bytes = window.fill(want)?;
        let seen = bytes.len();
        let exhausted = seen < want;

        let mut r = WireReader::new(bytes);
        match decode(&mut r) {
            Ok(value) => {
                let used = r.position();
                window.advance(used)?;
                return Ok(value);
            }
            Err(e) if e.is_incomplete() && !exhausted => {
                want = seen.saturating_mul(2).max(RECORD_WINDOW_HINT);
            }
            Err(e) => return Err(e),
        }
    }
}

fn read_all<R, T, F>(window: &mut SlidingWindow<R>, count: usize, decode: F) -> Result<Vec<T>, CodecError>
where
    R: Read,
    F: Fn(&mut WireReader<'_>) -> Result<T, CodecError>,
{
    let mut out = Vec::with_capacity(count.min(MAX_PREALLOC_RECORDS));
    for _ in 0..count {
        out.push(next_record(window, &decode)?);
    }
    Ok(out)
}

fn resolve_event(index: usize, rec: EventRecord, frame_count: usize, event_count: usize) -> Result<Event, CodecError> {
    let mut stk = Vec::with_capacity(rec.stk.len());
    for raw in rec.stk {
        if raw < 0 || raw as u64 >= frame_count as u64 {
            return Err(CodecError::FrameIndex {
                event: index,
                index: raw,
                len: frame_count,
            });
        }
        stk.push(FrameId::new(raw as usize));
    }

    let link = match rec.link {
        NO_LINK => None,
        raw if raw >= 0 && (raw as u64) < event_count as u64 => Some(EventId::new(raw as usize)),
        raw => {
            return Err(CodecError::LinkIndex {
                event: index,
                index: raw,
                len: event_count,
            })
        }
    };

    Ok(Event {
        off: rec.off,
        ty: rec.ty,
        ts: rec.ts,
        p: rec.p,
        g: rec.g,
        stk_id: rec.stk_id,
        stk,
        args: rec.args,
        link,
    })
}

/// Read a snapshot from `reader`
///
/// **Public** - main entry point for decoding
///
/// The whole input must be consumed: bytes after the last declared record
/// are an error. No partial result is returned on failure.
///
/// # Errors
/// * `CodecError::Io` - the reader failed
/// * any other `CodecError` - malformed input
pub fn unmarshal<R: Read>(reader: R) -> Result<Snapshot, CodecError> {
    let mut window = SlidingWindow::new(reader);

    let header = next_record(&mut window, Header::decode)?;
    let (event_count, frame_count, goroutine_count) = header.counts()?;
    debug!(
        "Decoding snapshot: {} events, {} frames, {} goroutines",
        event_count, frame_count, goroutine_count
    );

    let records = read_all(&mut window, event_count, EventRecord::decode)?;
    let frames: Vec<Frame> = read_all(&mut window, frame_count, decode_frame)?;
    let stats: Vec<GoroutineStats> = read_all(&mut window, goroutine_count, decode_goroutine)?;

    let trailing = window.fill(1)?.len();
    if trailing > 0 {
        return Err(CodecError::TrailingBytes(trailing));
    }

    let events = records
        .into_iter()
        .enumerate()
        .map(|(i, rec)| resolve_event(i, rec, frame_count, event_count))
        .collect::<Result<Vec<_>, _>>()?;

    if let Some(i) = events.windows(2).position(|w| w[1].ts < w[0].ts) {
        return Err(CodecError::OutOfOrder {
            event: i + 1,
            ts: events[i + 1].ts,
            previous: events[i].ts,
        });
    }

    let mut goroutines = GoroutineMap::new();
    for g in stats {
        let id = g.id;
        if goroutines.insert(id, g).is_some() {
            warn!("Snapshot lists goroutine {} more than once; keeping the last record", id);
        }
    }

    Ok(Snapshot {
        trace: Trace::from_parts_unchecked(events, frames),
        goroutines,
    })
}

/// Decode a snapshot held in memory
pub fn unmarshal_slice(bytes: &[u8]) -> Result<Snapshot, CodecError> {
    unmarshal(bytes)
}
