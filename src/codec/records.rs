//! Fixed-shape records of the snapshot format.
//!
//! Layout, in order:
//! - header: events i64, frames i64, goroutines i64 (all little endian)
//! - event: type u8, ts i64, p zigzag32, g u64, stk_id u64,
//!   stk (uvarint count + zigzag64 indices), args 3 x u64,
//!   link zigzag64 (-1 = none), off zigzag32
//! - frame: pc u64, fn string, file string, line i64
//! - goroutine: id u64, name string, pc u64, then eleven i64 times

use super::varint::{
    put_i64, put_string, put_u64, put_u8, put_uvarint, put_varint32, put_varint64, WireReader,
};
use crate::model::{EventType, Frame, GoroutineStats};
use crate::utils::config::HEADER_SIZE;
use crate::utils::error::CodecError;

/// Link value meaning "no linked event"
pub const NO_LINK: i64 = -1;

/// Record counts at the start of a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub events: i64,
    pub frames: i64,
    pub goroutines: i64,
}

impl Header {
    pub fn encode(&self, buf: &mut Vec<u8>) {
        put_i64(buf, self.events);
        put_i64(buf, self.frames);
        put_i64(buf, self.goroutines);
    }

    pub fn decode(r: &mut WireReader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            events: r.i64("header")?,
            frames: r.i64("header")?,
            goroutines: r.i64("header")?,
        })
    }

    /// Counts as sizes, rejecting negative values
    pub fn counts(&self) -> Result<(usize, usize, usize), CodecError> {
        Ok((
            count(self.events, "event")?,
            count(self.frames, "frame")?,
            count(self.goroutines, "goroutine")?,
        ))
    }
}

fn count(value: i64, context: &'static str) -> Result<usize, CodecError> {
    if value < 0 {
        return Err(CodecError::NegativeCount { context, count: value });
    }
    usize::try_from(value).map_err(|_| CodecError::LengthOverflow {
        context,
        length: value as u64,
        remaining: 0,
    })
}

const _: () = assert!(HEADER_SIZE == 24);

/// Event record with unresolved frame and link indices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub ty: EventType,
    pub ts: i64,
    pub p: i32,
    pub g: u64,
    pub stk_id: u64,
    pub stk: Vec<i64>,
    pub args: [u64; 3],
    pub link: i64,
    pub off: i32,
}

impl EventRecord {
    pub fn encode(&self, buf: &mut Vec<u8>) {
        put_u8(buf, self.ty.code());
        put_i64(buf, self.ts);
        put_varint32(buf, self.p);
        put_u64(buf, self.g);
        put_u64(buf, self.stk_id);
        put_uvarint(buf, self.stk.len() as u64);
        for idx in &self.stk {
            put_varint64(buf, *idx);
        }
        for arg in &self.args {
            put_u64(buf, *arg);
        }
        put_varint64(buf, self.link);
        put_varint32(buf, self.off);
    }

    pub fn decode(r: &mut WireReader<'_>) -> Result<Self, CodecError> {
        let ty = EventType::try_from(r.u8("event type")?)?;
        let ts = r.i64("event ts")?;
        let p = r.varint32("event p")?;
        let g = r.u64("event g")?;
        let stk_id = r.u64("event stk_id")?;

        let depth = r.length(1, "event stack")?;
        let mut stk = Vec::with_capacity(depth);
        for _ in 0..depth {
            stk.push(r.varint64("event stack")?);
        }

        let mut args = [0u64; 3];
        for arg in &mut args {
            *arg = r.u64("event args")?;
        }

        let link = r.varint64("event link")?;
        let off = r.varint32("event off")?;

        Ok(Self {
            ty,
            ts,
            p,
            g,
            stk_id,
            stk,
            args,
            link,
            off,
        })
    }
}

pub fn encode_frame(buf: &mut Vec<u8>, frame: &Frame) {
    put_u64(buf, frame.pc);
    put_string(buf, &frame.func);
    put_string(buf, &frame.file);
    put_i64(buf, frame.line);
}

pub fn decode_frame(r: &mut WireReader<'_>) -> Result<Frame, CodecError> {
    Ok(Frame {
        pc: r.u64("frame pc")?,
        func: r.string("frame fn")?,
        file: r.string("frame file")?,
        line: r.i64("frame line")?,
    })
}

pub fn encode_goroutine(buf: &mut Vec<u8>, g: &GoroutineStats) {
    put_u64(buf, g.id);
    put_string(buf, &g.name);
    put_u64(buf, g.pc);
    for t in [
        g.creation_time,
        g.start_time,
        g.end_time,
        g.exec_time,
        g.sched_wait_time,
        g.io_time,
        g.block_time,
        g.syscall_time,
        g.gc_time,
        g.sweep_time,
        g.total_time,
    ] {
        put_i64(buf, t);
    }
}

pub fn decode_goroutine(r: &mut WireReader<'_>) -> Result<GoroutineStats, CodecError> {
    let id = r.u64("goroutine id")?;
    let name = r.string("goroutine name")?;
    let pc = r.u64("goroutine pc")?;
    let mut times = [0i64; 11];
    for t in &mut times {
        *t = r.i64("goroutine times")?;
    }
    let [creation_time, start_time, end_time, exec_time, sched_wait_time, io_time, block_time, syscall_time, gc_time, sweep_time, total_time] =
        times;
    Ok(GoroutineStats {
        id,
        name,
        pc,
        creation_time,
        start_time,
        end_time,
        exec_time,
        sched_wait_time,
        io_time,
        block_time,
        syscall_time,
        gc_time,
        sweep_time,
        total_time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_is_24_bytes() {
        let mut buf = Vec::new();
        Header { events: 3, frames: 2, goroutines: 1 }.encode(&mut buf);
        assert_eq!(buf.len(), HEADER_SIZE);
        assert_eq!(&buf[..8], &3i64.to_le_bytes());
    }

    #[test]
    fn test_negative_header_count() {
        let header = Header { events: -1, frames: 0, goroutines: 0 };
        assert!(matches!(header.counts(), Err(CodecError::NegativeCount { count: -1, .. })));
    }

    #[test]
    fn test_event_record_layout() {
        let rec = EventRecord {
            ty: EventType::GoStart,
            ts: 1,
            p: -1,
            g: 2,
            stk_id: 3,
            stk: vec![0, 1],
            args: [4, 5, 6],
            link: NO_LINK,
            off: 7,
        };
        let mut buf = Vec::new();
        rec.encode(&mut buf);
        // type + ts + p + g + stk_id + count + 2 indices + args + link + off
        assert_eq!(buf.len(), 1 + 8 + 1 + 8 + 8 + 1 + 2 + 24 + 1 + 1);
        assert_eq!(buf[0], 14);
        assert_eq!(buf[9], 1, "p=-1 zigzags to 1");

        let mut r = WireReader::new(&buf);
        assert_eq!(EventRecord::decode(&mut r).unwrap(), rec);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_goroutine_record_is_fixed_after_name() {
        let g = GoroutineStats {
            name: "main.worker".to_string(),
            total_time: 99,
            ..GoroutineStats::new(12345, 10)
        };
        let mut buf = Vec::new();
        encode_goroutine(&mut buf, &g);
        assert_eq!(buf.len(), 8 + 1 + g.name.len() + 8 + 11 * 8);
        assert_eq!(decode_goroutine(&mut WireReader::new(&buf)).unwrap(), g);
    }

    #[test]
    fn test_stack_count_larger_than_input() {
        let mut buf = Vec::new();
        EventRecord {
            ty: EventType::GoEnd,
            ts: 0,
            p: 0,
            g: 0,
            stk_id: 0,
            stk: vec![],
            args: [0; 3],
            link: NO_LINK,
            off: 0,
        }
        .encode(&mut buf);
        // Patch the stack count (after type, ts, p, g, stk_id) to 100.
        buf[26] = 100;
        let err = EventRecord::decode(&mut WireReader::new(&buf)).unwrap_err();
        assert!(matches!(err, CodecError::LengthOverflow { length: 100, .. }));
    }
}
