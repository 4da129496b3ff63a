//! Sliding read window over a byte stream.
//!
//! Record sizes are only known once a record is partly parsed, so the
//! decoder asks for "at least N bytes", tries to parse, and asks for more
//! if the record did not fit. Unconsumed bytes are kept across refills.

use crate::utils::config::READ_WINDOW_SIZE;
use crate::utils::error::CodecError;
use std::io::{self, Read};

/// Growable, refillable buffer that retains its unconsumed tail
#[derive(Debug)]
pub struct SlidingWindow<R> {
    reader: R,
    buf: Vec<u8>,
    /// Start of unconsumed bytes
    offset: usize,
    /// End of valid bytes
    last: usize,
    eof: bool,
}

impl<R: Read> SlidingWindow<R> {
    pub fn new(reader: R) -> Self {
        Self::with_capacity(reader, READ_WINDOW_SIZE)
    }

    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        Self {
            reader,
            buf: vec![0; capacity.max(1)],
            offset: 0,
            last: 0,
            eof: false,
        }
    }

    /// Unconsumed bytes currently buffered
    pub fn available(&self) -> usize {
        self.last - self.offset
    }

    /// Make at least `min` unconsumed bytes visible, unless the input ends
    /// first, and return the whole unconsumed window
    ///
    /// A returned window shorter than `min` means the input is exhausted.
    pub fn fill(&mut self, min: usize) -> io::Result<&[u8]> {
        if self.buf.len() < min {
            let mut grown = vec![0; min.max(self.buf.len().saturating_mul(2))];
            let tail = self.available();
            grown[..tail].copy_from_slice(&self.buf[self.offset..self.last]);
            self.buf = grown;
            self.offset = 0;
            self.last = tail;
        }

        if !self.eof && self.available() < min {
            self.buf.copy_within(self.offset..self.last, 0);
            self.last -= self.offset;
            self.offset = 0;

            while self.last < self.buf.len() {
                match self.reader.read(&mut self.buf[self.last..]) {
                    Ok(0) => {
                        self.eof = true;
                        break;
                    }
                    Ok(n) => self.last += n,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e),
                }
            }
        }

        Ok(&self.buf[self.offset..self.last])
    }

    /// Consume `n` bytes of the window
    pub fn advance(&mut self, n: usize) -> Result<(), CodecError> {
        if self.available() < n {
            return Err(CodecError::Truncated {
                context: "window",
                needed: n,
                available: self.available(),
            });
        }
        self.offset += n;
        Ok(())
    }
}
