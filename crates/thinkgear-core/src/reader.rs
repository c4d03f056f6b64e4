//! Blocking adapter that drives a [`FrameDecoder`] from any `std::io::Read`.
//!
//! This is the simplest way to replay a captured byte stream from a file or
//! read a serial device node in a plain thread.  The reader pulls bytes in
//! chunks, feeds them to the decoder one at a time, and hands out the
//! resulting [`FrameEvent`]s as an iterator.

use std::collections::VecDeque;
use std::io::{self, ErrorKind, Read};

use crate::protocol::frame::{FrameDecoder, FrameEvent};

const DEFAULT_CHUNK: usize = 64;

/// Iterator of [`FrameEvent`]s decoded from a blocking byte source.
///
/// Yields `Err` once if the source fails and then stops; end of input stops
/// iteration cleanly.  A frame cut off by end of input is never emitted.
///
/// # Examples
///
/// ```rust
/// use thinkgear_core::protocol::{encode_frame, FrameEvent};
/// use thinkgear_core::PacketReader;
///
/// let bytes = encode_frame(&[0x04, 0x41]).unwrap();
/// let events: Vec<_> = PacketReader::new(bytes.as_slice())
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert!(matches!(events.as_slice(), [FrameEvent::RecordsDecoded(_)]));
/// ```
pub struct PacketReader<R> {
    source: R,
    decoder: FrameDecoder,
    buf: Vec<u8>,
    pending: VecDeque<FrameEvent>,
    done: bool,
}

impl<R: Read> PacketReader<R> {
    /// Wraps `source` with a 64-byte read buffer.
    pub fn new(source: R) -> Self {
        Self::with_chunk_size(source, DEFAULT_CHUNK)
    }

    /// Wraps `source`, reading at most `chunk` bytes per call (minimum 1).
    pub fn with_chunk_size(source: R, chunk: usize) -> Self {
        Self {
            source,
            decoder: FrameDecoder::new(),
            buf: vec![0u8; chunk.max(1)],
            pending: VecDeque::new(),
            done: false,
        }
    }

    /// The decoder, for inspecting its state.
    pub fn decoder(&self) -> &FrameDecoder {
        &self.decoder
    }

    /// Consumes the reader and returns the underlying source.
    pub fn into_inner(self) -> R {
        self.source
    }
}

impl<R: Read> Iterator for PacketReader<R> {
    type Item = io::Result<FrameEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(Ok(event));
            }
            if self.done {
                return None;
            }
            match self.source.read(&mut self.buf) {
                Ok(0) => self.done = true,
                Ok(n) => {
                    for &b in &self.buf[..n] {
                        self.pending.extend(self.decoder.feed(b));
                    }
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}
