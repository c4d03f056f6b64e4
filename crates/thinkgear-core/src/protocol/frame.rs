//! Streaming frame decoder for the ThinkGear byte stream.
//!
//! Wire format:
//! ```text
//! [SYNC:0xAA][SYNC:0xAA][PAD:0xAA]*[PLENGTH:1][PAYLOAD:PLENGTH][CHECKSUM:1]
//! ```
//! `PLENGTH` is at most 170, though 170 itself is 0xAA and always reads as
//! padding, so 169 is the largest payload that can be sent.  `CHECKSUM` is
//! the bitwise complement of the low eight bits of the sum of all payload
//! bytes.
//!
//! # How the decoder works (for beginners)
//!
//! A serial link gives us bytes with no boundaries: the headset may have been
//! talking for a while before we started listening, and a loose connector can
//! drop or corrupt bytes at any time.  [`FrameDecoder`] is a small state
//! machine that looks at **one byte at a time**:
//!
//! ```text
//!  SeekSync1 ──0xAA──▶ SeekSync2 ──0xAA──▶ ReadLength ──len──▶ ReadPayload(n)
//!     ▲                   │                 │   ▲ 0xAA            │ n bytes
//!     │◀──── other ───────┘                 │   └──┘              ▼
//!     │◀──────────── len > 170 ─────────────┘              checksum byte
//!     │◀──────────────── good or bad checksum ─────────────────────┘
//! ```
//!
//! Every failure goes back to `SeekSync1`, so a corrupted stream costs at most
//! the frame it corrupted.  Because the whole state lives inside the decoder,
//! the caller can feed bytes whenever they arrive; a long pause between two
//! bytes changes nothing.

use tracing::{debug, trace, warn};

use crate::protocol::codes::{MAX_PAYLOAD_LEN, MAX_SENDABLE_PAYLOAD_LEN, SYNC_BYTE};
use crate::protocol::error::DecodeError;
use crate::protocol::payload::{decode_payload, Record};

/// Position of the decoder inside the frame grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    /// Waiting for the first sync byte.
    SeekSync1,
    /// One sync byte seen; waiting for the second.
    SeekSync2,
    /// Sync pair seen; skipping padding sync bytes until the length byte.
    ReadLength,
    /// Reading payload bytes.  When `remaining` is 0 the next byte is the
    /// checksum.
    ReadPayload { remaining: usize },
}

/// Something the decoder produced in response to a byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameEvent {
    /// A frame passed its checksum.  Records are in payload order and are
    /// all complete.
    RecordsDecoded(Vec<Record>),
    /// A frame (or part of one) was rejected.
    FrameError(DecodeError),
    /// A byte that could not start a frame was discarded.
    Noise(u8),
}

impl FrameEvent {
    /// Returns the error kind carried by this event.  [`FrameEvent::Noise`]
    /// maps to [`DecodeError::UnexpectedByte`].
    pub fn error(&self) -> Option<DecodeError> {
        match self {
            FrameEvent::RecordsDecoded(_) => None,
            FrameEvent::FrameError(e) => Some(e.clone()),
            FrameEvent::Noise(b) => Some(DecodeError::UnexpectedByte(*b)),
        }
    }
}

/// Byte-at-a-time frame decoder.
///
/// # Examples
///
/// ```rust
/// use thinkgear_core::protocol::{FrameDecoder, FrameEvent, encode_frame};
///
/// let bytes = encode_frame(&[0x04, 0x41]).unwrap();
/// let mut decoder = FrameDecoder::new();
/// let events: Vec<FrameEvent> = bytes.iter().flat_map(|&b| decoder.feed(b)).collect();
/// assert!(matches!(&events[..], [FrameEvent::RecordsDecoded(records)] if records.len() == 1));
/// ```
#[derive(Debug)]
pub struct FrameDecoder {
    state: FrameState,
    payload: Vec<u8>,
}

impl FrameDecoder {
    /// Creates a decoder waiting for the first sync byte.
    pub fn new() -> Self {
        Self {
            state: FrameState::SeekSync1,
            payload: Vec::with_capacity(MAX_PAYLOAD_LEN),
        }
    }

    /// Current position in the frame grammar.
    pub fn state(&self) -> FrameState {
        self.state
    }

    /// Drops any in-progress frame and goes back to seeking sync.
    pub fn reset(&mut self) {
        self.state = FrameState::SeekSync1;
        self.payload.clear();
    }

    /// Consumes one byte and returns the events it completed, in order.
    ///
    /// Most bytes produce nothing.  A checksum byte produces
    /// [`FrameEvent::RecordsDecoded`], possibly followed by a
    /// [`FrameEvent::FrameError`] if the payload ended inside a record.
    pub fn feed(&mut self, byte: u8) -> Vec<FrameEvent> {
        let mut events = Vec::new();

        match self.state {
            FrameState::SeekSync1 => {
                if byte == SYNC_BYTE {
                    self.state = FrameState::SeekSync2;
                } else {
                    trace!("discarding noise byte 0x{byte:02X}");
                    events.push(FrameEvent::Noise(byte));
                }
            }
            FrameState::SeekSync2 => {
                if byte == SYNC_BYTE {
                    self.state = FrameState::ReadLength;
                } else {
                    debug!("second sync byte missing (got 0x{byte:02X}); resyncing");
                    self.reset();
                    events.push(FrameEvent::FrameError(DecodeError::SyncLost(byte)));
                }
            }
            FrameState::ReadLength => {
                if byte == SYNC_BYTE {
                    // Padding before the length byte.
                } else if byte as usize > MAX_PAYLOAD_LEN {
                    warn!("declared payload length {byte} exceeds {MAX_PAYLOAD_LEN}; resyncing");
                    self.reset();
                    events.push(FrameEvent::FrameError(DecodeError::LengthOverflow(
                        byte as usize,
                    )));
                } else {
                    self.payload.clear();
                    self.state = FrameState::ReadPayload {
                        remaining: byte as usize,
                    };
                }
            }
            FrameState::ReadPayload { remaining: 0 } => {
                self.finish_frame(byte, &mut events);
            }
            FrameState::ReadPayload { remaining } => {
                self.payload.push(byte);
                self.state = FrameState::ReadPayload {
                    remaining: remaining - 1,
                };
            }
        }

        events
    }

    /// Feeds every byte of `bytes` and collects the resulting events.
    pub fn feed_slice(&mut self, bytes: &[u8]) -> Vec<FrameEvent> {
        bytes.iter().flat_map(|&b| self.feed(b)).collect()
    }

    fn finish_frame(&mut self, checksum_byte: u8, events: &mut Vec<FrameEvent>) {
        let expected = checksum(&self.payload);
        if checksum_byte != expected {
            warn!(
                "checksum mismatch on {}-byte payload: expected 0x{expected:02X}, got 0x{checksum_byte:02X}",
                self.payload.len()
            );
            self.reset();
            events.push(FrameEvent::FrameError(DecodeError::ChecksumMismatch {
                expected,
                actual: checksum_byte,
            }));
            return;
        }

        let decoded = decode_payload(&self.payload);
        trace!(
            "frame ok: {} payload byte(s), {} record(s)",
            self.payload.len(),
            decoded.records.len()
        );
        self.reset();
        events.push(FrameEvent::RecordsDecoded(decoded.records));
        if let Some(e) = decoded.error {
            events.push(FrameEvent::FrameError(e));
        }
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

// ── Checksum and encoding ─────────────────────────────────────────────────────

/// Computes the frame checksum: `!(sum of payload bytes) & 0xFF`.
pub fn checksum(payload: &[u8]) -> u8 {
    !payload.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

/// Wraps `payload` in a complete frame (sync pair, length, checksum).
///
/// # Errors
///
/// Returns [`DecodeError::LengthOverflow`] if the payload is longer than 169
/// bytes.  A 170-byte payload would need the length byte 0xAA, which the
/// receiver skips as sync padding.
pub fn encode_frame(payload: &[u8]) -> Result<Vec<u8>, DecodeError> {
    if payload.len() > MAX_SENDABLE_PAYLOAD_LEN {
        return Err(DecodeError::LengthOverflow(payload.len()));
    }
    let mut buf = Vec::with_capacity(payload.len() + 4);
    buf.push(SYNC_BYTE);
    buf.push(SYNC_BYTE);
    buf.push(payload.len() as u8);
    buf.extend_from_slice(payload);
    buf.push(checksum(payload));
    Ok(buf)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::codes::Code;

    fn decoded_records(events: &[FrameEvent]) -> Vec<Vec<Record>> {
        events
            .iter()
            .filter_map(|e| match e {
                FrameEvent::RecordsDecoded(r) => Some(r.clone()),
                _ => None,
            })
            .collect()
    }

    // ── Checksum ─────────────────────────────────────────────────────────────

    #[test]
    fn test_checksum_of_empty_payload_is_ff() {
        assert_eq!(checksum(&[]), 0xFF);
    }

    #[test]
    fn test_checksum_wraps_modulo_256() {
        // 0x80 + 0x80 + 0x01 = 0x101 -> low byte 0x01 -> complement 0xFE
        assert_eq!(checksum(&[0x80, 0x80, 0x01]), 0xFE);
    }

    #[test]
    fn test_checksum_matches_reference_packet() {
        // Attention 0x41 and Meditation 0x42: sum = 0x8C -> 0x73
        assert_eq!(checksum(&[0x04, 0x41, 0x05, 0x42]), 0x73);
    }

    // ── Happy path ───────────────────────────────────────────────────────────

    #[test]
    fn test_valid_frame_yields_records() {
        // Arrange
        let bytes = encode_frame(&[0x04, 0x41, 0x05, 0x42]).unwrap();
        let mut decoder = FrameDecoder::new();

        // Act
        let events = decoder.feed_slice(&bytes);

        // Assert
        assert_eq!(
            events,
            vec![FrameEvent::RecordsDecoded(vec![
                Record::new(Code::Attention, vec![0x41]),
                Record::new(Code::Meditation, vec![0x42]),
            ])]
        );
        assert_eq!(decoder.state(), FrameState::SeekSync1);
    }

    #[test]
    fn test_zero_length_frame_yields_empty_record_list() {
        let mut decoder = FrameDecoder::new();
        let events = decoder.feed_slice(&[0xAA, 0xAA, 0x00, 0xFF]);
        assert_eq!(events, vec![FrameEvent::RecordsDecoded(vec![])]);
    }

    #[test]
    fn test_largest_sendable_frame_is_accepted() {
        // Arrange – 82 two-byte records and one 5-byte RAW_WAVE record
        let mut payload: Vec<u8> = std::iter::repeat([0x02, 0x00]).take(82).flatten().collect();
        payload.extend_from_slice(&[0x80, 0x03, 0x01, 0x02, 0x03]);
        assert_eq!(payload.len(), MAX_SENDABLE_PAYLOAD_LEN);
        let mut decoder = FrameDecoder::new();

        // Act
        let events = decoder.feed_slice(&encode_frame(&payload).unwrap());

        // Assert
        assert_eq!(events.len(), 1);
        let records = &decoded_records(&events)[0];
        assert_eq!(records.len(), 83);
        assert_eq!(records[82], Record::new(Code::RawWave, vec![0x01, 0x02, 0x03]));
    }

    #[test]
    fn test_encode_rejects_payload_whose_length_byte_is_sync() {
        let payload = vec![0u8; MAX_PAYLOAD_LEN];
        assert_eq!(
            encode_frame(&payload),
            Err(DecodeError::LengthOverflow(MAX_PAYLOAD_LEN))
        );
    }

    #[test]
    fn test_padding_sync_bytes_before_length_are_ignored() {
        // Arrange – three extra 0xAA between the sync pair and PLENGTH
        let mut decoder = FrameDecoder::new();
        let bytes = [0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0x02, 0x04, 0x41, checksum(&[0x04, 0x41])];

        // Act
        let events = decoder.feed_slice(&bytes);

        // Assert
        assert_eq!(
            decoded_records(&events),
            vec![vec![Record::new(Code::Attention, vec![0x41])]]
        );
    }

    #[test]
    fn test_back_to_back_frames_decode_independently() {
        let mut bytes = encode_frame(&[0x04, 0x10]).unwrap();
        bytes.extend(encode_frame(&[0x05, 0x20]).unwrap());
        let mut decoder = FrameDecoder::new();
        let frames = decoded_records(&decoder.feed_slice(&bytes));
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1][0].code, Code::Meditation);
    }

    #[test]
    fn test_decoder_is_resumable_byte_by_byte() {
        // Arrange
        let bytes = encode_frame(&[0x04, 0x41]).unwrap();
        let mut decoder = FrameDecoder::new();

        // Act – nothing is emitted until the checksum byte
        let (last, head) = bytes.split_last().unwrap();
        for &b in head {
            assert!(decoder.feed(b).is_empty());
        }
        let events = decoder.feed(*last);

        // Assert
        assert_eq!(decoded_records(&events).len(), 1);
    }

    // ── Resynchronisation ────────────────────────────────────────────────────

    #[test]
    fn test_noise_before_sync_is_reported_per_byte() {
        let mut decoder = FrameDecoder::new();
        let events = decoder.feed_slice(&[0x01, 0x02]);
        assert_eq!(events, vec![FrameEvent::Noise(0x01), FrameEvent::Noise(0x02)]);
    }

    #[test]
    fn test_missing_second_sync_reports_sync_lost() {
        let mut decoder = FrameDecoder::new();
        let events = decoder.feed_slice(&[0xAA, 0x17]);
        assert_eq!(events, vec![FrameEvent::FrameError(DecodeError::SyncLost(0x17))]);
        assert_eq!(decoder.state(), FrameState::SeekSync1);
    }

    #[test]
    fn test_length_overflow_resets_before_reading_payload() {
        // Arrange
        let mut decoder = FrameDecoder::new();

        // Act
        let events = decoder.feed_slice(&[0xAA, 0xAA, 171]);

        // Assert
        assert_eq!(
            events,
            vec![FrameEvent::FrameError(DecodeError::LengthOverflow(171))]
        );
        assert_eq!(decoder.state(), FrameState::SeekSync1);
    }

    #[test]
    fn test_checksum_mismatch_discards_payload_and_recovers() {
        // Arrange – corrupt one payload byte of the first frame
        let mut bad = encode_frame(&[0x04, 0x41]).unwrap();
        bad[4] ^= 0x01;
        let good = encode_frame(&[0x05, 0x42]).unwrap();
        let mut decoder = FrameDecoder::new();

        // Act
        let first = decoder.feed_slice(&bad);
        let second = decoder.feed_slice(&good);

        // Assert
        assert!(matches!(
            first.as_slice(),
            [FrameEvent::FrameError(DecodeError::ChecksumMismatch { .. })]
        ));
        assert_eq!(
            decoded_records(&second),
            vec![vec![Record::new(Code::Meditation, vec![0x42])]]
        );
    }

    #[test]
    fn test_truncated_record_emits_records_then_error() {
        let mut decoder = FrameDecoder::new();
        let events = decoder.feed_slice(&encode_frame(&[0x04, 0x41, 0x80, 0x05, 0x01]).unwrap());
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            FrameEvent::RecordsDecoded(vec![Record::new(Code::Attention, vec![0x41])])
        );
        assert!(matches!(
            events[1],
            FrameEvent::FrameError(DecodeError::MalformedRecord(_))
        ));
    }

    #[test]
    fn test_reset_abandons_in_progress_frame() {
        let mut decoder = FrameDecoder::new();
        decoder.feed_slice(&[0xAA, 0xAA, 0x04, 0x01]);
        decoder.reset();
        assert_eq!(decoder.state(), FrameState::SeekSync1);
        assert_eq!(decoder.feed(0x04), vec![FrameEvent::Noise(0x04)]);
    }

    // ── Encoding ─────────────────────────────────────────────────────────────

    #[test]
    fn test_encode_frame_rejects_oversized_payload() {
        assert_eq!(
            encode_frame(&[0u8; 171]),
            Err(DecodeError::LengthOverflow(171))
        );
    }

    #[test]
    fn test_noise_event_maps_to_unexpected_byte() {
        assert_eq!(
            FrameEvent::Noise(0x12).error(),
            Some(DecodeError::UnexpectedByte(0x12))
        );
        assert_eq!(FrameEvent::RecordsDecoded(vec![]).error(), None);
    }
}
