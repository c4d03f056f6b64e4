//! Thread-safe decoder statistics.
//!
//! # Why atomics? (for beginners)
//!
//! The decode loop updates these counters for every byte it sees, while a
//! reporter on another task reads them once a second.  Each counter is an
//! `AtomicU64`: an increment is a single indivisible CPU operation, so the two
//! sides never need a lock and the decode loop never waits on the reporter.
//!
//! `Ordering::Relaxed` is enough because the counters are diagnostics only.
//! A [`StatsSnapshot`] may mix values read a few nanoseconds apart; that is
//! fine for logging.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::protocol::codes::Code;
use crate::protocol::error::DecodeError;
use crate::protocol::frame::FrameEvent;

/// Lock-free counters describing the health of a byte stream.
///
/// # Examples
///
/// ```rust
/// use thinkgear_core::protocol::{DecoderStats, FrameEvent};
///
/// let stats = DecoderStats::new();
/// stats.observe(&FrameEvent::Noise(0x00));
/// assert_eq!(stats.snapshot().noise_bytes, 1);
/// ```
#[derive(Debug, Default)]
pub struct DecoderStats {
    frames_decoded: AtomicU64,
    records_decoded: AtomicU64,
    noise_bytes: AtomicU64,
    sync_lost: AtomicU64,
    length_overflows: AtomicU64,
    checksum_mismatches: AtomicU64,
    malformed_records: AtomicU64,
    unknown_codes: AtomicU64,
}

/// Point-in-time copy of [`DecoderStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub frames_decoded: u64,
    pub records_decoded: u64,
    pub noise_bytes: u64,
    pub sync_lost: u64,
    pub length_overflows: u64,
    pub checksum_mismatches: u64,
    pub malformed_records: u64,
    pub unknown_codes: u64,
}

impl StatsSnapshot {
    /// Total number of framing and integrity failures (noise excluded).
    pub fn frame_errors(&self) -> u64 {
        self.sync_lost + self.length_overflows + self.checksum_mismatches
    }
}

impl DecoderStats {
    /// Creates a set of counters starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates the counters for one decoder event.
    pub fn observe(&self, event: &FrameEvent) {
        match event {
            FrameEvent::RecordsDecoded(records) => {
                bump(&self.frames_decoded);
                self.records_decoded
                    .fetch_add(records.len() as u64, Ordering::Relaxed);
                let unknown = records
                    .iter()
                    .filter(|r| matches!(r.code, Code::Unknown(_)))
                    .count();
                self.unknown_codes
                    .fetch_add(unknown as u64, Ordering::Relaxed);
            }
            FrameEvent::Noise(_) => bump(&self.noise_bytes),
            FrameEvent::FrameError(e) => self.observe_error(e),
        }
    }

    /// Counts a record the interpreter had to drop.
    pub fn record_malformed(&self) {
        bump(&self.malformed_records);
    }

    /// Returns the current counter values.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            frames_decoded: self.frames_decoded.load(Ordering::Relaxed),
            records_decoded: self.records_decoded.load(Ordering::Relaxed),
            noise_bytes: self.noise_bytes.load(Ordering::Relaxed),
            sync_lost: self.sync_lost.load(Ordering::Relaxed),
            length_overflows: self.length_overflows.load(Ordering::Relaxed),
            checksum_mismatches: self.checksum_mismatches.load(Ordering::Relaxed),
            malformed_records: self.malformed_records.load(Ordering::Relaxed),
            unknown_codes: self.unknown_codes.load(Ordering::Relaxed),
        }
    }

    fn observe_error(&self, error: &DecodeError) {
        match error {
            DecodeError::UnexpectedByte(_) => bump(&self.noise_bytes),
            DecodeError::SyncLost(_) => bump(&self.sync_lost),
            DecodeError::LengthOverflow(_) => bump(&self.length_overflows),
            DecodeError::ChecksumMismatch { .. } => bump(&self.checksum_mismatches),
            DecodeError::UnrecognizedCode(_) => bump(&self.unknown_codes),
            DecodeError::MalformedRecord(_) => bump(&self.malformed_records),
        }
    }
}

fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}
