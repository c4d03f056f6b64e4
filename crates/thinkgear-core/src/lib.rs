//! # thinkgear-core
//!
//! Streaming decoder for the ThinkGear serial protocol spoken by consumer EEG
//! headsets (attention / meditation indices, raw wave samples, band powers,
//! heart rate).
//!
//! This crate has zero dependencies on serial ports, async runtimes, or UI
//! frameworks.  It only needs a sequential supply of bytes.
//!
//! # Architecture overview (for beginners)
//!
//! Data flows one way through three stages:
//!
//! ```text
//! bytes ─▶ FrameDecoder ─▶ PayloadDecoder ─▶ RecordInterpreter ─▶ consumer
//!          (sync, length,   (split payload    (typed Reading
//!           checksum)        into Records)     per Record)
//! ```
//!
//! - **`protocol`** – How bytes travel on the wire.  [`FrameDecoder`] finds
//!   frame boundaries one byte at a time and validates the checksum;
//!   [`decode_payload`] splits a validated payload into [`Record`]s.
//!
//! - **`domain`** – What the bytes mean.  [`interpret`] turns a record into a
//!   [`Reading`], and [`ReadingHistory`] keeps bounded per-series history that
//!   consumers read through immutable snapshots.
//!
//! - **`reader`** – A blocking adapter that runs the decoder over any
//!   `std::io::Read`.

pub mod domain;
pub mod protocol;
pub mod reader;

// Re-export the most-used types at the crate root so callers can write
// `thinkgear_core::FrameDecoder` instead of the full module path.
pub use domain::history::{HistorySnapshot, ReadingHistory, Series};
pub use domain::reading::{interpret, interpret_records, AsicEegPower, EegBand, Reading};
pub use protocol::frame::{FrameDecoder, FrameEvent};
pub use protocol::payload::{decode_payload, Record};
pub use protocol::{Code, DecodeError, DecoderStats};
pub use reader::PacketReader;
