//! Protocol module containing the code table, frame decoder, and payload decoder.

pub mod codes;
pub mod error;
pub mod frame;
pub mod payload;
pub mod stats;

pub use codes::{Code, EXCODE_BYTE, MAX_PAYLOAD_LEN, MAX_SENDABLE_PAYLOAD_LEN, SYNC_BYTE};
pub use error::DecodeError;
pub use frame::{checksum, encode_frame, FrameDecoder, FrameEvent, FrameState};
pub use payload::{decode_payload, encode_payload, DecodedPayload, Record};
pub use stats::{DecoderStats, StatsSnapshot};
