//! Decoding error kinds.
//!
//! None of these are fatal to the byte stream.  The frame decoder reports
//! them and goes straight back to searching for the next sync pair.

use thiserror::Error;

/// Errors reported while framing or decoding the byte stream.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// A byte arrived while the decoder was looking for the first sync byte.
    #[error("unexpected byte 0x{0:02X} while seeking sync")]
    UnexpectedByte(u8),

    /// The byte after the first sync byte was not a sync byte.
    #[error("sync lost: expected 0xAA, got 0x{0:02X}")]
    SyncLost(u8),

    /// The declared payload length exceeds the protocol maximum, or a payload
    /// handed to the encoder is too long to send.
    #[error("payload length {0} does not fit in a frame")]
    LengthOverflow(usize),

    /// The trailing checksum byte disagrees with the payload.
    #[error("checksum mismatch: expected 0x{expected:02X}, got 0x{actual:02X}")]
    ChecksumMismatch { expected: u8, actual: u8 },

    /// A code byte is not in the documented table (strict lookups only).
    #[error("unrecognized code: 0x{0:02X}")]
    UnrecognizedCode(u8),

    /// A record could not be completed or interpreted.
    #[error("malformed record: {0}")]
    MalformedRecord(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_mismatch_message_shows_both_values() {
        let err = DecodeError::ChecksumMismatch {
            expected: 0x0F,
            actual: 0xF0,
        };
        assert_eq!(
            err.to_string(),
            "checksum mismatch: expected 0x0F, got 0xF0"
        );
    }

    #[test]
    fn test_length_overflow_message_includes_length() {
        assert_eq!(
            DecodeError::LengthOverflow(200).to_string(),
            "payload length 200 does not fit in a frame"
        );
    }
}
