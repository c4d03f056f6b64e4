//! Protocol constants and the DataRow code table.
//!
//! Every record inside a payload starts with a one-byte *code* that says what
//! the record carries.  The code also decides how wide the record is:
//!
//! - Codes below `0x80` are **fixed-width** – exactly one data byte follows
//!   and there is no length byte on the wire.
//! - Codes at or above `0x80` are **variable-width** – a one-byte `VLENGTH`
//!   follows the code, then `VLENGTH` data bytes.
//!
//! The width rule depends only on the numeric value, so it also applies to
//! codes that are not in the table below.

use serde::{Deserialize, Serialize};

use crate::protocol::error::DecodeError;

// ── Wire constants ────────────────────────────────────────────────────────────

/// Synchronisation byte.  Two of them start every frame.
pub const SYNC_BYTE: u8 = 0xAA;

/// Extended-code escape byte.  Zero or more of them prefix a record's code.
pub const EXCODE_BYTE: u8 = 0x55;

/// Largest payload length a frame may declare.
pub const MAX_PAYLOAD_LEN: usize = 170;

/// Largest payload an encoder can actually send.  A length byte of 170 is
/// 0xAA, which a receiver reads as sync padding, so 169 is the real limit.
pub const MAX_SENDABLE_PAYLOAD_LEN: usize = SYNC_BYTE as usize - 1;

/// Codes at or above this value carry an explicit `VLENGTH` byte.
pub const MULTI_BYTE_CODE_THRESHOLD: u8 = 0x80;

/// Number of data bytes in a well-formed ASIC EEG power record.
pub const ASIC_EEG_POWER_LEN: usize = 24;

// ── Code table ────────────────────────────────────────────────────────────────

/// Record type carried by a DataRow.
///
/// The mapping from `u8` is total: any value not in the table becomes
/// [`Code::Unknown`], so a headset emitting a newer code never stops the
/// decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Code {
    // Single-byte values
    PoorSignal,
    HeartRate,
    Attention,
    Meditation,
    Raw8Bit,
    RawMarker,
    // Multi-byte values
    RawWave,
    EegPower,
    AsicEegPower,
    RrInterval,
    /// A code value outside the documented table.
    Unknown(u8),
}

impl Code {
    /// Returns the wire value of this code.
    pub fn as_u8(self) -> u8 {
        match self {
            Code::PoorSignal => 0x02,
            Code::HeartRate => 0x03,
            Code::Attention => 0x04,
            Code::Meditation => 0x05,
            Code::Raw8Bit => 0x06,
            Code::RawMarker => 0x07,
            Code::RawWave => 0x80,
            Code::EegPower => 0x81,
            Code::AsicEegPower => 0x83,
            Code::RrInterval => 0x86,
            Code::Unknown(value) => value,
        }
    }

    /// Returns `true` when the record carries an explicit `VLENGTH` byte.
    pub fn is_variable_width(self) -> bool {
        self.as_u8() >= MULTI_BYTE_CODE_THRESHOLD
    }

    /// Strict lookup: returns [`DecodeError::UnrecognizedCode`] for values
    /// outside the table instead of falling back to [`Code::Unknown`].
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::UnrecognizedCode`] when `value` is not a
    /// documented code.
    pub fn known(value: u8) -> Result<Code, DecodeError> {
        match Code::from(value) {
            Code::Unknown(v) => Err(DecodeError::UnrecognizedCode(v)),
            code => Ok(code),
        }
    }

    /// Lower-case name used in logs and JSON output.
    pub fn name(self) -> &'static str {
        match self {
            Code::PoorSignal => "poor_signal",
            Code::HeartRate => "heart_rate",
            Code::Attention => "attention",
            Code::Meditation => "meditation",
            Code::Raw8Bit => "raw_8bit",
            Code::RawMarker => "raw_marker",
            Code::RawWave => "raw_wave",
            Code::EegPower => "eeg_power",
            Code::AsicEegPower => "asic_eeg_power",
            Code::RrInterval => "rr_interval",
            Code::Unknown(_) => "unknown",
        }
    }
}

impl From<u8> for Code {
    fn from(value: u8) -> Self {
        match value {
            0x02 => Code::PoorSignal,
            0x03 => Code::HeartRate,
            0x04 => Code::Attention,
            0x05 => Code::Meditation,
            0x06 => Code::Raw8Bit,
            0x07 => Code::RawMarker,
            0x80 => Code::RawWave,
            0x81 => Code::EegPower,
            0x83 => Code::AsicEegPower,
            0x86 => Code::RrInterval,
            other => Code::Unknown(other),
        }
    }
}

impl From<Code> for u8 {
    fn from(code: Code) -> Self {
        code.as_u8()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: [(u8, Code); 10] = [
        (0x02, Code::PoorSignal),
        (0x03, Code::HeartRate),
        (0x04, Code::Attention),
        (0x05, Code::Meditation),
        (0x06, Code::Raw8Bit),
        (0x07, Code::RawMarker),
        (0x80, Code::RawWave),
        (0x81, Code::EegPower),
        (0x83, Code::AsicEegPower),
        (0x86, Code::RrInterval),
    ];

    #[test]
    fn test_every_documented_code_maps_both_ways() {
        for (value, code) in TABLE {
            assert_eq!(Code::from(value), code);
            assert_eq!(code.as_u8(), value);
        }
    }

    #[test]
    fn test_from_u8_is_total_over_all_bytes() {
        // Arrange / Act / Assert – every byte maps to something and back again
        for value in 0..=u8::MAX {
            assert_eq!(Code::from(value).as_u8(), value);
        }
    }

    #[test]
    fn test_undocumented_code_becomes_unknown() {
        assert_eq!(Code::from(0x09), Code::Unknown(0x09));
        assert_eq!(Code::from(0x82), Code::Unknown(0x82));
    }

    #[test]
    fn test_width_class_follows_threshold() {
        assert!(!Code::Attention.is_variable_width());
        assert!(!Code::RawMarker.is_variable_width());
        assert!(Code::RawWave.is_variable_width());
        assert!(Code::AsicEegPower.is_variable_width());
        assert!(!Code::Unknown(0x7F).is_variable_width());
        assert!(Code::Unknown(0xF0).is_variable_width());
    }

    #[test]
    fn test_known_rejects_unrecognized_code() {
        assert_eq!(Code::known(0x04), Ok(Code::Attention));
        assert_eq!(Code::known(0x09), Err(DecodeError::UnrecognizedCode(0x09)));
    }

    #[test]
    fn test_names_are_stable() {
        assert_eq!(Code::AsicEegPower.name(), "asic_eeg_power");
        assert_eq!(Code::Unknown(0x42).name(), "unknown");
    }
}
