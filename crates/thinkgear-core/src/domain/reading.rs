//! Record interpreter: turns raw records into typed readings.
//!
//! The interpreter is a pure function of one record.  It never looks at
//! neighbouring records and keeps no state, so a record it cannot make sense
//! of is simply dropped without affecting the rest of the frame.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::protocol::codes::{Code, ASIC_EEG_POWER_LEN};
use crate::protocol::error::DecodeError;
use crate::protocol::payload::Record;

/// Largest value a 3-byte band magnitude can hold.
pub const BAND_MAX: u32 = 0x00FF_FFFF;

// ── EEG bands ─────────────────────────────────────────────────────────────────

/// The eight ASIC EEG bands, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EegBand {
    /// 0.5 – 2.75 Hz
    Delta,
    /// 3.5 – 6.75 Hz
    Theta,
    /// 7.5 – 9.25 Hz
    LowAlpha,
    /// 10 – 11.75 Hz
    HighAlpha,
    /// 13 – 16.75 Hz
    LowBeta,
    /// 18 – 29.75 Hz
    HighBeta,
    /// 31 – 39.75 Hz
    LowGamma,
    /// 41 – 49.75 Hz
    MidGamma,
}

impl EegBand {
    /// All bands in the order they appear in an ASIC EEG power record.
    pub const ALL: [EegBand; 8] = [
        EegBand::Delta,
        EegBand::Theta,
        EegBand::LowAlpha,
        EegBand::HighAlpha,
        EegBand::LowBeta,
        EegBand::HighBeta,
        EegBand::LowGamma,
        EegBand::MidGamma,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EegBand::Delta => "delta",
            EegBand::Theta => "theta",
            EegBand::LowAlpha => "low_alpha",
            EegBand::HighAlpha => "high_alpha",
            EegBand::LowBeta => "low_beta",
            EegBand::HighBeta => "high_beta",
            EegBand::LowGamma => "low_gamma",
            EegBand::MidGamma => "mid_gamma",
        }
    }
}

// ── ASIC EEG power ────────────────────────────────────────────────────────────

/// Eight relative band-power magnitudes.  Values have no unit and are only
/// meaningful compared with each other and over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AsicEegPower {
    pub delta: u32,
    pub theta: u32,
    pub low_alpha: u32,
    pub high_alpha: u32,
    pub low_beta: u32,
    pub high_beta: u32,
    pub low_gamma: u32,
    pub mid_gamma: u32,
}

impl AsicEegPower {
    /// Decodes eight big-endian 3-byte magnitudes.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::MalformedRecord`] unless `data` is exactly 24
    /// bytes long.
    pub fn from_bytes(data: &[u8]) -> Result<Self, DecodeError> {
        if data.len() != ASIC_EEG_POWER_LEN {
            return Err(DecodeError::MalformedRecord(format!(
                "ASIC EEG power: need {ASIC_EEG_POWER_LEN} bytes, got {}",
                data.len()
            )));
        }
        let band = |i: usize| read_u24(&data[i * 3..i * 3 + 3]);
        Ok(Self {
            delta: band(0),
            theta: band(1),
            low_alpha: band(2),
            high_alpha: band(3),
            low_beta: band(4),
            high_beta: band(5),
            low_gamma: band(6),
            mid_gamma: band(7),
        })
    }

    /// Returns the magnitude for `band`.
    pub fn get(&self, band: EegBand) -> u32 {
        match band {
            EegBand::Delta => self.delta,
            EegBand::Theta => self.theta,
            EegBand::LowAlpha => self.low_alpha,
            EegBand::HighAlpha => self.high_alpha,
            EegBand::LowBeta => self.low_beta,
            EegBand::HighBeta => self.high_beta,
            EegBand::LowGamma => self.low_gamma,
            EegBand::MidGamma => self.mid_gamma,
        }
    }

    /// Iterates `(band, magnitude)` pairs in wire order.
    pub fn bands(&self) -> impl Iterator<Item = (EegBand, u32)> + '_ {
        EegBand::ALL.iter().map(move |&b| (b, self.get(b)))
    }
}

fn read_u24(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([0, bytes[0], bytes[1], bytes[2]])
}

// ── Readings ──────────────────────────────────────────────────────────────────

/// A typed value decoded from one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Reading {
    PoorSignal(u8),
    HeartRate(u8),
    Attention(u8),
    Meditation(u8),
    Raw8Bit(u8),
    RawMarker(u8),
    RawWave(Vec<u8>),
    EegPower(Vec<u8>),
    AsicEegPower(AsicEegPower),
    RrInterval(Vec<u8>),
    /// A code outside the table, carried through untouched.
    Unknown { code: u8, data: Vec<u8> },
}

impl Reading {
    /// The code this reading was decoded from.
    pub fn code(&self) -> Code {
        match self {
            Reading::PoorSignal(_) => Code::PoorSignal,
            Reading::HeartRate(_) => Code::HeartRate,
            Reading::Attention(_) => Code::Attention,
            Reading::Meditation(_) => Code::Meditation,
            Reading::Raw8Bit(_) => Code::Raw8Bit,
            Reading::RawMarker(_) => Code::RawMarker,
            Reading::RawWave(_) => Code::RawWave,
            Reading::EegPower(_) => Code::EegPower,
            Reading::AsicEegPower(_) => Code::AsicEegPower,
            Reading::RrInterval(_) => Code::RrInterval,
            Reading::Unknown { code, .. } => Code::Unknown(*code),
        }
    }
}

/// Interprets one completed record.
///
/// # Errors
///
/// Returns [`DecodeError::MalformedRecord`] when a single-byte code does not
/// carry exactly one byte, or an ASIC EEG power record is not 24 bytes.
///
/// # Examples
///
/// ```rust
/// use thinkgear_core::domain::{interpret, Reading};
/// use thinkgear_core::protocol::{Code, Record};
///
/// let reading = interpret(&Record::new(Code::Attention, vec![57])).unwrap();
/// assert_eq!(reading, Reading::Attention(57));
/// ```
pub fn interpret(record: &Record) -> Result<Reading, DecodeError> {
    let data = &record.data;
    let reading = match record.code {
        Code::PoorSignal => Reading::PoorSignal(single_byte(record)?),
        Code::HeartRate => Reading::HeartRate(single_byte(record)?),
        Code::Attention => Reading::Attention(single_byte(record)?),
        Code::Meditation => Reading::Meditation(single_byte(record)?),
        Code::Raw8Bit => Reading::Raw8Bit(single_byte(record)?),
        Code::RawMarker => Reading::RawMarker(single_byte(record)?),
        Code::RawWave => Reading::RawWave(data.clone()),
        Code::EegPower => Reading::EegPower(data.clone()),
        Code::AsicEegPower => Reading::AsicEegPower(AsicEegPower::from_bytes(data)?),
        Code::RrInterval => Reading::RrInterval(data.clone()),
        Code::Unknown(code) => Reading::Unknown {
            code,
            data: data.clone(),
        },
    };
    Ok(reading)
}

/// Interprets every record of one frame, in order, dropping only the ones
/// that fail.  Returns the readings and the number of records dropped.
pub fn interpret_records(records: &[Record]) -> (Vec<Reading>, usize) {
    let mut readings = Vec::with_capacity(records.len());
    let mut dropped = 0;
    for record in records {
        match interpret(record) {
            Ok(reading) => readings.push(reading),
            Err(e) => {
                warn!("dropping {} record: {e}", record.code.name());
                dropped += 1;
            }
        }
    }
    (readings, dropped)
}

fn single_byte(record: &Record) -> Result<u8, DecodeError> {
    match record.data.as_slice() {
        [value] => Ok(*value),
        other => Err(DecodeError::MalformedRecord(format!(
            "{}: expected 1 data byte, got {}",
            record.code.name(),
            other.len()
        ))),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn ascending_bands() -> Vec<u8> {
        (1u8..=8).flat_map(|v| [0x00, 0x00, v]).collect()
    }

    #[test]
    fn test_asic_power_decodes_bands_in_order() {
        // Arrange
        let data = ascending_bands();

        // Act
        let power = AsicEegPower::from_bytes(&data).expect("24 bytes");

        // Assert
        let values: Vec<u32> = power.bands().map(|(_, v)| v).collect();
        assert_eq!(values, vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(power.delta, 1);
        assert_eq!(power.mid_gamma, 8);
    }

    #[test]
    fn test_asic_power_reads_big_endian_three_byte_values() {
        let mut data = vec![0u8; 24];
        data[0..3].copy_from_slice(&[0x12, 0x34, 0x56]);
        data[21..24].copy_from_slice(&[0xFF, 0xFF, 0xFF]);
        let power = AsicEegPower::from_bytes(&data).unwrap();
        assert_eq!(power.delta, 0x12_3456);
        assert_eq!(power.mid_gamma, BAND_MAX);
    }

    #[test]
    fn test_asic_power_rejects_wrong_length() {
        // 21 is a multiple of 3 but still not 24
        assert!(matches!(
            AsicEegPower::from_bytes(&[0u8; 21]),
            Err(DecodeError::MalformedRecord(_))
        ));
        assert!(AsicEegPower::from_bytes(&[0u8; 25]).is_err());
    }

    #[test]
    fn test_single_byte_codes_interpret_to_their_value() {
        let cases = [
            (Code::PoorSignal, Reading::PoorSignal(7)),
            (Code::HeartRate, Reading::HeartRate(7)),
            (Code::Attention, Reading::Attention(7)),
            (Code::Meditation, Reading::Meditation(7)),
            (Code::Raw8Bit, Reading::Raw8Bit(7)),
            (Code::RawMarker, Reading::RawMarker(7)),
        ];
        for (code, expected) in cases {
            let reading = interpret(&Record::new(code, vec![7])).unwrap();
            assert_eq!(reading, expected);
            assert_eq!(reading.code(), code);
        }
    }

    #[test]
    fn test_single_byte_code_with_wrong_width_is_malformed() {
        let result = interpret(&Record::new(Code::Attention, vec![]));
        assert!(matches!(result, Err(DecodeError::MalformedRecord(_))));
    }

    #[test]
    fn test_multi_byte_codes_pass_through_raw_bytes() {
        assert_eq!(
            interpret(&Record::new(Code::RawWave, vec![0xFF, 0x10])).unwrap(),
            Reading::RawWave(vec![0xFF, 0x10])
        );
        assert_eq!(
            interpret(&Record::new(Code::RrInterval, vec![1, 2])).unwrap(),
            Reading::RrInterval(vec![1, 2])
        );
        assert_eq!(
            interpret(&Record::new(Code::EegPower, vec![3])).unwrap(),
            Reading::EegPower(vec![3])
        );
    }

    #[test]
    fn test_unknown_code_becomes_unknown_reading() {
        let reading = interpret(&Record::new(Code::Unknown(0x09), vec![0x10])).unwrap();
        assert_eq!(
            reading,
            Reading::Unknown {
                code: 0x09,
                data: vec![0x10]
            }
        );
    }

    #[test]
    fn test_interpret_records_drops_only_the_bad_record() {
        // Arrange
        let records = vec![
            Record::new(Code::Attention, vec![40]),
            Record::new(Code::AsicEegPower, vec![0; 3]),
            Record::new(Code::Meditation, vec![60]),
        ];

        // Act
        let (readings, dropped) = interpret_records(&records);

        // Assert
        assert_eq!(readings, vec![Reading::Attention(40), Reading::Meditation(60)]);
        assert_eq!(dropped, 1);
    }

    #[test]
    fn test_reading_serializes_with_kind_tag() {
        let json = serde_json::to_string(&Reading::Attention(42)).unwrap();
        assert_eq!(json, r#"{"kind":"attention","value":42}"#);
    }
}
