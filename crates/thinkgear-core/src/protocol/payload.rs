//! Payload decoder: splits a checksum-validated payload into records.
//!
//! Record format (repeated until the payload is exhausted):
//! ```text
//! [EXCODE:0x55]* [CODE:1] [VLENGTH:1 if CODE >= 0x80] [DATA:VLENGTH or 1]
//! ```
//!
//! Decoding is strictly left to right.  A record is only handed out once all
//! of its declared data bytes have been consumed; a record cut short by the
//! end of the payload is reported as [`DecodeError::MalformedRecord`] and
//! dropped.  Because the length of the broken record is unknown, nothing after
//! it can be recovered, so decoding of that payload stops there.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::protocol::codes::{Code, EXCODE_BYTE};
use crate::protocol::error::DecodeError;

/// One code-tagged record decoded from a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Number of `0x55` escape bytes that preceded the code (the extended
    /// code page).  Carried through but not interpreted.
    pub excode_level: u8,
    pub code: Code,
    /// Exactly the record's declared value length of bytes.
    pub data: Vec<u8>,
}

impl Record {
    /// Creates a record on the base code page.
    pub fn new(code: Code, data: Vec<u8>) -> Self {
        Self {
            excode_level: 0,
            code,
            data,
        }
    }

    /// Creates a record on extended code page `excode_level`.
    pub fn with_excode(excode_level: u8, code: Code, data: Vec<u8>) -> Self {
        Self {
            excode_level,
            code,
            data,
        }
    }
}

/// Result of decoding one payload.
///
/// `records` holds every record that completed before decoding stopped.
/// `error` is set when the payload ended inside a record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecodedPayload {
    pub records: Vec<Record>,
    pub error: Option<DecodeError>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Decodes every complete record in `payload`, in payload order.
///
/// Never fails as a whole: a truncated trailing record is reported through
/// [`DecodedPayload::error`] while the records before it are kept.
///
/// # Examples
///
/// ```rust
/// use thinkgear_core::protocol::{decode_payload, Code};
///
/// let decoded = decode_payload(&[0x04, 0x41, 0x05, 0x42]);
/// assert_eq!(decoded.records.len(), 2);
/// assert_eq!(decoded.records[0].code, Code::Attention);
/// assert_eq!(decoded.records[1].data, vec![0x42]);
/// assert!(decoded.error.is_none());
/// ```
pub fn decode_payload(payload: &[u8]) -> DecodedPayload {
    let mut records = Vec::new();
    let mut off = 0;

    while off < payload.len() {
        match decode_record(payload, off) {
            Ok((record, next)) => {
                records.push(record);
                off = next;
            }
            Err(e) => {
                warn!(
                    "dropping record at payload offset {off} ({} earlier record(s) kept): {e}",
                    records.len()
                );
                return DecodedPayload {
                    records,
                    error: Some(e),
                };
            }
        }
    }

    DecodedPayload {
        records,
        error: None,
    }
}

/// Encodes `records` into payload bytes.
///
/// # Errors
///
/// Returns [`DecodeError::MalformedRecord`] if a record's code is the excode
/// byte 0x55, a fixed-width record does not carry exactly one data byte, or a
/// variable-width record carries more than 255 bytes.
pub fn encode_payload(records: &[Record]) -> Result<Vec<u8>, DecodeError> {
    let mut buf = Vec::new();
    for record in records {
        encode_record(&mut buf, record)?;
    }
    Ok(buf)
}

// ── Record helpers ────────────────────────────────────────────────────────────

/// Decodes one record starting at `start`.  Returns the record and the offset
/// of the first byte after it.
fn decode_record(p: &[u8], start: usize) -> Result<(Record, usize), DecodeError> {
    let mut off = start;

    let mut excode_level: u8 = 0;
    while off < p.len() && p[off] == EXCODE_BYTE {
        excode_level = excode_level.saturating_add(1);
        off += 1;
    }

    let Some(&code_byte) = p.get(off) else {
        return Err(DecodeError::MalformedRecord(format!(
            "payload ends after {excode_level} excode byte(s) with no code"
        )));
    };
    off += 1;
    let code = Code::from(code_byte);

    let value_len = if code.is_variable_width() {
        let Some(&vlength) = p.get(off) else {
            return Err(DecodeError::MalformedRecord(format!(
                "code 0x{code_byte:02X}: payload ends before VLENGTH"
            )));
        };
        off += 1;
        vlength as usize
    } else {
        1
    };

    let available = p.len() - off;
    if available < value_len {
        return Err(DecodeError::MalformedRecord(format!(
            "code 0x{code_byte:02X}: declared {value_len} data byte(s), {available} available"
        )));
    }

    let end = off + value_len;
    let record = Record {
        excode_level,
        code,
        data: p[off..end].to_vec(),
    };
    Ok((record, end))
}

fn encode_record(buf: &mut Vec<u8>, record: &Record) -> Result<(), DecodeError> {
    let code_byte = record.code.as_u8();
    if code_byte == EXCODE_BYTE {
        return Err(DecodeError::MalformedRecord(format!(
            "code 0x{code_byte:02X} would be read back as an excode prefix"
        )));
    }
    if record.code.is_variable_width() {
        if record.data.len() > u8::MAX as usize {
            return Err(DecodeError::MalformedRecord(format!(
                "code 0x{code_byte:02X}: {} data bytes do not fit VLENGTH",
                record.data.len()
            )));
        }
    } else if record.data.len() != 1 {
        return Err(DecodeError::MalformedRecord(format!(
            "code 0x{code_byte:02X}: single-byte code with {} data bytes",
            record.data.len()
        )));
    }

    buf.extend(std::iter::repeat(EXCODE_BYTE).take(record.excode_level as usize));
    buf.push(code_byte);
    if record.code.is_variable_width() {
        buf.push(record.data.len() as u8);
    }
    buf.extend_from_slice(&record.data);
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
