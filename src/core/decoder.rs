//! Decoding of heart-rate measurement frames.
//!
//! A frame is a flags byte followed by the heart rate (8 or 16 bits, as
//! selected by bit 0 of the flags) and zero or more RR-interval groups of
//! two little-endian bytes each, measured in 1/1024 second ticks.

use serde::{Deserialize, Serialize};

/// Bit 0: heart rate is a 16-bit value.
const FLAG_RATE_U16: u8 = 0x01;
/// Bit 1: sensor contact detected.
const FLAG_CONTACT_DETECTED: u8 = 0x02;
/// Bit 2: sensor contact detection supported.
const FLAG_CONTACT_SUPPORTED: u8 = 0x04;
/// Bit 3: energy expended field present.
const FLAG_ENERGY_EXPENDED: u8 = 0x08;
/// Bit 4: RR intervals present.
const FLAG_RR_PRESENT: u8 = 0x10;

/// RR interval resolution (ticks per second).
pub const TICKS_PER_SECOND: f64 = 1024.0;

/// A decoded heart-rate reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartRateSample {
    /// Beats per minute
    pub rate: u16,
    /// Beat-to-beat intervals in milliseconds, in frame order
    pub intervals: Vec<f64>,
}

impl HeartRateSample {
    pub fn new(rate: u16, intervals: Vec<f64>) -> Self {
        Self { rate, intervals }
    }
}

/// Errors produced while decoding a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// The frame is shorter than its declared rate width requires.
    TooShort { needed: usize, actual: usize },
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::TooShort { needed, actual } => {
                write!(f, "Frame too short: need {needed} bytes, got {actual}")
            }
        }
    }
}

impl std::error::Error for DecodeError {}

/// Named view over the flags byte.
///
/// Only `rate_is_u16` affects decoding. The remaining bits are reported for
/// diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameFlags {
    pub rate_is_u16: bool,
    pub contact_detected: bool,
    pub contact_supported: bool,
    pub energy_expended_present: bool,
    pub rr_present: bool,
}

impl FrameFlags {
    pub fn from_byte(flags: u8) -> Self {
        Self {
            rate_is_u16: flags & FLAG_RATE_U16 != 0,
            contact_detected: flags & FLAG_CONTACT_DETECTED != 0,
            contact_supported: flags & FLAG_CONTACT_SUPPORTED != 0,
            energy_expended_present: flags & FLAG_ENERGY_EXPENDED != 0,
            rr_present: flags & FLAG_RR_PRESENT != 0,
        }
    }

    /// Bytes needed for the flags byte plus the rate field.
    pub fn header_len(&self) -> usize {
        if self.rate_is_u16 {
            3
        } else {
            2
        }
    }
}

/// Decode one frame into a heart-rate sample.
///
/// Every complete 2-byte group after the rate field is read as an RR
/// interval. A trailing odd byte is ignored.
pub fn decode(frame: &[u8]) -> Result<HeartRateSample, DecodeError> {
    let Some(&flag_byte) = frame.first() else {
        return Err(DecodeError::TooShort {
            needed: 2,
            actual: 0,
        });
    };

    let flags = FrameFlags::from_byte(flag_byte);
    let header_len = flags.header_len();
    if frame.len() < header_len {
        return Err(DecodeError::TooShort {
            needed: header_len,
            actual: frame.len(),
        });
    }

    let rate = if flags.rate_is_u16 {
        u16::from_le_bytes([frame[1], frame[2]])
    } else {
        u16::from(frame[1])
    };

    let intervals = frame[header_len..]
        .chunks_exact(2)
        .map(|pair| ticks_to_ms(u16::from_le_bytes([pair[0], pair[1]])))
        .collect();

    Ok(HeartRateSample { rate, intervals })
}

/// Convert an RR interval from 1/1024 s ticks to milliseconds.
pub fn ticks_to_ms(ticks: u16) -> f64 {
    f64::from(ticks) / TICKS_PER_SECOND * 1000.0
}
