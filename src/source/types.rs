//! Frame events delivered by a frame source.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One already-framed measurement report, stamped on arrival.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameEvent {
    /// Time the frame was received
    pub received_at: DateTime<Utc>,
    /// Raw frame bytes, flags byte first
    pub bytes: Vec<u8>,
}

impl FrameEvent {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            received_at: Utc::now(),
            bytes,
        }
    }
}

/// Configuration for a frame source.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Delay between frames when replaying (zero = as fast as possible)
    pub frame_interval: Duration,
    /// Channel capacity between the reader thread and the consumer
    pub channel_capacity: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            frame_interval: Duration::ZERO,
            channel_capacity: 10_000,
        }
    }
}

/// Errors that can occur while reading frames.
#[derive(Debug)]
pub enum SourceError {
    /// The source was already started.
    AlreadyStarted,
    /// A line could not be parsed as hex.
    InvalidHex { line: usize, reason: String },
    /// Reading from the underlying input failed.
    Io(String),
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::AlreadyStarted => write!(f, "Frame source was already started"),
            SourceError::InvalidHex { line: 0, reason } => {
                write!(f, "Invalid hex frame: {reason}")
            }
            SourceError::InvalidHex { line, reason } => {
                write!(f, "Invalid hex frame on line {line}: {reason}")
            }
            SourceError::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for SourceError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_event_creation() {
        let before = Utc::now();
        let event = FrameEvent::new(vec![0x00, 72]);
        assert_eq!(event.bytes, vec![0x00, 72]);
        assert!(event.received_at >= before);
    }

    #[test]
    fn test_error_display() {
        let err = SourceError::InvalidHex {
            line: 3,
            reason: "Odd number of digits".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid hex frame on line 3: Odd number of digits"
        );

        let err = SourceError::InvalidHex {
            line: 0,
            reason: "Odd number of digits".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid hex frame: Odd number of digits");
    }
}
