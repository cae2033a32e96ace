//! Core functionality for the heart-rate zone monitor.
//!
//! This module contains:
//! - Frame decoding from raw sensor bytes
//! - The bounded sample history
//! - Zone boundary validation and occupancy analysis
//! - Session summaries and the flat text export

pub mod analyzer;
pub mod decoder;
pub mod export;
pub mod history;
pub mod summary;
pub mod zones;

// Re-export commonly used types
pub use analyzer::{occupancy, occupancy_if_valid, zone_of, Zone, ZoneOccupancy};
pub use decoder::{decode, DecodeError, FrameFlags, HeartRateSample};
pub use export::{render_csv, write_csv, EXPORT_HEADER};
pub use history::{
    SampleHistory, SharedSampleHistory, TimestampedSample, DEFAULT_HISTORY_CAPACITY,
    LEGACY_HISTORY_CAPACITY,
};
pub use summary::{summarize, SessionSummary};
pub use zones::{validate, ConfigError, ZoneBoundaries, ZoneConfig};
