//! Heart-rate zone monitor - decodes sensor frames and tracks zone occupancy.
//!
//! This library turns a stream of heart-rate measurement frames into a
//! bounded, time-ordered sample history and reports how much time was
//! spent in each user-defined intensity zone.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Heart-Rate Zone Monitor                  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐       │
//! │  │   Source    │──▶│   Decoder   │──▶│   History   │       │
//! │  │  (frames)   │   │ (bit layout)│   │  (bounded)  │       │
//! │  └─────────────┘   └─────────────┘   └─────────────┘       │
//! │         │                                    │              │
//! │         ▼                                    ▼              │
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐       │
//! │  │   Session   │   │    Zones    │──▶│  Analyzer   │       │
//! │  │     Log     │   │ (validated) │   │ (occupancy) │       │
//! │  └─────────────┘   └─────────────┘   └─────────────┘       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use chrono::{Duration, Utc};
//! use hr_zone_monitor::core::{decode, occupancy, validate, SampleHistory};
//!
//! let mut history = SampleHistory::new(500);
//! let start = Utc::now();
//!
//! for (i, frame) in [[0x00u8, 120], [0x00, 160], [0x00, 190]].iter().enumerate() {
//!     let sample = decode(frame).expect("valid frame");
//!     history.append(sample, start + Duration::seconds(i as i64 * 10));
//! }
//!
//! let zones = validate(100, 150, 180).expect("ordered zones");
//! let result = occupancy(&history.snapshot(), &zones);
//! assert_eq!(result.low_percent, 50.0);
//! assert_eq!(result.mid_percent, 50.0);
//! ```

pub mod config;
pub mod core;
pub mod monitor;
pub mod session;
pub mod source;

// Re-export key types at crate root for convenience
pub use crate::config::{Config, ConfigFileError};
pub use crate::core::{
    decode, occupancy, summarize, validate, ConfigError, DecodeError, HeartRateSample,
    SampleHistory, SessionSummary, SharedSampleHistory, TimestampedSample, Zone, ZoneBoundaries,
    ZoneConfig, ZoneOccupancy,
};
pub use crate::monitor::{Recorded, ZoneMonitor};
pub use crate::session::{SessionLog, SessionStats, SharedSessionLog};
pub use crate::source::{FrameEvent, ReplaySource, SourceConfig, SourceError};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
