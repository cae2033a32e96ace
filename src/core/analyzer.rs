//! Zone occupancy computed from a sample history.
//!
//! Time between two consecutive samples is credited to the zone of the
//! earlier sample. Time starting from a reading below the low boundary is
//! not counted in any zone and does not enter the denominator.

use crate::core::history::TimestampedSample;
use crate::core::zones::{ConfigError, ZoneConfig};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Heart-rate intensity zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Low,
    Mid,
    High,
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Zone::Low => write!(f, "low"),
            Zone::Mid => write!(f, "mid"),
            Zone::High => write!(f, "high"),
        }
    }
}

/// Percentage of classified time spent in each zone.
///
/// All fields are zero when no classifiable time exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneOccupancy {
    pub low_percent: f64,
    pub mid_percent: f64,
    pub high_percent: f64,
    /// Seconds of elapsed time that fell into one of the zones
    pub classified_secs: f64,
}

impl ZoneOccupancy {
    /// True when there was no classifiable time.
    pub fn is_empty(&self) -> bool {
        self.classified_secs <= 0.0
    }

    /// Sum of the three percentages (100 or 0).
    pub fn total_percent(&self) -> f64 {
        self.low_percent + self.mid_percent + self.high_percent
    }

    pub fn percent(&self, zone: Zone) -> f64 {
        match zone {
            Zone::Low => self.low_percent,
            Zone::Mid => self.mid_percent,
            Zone::High => self.high_percent,
        }
    }
}

/// Classify a rate. Rates below the low boundary have no zone.
pub fn zone_of(rate: u16, config: &ZoneConfig) -> Option<Zone> {
    let rate = i32::from(rate);
    if rate < config.low() {
        None
    } else if rate < config.mid() {
        Some(Zone::Low)
    } else if rate < config.high() {
        Some(Zone::Mid)
    } else {
        Some(Zone::High)
    }
}

/// Compute zone occupancy over a history snapshot.
pub fn occupancy(history: &[TimestampedSample], config: &ZoneConfig) -> ZoneOccupancy {
    if history.len() < 2 {
        return ZoneOccupancy::default();
    }

    let mut low_secs = 0.0;
    let mut mid_secs = 0.0;
    let mut high_secs = 0.0;

    for pair in history.windows(2) {
        let dt = elapsed_secs(pair[0].timestamp, pair[1].timestamp);
        match zone_of(pair[0].rate, config) {
            Some(Zone::Low) => low_secs += dt,
            Some(Zone::Mid) => mid_secs += dt,
            Some(Zone::High) => high_secs += dt,
            None => {}
        }
    }

    let total = low_secs + mid_secs + high_secs;
    if total <= 0.0 {
        return ZoneOccupancy::default();
    }

    ZoneOccupancy {
        low_percent: low_secs / total * 100.0,
        mid_percent: mid_secs / total * 100.0,
        high_percent: high_secs / total * 100.0,
        classified_secs: total,
    }
}

/// Compute occupancy only when the zone configuration is valid.
pub fn occupancy_if_valid(
    history: &[TimestampedSample],
    config: &Result<ZoneConfig, ConfigError>,
) -> Option<ZoneOccupancy> {
    config.as_ref().ok().map(|config| occupancy(history, config))
}

/// Non-negative elapsed time in seconds, at microsecond resolution.
fn elapsed_secs(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    let delta = to - from;
    let micros = delta
        .num_microseconds()
        .unwrap_or_else(|| delta.num_milliseconds().saturating_mul(1000));
    micros.max(0) as f64 / 1_000_000.0
}
