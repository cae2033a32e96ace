//! Frame ingestion into a shared history.
//!
//! [`ZoneMonitor`] is what a frame source feeds: it decodes each frame,
//! appends the sample to the history and keeps the session counters up to
//! date. Zone output is computed on demand and suppressed while the zone
//! boundaries are invalid; ingestion is never affected by them.

use crate::core::analyzer::{occupancy_if_valid, zone_of, Zone, ZoneOccupancy};
use crate::core::decoder::{decode, DecodeError};
use crate::core::export::write_csv;
use crate::core::history::SharedSampleHistory;
use crate::core::summary::{summarize, SessionSummary};
use crate::core::zones::{ConfigError, ZoneBoundaries, ZoneConfig};
use crate::session::SharedSessionLog;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::path::Path;

/// Result of ingesting one decoded frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub rate: u16,
    pub interval_count: usize,
    /// Zone of the new sample, if the zones are valid and the rate is in one
    pub zone: Option<Zone>,
    /// Whether the oldest sample was evicted to make room
    pub evicted: bool,
}

/// Decodes frames into a bounded history and derives zone statistics.
pub struct ZoneMonitor {
    history: SharedSampleHistory,
    zones: ZoneBoundaries,
    zone_config: Result<ZoneConfig, ConfigError>,
    log: SharedSessionLog,
}

impl ZoneMonitor {
    pub fn new(capacity: usize, zones: ZoneBoundaries, log: SharedSessionLog) -> Self {
        let zone_config = zones.validate();
        if let Err(ref e) = zone_config {
            tracing::warn!("Zone output disabled: {}", e);
        }
        Self {
            history: SharedSampleHistory::new(capacity),
            zones,
            zone_config,
            log,
        }
    }

    /// Decode a frame received at `at` and append it to the history.
    ///
    /// A frame that fails to decode is counted and dropped; the history is
    /// left untouched.
    pub fn ingest(&self, frame: &[u8], at: DateTime<Utc>) -> Result<Recorded, DecodeError> {
        self.log.record_frame_received();

        let sample = match decode(frame) {
            Ok(sample) => sample,
            Err(e) => {
                self.log.record_frame_dropped();
                tracing::warn!("Dropping frame {}: {}", hex::encode(frame), e);
                return Err(e);
            }
        };
        self.log.record_frame_decoded();

        let rate = sample.rate;
        let interval_count = sample.intervals.len();
        let evicted = self.history.append(sample, at).is_some();
        if evicted {
            self.log.record_sample_evicted();
        }

        let zone = self
            .zone_config
            .as_ref()
            .ok()
            .and_then(|config| zone_of(rate, config));

        tracing::debug!(rate, interval_count, ?zone, "Recorded sample");

        Ok(Recorded {
            rate,
            interval_count,
            zone,
            evicted,
        })
    }

    /// Replace the zone boundaries, re-validating them.
    pub fn set_zones(&mut self, zones: ZoneBoundaries) -> Result<ZoneConfig, ConfigError> {
        self.zones = zones;
        self.zone_config = zones.validate();
        self.zone_config
    }

    pub fn zones(&self) -> ZoneBoundaries {
        self.zones
    }

    pub fn zone_config(&self) -> Result<ZoneConfig, ConfigError> {
        self.zone_config
    }

    /// Zone occupancy over the current history, `None` while zones are invalid.
    pub fn occupancy(&self) -> Option<ZoneOccupancy> {
        occupancy_if_valid(&self.history.snapshot(), &self.zone_config)
    }

    pub fn summary(&self) -> SessionSummary {
        summarize(&self.history.snapshot())
    }

    /// Write the current history to `path` and count the exported rows.
    pub fn export(&self, path: &Path, tz: Tz) -> Result<usize, std::io::Error> {
        let rows = write_csv(path, &self.history.snapshot(), tz)?;
        self.log.record_rows_exported(rows as u64);
        Ok(rows)
    }

    pub fn history(&self) -> &SharedSampleHistory {
        &self.history
    }

    pub fn log(&self) -> &SharedSessionLog {
        &self.log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::create_shared_log;
    use chrono::Duration;

    fn monitor(capacity: usize) -> ZoneMonitor {
        ZoneMonitor::new(capacity, ZoneBoundaries::default(), create_shared_log())
    }

    #[test]
    fn test_ingest_records_sample() {
        let monitor = monitor(10);
        let recorded = monitor
            .ingest(&[0x10, 160, 0x00, 0x04], Utc::now())
            .unwrap();

        assert_eq!(recorded.rate, 160);
        assert_eq!(recorded.interval_count, 1);
        assert_eq!(recorded.zone, Some(Zone::Mid));
        assert!(!recorded.evicted);
        assert_eq!(monitor.history().len(), 1);
    }

    #[test]
    fn test_bad_frame_is_dropped_and_counted() {
        let monitor = monitor(10);
        assert!(monitor.ingest(&[0x01, 0x46], Utc::now()).is_err());
        assert!(monitor.ingest(&[0x00, 70], Utc::now()).is_ok());

        let stats = monitor.log().stats();
        assert_eq!(stats.frames_received, 2);
        assert_eq!(stats.frames_dropped, 1);
        assert_eq!(stats.frames_decoded, 1);
        assert_eq!(monitor.history().len(), 1);
    }

    #[test]
    fn test_eviction_is_counted() {
        let monitor = monitor(2);
        let start = Utc::now();
        for i in 0..5 {
            monitor
                .ingest(&[0x00, 100 + i], start + Duration::seconds(i64::from(i)))
                .unwrap();
        }
        assert_eq!(monitor.history().len(), 2);
        assert_eq!(monitor.log().stats().samples_evicted, 3);
    }

    #[test]
    fn test_invalid_zones_suppress_output_but_not_ingestion() {
        let mut monitor = monitor(10);
        let start = Utc::now();
        monitor.ingest(&[0x00, 120], start).unwrap();

        assert!(monitor.set_zones(ZoneBoundaries::new(150, 150, 180)).is_err());
        let recorded = monitor
            .ingest(&[0x00, 160], start + Duration::seconds(10))
            .unwrap();
        assert_eq!(recorded.zone, None);
        assert_eq!(monitor.history().len(), 2);
        assert!(monitor.occupancy().is_none());

        assert!(monitor.set_zones(ZoneBoundaries::new(100, 150, 180)).is_ok());
        let occupancy = monitor.occupancy().unwrap();
        assert_eq!(occupancy.low_percent, 100.0);
    }

    #[test]
    fn test_export_counts_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.csv");

        let monitor = monitor(10);
        monitor.ingest(&[0x00, 72], Utc::now()).unwrap();
        monitor.ingest(&[0x00, 73], Utc::now()).unwrap();

        assert_eq!(monitor.export(&path, Tz::UTC).unwrap(), 2);
        assert_eq!(monitor.log().stats().rows_exported, 2);
        assert_eq!(monitor.summary().sample_count, 2);
    }
}
