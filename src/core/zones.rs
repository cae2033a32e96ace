//! Heart-rate zone boundaries and their validation.

use serde::{Deserialize, Serialize};

/// A validated set of zone boundaries with `low < mid < high`.
///
/// Only obtainable through [`validate`] or [`ZoneBoundaries::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ZoneConfig {
    low: i32,
    mid: i32,
    high: i32,
}

impl ZoneConfig {
    pub fn low(&self) -> i32 {
        self.low
    }

    pub fn mid(&self) -> i32 {
        self.mid
    }

    pub fn high(&self) -> i32 {
        self.high
    }
}

/// Zone configuration errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Boundaries are not strictly increasing.
    NotMonotonic { low: i32, mid: i32, high: i32 },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotMonotonic { low, mid, high } => write!(
                f,
                "Zone boundaries must satisfy low < mid < high (got {low}, {mid}, {high})"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Validate zone boundaries.
pub fn validate(low: i32, mid: i32, high: i32) -> Result<ZoneConfig, ConfigError> {
    if low < mid && mid < high {
        Ok(ZoneConfig { low, mid, high })
    } else {
        Err(ConfigError::NotMonotonic { low, mid, high })
    }
}

/// Zone boundaries as entered by the user, possibly invalid.
///
/// Each setter re-validates and returns the fresh result, so callers can
/// suppress zone output the moment an edit breaks the ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneBoundaries {
    pub low: i32,
    pub mid: i32,
    pub high: i32,
}

impl Default for ZoneBoundaries {
    fn default() -> Self {
        Self {
            low: 100,
            mid: 150,
            high: 180,
        }
    }
}

impl ZoneBoundaries {
    pub fn new(low: i32, mid: i32, high: i32) -> Self {
        Self { low, mid, high }
    }

    pub fn validate(&self) -> Result<ZoneConfig, ConfigError> {
        validate(self.low, self.mid, self.high)
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    pub fn set_low(&mut self, low: i32) -> Result<ZoneConfig, ConfigError> {
        self.low = low;
        self.validate()
    }

    pub fn set_mid(&mut self, mid: i32) -> Result<ZoneConfig, ConfigError> {
        self.mid = mid;
        self.validate()
    }

    pub fn set_high(&mut self, high: i32) -> Result<ZoneConfig, ConfigError> {
        self.high = high;
        self.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_ordering() {
        let config = validate(100, 150, 180).unwrap();
        assert_eq!((config.low(), config.mid(), config.high()), (100, 150, 180));

        assert_eq!(
            validate(150, 150, 180),
            Err(ConfigError::NotMonotonic {
                low: 150,
                mid: 150,
                high: 180
            })
        );
        assert!(matches!(
            validate(180, 150, 100),
            Err(ConfigError::NotMonotonic { .. })
        ));
        assert!(validate(100, 180, 180).is_err());
    }

    #[test]
    fn test_boundary_edits_revalidate() {
        let mut zones = ZoneBoundaries::default();
        assert!(zones.is_valid());

        // Temporarily invalid while editing
        assert!(zones.set_mid(200).is_err());
        assert!(!zones.is_valid());

        assert!(zones.set_high(210).is_ok());
        assert_eq!(zones, ZoneBoundaries::new(100, 200, 210));

        assert!(zones.set_low(-5).is_ok());
    }

    #[test]
    fn test_error_message() {
        let err = validate(3, 2, 1).unwrap_err();
        assert!(err.to_string().contains("low < mid < high"));
    }
}
