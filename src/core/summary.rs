//! Descriptive statistics over a sample history.

use crate::core::history::TimestampedSample;
use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, Distribution};

/// Summary of a recorded session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub sample_count: usize,
    /// Seconds between the first and last sample
    pub duration_secs: f64,
    pub min_rate: Option<u16>,
    pub max_rate: Option<u16>,
    pub mean_rate: Option<f64>,
    /// Sample standard deviation of the rate
    pub rate_std_dev: Option<f64>,
    /// Number of RR intervals across all samples
    pub interval_count: usize,
    pub mean_interval_ms: Option<f64>,
    /// Root mean square of successive RR differences
    pub rmssd_ms: Option<f64>,
}

/// Summarize a history snapshot.
pub fn summarize(history: &[TimestampedSample]) -> SessionSummary {
    let (Some(first), Some(last)) = (history.first(), history.last()) else {
        return SessionSummary::default();
    };

    let duration_secs =
        (last.timestamp - first.timestamp).num_milliseconds().max(0) as f64 / 1000.0;

    let rates: Vec<f64> = history.iter().map(|s| f64::from(s.rate)).collect();
    let rate_data = Data::new(rates);

    let intervals: Vec<f64> = history
        .iter()
        .flat_map(|s| s.intervals.iter().copied())
        .collect();
    let interval_count = intervals.len();
    let rmssd_ms = rmssd(&intervals);
    let mean_interval_ms = if intervals.is_empty() {
        None
    } else {
        finite(Data::new(intervals).mean())
    };

    SessionSummary {
        sample_count: history.len(),
        duration_secs,
        min_rate: history.iter().map(|s| s.rate).min(),
        max_rate: history.iter().map(|s| s.rate).max(),
        mean_rate: finite(rate_data.mean()),
        rate_std_dev: if history.len() < 2 {
            None
        } else {
            finite(rate_data.std_dev())
        },
        interval_count,
        mean_interval_ms,
        rmssd_ms,
    }
}

/// RMSSD of a sequence of RR intervals.
pub fn rmssd(intervals: &[f64]) -> Option<f64> {
    if intervals.len() < 2 {
        return None;
    }

    let sum_sq: f64 = intervals
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).powi(2))
        .sum();
    Some((sum_sq / (intervals.len() - 1) as f64).sqrt())
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn sample(offset_secs: i64, rate: u16, intervals: Vec<f64>) -> TimestampedSample {
        TimestampedSample {
            timestamp: Utc::now() + Duration::seconds(offset_secs),
            rate,
            intervals,
        }
    }

    #[test]
    fn test_empty_summary() {
        let summary = summarize(&[]);
        assert_eq!(summary, SessionSummary::default());
        assert_eq!(summary.sample_count, 0);
        assert!(summary.mean_rate.is_none());
    }

    #[test]
    fn test_rate_statistics() {
        let start = Utc::now();
        let samples: Vec<TimestampedSample> = [60u16, 70, 80]
            .iter()
            .enumerate()
            .map(|(i, &rate)| TimestampedSample {
                timestamp: start + Duration::seconds(i as i64 * 5),
                rate,
                intervals: Vec::new(),
            })
            .collect();

        let summary = summarize(&samples);
        assert_eq!(summary.sample_count, 3);
        assert_eq!(summary.min_rate, Some(60));
        assert_eq!(summary.max_rate, Some(80));
        assert!((summary.mean_rate.unwrap() - 70.0).abs() < 1e-9);
        assert!((summary.rate_std_dev.unwrap() - 10.0).abs() < 1e-9);
        assert!((summary.duration_secs - 10.0).abs() < 1e-9);
        assert_eq!(summary.interval_count, 0);
        assert!(summary.rmssd_ms.is_none());
    }

    #[test]
    fn test_single_sample_has_no_std_dev() {
        let summary = summarize(&[sample(0, 72, vec![800.0])]);
        assert_eq!(summary.mean_rate, Some(72.0));
        assert!(summary.rate_std_dev.is_none());
        assert_eq!(summary.mean_interval_ms, Some(800.0));
        assert!(summary.rmssd_ms.is_none());
    }

    #[test]
    fn test_rmssd_spans_samples() {
        let samples = vec![
            sample(0, 75, vec![800.0, 810.0]),
            sample(1, 74, Vec::new()),
            sample(2, 76, vec![790.0]),
        ];

        let summary = summarize(&samples);
        assert_eq!(summary.interval_count, 3);
        // diffs: 10, -20 -> sqrt((100 + 400) / 2)
        assert!((summary.rmssd_ms.unwrap() - 250.0_f64.sqrt()).abs() < 1e-9);
        assert!((summary.mean_interval_ms.unwrap() - 800.0).abs() < 1e-9);
    }

    #[test]
    fn test_rmssd_direct() {
        assert_eq!(rmssd(&[]), None);
        assert_eq!(rmssd(&[1000.0]), None);
        assert_eq!(rmssd(&[1000.0, 1000.0]), Some(0.0));
    }
}
