//! Bounded, time-ordered history of heart-rate samples.
//!
//! Samples are kept in a ring buffer of fixed capacity. When an append
//! would exceed the capacity the oldest sample is evicted first.

use crate::core::decoder::HeartRateSample;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, RwLock};

/// Default history capacity.
pub const DEFAULT_HISTORY_CAPACITY: usize = 10_000;

/// Capacity used by early recordings, kept for replaying old sessions.
pub const LEGACY_HISTORY_CAPACITY: usize = 500;

/// A heart-rate sample stamped with the time it was recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimestampedSample {
    /// Time the sample was appended
    pub timestamp: DateTime<Utc>,
    /// Beats per minute
    pub rate: u16,
    /// Beat-to-beat intervals in milliseconds
    pub intervals: Vec<f64>,
}

impl TimestampedSample {
    pub fn new(sample: HeartRateSample, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            rate: sample.rate,
            intervals: sample.intervals,
        }
    }
}

/// Fixed-capacity FIFO of timestamped samples.
#[derive(Debug, Clone)]
pub struct SampleHistory {
    samples: VecDeque<TimestampedSample>,
    capacity: usize,
}

impl SampleHistory {
    /// Create a history holding at most `capacity` samples (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity.min(DEFAULT_HISTORY_CAPACITY)),
            capacity,
        }
    }

    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }

    /// Append a sample recorded at `at`.
    ///
    /// Returns the evicted sample when the history was already full.
    /// A timestamp earlier than the newest entry is clamped to it so the
    /// history stays ordered.
    pub fn append(
        &mut self,
        sample: HeartRateSample,
        at: DateTime<Utc>,
    ) -> Option<TimestampedSample> {
        let timestamp = match self.samples.back() {
            Some(last) if at < last.timestamp => {
                tracing::debug!(
                    "Clamping out-of-order timestamp {} to {}",
                    at,
                    last.timestamp
                );
                last.timestamp
            }
            _ => at,
        };

        let evicted = if self.samples.len() == self.capacity {
            self.samples.pop_front()
        } else {
            None
        };
        self.samples.push_back(TimestampedSample::new(sample, timestamp));
        evicted
    }

    /// Remove all samples.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Copy of the current samples, oldest first.
    pub fn snapshot(&self) -> Vec<TimestampedSample> {
        self.samples.iter().cloned().collect()
    }

    /// Iterate over the samples without copying, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &TimestampedSample> {
        self.samples.iter()
    }

    /// The most recently appended sample.
    pub fn latest(&self) -> Option<&TimestampedSample> {
        self.samples.back()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for SampleHistory {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

/// History shared between a producer thread and readers.
///
/// All access is serialized by a read-write lock, so a snapshot never
/// observes a partially appended sample.
#[derive(Debug, Clone)]
pub struct SharedSampleHistory {
    inner: Arc<RwLock<SampleHistory>>,
}

impl SharedSampleHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(SampleHistory::new(capacity))),
        }
    }

    pub fn append(
        &self,
        sample: HeartRateSample,
        at: DateTime<Utc>,
    ) -> Option<TimestampedSample> {
        self.inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .append(sample, at)
    }

    pub fn clear(&self) {
        self.inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }

    pub fn snapshot(&self) -> Vec<TimestampedSample> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .snapshot()
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample(rate: u16) -> HeartRateSample {
        HeartRateSample::new(rate, Vec::new())
    }

    #[test]
    fn test_append_and_snapshot_order() {
        let start = Utc::now();
        let mut history = SampleHistory::new(10);

        for i in 0..3 {
            history.append(sample(60 + i), start + Duration::seconds(i as i64));
        }

        let snapshot = history.snapshot();
        assert_eq!(snapshot.len(), 3);
        let rates: Vec<u16> = snapshot.iter().map(|s| s.rate).collect();
        assert_eq!(rates, vec![60, 61, 62]);
        assert_eq!(history.latest().map(|s| s.rate), Some(62));
    }

    #[test]
    fn test_eviction_keeps_most_recent() {
        let start = Utc::now();
        let capacity = 5;
        let mut history = SampleHistory::new(capacity);

        let mut evicted = Vec::new();
        for i in 0..12u16 {
            if let Some(old) = history.append(sample(i), start + Duration::seconds(i64::from(i))) {
                evicted.push(old.rate);
            }
        }

        assert_eq!(history.len(), capacity);
        let rates: Vec<u16> = history.iter().map(|s| s.rate).collect();
        assert_eq!(rates, vec![7, 8, 9, 10, 11]);
        assert_eq!(evicted, vec![0, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_clear() {
        let mut history = SampleHistory::new(3);
        history.append(sample(70), Utc::now());
        assert!(!history.is_empty());

        history.clear();
        assert!(history.is_empty());
        assert!(history.snapshot().is_empty());
    }

    #[test]
    fn test_zero_capacity_holds_one() {
        let mut history = SampleHistory::new(0);
        assert_eq!(history.capacity(), 1);

        history.append(sample(60), Utc::now());
        history.append(sample(61), Utc::now());
        assert_eq!(history.len(), 1);
        assert_eq!(history.latest().map(|s| s.rate), Some(61));
    }

    #[test]
    fn test_out_of_order_timestamp_is_clamped() {
        let start = Utc::now();
        let mut history = SampleHistory::new(4);

        history.append(sample(60), start);
        history.append(sample(61), start - Duration::seconds(5));

        let snapshot = history.snapshot();
        assert_eq!(snapshot[1].timestamp, start);
        assert!(snapshot.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn test_shared_history_across_threads() {
        let shared = SharedSampleHistory::new(100);
        let producer = shared.clone();

        let handle = std::thread::spawn(move || {
            let start = Utc::now();
            for i in 0..250u16 {
                producer.append(sample(i), start + Duration::milliseconds(i64::from(i)));
            }
        });

        // Every snapshot observed mid-stream must be ordered and bounded.
        for _ in 0..50 {
            let snapshot = shared.snapshot();
            assert!(snapshot.len() <= 100);
            assert!(snapshot.windows(2).all(|w| w[0].rate < w[1].rate));
        }

        handle.join().unwrap();
        assert_eq!(shared.len(), 100);
        assert_eq!(shared.snapshot().first().map(|s| s.rate), Some(150));

        shared.clear();
        assert!(shared.is_empty());
    }
}
