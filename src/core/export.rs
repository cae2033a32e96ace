//! Flat text export of a sample history.
//!
//! ```text
//! timestamp,heart_rate,rr_intervals_ms
//! 2025-09-18T10:00:00.000Z,72,750.00|812.50
//! 2025-09-18T10:00:01.000Z,73,
//! ```

use crate::core::history::TimestampedSample;
use chrono::{DateTime, SecondsFormat, Utc};
use chrono_tz::Tz;
use std::fmt::Write as _;
use std::path::Path;
use uuid::Uuid;

/// Header line of the export table.
pub const EXPORT_HEADER: &str = "timestamp,heart_rate,rr_intervals_ms";

/// Render one sample as an export row (without the line terminator).
pub fn render_row(sample: &TimestampedSample, tz: Tz) -> String {
    let timestamp = sample
        .timestamp
        .with_timezone(&tz)
        .to_rfc3339_opts(SecondsFormat::Millis, true);

    let intervals = sample
        .intervals
        .iter()
        .map(|ms| format!("{ms:.2}"))
        .collect::<Vec<_>>()
        .join("|");

    format!("{},{},{}", timestamp, sample.rate, intervals)
}

/// Render the full export table, one line per sample.
pub fn render_csv(samples: &[TimestampedSample], tz: Tz) -> String {
    let mut out = String::with_capacity(EXPORT_HEADER.len() + 1 + samples.len() * 40);
    out.push_str(EXPORT_HEADER);
    out.push('\n');
    for sample in samples {
        // Writing to a String cannot fail
        let _ = writeln!(out, "{}", render_row(sample, tz));
    }
    out
}

/// Write the export table to `path`, creating parent directories.
///
/// Returns the number of sample rows written.
pub fn write_csv(
    path: &Path,
    samples: &[TimestampedSample],
    tz: Tz,
) -> Result<usize, std::io::Error> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, render_csv(samples, tz))?;
    Ok(samples.len())
}

/// File name for a session export.
pub fn export_file_name(session_id: Uuid, at: DateTime<Utc>) -> String {
    let id = session_id.simple().to_string();
    format!("session_{}_{}.csv", at.format("%Y%m%d_%H%M%S"), &id[..8])
}
