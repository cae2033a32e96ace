//! Replay of hex-encoded frames from a text input.
//!
//! Each non-empty line holds one frame, e.g. `10 48 00 04` or `01:46:00`.
//! Lines starting with `#` are comments. Frames are read on a background
//! thread and delivered over a bounded channel; the channel closes at the
//! end of the input.

use crate::source::types::{FrameEvent, SourceConfig, SourceError};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Parse one line of input into frame bytes.
///
/// Returns `Ok(None)` for blank lines, comments and lines holding only
/// separators or a `0x` prefix. Spaces, tabs, `:` and `-` may separate
/// bytes. Errors carry line 0; callers reading a file set the real line.
pub fn parse_hex_frame(line: &str) -> Result<Option<Vec<u8>>, SourceError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let digits: String = trimmed
        .chars()
        .filter(|c| !matches!(c, ' ' | '\t' | ':' | '-'))
        .collect();
    let digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .unwrap_or(&digits);
    if digits.is_empty() {
        return Ok(None);
    }

    hex::decode(digits)
        .map(Some)
        .map_err(|e| SourceError::InvalidHex {
            line: 0,
            reason: e.to_string(),
        })
}

/// A frame source replaying hex lines from any reader.
pub struct ReplaySource {
    config: SourceConfig,
    sender: Option<Sender<FrameEvent>>,
    receiver: Receiver<FrameEvent>,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ReplaySource {
    /// Create a new replay source.
    pub fn new(config: SourceConfig) -> Self {
        let (sender, receiver) = bounded(config.channel_capacity.max(1));
        Self {
            config,
            sender: Some(sender),
            receiver,
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    /// Start reading frames from `reader` on a background thread.
    ///
    /// A source can only be started once.
    pub fn start<R>(&mut self, reader: R) -> Result<(), SourceError>
    where
        R: BufRead + Send + 'static,
    {
        let sender = self.sender.take().ok_or(SourceError::AlreadyStarted)?;
        let running = Arc::clone(&self.running);
        let frame_interval = self.config.frame_interval;

        running.store(true, Ordering::SeqCst);

        let handle = thread::Builder::new()
            .name("frame-replay".to_string())
            .spawn(move || {
                if let Err(e) = replay_lines(reader, &sender, &running, frame_interval) {
                    tracing::error!("Frame replay stopped: {}", e);
                }
                running.store(false, Ordering::SeqCst);
                tracing::debug!("Frame replay finished");
            })
            .map_err(|e| SourceError::Io(e.to_string()))?;

        self.handle = Some(handle);
        Ok(())
    }

    /// Ask the reader thread to stop after the current frame.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Check if the reader thread is still producing frames.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Get the receiver for frame events.
    pub fn receiver(&self) -> &Receiver<FrameEvent> {
        &self.receiver
    }

    /// Wait for the reader thread to exit.
    pub fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("Frame replay thread panicked");
            }
        }
    }
}

fn replay_lines<R: BufRead>(
    reader: R,
    sender: &Sender<FrameEvent>,
    running: &AtomicBool,
    frame_interval: std::time::Duration,
) -> Result<(), SourceError> {
    for (index, line) in reader.lines().enumerate() {
        if !running.load(Ordering::SeqCst) {
            break;
        }

        let line = line.map_err(|e| SourceError::Io(e.to_string()))?;
        let bytes = match parse_hex_frame(&line) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => continue,
            Err(SourceError::InvalidHex { reason, .. }) => {
                let err = SourceError::InvalidHex {
                    line: index + 1,
                    reason,
                };
                tracing::warn!("Skipping line: {}", err);
                continue;
            }
            Err(e) => {
                tracing::warn!("Skipping line {}: {}", index + 1, e);
                continue;
            }
        };

        if sender.send(FrameEvent::new(bytes)).is_err() {
            // Receiver dropped
            break;
        }

        if !frame_interval.is_zero() {
            thread::sleep(frame_interval);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::time::Duration;

    #[test]
    fn test_parse_hex_frame() {
        assert_eq!(parse_hex_frame("00 48").unwrap(), Some(vec![0x00, 0x48]));
        assert_eq!(
            parse_hex_frame("01:46:00-00:04").unwrap(),
            Some(vec![0x01, 0x46, 0x00, 0x00, 0x04])
        );
        assert_eq!(parse_hex_frame("0x0048").unwrap(), Some(vec![0x00, 0x48]));
        assert_eq!(parse_hex_frame("   ").unwrap(), None);
        assert_eq!(parse_hex_frame("# comment").unwrap(), None);
        assert!(parse_hex_frame("0g").is_err());
        assert!(parse_hex_frame("004").is_err());
    }

    #[test]
    fn test_separator_only_lines_are_blank() {
        for line in ["0x", "0X", "--", ":", " : - ", "\t-\t"] {
            assert_eq!(parse_hex_frame(line).unwrap(), None, "line {line:?}");
        }
    }

    #[test]
    fn test_invalid_hex_is_source_error() {
        match parse_hex_frame("0g 48") {
            Err(SourceError::InvalidHex { line, reason }) => {
                assert_eq!(line, 0);
                assert!(!reason.is_empty());
            }
            other => panic!("expected InvalidHex, got {other:?}"),
        }
        assert!(matches!(
            parse_hex_frame("004"),
            Err(SourceError::InvalidHex { .. })
        ));
    }

    #[test]
    fn test_replay_skips_separator_only_lines() {
        let input = "0x\n--\n00 48\n";
        let mut source = ReplaySource::new(SourceConfig::default());
        source.start(Cursor::new(input)).unwrap();

        let frames: Vec<Vec<u8>> = source
            .receiver()
            .clone()
            .iter()
            .map(|event| event.bytes)
            .collect();

        assert_eq!(frames, vec![vec![0x00, 0x48]]);
        source.join();
    }

    #[test]
    fn test_replay_delivers_frames_in_order() {
        let input = "# recorded session\n00 48\nzz\n\n10 50 00 04\n";
        let mut source = ReplaySource::new(SourceConfig::default());
        source.start(Cursor::new(input)).unwrap();

        let frames: Vec<Vec<u8>> = source
            .receiver()
            .clone()
            .iter()
            .map(|event| event.bytes)
            .collect();

        assert_eq!(frames, vec![vec![0x00, 0x48], vec![0x10, 0x50, 0x00, 0x04]]);
        source.join();
        assert!(!source.is_running());
    }

    #[test]
    fn test_start_twice_fails() {
        let mut source = ReplaySource::new(SourceConfig::default());
        source.start(Cursor::new("00 48\n")).unwrap();
        assert!(matches!(
            source.start(Cursor::new("00 49\n")),
            Err(SourceError::AlreadyStarted)
        ));
        source.join();
    }

    #[test]
    fn test_stop_ends_replay() {
        let input: String = (0..1000).map(|_| "00 48\n").collect();
        let mut source = ReplaySource::new(SourceConfig {
            frame_interval: Duration::from_millis(5),
            channel_capacity: 16,
        });
        source.start(Cursor::new(input)).unwrap();

        let first = source
            .receiver()
            .recv_timeout(Duration::from_secs(1))
            .unwrap();
        assert_eq!(first.bytes, vec![0x00, 0x48]);

        source.stop();
        let remaining = source.receiver().clone().iter().count();
        assert!(remaining < 999);
        source.join();
    }
}
