//! Frame sources for the heart-rate zone monitor.
//!
//! The wireless link itself is handled outside this crate. A source only
//! delivers already-framed measurement reports, in arrival order, over a
//! channel.

pub mod replay;
pub mod types;

// Re-export commonly used types
pub use replay::{parse_hex_frame, ReplaySource};
pub use types::{FrameEvent, SourceConfig, SourceError};
