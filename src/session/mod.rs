//! Session bookkeeping for the heart-rate zone monitor.
//!
//! Counts what happened to incoming frames so dropped or evicted data is
//! visible to the user.

pub mod log;

// Re-export commonly used types
pub use log::{
    create_shared_log, create_shared_log_with_persistence, SessionLog, SessionStats,
    SharedSessionLog,
};
