//! vidsnap - Video Snapshot Bridge
//!
//! Grabs a still frame from a video at a timestamp using ffmpeg, optionally
//! stamps it with a timestamp label, and saves it to the application
//! documents directory.

pub mod bridge;
pub mod cli;
pub mod config;
pub mod error;
pub mod media;
pub mod overlay;
pub mod request;
pub mod service;
pub mod storage;
pub mod timestamp;

pub use bridge::{SnapshotBridge, SnapshotResponse};
pub use error::{ErrorKind, Result, SnapshotError};
pub use request::{SnapshotRequest, VideoSource};
pub use service::{SnapshotOutput, SnapshotService};
pub use timestamp::Timestamp;
