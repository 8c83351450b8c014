use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::error::Result;
use crate::request::{SnapshotRequest, VideoSource};
use crate::timestamp::Timestamp;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the directory snapshots are written to
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Take a snapshot of a video at a timestamp
    Snapshot {
        /// Video file path or file:// URI
        #[arg(long)]
        video: String,

        /// Position in seconds
        #[arg(short, long)]
        time: f64,

        /// Text drawn before the timestamp label
        #[arg(short, long)]
        prefix: Option<String>,

        /// Label font size
        #[arg(short, long)]
        font_size: Option<u32>,

        /// Draw the timestamp label even without a prefix or font size
        #[arg(short, long)]
        draw_timestamp: bool,
    },

    /// Take a snapshot from a JSON options object and print the JSON response
    Bridge {
        /// Options, e.g. '{"video": "clip.mp4", "time": 3.5, "prefix": "At "}'
        #[arg(short, long)]
        options: String,
    },

    /// Check that ffmpeg and ffprobe are available
    Check,

    /// Write the default configuration to a file
    InitConfig {
        /// Destination path
        #[arg(default_value = "config.toml")]
        path: PathBuf,
    },
}

/// Turn `snapshot` subcommand arguments into a validated request
pub fn build_snapshot_request(
    video: &str,
    time: f64,
    prefix: Option<String>,
    font_size: Option<u32>,
    draw_timestamp: bool,
) -> Result<SnapshotRequest> {
    let mut request = SnapshotRequest::new(VideoSource::parse(video)?, Timestamp::from_secs(time)?);
    if let Some(prefix) = prefix {
        request = request.with_prefix(prefix);
    }
    if let Some(font_size) = font_size {
        request = request.with_font_size(font_size)?;
    }
    if draw_timestamp {
        request = request.with_draw_timestamp(true);
    }
    Ok(request)
}
