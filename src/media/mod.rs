// Media framework adapter
//
// Frame extraction is delegated entirely to an external tool:
// - Extractor: ffmpeg-backed implementation of the FrameExtractor trait
// - Commands: Command builders for ffmpeg and ffprobe

pub mod commands;
pub mod extractor;

use async_trait::async_trait;
use image::RgbaImage;

pub use commands::*;
pub use extractor::*;

use crate::config::MediaConfig;
use crate::error::Result;
use crate::request::VideoSource;
use crate::timestamp::Timestamp;

/// Produces a still frame from a video at a timestamp
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FrameExtractor: Send + Sync {
    /// Decode the frame nearest to `time`. Times past the end of the media
    /// are an extraction error.
    async fn extract_frame(&self, source: &VideoSource, time: Timestamp) -> Result<RgbaImage>;
}

/// Factory for creating frame extractor instances
pub struct FrameExtractorFactory;

impl FrameExtractorFactory {
    /// Create the default extractor implementation (FFmpeg-based)
    pub fn create_extractor(config: MediaConfig) -> Box<dyn FrameExtractor> {
        Box::new(extractor::FfmpegFrameExtractor::new(config))
    }
}
