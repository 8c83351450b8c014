use async_trait::async_trait;
use image::RgbaImage;
use tracing::{debug, info, warn};

use crate::config::MediaConfig;
use crate::error::{Result, SnapshotError};
use crate::request::VideoSource;
use crate::timestamp::Timestamp;
use super::{FrameExtractor, MediaCommandBuilder};

/// Frame extractor backed by the ffmpeg and ffprobe binaries
pub struct FfmpegFrameExtractor {
    command_builder: MediaCommandBuilder,
}

impl FfmpegFrameExtractor {
    pub fn new(config: MediaConfig) -> Self {
        let command_builder = MediaCommandBuilder::new(&config.ffmpeg_path, &config.ffprobe_path);
        Self { command_builder }
    }

    /// Container duration in seconds, if ffprobe reports one
    pub async fn probe_duration(&self, source: &VideoSource) -> Result<Option<f64>> {
        let stdout = self.command_builder.probe_duration(source.path()).output().await?;
        let duration = parse_duration(&String::from_utf8_lossy(&stdout));
        debug!("Probed duration of {}: {:?}", source, duration);
        Ok(duration)
    }

    /// Check that both tools can be executed
    pub async fn check_availability(&self) -> Result<()> {
        self.command_builder.ffmpeg_version().output().await?;
        self.command_builder.ffprobe_version().output().await?;
        info!("ffmpeg and ffprobe are available");
        Ok(())
    }

    /// First line of `ffmpeg -version` and `ffprobe -version`
    pub async fn version_info(&self) -> Result<(String, String)> {
        let ffmpeg = self.command_builder.ffmpeg_version().output().await?;
        let ffprobe = self.command_builder.ffprobe_version().output().await?;
        Ok((first_line(&ffmpeg), first_line(&ffprobe)))
    }
}

#[async_trait]
impl FrameExtractor for FfmpegFrameExtractor {
    async fn extract_frame(&self, source: &VideoSource, time: Timestamp) -> Result<RgbaImage> {
        if !source.path().is_file() {
            return Err(SnapshotError::Extraction(format!("video file not found: {}", source)));
        }

        // ffmpeg exits successfully with no output when seeking past the end,
        // so the range check happens up front
        match self.probe_duration(source).await? {
            Some(duration) if time.as_secs_f64() > duration => {
                warn!("Requested {} past the end of {} ({:.3}s)", time, source, duration);
                return Err(SnapshotError::Extraction(format!(
                    "time {:.3}s is beyond the video duration of {:.3}s",
                    time.as_secs_f64(),
                    duration
                )));
            }
            Some(_) => {}
            None => debug!("No duration reported for {}, skipping range check", source),
        }

        info!("Extracting frame at {} from {}", time, source);
        let png = self.command_builder.extract_frame(source.path(), time).output().await?;
        if png.is_empty() {
            return Err(SnapshotError::Extraction(format!(
                "no frame available at {} in {}",
                time, source
            )));
        }

        let frame = image::load_from_memory(&png)
            .map_err(|e| SnapshotError::Extraction(format!("ffmpeg produced an undecodable frame: {}", e)))?
            .to_rgba8();

        debug!("Extracted {}x{} frame", frame.width(), frame.height());
        Ok(frame)
    }
}

/// Parse ffprobe's duration output. `N/A` and blank output mean unknown.
fn parse_duration(output: &str) -> Option<f64> {
    output
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .and_then(|line| line.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
}

fn first_line(output: &[u8]) -> String {
    String::from_utf8_lossy(output)
        .lines()
        .next()
        .unwrap_or("Unknown version")
        .to_string()
}
