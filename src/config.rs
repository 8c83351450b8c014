use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{Result, SnapshotError};
use crate::request::MAX_FONT_SIZE;

fn default_jpeg_quality() -> u8 {
    90
}

fn default_file_prefix() -> String {
    "snapshot".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub overlay: OverlayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    pub ffmpeg_path: String,
    /// Path to ffprobe binary, used to read the source duration
    pub ffprobe_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory snapshots are written to. Falls back to the platform
    /// documents directory when unset.
    #[serde(default)]
    pub documents_dir: Option<PathBuf>,
    /// Encoded image format
    #[serde(default)]
    pub format: OutputFormat,
    /// JPEG quality (1-100), ignored for PNG
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
    /// Leading part of generated filenames
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Font size used when the caller does not pass one
    pub default_font_size: u32,
    /// Distance in pixels between the label box and the image edges
    pub margin: u32,
    /// RGBA color of the label text
    pub text_color: [u8; 4],
    /// RGBA color of the box behind the label
    pub background_color: [u8; 4],
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            documents_dir: None,
            format: OutputFormat::Png,
            jpeg_quality: default_jpeg_quality(),
            file_prefix: default_file_prefix(),
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            default_font_size: 24,
            margin: 10,
            text_color: [255, 255, 255, 255],
            background_color: [0, 0, 0, 160],
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SnapshotError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| SnapshotError::Config(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SnapshotError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| SnapshotError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.output.jpeg_quality) {
            return Err(SnapshotError::Config(format!(
                "jpeg_quality must be between 1 and 100, got {}",
                self.output.jpeg_quality
            )));
        }
        if !(1..=MAX_FONT_SIZE).contains(&self.overlay.default_font_size) {
            return Err(SnapshotError::Config(format!(
                "default_font_size must be between 1 and {}, got {}",
                MAX_FONT_SIZE, self.overlay.default_font_size
            )));
        }
        if self.output.file_prefix.contains(['/', '\\']) {
            return Err(SnapshotError::Config(format!(
                "file_prefix must not contain path separators: {}",
                self.output.file_prefix
            )));
        }
        Ok(())
    }
}
