//! Output location and atomic snapshot persistence.

use image::{DynamicImage, ImageFormat, RgbaImage};
use image::codecs::jpeg::JpegEncoder;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::{OutputConfig, OutputFormat};
use crate::error::{Result, SnapshotError};

/// Resolves the directory snapshots are written to
pub trait PathProvider: Send + Sync {
    fn documents_dir(&self) -> Result<PathBuf>;
}

/// Application documents directory: the configured one, else the platform's
pub struct DocumentsDirectory {
    configured: Option<PathBuf>,
}

impl DocumentsDirectory {
    pub fn new(configured: Option<PathBuf>) -> Self {
        Self { configured }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(config.documents_dir.clone())
    }
}

impl PathProvider for DocumentsDirectory {
    fn documents_dir(&self) -> Result<PathBuf> {
        let dir = match &self.configured {
            Some(dir) => dir.clone(),
            None => dirs::document_dir()
                .or_else(dirs::data_dir)
                .map(|base| base.join(env!("CARGO_PKG_NAME")))
                .ok_or_else(|| {
                    SnapshotError::Persistence("Cannot determine a documents directory".to_string())
                })?,
        };

        std::fs::create_dir_all(&dir).map_err(|e| {
            SnapshotError::Persistence(format!("Failed to create {}: {}", dir.display(), e))
        })?;

        // Callers get absolute paths back
        std::path::absolute(&dir)
            .map_err(|e| SnapshotError::Persistence(format!("Failed to resolve {}: {}", dir.display(), e)))
    }
}

/// Encodes frames and writes them under unique names
pub struct SnapshotWriter {
    format: OutputFormat,
    jpeg_quality: u8,
    file_prefix: String,
}

impl SnapshotWriter {
    pub fn new(config: &OutputConfig) -> Self {
        Self {
            format: config.format,
            jpeg_quality: config.jpeg_quality,
            file_prefix: config.file_prefix.clone(),
        }
    }

    /// Encode into the configured format
    pub fn encode(&self, image: &RgbaImage) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        match self.format {
            OutputFormat::Png => {
                image
                    .write_to(&mut buffer, ImageFormat::Png)
                    .map_err(|e| SnapshotError::Persistence(format!("PNG encoding failed: {}", e)))?;
            }
            OutputFormat::Jpeg => {
                // JPEG has no alpha channel
                let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
                let encoder = JpegEncoder::new_with_quality(&mut buffer, self.jpeg_quality);
                rgb.write_with_encoder(encoder)
                    .map_err(|e| SnapshotError::Persistence(format!("JPEG encoding failed: {}", e)))?;
            }
        }
        Ok(buffer.into_inner())
    }

    /// Write `bytes` into `dir` under a fresh unique name and return the final path.
    /// Data goes to a temp file first, so a failed write leaves nothing behind.
    pub fn persist(&self, dir: &Path, bytes: &[u8]) -> Result<PathBuf> {
        let target = dir.join(self.unique_file_name());
        debug!("Writing {} bytes to {}", bytes.len(), target.display());

        let mut temp = NamedTempFile::new_in(dir)
            .map_err(|e| SnapshotError::Persistence(format!("Failed to create temp file in {}: {}", dir.display(), e)))?;
        temp.write_all(bytes)
            .and_then(|_| temp.as_file().sync_all())
            .map_err(|e| SnapshotError::Persistence(format!("Failed to write snapshot: {}", e)))?;
        temp.persist_noclobber(&target)
            .map_err(|e| SnapshotError::Persistence(format!("Failed to save {}: {}", target.display(), e.error)))?;

        info!("Snapshot saved to {}", target.display());
        Ok(target)
    }

    fn unique_file_name(&self) -> String {
        format!("{}-{}.{}", self.file_prefix, Uuid::new_v4(), self.format.extension())
    }
}
