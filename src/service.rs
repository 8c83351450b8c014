use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use crate::config::Config;
use crate::error::{Result, SnapshotError};
use crate::media::{FrameExtractor, FrameExtractorFactory};
use crate::overlay::{self, LabelStyle};
use crate::request::SnapshotRequest;
use crate::storage::{DocumentsDirectory, PathProvider, SnapshotWriter};

/// A saved snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotOutput {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Runs the snapshot pipeline: extract, stamp, encode, persist.
///
/// Cloning is cheap and clones share collaborators, so one service can serve
/// any number of concurrent requests.
#[derive(Clone)]
pub struct SnapshotService {
    config: Arc<Config>,
    extractor: Arc<dyn FrameExtractor>,
    paths: Arc<dyn PathProvider>,
}

impl SnapshotService {
    pub fn new(config: Config, extractor: Arc<dyn FrameExtractor>, paths: Arc<dyn PathProvider>) -> Self {
        Self {
            config: Arc::new(config),
            extractor,
            paths,
        }
    }

    /// Service wired to ffmpeg and the configured documents directory
    pub fn from_config(config: Config) -> Result<Self> {
        config.validate()?;
        let extractor: Arc<dyn FrameExtractor> =
            Arc::from(FrameExtractorFactory::create_extractor(config.media.clone()));
        let paths = Arc::new(DocumentsDirectory::from_config(&config.output));
        Ok(Self::new(config, extractor, paths))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Take one snapshot. Exactly one file is created on success and none on failure.
    pub async fn snapshot(&self, request: SnapshotRequest) -> Result<SnapshotOutput> {
        info!("Snapshot requested: {} at {}", request.video, request.time);

        let result = self.run(&request).await;
        if let Err(e) = &result {
            error!("Snapshot of {} at {} failed: {}", request.video, request.time, e);
        }
        result
    }

    async fn run(&self, request: &SnapshotRequest) -> Result<SnapshotOutput> {
        let frame = self.extractor.extract_frame(&request.video, request.time).await?;

        let frame = if request.draw_timestamp {
            let style = LabelStyle::from_config(&self.config.overlay, request.font_size);
            overlay::draw_timestamp_label(request.time, request.prefix.as_deref(), &style, &frame)?
        } else {
            frame
        };
        let (width, height) = frame.dimensions();

        let dir = self.paths.documents_dir()?;
        let writer = SnapshotWriter::new(&self.config.output);

        // Encoding and file IO are blocking work
        let path = tokio::task::spawn_blocking(move || {
            let bytes = writer.encode(&frame)?;
            writer.persist(&dir, &bytes)
        })
        .await
        .map_err(|e| SnapshotError::Persistence(format!("Snapshot writer task failed: {}", e)))??;

        Ok(SnapshotOutput { path, width, height })
    }
}
