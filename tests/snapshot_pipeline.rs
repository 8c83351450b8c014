use async_trait::async_trait;
use assert_fs::TempDir;
use image::{Rgba, RgbaImage};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use vidsnap::config::Config;
use vidsnap::media::FrameExtractor;
use vidsnap::overlay::{label_bounds, LabelStyle};
use vidsnap::storage::DocumentsDirectory;
use vidsnap::{Result, SnapshotBridge, SnapshotError, SnapshotService, Timestamp, VideoSource};

/// Stand-in for ffmpeg: a 640x360 gradient clip that is ten seconds long
struct GradientVideo {
    calls: AtomicUsize,
}

impl GradientVideo {
    const DURATION: f64 = 10.0;

    fn new() -> Self {
        Self { calls: AtomicUsize::new(0) }
    }
}

#[async_trait]
impl FrameExtractor for GradientVideo {
    async fn extract_frame(&self, _source: &VideoSource, time: Timestamp) -> Result<RgbaImage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if time.as_secs_f64() > Self::DURATION {
            return Err(SnapshotError::Extraction(format!(
                "time {} is beyond the video duration",
                time
            )));
        }
        tokio::task::yield_now().await;
        Ok(RgbaImage::from_fn(640, 360, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 200, 255])
        }))
    }
}

fn bridge(dir: &TempDir, extractor: Arc<GradientVideo>) -> SnapshotBridge {
    let paths = Arc::new(DocumentsDirectory::new(Some(dir.path().to_path_buf())));
    SnapshotBridge::new(SnapshotService::new(Config::default(), extractor, paths))
}

fn file_count(dir: &TempDir) -> usize {
    std::fs::read_dir(dir.path()).unwrap().count()
}

#[tokio::test]
async fn snapshot_matches_source_dimensions() {
    let dir = TempDir::new().unwrap();
    let bridge = bridge(&dir, Arc::new(GradientVideo::new()));

    let response = bridge.snapshot(&json!({"video": "/videos/clip.mp4", "time": 3.5})).await;

    assert!(response.is_success(), "{:?}", response);
    let path = Path::new(response.path().unwrap());
    assert!(path.is_absolute());
    let decoded = image::open(path).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (640, 360));
    // No label requested, so pixels are untouched
    assert_eq!(decoded.get_pixel(5, 355), &Rgba([5, 99, 200, 255]));
    assert_eq!(file_count(&dir), 1);
}

#[tokio::test]
async fn missing_video_reports_invalid_argument() {
    let dir = TempDir::new().unwrap();
    let extractor = Arc::new(GradientVideo::new());
    let bridge = bridge(&dir, extractor.clone());

    let response = bridge.snapshot(&json!({"time": 1.0, "prefix": "At "})).await;

    assert!(!response.is_success());
    assert!(response.message().unwrap().contains("video"));
    assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);
    assert_eq!(file_count(&dir), 0);
}

#[tokio::test]
async fn time_past_end_reports_extraction_error() {
    let dir = TempDir::new().unwrap();
    let bridge = bridge(&dir, Arc::new(GradientVideo::new()));

    let response = bridge.snapshot(&json!({"video": "/videos/clip.mp4", "time": 42})).await;

    assert!(!response.is_success());
    assert!(response.message().unwrap().starts_with("Frame extraction error"));
    assert_eq!(file_count(&dir), 0);
}

#[tokio::test]
async fn prefix_draws_label_at_anchor() {
    let dir = TempDir::new().unwrap();
    let bridge = bridge(&dir, Arc::new(GradientVideo::new()));

    let plain = bridge.snapshot(&json!({"video": "/videos/clip.mp4", "time": 2})).await;
    let stamped = bridge
        .snapshot(&json!({"video": "/videos/clip.mp4", "time": 2, "prefix": "Shot "}))
        .await;

    let plain = image::open(plain.path().unwrap()).unwrap().to_rgba8();
    let stamped = image::open(stamped.path().unwrap()).unwrap().to_rgba8();
    assert_eq!(plain.dimensions(), stamped.dimensions());

    let bounds = label_bounds("Shot 00:00:02.000".len(), &LabelStyle::default(), 640, 360).unwrap();
    let changed = (bounds.y..bounds.y + bounds.height)
        .flat_map(|y| (bounds.x..bounds.x + bounds.width).map(move |x| (x, y)))
        .filter(|&(x, y)| plain.get_pixel(x, y) != stamped.get_pixel(x, y))
        .count();
    assert_eq!(changed as u32, bounds.width * bounds.height);

    // Outside the label both images agree
    assert_eq!(plain.get_pixel(600, 20), stamped.get_pixel(600, 20));
}

#[tokio::test]
async fn concurrent_requests_write_distinct_files() {
    let dir = TempDir::new().unwrap();
    let extractor = Arc::new(GradientVideo::new());
    let bridge = bridge(&dir, extractor.clone());
    let options = json!({"video": "/videos/clip.mp4", "time": 5.0});

    let (first, second) = tokio::join!(bridge.snapshot(&options), bridge.snapshot(&options));

    assert!(first.is_success());
    assert!(second.is_success());
    assert_ne!(first.path(), second.path());
    assert_eq!(extractor.calls.load(Ordering::SeqCst), 2);
    assert_eq!(file_count(&dir), 2);
}

#[tokio::test]
async fn callback_runs_exactly_once() {
    let dir = TempDir::new().unwrap();
    let bridge = bridge(&dir, Arc::new(GradientVideo::new()));
    let invocations = Arc::new(AtomicUsize::new(0));

    let counter = invocations.clone();
    let handle = bridge.request_snapshot(json!({"video": "/videos/clip.mp4", "time": -3}), move |response| {
        assert!(!response.is_success());
        counter.fetch_add(1, Ordering::SeqCst);
    });
    handle.await.unwrap();

    assert_eq!(invocations.load(Ordering::SeqCst), 1);
    assert_eq!(file_count(&dir), 0);
}

#[tokio::test]
async fn oversized_configured_font_still_answers_callback() {
    let dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.overlay.default_font_size = u32::MAX;
    assert!(config.validate().is_err());

    // Built without validation, the label geometry must still fail cleanly
    let paths = Arc::new(DocumentsDirectory::new(Some(dir.path().to_path_buf())));
    let bridge = SnapshotBridge::new(SnapshotService::new(config, Arc::new(GradientVideo::new()), paths));
    let invocations = Arc::new(AtomicUsize::new(0));

    let counter = invocations.clone();
    let handle = bridge.request_snapshot(
        json!({"video": "/videos/clip.mp4", "time": 1, "prefix": "At "}),
        move |response| {
            assert!(response.message().unwrap().starts_with("Overlay error"));
            counter.fetch_add(1, Ordering::SeqCst);
        },
    );
    handle.await.unwrap();

    assert_eq!(invocations.load(Ordering::SeqCst), 1);
    assert_eq!(file_count(&dir), 0);
}
