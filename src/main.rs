//! vidsnap - Video Snapshot Bridge
//!
//! Command line host for the snapshot bridge: takes a frame from a video,
//! optionally stamps it, saves it, and reports the saved path.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::{non_blocking, rolling};

use vidsnap::cli::{build_snapshot_request, Args, Commands};
use vidsnap::config::Config;
use vidsnap::media::FfmpegFrameExtractor;
use vidsnap::{SnapshotBridge, SnapshotResponse, SnapshotService};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(args.verbose)?;
    info!("Starting vidsnap");

    // Load configuration
    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if std::path::Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };
    if let Some(dir) = args.output_dir {
        config.output.documents_dir = Some(dir);
    }

    match args.command {
        Commands::Snapshot { video, time, prefix, font_size, draw_timestamp } => {
            let service = SnapshotService::from_config(config)?;

            // Argument errors are reported the same way as the bridge reports them
            let response: SnapshotResponse = match build_snapshot_request(&video, time, prefix, font_size, draw_timestamp) {
                Ok(request) => service.snapshot(request).await.into(),
                Err(e) => SnapshotResponse::failure(e.to_string()),
            };
            print_response(&response)?;
        }
        Commands::Bridge { options } => {
            let options: serde_json::Value = serde_json::from_str(&options)
                .context("--options must be a JSON object")?;
            let bridge = SnapshotBridge::new(SnapshotService::from_config(config)?);

            let response = bridge.snapshot(&options).await;
            print_response(&response)?;
        }
        Commands::Check => {
            let extractor = FfmpegFrameExtractor::new(config.media.clone());
            extractor.check_availability().await?;
            let (ffmpeg, ffprobe) = extractor.version_info().await?;
            println!("{}", ffmpeg);
            println!("{}", ffprobe);
        }
        Commands::InitConfig { path } => {
            Config::default().save_to_file(&path)?;
            println!("Wrote default configuration to {}", path.display());
        }
    }

    Ok(())
}

fn print_response(response: &SnapshotResponse) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(response)?);
    if !response.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let log_dir = std::env::current_dir()?.join(".vidsnap").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "vidsnap.log");
    let (non_blocking_file, _guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(_guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    // Console output goes to stderr so stdout stays clean JSON
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(true)
        .with_line_number(true);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}
