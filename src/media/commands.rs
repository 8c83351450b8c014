use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, SnapshotError};
use crate::timestamp::Timestamp;

/// Abstract media tool invocation (ffmpeg or ffprobe)
#[derive(Debug, Clone)]
pub struct MediaCommand {
    pub binary_path: String,
    pub args: Vec<String>,
    pub description: String,
}

impl MediaCommand {
    /// Create a new media command
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            args: Vec::new(),
            description: description.into(),
        }
    }

    /// Add an argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(|s| s.into()));
        self
    }

    /// Add input file
    pub fn input<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg("-i").arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Only print errors
    pub fn quiet(self) -> Self {
        self.arg("-v").arg("error")
    }

    /// Seek to a position before decoding the input
    pub fn seek(self, time: Timestamp) -> Self {
        self.arg("-ss").arg(time.to_ffmpeg_arg())
    }

    /// Limit the number of video frames written
    pub fn frames(self, count: u32) -> Self {
        self.arg("-frames:v").arg(count.to_string())
    }

    /// Disable audio
    pub fn no_audio(self) -> Self {
        self.arg("-an")
    }

    /// Write a single PNG image to stdout
    pub fn png_to_stdout(self) -> Self {
        self.arg("-f").arg("image2pipe").arg("-c:v").arg("png").arg("pipe:1")
    }

    /// Run the command and collect stdout. A non-zero exit status is an error
    /// carrying the tool's stderr.
    pub async fn output(&self) -> Result<Vec<u8>> {
        debug!("Executing media command: {} {:?}", self.binary_path, self.args);
        debug!("Description: {}", self.description);

        let output = Command::new(&self.binary_path)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| SnapshotError::Extraction(format!("Failed to execute {}: {}", self.binary_path, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SnapshotError::Extraction(format!(
                "{} failed: {}",
                self.description,
                stderr.trim()
            )));
        }

        Ok(output.stdout)
    }
}

/// Builder for the ffmpeg/ffprobe invocations used by the extractor
pub struct MediaCommandBuilder {
    ffmpeg_path: String,
    ffprobe_path: String,
}

impl MediaCommandBuilder {
    /// Create a new command builder
    pub fn new<S1: Into<String>, S2: Into<String>>(ffmpeg_path: S1, ffprobe_path: S2) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            ffprobe_path: ffprobe_path.into(),
        }
    }

    /// Build single-frame extraction command. `-ss` before `-i` makes ffmpeg
    /// seek on the input and decode forward to the nearest frame.
    pub fn extract_frame<P: AsRef<Path>>(&self, video_path: P, time: Timestamp) -> MediaCommand {
        MediaCommand::new(&self.ffmpeg_path, "Frame extraction")
            .quiet()
            .seek(time)
            .input(video_path)
            .frames(1)
            .no_audio()
            .png_to_stdout()
    }

    /// Build container duration probe, printing seconds as a bare number
    pub fn probe_duration<P: AsRef<Path>>(&self, video_path: P) -> MediaCommand {
        MediaCommand::new(&self.ffprobe_path, "Duration probe")
            .quiet()
            .args(["-show_entries", "format=duration", "-of", "default=noprint_wrappers=1:nokey=1"])
            .arg(video_path.as_ref().to_string_lossy().to_string())
    }

    /// Build ffmpeg version check command
    pub fn ffmpeg_version(&self) -> MediaCommand {
        MediaCommand::new(&self.ffmpeg_path, "ffmpeg version check").arg("-version")
    }

    /// Build ffprobe version check command
    pub fn ffprobe_version(&self) -> MediaCommand {
        MediaCommand::new(&self.ffprobe_path, "ffprobe version check").arg("-version")
    }
}
