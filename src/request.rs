//! Snapshot requests and the option parsing that builds them.
//!
//! The bridge receives a loose JSON object from the scripting layer. It is
//! turned into a typed [`SnapshotRequest`] here, before any media work starts,
//! so malformed input never reaches ffmpeg.

use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

use crate::error::{Result, SnapshotError};
use crate::timestamp::Timestamp;

/// Largest accepted `fontSize`
pub const MAX_FONT_SIZE: u32 = 512;

const KEY_VIDEO: &str = "video";
const KEY_TIME: &str = "time";
const KEY_PREFIX: &str = "prefix";
const KEY_FONT_SIZE: &str = "fontSize";
const KEY_DRAW_TIMESTAMP: &str = "drawTimestamp";

/// Local video file a snapshot is taken from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoSource {
    path: PathBuf,
}

impl VideoSource {
    /// Resolve a caller-supplied locator: a plain path or a `file://` URI.
    pub fn parse(locator: &str) -> Result<Self> {
        let locator = locator.trim();
        if locator.is_empty() {
            return Err(SnapshotError::InvalidArgument("video must not be empty".to_string()));
        }

        match Url::parse(locator) {
            Ok(url) if url.scheme() == "file" => {
                let path = url.to_file_path().map_err(|_| {
                    SnapshotError::InvalidArgument(format!("video is not a valid file URI: {}", locator))
                })?;
                Ok(Self { path })
            }
            // Single-letter schemes are Windows drive letters, e.g. `C:\clip.mp4`
            Ok(url) if url.scheme().len() > 1 => Err(SnapshotError::InvalidArgument(format!(
                "unsupported video URI scheme `{}`; only local files are supported",
                url.scheme()
            ))),
            _ => Ok(Self { path: PathBuf::from(locator) }),
        }
    }

    pub fn from_path<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for VideoSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// A validated snapshot request
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotRequest {
    pub video: VideoSource,
    pub time: Timestamp,
    pub prefix: Option<String>,
    pub font_size: Option<u32>,
    pub draw_timestamp: bool,
}

impl SnapshotRequest {
    pub fn new(video: VideoSource, time: Timestamp) -> Self {
        Self {
            video,
            time,
            prefix: None,
            font_size: None,
            draw_timestamp: false,
        }
    }

    /// Set a label prefix; also turns the timestamp label on
    pub fn with_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.prefix = Some(prefix.into());
        self.draw_timestamp = true;
        self
    }

    /// Set the label font size; also turns the timestamp label on
    pub fn with_font_size(mut self, font_size: u32) -> Result<Self> {
        self.font_size = Some(validate_font_size(font_size as f64)?);
        self.draw_timestamp = true;
        Ok(self)
    }

    pub fn with_draw_timestamp(mut self, draw: bool) -> Self {
        self.draw_timestamp = draw;
        self
    }

    /// Label text drawn on the image: prefix followed by the timestamp
    pub fn label_text(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}{}", prefix, self.time.label()),
            None => self.time.label(),
        }
    }

    /// Parse the options object sent by the scripting layer.
    ///
    /// Recognized keys are `video`, `time`, `prefix`, `fontSize` and
    /// `drawTimestamp`. `null` counts as absent and unknown keys are ignored.
    pub fn from_options(options: &Value) -> Result<Self> {
        let map = options.as_object().ok_or_else(|| {
            SnapshotError::InvalidArgument("options must be a JSON object".to_string())
        })?;

        for key in map.keys() {
            if ![KEY_VIDEO, KEY_TIME, KEY_PREFIX, KEY_FONT_SIZE, KEY_DRAW_TIMESTAMP].contains(&key.as_str()) {
                debug!("Ignoring unknown snapshot option `{}`", key);
            }
        }

        let video = match present(map, KEY_VIDEO) {
            Some(Value::String(s)) => VideoSource::parse(s)?,
            Some(other) => return Err(type_error(KEY_VIDEO, "a string", other)),
            None => return Err(missing(KEY_VIDEO)),
        };

        let time = match present(map, KEY_TIME) {
            Some(Value::Number(n)) => n
                .as_f64()
                .ok_or_else(|| SnapshotError::InvalidArgument(format!("time is out of range: {}", n)))?,
            Some(Value::String(s)) => s.trim().parse::<f64>().map_err(|_| {
                SnapshotError::InvalidArgument(format!("time must be numeric, got \"{}\"", s))
            })?,
            Some(other) => return Err(type_error(KEY_TIME, "a number", other)),
            None => return Err(missing(KEY_TIME)),
        };
        let time = Timestamp::from_secs(time)?;

        let prefix = match present(map, KEY_PREFIX) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => return Err(type_error(KEY_PREFIX, "a string", other)),
            None => None,
        };

        let font_size = match present(map, KEY_FONT_SIZE) {
            Some(Value::Number(n)) => Some(validate_font_size(n.as_f64().unwrap_or(f64::NAN))?),
            Some(other) => return Err(type_error(KEY_FONT_SIZE, "an integer", other)),
            None => None,
        };

        let draw_timestamp = match present(map, KEY_DRAW_TIMESTAMP) {
            Some(Value::Bool(b)) => *b,
            Some(other) => return Err(type_error(KEY_DRAW_TIMESTAMP, "a boolean", other)),
            None => prefix.is_some() || font_size.is_some(),
        };

        Ok(Self {
            video,
            time,
            prefix,
            font_size,
            draw_timestamp,
        })
    }
}

fn present<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|v| !v.is_null())
}

fn missing(key: &str) -> SnapshotError {
    SnapshotError::InvalidArgument(format!("missing required option `{}`", key))
}

fn type_error(key: &str, expected: &str, got: &Value) -> SnapshotError {
    SnapshotError::InvalidArgument(format!("option `{}` must be {}, got {}", key, expected, got))
}

fn validate_font_size(size: f64) -> Result<u32> {
    if !size.is_finite() || size.fract() != 0.0 || size < 1.0 || size > MAX_FONT_SIZE as f64 {
        return Err(SnapshotError::InvalidArgument(format!(
            "fontSize must be an integer between 1 and {}, got {}",
            MAX_FONT_SIZE, size
        )));
    }
    Ok(size as u32)
}
