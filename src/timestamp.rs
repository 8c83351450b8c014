use std::fmt;
use std::time::Duration;

use crate::error::{Result, SnapshotError};

/// Position in a video, in seconds from the start
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Timestamp(f64);

impl Timestamp {
    /// Build a timestamp, rejecting negative, NaN and infinite values
    pub fn from_secs(seconds: f64) -> Result<Self> {
        if !seconds.is_finite() {
            return Err(SnapshotError::InvalidArgument(format!(
                "time must be a finite number, got {}",
                seconds
            )));
        }
        if seconds < 0.0 {
            return Err(SnapshotError::InvalidArgument(format!(
                "time must not be negative, got {}",
                seconds
            )));
        }
        Ok(Self(seconds))
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.0
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_secs_f64(self.0)
    }

    /// Argument form for ffmpeg's `-ss` option
    pub fn to_ffmpeg_arg(&self) -> String {
        format!("{:.3}", self.0)
    }

    /// Label text drawn on snapshots: `HH:MM:SS.mmm`, sub-millisecond part dropped.
    /// Hours keep growing past 99 rather than wrapping.
    pub fn label(&self) -> String {
        // Round to whole microseconds before truncating to milliseconds
        let total_milliseconds = (self.0 * 1_000_000.0).round() as u64 / 1000;
        let hours = total_milliseconds / 3_600_000;
        let minutes = (total_milliseconds % 3_600_000) / 60_000;
        let secs = (total_milliseconds % 60_000) / 1_000;
        let millis = total_milliseconds % 1_000;

        format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, millis)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_format() {
        assert_eq!(Timestamp::from_secs(0.0).unwrap().label(), "00:00:00.000");
        assert_eq!(Timestamp::from_secs(65.123).unwrap().label(), "00:01:05.123");
        assert_eq!(Timestamp::from_secs(3661.5).unwrap().label(), "01:01:01.500");
        assert_eq!(Timestamp::from_secs(360_000.0).unwrap().label(), "100:00:00.000");
        assert_eq!(Timestamp::from_secs(1.001).unwrap().label(), "00:00:01.001");
        assert_eq!(Timestamp::from_secs(4.35).unwrap().label(), "00:00:04.350");
        assert_eq!(Timestamp::from_secs(1.9999).unwrap().label(), "00:00:01.999");
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(Timestamp::from_secs(-0.5).is_err());
        assert!(Timestamp::from_secs(f64::NAN).is_err());
        assert!(Timestamp::from_secs(f64::INFINITY).is_err());
    }

    #[test]
    fn test_ffmpeg_arg() {
        assert_eq!(Timestamp::from_secs(2.5).unwrap().to_ffmpeg_arg(), "2.500");
        assert_eq!(Timestamp::from_secs(2.5).unwrap().as_duration(), Duration::from_millis(2500));
    }
}
