use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

mod time_range;
pub use time_range::*;
mod camera;
pub use camera::*;
mod track;
pub use track::*;
mod sector;
pub use sector::*;
mod assign;
pub use assign::*;
mod config;
pub use config::*;
mod import;
pub use import::*;
mod validate;
pub use validate::*;

#[derive(Debug, Error)]
pub enum TimelineError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

pub type Seconds = f64; // epoch seconds for start times, plain seconds for durations

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Video,
    Audio,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Video => write!(f, "video"),
            MediaKind::Audio => write!(f, "audio"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct VideoStreamInfo {
    pub width: u32,
    pub height: u32,
}

/// An imported media file. Metadata arrives already probed; missing values
/// are read as zero rather than rejected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Clip {
    pub id: String,
    #[serde(default)]
    pub path: Option<String>,
    pub kind: MediaKind,
    #[serde(default)]
    pub start_time: Option<Seconds>,
    #[serde(default)]
    pub duration: Option<Seconds>,
    #[serde(default)]
    pub video: Option<VideoStreamInfo>,
}

impl Clip {
    pub fn new(
        id: impl Into<String>,
        kind: MediaKind,
        start_time: Seconds,
        duration: Seconds,
    ) -> Self {
        Self {
            id: id.into(),
            path: None,
            kind,
            start_time: Some(start_time),
            duration: Some(duration),
            video: None,
        }
    }

    pub fn video(id: impl Into<String>, start_time: Seconds, duration: Seconds) -> Self {
        Self::new(id, MediaKind::Video, start_time, duration)
    }

    pub fn audio(id: impl Into<String>, start_time: Seconds, duration: Seconds) -> Self {
        Self::new(id, MediaKind::Audio, start_time, duration)
    }

    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.video = Some(VideoStreamInfo { width, height });
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Effective start; missing or non-finite reads as 0.
    pub fn start(&self) -> Seconds {
        finite_or_zero(self.start_time)
    }

    /// Effective duration; missing, non-finite or negative reads as 0.
    pub fn length(&self) -> Seconds {
        finite_or_zero(self.duration).max(0.0)
    }

    pub fn end(&self) -> Seconds {
        self.start() + self.length()
    }

    pub fn has_timing(&self) -> bool {
        self.start_time.is_some_and(f64::is_finite) && self.duration.is_some_and(f64::is_finite)
    }
}

fn finite_or_zero(value: Option<Seconds>) -> Seconds {
    match value {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}
