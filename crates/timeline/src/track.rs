use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::{calculate_time_ranges, span, Clip, MediaKind, Seconds, TimeRange};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct TrackId(pub Uuid);

impl TrackId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TrackId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A lane of same-kind clips inside one sector. Everything after `clips` is a
/// cache derived by [`Track::recompute`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: TrackId,
    pub name: String,
    pub kind: MediaKind,
    /// 1-based, unique per kind within a sector.
    pub index: u32,
    #[serde(default)]
    pub camera_id: Option<String>,
    #[serde(default)]
    pub clips: Vec<Clip>,
    #[serde(default)]
    pub start_time: Seconds,
    #[serde(default)]
    pub end_time: Seconds,
    #[serde(default)]
    pub combined_duration: Seconds,
    #[serde(default)]
    pub time_ranges: Vec<TimeRange>,
}

impl Track {
    pub fn new(name: impl Into<String>, kind: MediaKind, index: u32) -> Self {
        Self {
            id: TrackId::new(),
            name: name.into(),
            kind,
            index,
            camera_id: None,
            clips: Vec::new(),
            start_time: 0.0,
            end_time: 0.0,
            combined_duration: 0.0,
            time_ranges: Vec::new(),
        }
    }

    /// New track seeded with a single clip.
    pub fn with_clip(name: impl Into<String>, kind: MediaKind, index: u32, clip: Clip) -> Self {
        let mut track = Self::new(name, kind, index);
        track.push_clip(clip);
        track
    }

    pub fn push_clip(&mut self, clip: Clip) {
        self.clips.push(clip);
        self.recompute();
    }

    pub fn recompute(&mut self) {
        self.time_ranges = calculate_time_ranges(&self.clips);
        let (start, end) = span(&self.time_ranges).unwrap_or((0.0, 0.0));
        self.start_time = start;
        self.end_time = end;
        self.combined_duration = self.clips.iter().map(Clip::length).sum();
    }

    /// Whether `range` overlaps any clip already on this track.
    pub fn overlaps(&self, range: &TimeRange) -> bool {
        self.clips.iter().any(|c| TimeRange::of(c).overlaps(range))
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Copy of this track with caches rebuilt from `clips`.
    pub fn recomputed(&self) -> Self {
        let mut copy = self.clone();
        copy.recompute();
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_clip_updates_caches() {
        let mut track = Track::with_clip("Audio 1", MediaKind::Audio, 1, Clip::audio("a", 10.0, 5.0));
        assert_eq!(track.start_time, 10.0);
        assert_eq!(track.end_time, 15.0);
        assert_eq!(track.combined_duration, 5.0);

        track.push_clip(Clip::audio("b", 2.0, 3.0));
        assert_eq!(track.start_time, 2.0);
        assert_eq!(track.end_time, 15.0);
        assert_eq!(track.combined_duration, 8.0);
        assert_eq!(
            track.time_ranges,
            vec![TimeRange::new(10.0, 15.0), TimeRange::new(2.0, 5.0)]
        );
    }

    #[test]
    fn test_empty_track_bounds_are_zero() {
        let mut track = Track::new("Camera 1", MediaKind::Video, 1);
        track.recompute();
        assert!(track.is_empty());
        assert_eq!((track.start_time, track.end_time), (0.0, 0.0));
        assert_eq!(track.combined_duration, 0.0);
    }

    #[test]
    fn test_overlaps_ignores_touching() {
        let track = Track::with_clip("Audio 1", MediaKind::Audio, 1, Clip::audio("a", 0.0, 5.0));
        assert!(!track.overlaps(&TimeRange::new(5.0, 10.0)));
        assert!(track.overlaps(&TimeRange::new(4.0, 10.0)));
    }

    #[test]
    fn test_combined_duration_sums_overlapping_clips() {
        let mut track = Track::with_clip("Camera 1", MediaKind::Video, 1, Clip::video("a", 0.0, 10.0));
        track.push_clip(Clip::video("b", 5.0, 10.0));
        assert_eq!(track.combined_duration, 20.0);
        assert_eq!((track.start_time, track.end_time), (0.0, 15.0));
    }

    #[test]
    fn test_track_json_is_camel_case() {
        let track = Track::with_clip("Camera 1", MediaKind::Video, 1, Clip::video("a", 0.0, 1.0));
        let json = serde_json::to_value(&track).unwrap();
        assert!(json.get("combinedDuration").is_some());
        assert!(json.get("timeRanges").is_some());
        assert_eq!(json["kind"], "video");
    }
}
