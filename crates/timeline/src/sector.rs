use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::{calculate_time_ranges, span, MediaKind, Seconds, TimeRange, Track, TrackId};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct SectorId(pub Uuid);

impl SectorId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SectorId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One calendar day of recording. Tracks are keyed by id and keep creation
/// order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Sector {
    pub id: SectorId,
    /// `None` for sectors that predate day keys and are matched by name.
    #[serde(default)]
    pub day: Option<NaiveDate>,
    pub name: String,
    #[serde(default)]
    pub tracks: IndexMap<TrackId, Track>,
    #[serde(default)]
    pub start_time: Seconds,
    #[serde(default)]
    pub end_time: Seconds,
    #[serde(default)]
    pub time_ranges: Vec<TimeRange>,
}

impl Sector {
    pub fn new(day: Option<NaiveDate>, name: impl Into<String>) -> Self {
        Self {
            id: SectorId::new(),
            day,
            name: name.into(),
            tracks: IndexMap::new(),
            start_time: 0.0,
            end_time: 0.0,
            time_ranges: Vec::new(),
        }
    }

    /// Inserts `track`, replacing a track with the same id in place.
    pub fn upsert_track(&mut self, track: Track) -> TrackId {
        let id = track.id;
        self.tracks.insert(id, track);
        id
    }

    pub fn track(&self, id: &TrackId) -> Option<&Track> {
        self.tracks.get(id)
    }

    pub fn track_mut(&mut self, id: &TrackId) -> Option<&mut Track> {
        self.tracks.get_mut(id)
    }

    pub fn tracks_of(&self, kind: MediaKind) -> impl Iterator<Item = &Track> {
        self.tracks.values().filter(move |t| t.kind == kind)
    }

    /// Ids of `kind` tracks in ascending `index` order.
    pub fn track_ids_by_index(&self, kind: MediaKind) -> Vec<TrackId> {
        let mut tracks: Vec<&Track> = self.tracks_of(kind).collect();
        tracks.sort_by_key(|t| t.index);
        tracks.into_iter().map(|t| t.id).collect()
    }

    pub fn max_index(&self, kind: MediaKind) -> u32 {
        self.tracks_of(kind).map(|t| t.index).max().unwrap_or(0)
    }

    pub fn clip_count(&self) -> usize {
        self.tracks.values().map(|t| t.clips.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.clip_count() == 0
    }

    /// Rebuilds the sector-level range cache and bounds from every clip on
    /// every track.
    pub fn recompute(&mut self) {
        self.time_ranges = calculate_time_ranges(self.tracks.values().flat_map(|t| t.clips.iter()));
        let (start, end) = span(&self.time_ranges).unwrap_or((0.0, 0.0));
        self.start_time = start;
        self.end_time = end;
    }
}
