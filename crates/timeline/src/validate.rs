use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

use crate::{CameraIdResolver, Clip, MediaKind, Sector, SectorId, Timeline, TimeRange, Track, TrackId};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "violation", rename_all = "snake_case")]
pub enum Violation {
    OverlappingClips {
        sector: SectorId,
        track: TrackId,
        first: String,
        second: String,
    },
    DuplicateIndex {
        sector: SectorId,
        kind: MediaKind,
        index: u32,
    },
    StaleCache {
        sector: SectorId,
        track: Option<TrackId>,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::OverlappingClips {
                sector,
                track,
                first,
                second,
            } => write!(
                f,
                "sector {sector}: clips {first} and {second} overlap on track {track}"
            ),
            Violation::DuplicateIndex {
                sector,
                kind,
                index,
            } => write!(f, "sector {sector}: {kind} index {index} used more than once"),
            Violation::StaleCache {
                sector,
                track: Some(track),
            } => write!(f, "sector {sector}: track {track} has stale cached ranges"),
            Violation::StaleCache {
                sector,
                track: None,
            } => write!(f, "sector {sector}: stale cached ranges"),
        }
    }
}

impl Sector {
    /// Checks the placement invariants and cache consistency. Overlapping
    /// video clips pass when `resolver` gives them the same camera.
    pub fn violations(&self, resolver: &dyn CameraIdResolver) -> Vec<Violation> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        for track in self.tracks.values() {
            if !seen.insert((track.kind, track.index)) {
                out.push(Violation::DuplicateIndex {
                    sector: self.id,
                    kind: track.kind,
                    index: track.index,
                });
            }
            overlapping_pairs(self.id, track, resolver, &mut out);
            if track.recomputed() != *track {
                out.push(Violation::StaleCache {
                    sector: self.id,
                    track: Some(track.id),
                });
            }
        }
        let mut fresh = self.clone();
        fresh.recompute();
        if fresh.time_ranges != self.time_ranges
            || fresh.start_time != self.start_time
            || fresh.end_time != self.end_time
        {
            out.push(Violation::StaleCache {
                sector: self.id,
                track: None,
            });
        }
        out
    }
}

impl Timeline {
    pub fn violations(&self, resolver: &dyn CameraIdResolver) -> Vec<Violation> {
        self.sectors
            .iter()
            .flat_map(|s| s.violations(resolver))
            .collect()
    }
}

fn overlapping_pairs(
    sector: SectorId,
    track: &Track,
    resolver: &dyn CameraIdResolver,
    out: &mut Vec<Violation>,
) {
    for (i, a) in track.clips.iter().enumerate() {
        for b in &track.clips[i + 1..] {
            if !TimeRange::of(a).overlaps(&TimeRange::of(b)) {
                continue;
            }
            if track.kind == MediaKind::Video && same_camera(resolver, a, b) {
                continue;
            }
            out.push(Violation::OverlappingClips {
                sector,
                track: track.id,
                first: a.id.clone(),
                second: b.id.clone(),
            });
        }
    }
}

/// Synthetic ids differ on every call, so clips without a usable identity
/// never count as the same camera.
fn same_camera(resolver: &dyn CameraIdResolver, a: &Clip, b: &Clip) -> bool {
    resolver.resolve(a, None) == resolver.resolve(b, None)
}
