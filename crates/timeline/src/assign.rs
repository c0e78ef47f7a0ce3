/// Greedy track assignment for one sector and one media kind.
///
/// Each clip goes to the lowest-index track of its kind that can take it,
/// or to a new track when none can. Audio tracks never hold overlapping
/// clips; video tracks may when the overlapping clips share a camera.
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::{CameraIdResolver, Clip, MediaKind, Sector, TimeRange, Track, TrackId, TrackLabels};

pub struct AssignContext<'a> {
    pub labels: &'a TrackLabels,
    pub resolver: &'a dyn CameraIdResolver,
}

impl<'a> AssignContext<'a> {
    pub fn new(labels: &'a TrackLabels, resolver: &'a dyn CameraIdResolver) -> Self {
        Self { labels, resolver }
    }
}

/// Where a single clip ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub clip_id: String,
    pub track_id: TrackId,
    pub track_index: u32,
    pub track_name: String,
    pub created: bool,
}

/// Places `clips` in input order. Clips of another kind are skipped.
///
/// Sector-level caches are left to the caller ([`Sector::recompute`]).
pub fn assign_clips_to_tracks<I>(
    clips: I,
    sector: &mut Sector,
    kind: MediaKind,
    ctx: &AssignContext<'_>,
) -> Vec<Placement>
where
    I: IntoIterator<Item = Clip>,
{
    let mut placements = Vec::new();
    for clip in clips {
        if clip.kind != kind {
            warn!(clip = %clip.id, expected = %kind, actual = %clip.kind, "skipping clip of other kind");
            continue;
        }
        placements.push(assign_clip(sector, clip, ctx));
    }
    placements
}

/// Reducer form of [`assign_clip`].
pub fn place(mut sector: Sector, clip: Clip, ctx: &AssignContext<'_>) -> (Sector, Placement) {
    let placement = assign_clip(&mut sector, clip, ctx);
    (sector, placement)
}

/// Places one clip on the first eligible track of its kind, creating a new
/// track when none is eligible.
pub fn assign_clip(sector: &mut Sector, clip: Clip, ctx: &AssignContext<'_>) -> Placement {
    if !clip.has_timing() {
        warn!(clip = %clip.id, "clip has no usable start time or duration, treating as zero");
    }
    let kind = clip.kind;
    let camera = match kind {
        MediaKind::Video => Some(ctx.resolver.resolve(&clip, None)),
        MediaKind::Audio => None,
    };
    let range = TimeRange::of(&clip);

    let target = sector
        .track_ids_by_index(kind)
        .into_iter()
        .find(|id| is_eligible(sector, id, &range, camera.as_deref(), ctx));

    if let Some(track_id) = target {
        if let Some(track) = sector.track_mut(&track_id) {
            let clip_id = clip.id.clone();
            track.push_clip(clip);
            debug!(clip = %clip_id, track = %track.name, index = track.index, "appended to track");
            return Placement {
                clip_id,
                track_id,
                track_index: track.index,
                track_name: track.name.clone(),
                created: false,
            };
        }
    }

    let index = next_index(sector, kind);
    let name = next_track_name(sector, kind, ctx.labels);
    let clip_id = clip.id.clone();
    let mut track = Track::with_clip(name, kind, index, clip);
    track.camera_id = camera;
    debug!(
        clip = %clip_id,
        track = %track.name,
        index,
        camera = track.camera_id.as_deref().unwrap_or("-"),
        "created track"
    );
    let placement = Placement {
        clip_id,
        track_id: track.id,
        track_index: index,
        track_name: track.name.clone(),
        created: true,
    };
    sector.upsert_track(track);
    placement
}

fn is_eligible(
    sector: &mut Sector,
    id: &TrackId,
    range: &TimeRange,
    camera: Option<&str>,
    ctx: &AssignContext<'_>,
) -> bool {
    let Some(track) = sector.track(id) else {
        return false;
    };
    if !track.overlaps(range) {
        return true;
    }
    let (MediaKind::Video, Some(camera)) = (track.kind, camera) else {
        return false;
    };
    // Every clip the new one overlaps must belong to the same camera too.
    let clashes = track
        .clips
        .iter()
        .filter(|c| TimeRange::of(c).overlaps(range))
        .any(|c| ctx.resolver.resolve(c, None) != camera);
    if clashes {
        return false;
    }
    track_camera_id(sector, id, ctx).is_some_and(|existing| existing == camera)
}

/// Stored identity of a video track. Tracks carried over without one get it
/// back-filled from their first clip.
fn track_camera_id(sector: &mut Sector, id: &TrackId, ctx: &AssignContext<'_>) -> Option<String> {
    let track = sector.track_mut(id)?;
    if track.camera_id.is_none() {
        let first = track.clips.first()?;
        let resolved = ctx.resolver.resolve(first, None);
        debug!(track = %track.name, camera = %resolved, "back-filled track camera id");
        track.camera_id = Some(resolved);
    }
    track.camera_id.clone()
}

/// One past the highest index of `kind`. Once that would overflow, the lowest
/// free index is reused instead.
fn next_index(sector: &Sector, kind: MediaKind) -> u32 {
    if let Some(index) = sector.max_index(kind).checked_add(1) {
        return index;
    }
    let used: HashSet<u32> = sector.tracks_of(kind).map(|t| t.index).collect();
    let index = (1..u32::MAX).find(|i| !used.contains(i)).unwrap_or(u32::MAX);
    warn!(%kind, index, "track index space exhausted, reusing lowest free index");
    index
}

/// Video: one past the highest number already used in any track name.
/// Audio: one past the number of audio tracks.
pub fn next_track_name(sector: &Sector, kind: MediaKind, labels: &TrackLabels) -> String {
    let number = match kind {
        MediaKind::Video => {
            sector
                .tracks
                .values()
                .filter_map(|t| labels.parse_number(MediaKind::Video, &t.name))
                .max()
                .unwrap_or(0)
                .saturating_add(1)
        }
        MediaKind::Audio => u32::try_from(sector.tracks_of(MediaKind::Audio).count())
            .unwrap_or(u32::MAX)
            .saturating_add(1),
    };
    labels.format(kind, number)
}
