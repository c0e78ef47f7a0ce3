/// Camera identity: decides whether two video clips come from the same
/// recording device.
use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

use crate::{Clip, MediaKind, TrackLabels};

const SYNTHETIC_PREFIX: &str = "camera-";
const SYNTHETIC_SUFFIX_LEN: usize = 6;

/// Resolves a stable camera key for a clip. Implementations hold no memory
/// across calls; callers compare two results for equality.
pub trait CameraIdResolver {
    fn resolve(&self, clip: &Clip, fallback_track_name: Option<&str>) -> String;
}

/// Default identity: name-encoded camera number, then pixel size, then a
/// synthetic id that matches nothing else.
pub fn resolve_camera_id<R: Rng + ?Sized>(
    clip: &Clip,
    fallback_track_name: Option<&str>,
    labels: &TrackLabels,
    rng: &mut R,
) -> String {
    if let Some(number) =
        fallback_track_name.and_then(|name| labels.parse_number(MediaKind::Video, name))
    {
        return number.to_string();
    }
    if let Some(id) = resolution_id(clip) {
        return id;
    }
    synthetic_camera_id(rng)
}

/// `"{width}x{height}"` when the clip reports a non-empty video stream.
pub fn resolution_id(clip: &Clip) -> Option<String> {
    clip.video
        .filter(|v| v.width > 0 && v.height > 0)
        .map(|v| format!("{}x{}", v.width, v.height))
}

pub fn synthetic_camera_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    let suffix: String = std::iter::repeat_with(|| rng.sample(Alphanumeric))
        .take(SYNTHETIC_SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("{SYNTHETIC_PREFIX}{suffix}")
}

pub fn is_synthetic_camera_id(id: &str) -> bool {
    id.strip_prefix(SYNTHETIC_PREFIX)
        .is_some_and(|s| s.len() == SYNTHETIC_SUFFIX_LEN)
}

/// Resolution-based resolver. Unseeded instances draw synthetic ids from
/// entropy; seeded ones are reproducible.
pub struct ResolutionResolver {
    labels: TrackLabels,
    rng: Mutex<StdRng>,
}

impl ResolutionResolver {
    pub fn new(labels: TrackLabels) -> Self {
        Self {
            labels,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn with_seed(labels: TrackLabels, seed: u64) -> Self {
        Self {
            labels,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for ResolutionResolver {
    fn default() -> Self {
        Self::new(TrackLabels::default())
    }
}

impl CameraIdResolver for ResolutionResolver {
    fn resolve(&self, clip: &Clip, fallback_track_name: Option<&str>) -> String {
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        resolve_camera_id(clip, fallback_track_name, &self.labels, &mut *rng)
    }
}
