/// Half-open time intervals and the per-clip range projection used as
/// track and sector caches.
use serde::{Deserialize, Serialize};

use crate::{Clip, Seconds};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TimeRange {
    pub start: Seconds,
    pub end: Seconds,
}

impl TimeRange {
    pub fn new(start: Seconds, end: Seconds) -> Self {
        Self { start, end }
    }

    pub fn of(clip: &Clip) -> Self {
        Self::new(clip.start(), clip.end())
    }

    pub fn duration(&self) -> Seconds {
        (self.end - self.start).max(0.0)
    }

    pub fn overlaps(&self, other: &TimeRange) -> bool {
        do_time_ranges_overlap(self.start, self.end, other.start, other.end)
    }
}

/// True iff `[start_a, end_a)` and `[start_b, end_b)` intersect.
///
/// Empty or inverted intervals have no interior and never overlap anything,
/// including an interval that strictly contains their start point.
pub fn do_time_ranges_overlap(
    start_a: Seconds,
    end_a: Seconds,
    start_b: Seconds,
    end_b: Seconds,
) -> bool {
    if !(start_a < end_a) || !(start_b < end_b) {
        return false;
    }
    start_a < end_b && start_b < end_a
}

/// One range per clip, in input order. Ranges are not merged.
pub fn calculate_time_ranges<'a, I>(clips: I) -> Vec<TimeRange>
where
    I: IntoIterator<Item = &'a Clip>,
{
    clips.into_iter().map(TimeRange::of).collect()
}

/// Earliest start and latest end over `ranges`, or `None` when empty.
pub fn span<'a, I>(ranges: I) -> Option<(Seconds, Seconds)>
where
    I: IntoIterator<Item = &'a TimeRange>,
{
    ranges.into_iter().fold(None, |acc, r| match acc {
        None => Some((r.start, r.end)),
        Some((lo, hi)) => Some((lo.min(r.start), hi.max(r.end))),
    })
}
