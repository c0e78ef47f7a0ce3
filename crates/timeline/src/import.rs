/// Groups imported clips by capture day and media kind and feeds each group
/// through the track assignment engine.
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::{
    assign_clips_to_tracks, AssignContext, CameraIdResolver, Clip, LayoutConfig, MediaKind,
    Placement, Sector, Seconds, TimelineError,
};

/// Calendar date of `seconds` (epoch) in the given offset. Out-of-range
/// timestamps fall back to the epoch day.
pub fn day_key(seconds: Seconds, offset: FixedOffset) -> NaiveDate {
    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1e9) as u32;
    DateTime::from_timestamp(whole as i64, nanos.min(999_999_999))
        .unwrap_or_default()
        .with_timezone(&offset)
        .date_naive()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Timeline {
    #[serde(default)]
    pub sectors: Vec<Sector>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub sectors_created: usize,
    pub tracks_created: usize,
    pub placements: Vec<Placement>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sector_for_day(&self, day: NaiveDate) -> Option<&Sector> {
        self.sectors.iter().find(|s| s.day == Some(day))
    }

    /// Position of the sector for `day`: by day key first, then by a
    /// day-less sector whose name matches the localized day label.
    fn find_sector(&self, day: NaiveDate, name: &str) -> Option<usize> {
        self.sectors
            .iter()
            .position(|s| s.day == Some(day))
            .or_else(|| {
                self.sectors
                    .iter()
                    .position(|s| s.day.is_none() && s.name == name)
            })
    }

    /// Imports `clips`, creating sectors lazily per capture day. Within a
    /// day, video is placed before audio and input order is preserved.
    pub fn import_clips(
        &mut self,
        clips: Vec<Clip>,
        config: &LayoutConfig,
        resolver: &dyn CameraIdResolver,
    ) -> Result<ImportReport, TimelineError> {
        let offset = config.utc_offset()?;
        let ctx = AssignContext::new(&config.labels, resolver);
        let mut report = ImportReport::default();

        let mut by_day: BTreeMap<NaiveDate, Vec<Clip>> = BTreeMap::new();
        for clip in clips {
            by_day
                .entry(day_key(clip.start(), offset))
                .or_default()
                .push(clip);
        }

        for (day, day_clips) in by_day {
            let name = config.sector_name(day);
            let idx = match self.find_sector(day, &name) {
                Some(idx) => {
                    debug!(sector = %name, "merging into existing sector");
                    idx
                }
                None => {
                    self.sectors.push(Sector::new(Some(day), name.clone()));
                    report.sectors_created += 1;
                    self.sectors.len() - 1
                }
            };
            let sector = &mut self.sectors[idx];
            sector.day = Some(day);

            let (video, audio): (Vec<Clip>, Vec<Clip>) = day_clips
                .into_iter()
                .partition(|c| c.kind == MediaKind::Video);
            for (kind, group) in [(MediaKind::Video, video), (MediaKind::Audio, audio)] {
                if group.is_empty() {
                    continue;
                }
                let placements = assign_clips_to_tracks(group, sector, kind, &ctx);
                report.tracks_created += placements.iter().filter(|p| p.created).count();
                report.placements.extend(placements);
                sector.recompute();
            }

            info!(
                sector = %sector.name,
                tracks = sector.tracks.len(),
                clips = sector.clip_count(),
                "sector updated"
            );
        }

        self.sort_sectors();
        Ok(report)
    }

    /// Chronological by day; sectors without a day keep their relative order
    /// after the dated ones.
    fn sort_sectors(&mut self) {
        self.sectors.sort_by_key(|s| (s.day.is_none(), s.day));
    }

    pub fn track_count(&self) -> usize {
        self.sectors.iter().map(|s| s.tracks.len()).sum()
    }

    pub fn clip_count(&self) -> usize {
        self.sectors.iter().map(Sector::clip_count).sum()
    }
}
