use chrono::format::{Item, StrftimeItems};
use chrono::{FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::path::Path;

use crate::{MediaKind, TimelineError};

const NUMBER_SLOT: &str = "{n}";

/// Localized track-name templates. Each template carries a single `{n}` slot
/// for the 1-based per-kind track number.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TrackLabels {
    pub video: String,
    pub audio: String,
}

impl Default for TrackLabels {
    fn default() -> Self {
        Self {
            video: "Camera {n}".to_string(),
            audio: "Audio {n}".to_string(),
        }
    }
}

impl TrackLabels {
    pub fn template(&self, kind: MediaKind) -> &str {
        match kind {
            MediaKind::Video => &self.video,
            MediaKind::Audio => &self.audio,
        }
    }

    pub fn format(&self, kind: MediaKind, number: u32) -> String {
        self.template(kind)
            .replacen(NUMBER_SLOT, &number.to_string(), 1)
    }

    /// Recover `n` from a name rendered by the template for `kind`.
    ///
    /// Surrounding whitespace in the name is ignored; the text around the
    /// slot must otherwise match exactly.
    pub fn parse_number(&self, kind: MediaKind, name: &str) -> Option<u32> {
        let (prefix, suffix) = self.template(kind).split_once(NUMBER_SLOT)?;
        let digits = name
            .trim()
            .strip_prefix(prefix.trim_start())?
            .strip_suffix(suffix.trim_end())?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }

    fn validate(&self) -> Result<(), TimelineError> {
        for (kind, template) in [(MediaKind::Video, &self.video), (MediaKind::Audio, &self.audio)] {
            if template.matches(NUMBER_SLOT).count() != 1 {
                return Err(TimelineError::InvalidConfig(format!(
                    "{kind} label template must contain exactly one {NUMBER_SLOT} slot: {template:?}"
                )));
            }
        }
        Ok(())
    }
}

/// Layout settings for grouping imported clips into day sectors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LayoutConfig {
    pub labels: TrackLabels,
    /// Offset applied to clip start times before taking the calendar date.
    pub utc_offset_minutes: i32,
    /// chrono format string for sector names.
    pub sector_name_format: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            labels: TrackLabels::default(),
            utc_offset_minutes: 0,
            sector_name_format: "%Y-%m-%d".to_string(),
        }
    }
}

impl LayoutConfig {
    /// Missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, TimelineError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let bytes = std::fs::read(path)?;
        let parsed: LayoutConfig = serde_json::from_slice(&bytes)?;
        parsed.validate()?;
        Ok(parsed)
    }

    pub fn save(&self, path: &Path) -> Result<(), TimelineError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, format!("{json}\n"))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), TimelineError> {
        self.labels.validate()?;
        self.utc_offset()?;
        if self.sector_name_format.trim().is_empty() {
            return Err(TimelineError::InvalidConfig(
                "sector_name_format must not be empty".to_string(),
            ));
        }
        if StrftimeItems::new(&self.sector_name_format).any(|item| matches!(item, Item::Error)) {
            return Err(TimelineError::InvalidConfig(format!(
                "sector_name_format is not a valid date format: {:?}",
                self.sector_name_format
            )));
        }
        Ok(())
    }

    pub fn utc_offset(&self) -> Result<FixedOffset, TimelineError> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                TimelineError::InvalidConfig(format!(
                    "utc_offset_minutes out of range: {}",
                    self.utc_offset_minutes
                ))
            })
    }

    /// Falls back to ISO date when the format cannot render a date.
    pub fn sector_name(&self, day: NaiveDate) -> String {
        let mut name = String::new();
        if write!(name, "{}", day.format(&self.sector_name_format)).is_err() {
            return day.to_string();
        }
        name
    }
}
