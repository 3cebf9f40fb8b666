//! Filter automation: per-instrument curves parsed from model text and
//! overlaid onto generated bars.

pub mod automation;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::Instrument;

/// One bar of filter automation for one instrument.
///
/// The empty placeholder (`""`, no values) stands in for an instrument the
/// model did not automate.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterInformation {
    pub filter_type: String,
    /// Normalized cutoff samples in `[0, 1]`.
    pub filter_value: Vec<f64>,
}

impl FilterInformation {
    pub fn new(filter_type: impl Into<String>, filter_value: Vec<f64>) -> Self {
        Self {
            filter_type: filter_type.into(),
            filter_value,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.filter_type.is_empty() && self.filter_value.is_empty()
    }
}

/// Filter automation for every instrument of one bar.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EffectBar {
    pub drums: FilterInformation,
    pub bass: FilterInformation,
    pub pad: FilterInformation,
}

impl EffectBar {
    pub fn get(&self, instrument: Instrument) -> &FilterInformation {
        match instrument {
            Instrument::Drums => &self.drums,
            Instrument::Bass => &self.bass,
            Instrument::Pad => &self.pad,
        }
    }
}

/// Automation for one named section, one [`EffectBar`] per bar.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SectionEffects {
    pub name: String,
    pub bars: Vec<EffectBar>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("section named `{0}` already has effects")]
pub struct DuplicateSectionEffects(pub String);

/// Section-name-keyed automation for a whole song.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SongEffects {
    sections: Vec<SectionEffects>,
}

impl SongEffects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add automation for a section. Each name may be added once.
    pub fn add_section(&mut self, section: SectionEffects) -> Result<(), DuplicateSectionEffects> {
        if self.get(&section.name).is_some() {
            return Err(DuplicateSectionEffects(section.name));
        }
        self.sections.push(section);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&SectionEffects> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SectionEffects> {
        self.sections.iter()
    }
}

/// What an overlay pass could not apply.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OverlayReport {
    /// `(section, bar index)` for bars past the end of their automation.
    pub skipped_bars: Vec<(String, usize)>,
    /// Sections with no automation entry at all.
    pub untouched_sections: Vec<String>,
}

impl OverlayReport {
    pub fn is_complete(&self) -> bool {
        self.skipped_bars.is_empty() && self.untouched_sections.is_empty()
    }
}
