//! Musical markup: the section outline a song is generated from.
//!
//! ```text
//! ##Intro (4 bars)
//! *Pad - warm sustained chords
//! *Bass - silent
//! ##verse-1 (8 bars)
//! *Bass - deep groove under the chords from %Intro
//! ```
//!
//! Sections keep outline order; `%name` tokens in a description are
//! references to earlier sections.

pub mod outline;

use serde::{Deserialize, Serialize};

/// Instrument line whose description drives the automation request.
pub const EFFECTS_INSTRUMENT: &str = "Effects";

/// One `instrument - description` line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkupInstrument {
    pub name: String,
    pub description: String,
    /// `%name` references in first-appearance order, duplicates kept.
    pub dependencies: Vec<String>,
}

/// A `##Name (N bars)` block and its instrument lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkupSection {
    pub name: String,
    pub number_bars: usize,
    pub instruments: Vec<MarkupInstrument>,
}

impl MarkupSection {
    /// Case-insensitive instrument lookup.
    pub fn instrument(&self, name: &str) -> Option<&MarkupInstrument> {
        self.instruments
            .iter()
            .find(|i| i.name.eq_ignore_ascii_case(name))
    }

    pub fn effects_description(&self) -> Option<&str> {
        self.instrument(EFFECTS_INSTRUMENT)
            .map(|i| i.description.as_str())
    }
}

/// A parsed outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MusicalMarkup {
    pub original_text: String,
    sections: Vec<MarkupSection>,
}

impl MusicalMarkup {
    pub fn sections(&self) -> &[MarkupSection] {
        &self.sections
    }

    /// Exact-name section lookup.
    pub fn section(&self, name: &str) -> Option<&MarkupSection> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn total_bars(&self) -> usize {
        self.sections.iter().map(|s| s.number_bars).sum()
    }
}
