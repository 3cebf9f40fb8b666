//! Song model: named sections of decoded bars, appended in generation order.

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::effects::{OverlayReport, SectionEffects, SongEffects};
use crate::error::{DecodeError, FormatError};
use crate::grid::{Bar, DecodeOptions};

static BLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\{[\s\S]+?\}\}\}").expect("valid regex"));

/// A named run of bars.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SongSection {
    pub name: String,
    pub bars: Vec<Bar>,
}

impl SongSection {
    pub fn new(name: impl Into<String>, bars: Vec<Bar>) -> Self {
        Self {
            name: name.into(),
            bars,
        }
    }

    /// Decode every `{{{ ... }}}` block of a model response, in order.
    pub fn from_prompt_text(text: &str, name: impl Into<String>) -> Result<Self, DecodeError> {
        Self::from_prompt_text_with(text, name, &DecodeOptions::default())
    }

    pub fn from_prompt_text_with(
        text: &str,
        name: impl Into<String>,
        options: &DecodeOptions,
    ) -> Result<Self, DecodeError> {
        let bars = BLOCK_RE
            .find_iter(text)
            .map(|block| Bar::decode_with(block.as_str(), options))
            .collect::<Result<Vec<_>, _>>()?;
        if bars.is_empty() {
            return Err(FormatError::MissingBlock.into());
        }
        Ok(Self::new(name, bars))
    }

    /// Like [`SongSection::from_prompt_text_with`], warning when the block
    /// count differs from the bar count that was asked for.
    pub fn from_prompt_text_expecting(
        text: &str,
        name: impl Into<String>,
        expected_bars: usize,
        options: &DecodeOptions,
    ) -> Result<Self, DecodeError> {
        let section = Self::from_prompt_text_with(text, name, options)?;
        if section.bars.len() != expected_bars {
            warn!(
                "section {} asked for {expected_bars} bars, model returned {}",
                section.name,
                section.bars.len()
            );
        }
        Ok(section)
    }

    /// Attach automation bar-by-bar. Returns the indices of bars that had none.
    pub fn apply_effects(&mut self, effects: &SectionEffects) -> Vec<usize> {
        let mut skipped = Vec::new();
        for (i, bar) in self.bars.iter_mut().enumerate() {
            match effects.bars.get(i) {
                Some(fx) => bar.apply_effects(fx),
                None => skipped.push(i),
            }
        }
        if !skipped.is_empty() {
            warn!(
                "section {}: automation covers {} of {} bars, skipped {:?}",
                self.name,
                effects.bars.len(),
                self.bars.len(),
                skipped
            );
        }
        skipped
    }

    /// All bars as prompt blocks, one after another.
    pub fn to_prompt_text(&self) -> String {
        self.bars
            .iter()
            .map(Bar::to_prompt_block)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// An ordered, append-only sequence of sections.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Song {
    sections: Vec<SongSection>,
}

impl Song {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_section(&mut self, section: SongSection) {
        self.sections.push(section);
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SongSection> {
        self.sections.iter()
    }

    pub fn sections(&self) -> &[SongSection] {
        &self.sections
    }

    /// Case-insensitive lookup of an already appended section.
    pub fn find(&self, name: &str) -> Option<&SongSection> {
        let wanted = name.to_lowercase();
        self.sections
            .iter()
            .find(|s| s.name.to_lowercase() == wanted)
    }

    pub fn bar_count(&self) -> usize {
        self.sections.iter().map(|s| s.bars.len()).sum()
    }

    /// Overlay automation onto every section that has an entry of the same name.
    pub fn apply_effects(&mut self, effects: &SongEffects) -> OverlayReport {
        let mut report = OverlayReport::default();
        for section in &mut self.sections {
            match effects.get(&section.name) {
                Some(fx) => {
                    let skipped = section.apply_effects(fx);
                    report
                        .skipped_bars
                        .extend(skipped.into_iter().map(|i| (section.name.clone(), i)));
                }
                None => report.untouched_sections.push(section.name.clone()),
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{EffectBar, FilterInformation};
    use crate::grid::Instrument;

    fn two_bar_response() -> String {
        let block = Bar::example().to_prompt_block();
        format!("Here are your bars:\n{block}\n\nand another\n{block}\nDone.")
    }

    fn lowpass_bar() -> EffectBar {
        EffectBar {
            drums: FilterInformation::new("lowpass", vec![1.0, 0.5]),
            ..EffectBar::default()
        }
    }

    #[test]
    fn decodes_every_block_in_order() {
        let section = SongSection::from_prompt_text(&two_bar_response(), "Intro").unwrap();
        assert_eq!(section.name, "Intro");
        assert_eq!(section.bars, vec![Bar::example(), Bar::example()]);
    }

    #[test]
    fn no_block_is_format_error() {
        let err = SongSection::from_prompt_text("I could not do that.", "Intro").unwrap_err();
        assert_eq!(err, DecodeError::Format(FormatError::MissingBlock));
    }

    #[test]
    fn one_bad_block_fails_the_section() {
        let text = format!("{}\n{{{{{{\nkick 1 1\n}}}}}}", Bar::example().to_prompt_block());
        assert!(matches!(
            SongSection::from_prompt_text(&text, "Intro"),
            Err(DecodeError::Validation(_))
        ));
    }

    #[test]
    fn bar_count_mismatch_is_not_an_error() {
        let section = SongSection::from_prompt_text_expecting(
            &two_bar_response(),
            "Intro",
            8,
            &DecodeOptions::default(),
        )
        .unwrap();
        assert_eq!(section.bars.len(), 2);
    }

    #[test]
    fn prompt_text_decodes_back() {
        let section = SongSection::new("Verse", vec![Bar::example(), Bar::rest()]);
        let back = SongSection::from_prompt_text(&section.to_prompt_text(), "Verse").unwrap();
        assert_eq!(back, section);
    }

    #[test]
    fn apply_effects_skips_bars_past_the_end() {
        let mut section = SongSection::new("Intro", vec![Bar::example(); 3]);
        let fx = SectionEffects {
            name: "Intro".to_string(),
            bars: vec![lowpass_bar(), lowpass_bar()],
        };
        assert_eq!(section.apply_effects(&fx), vec![2]);
        assert!(section.bars[1].track(Instrument::Drums).filter().is_some());
        assert!(section.bars[2].track(Instrument::Drums).filter().is_none());
    }

    #[test]
    fn song_overlay_reports_untouched_sections() {
        let mut song = Song::new();
        song.append_section(SongSection::new("Intro", vec![Bar::example(); 2]));
        song.append_section(SongSection::new("Outro", vec![Bar::example()]));

        let mut effects = SongEffects::new();
        effects
            .add_section(SectionEffects {
                name: "Intro".to_string(),
                bars: vec![lowpass_bar()],
            })
            .unwrap();

        let report = song.apply_effects(&effects);
        assert_eq!(report.skipped_bars, vec![("Intro".to_string(), 1)]);
        assert_eq!(report.untouched_sections, vec!["Outro".to_string()]);
        assert!(!report.is_complete());
    }

    #[test]
    fn find_ignores_case() {
        let mut song = Song::new();
        song.append_section(SongSection::new("verse-1", vec![Bar::rest()]));
        assert!(song.find("Verse-1").is_some());
        assert!(song.find("verse-2").is_none());
        assert_eq!(song.bar_count(), 1);
    }

    #[test]
    fn find_folds_unicode_case() {
        let mut song = Song::new();
        song.append_section(SongSection::new("Überleitung", vec![Bar::rest()]));
        assert!(song.find("überleitung").is_some());
        assert!(song.find("ÜBERLEITUNG").is_some());
    }
}
