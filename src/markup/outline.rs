//! Outline text → [`MusicalMarkup`].

use once_cell::sync::Lazy;
use regex::Regex;

use super::{MarkupInstrument, MarkupSection, MusicalMarkup};
use crate::error::FormatError;

const SECTION_MARKER: &str = "##";
const INSTRUMENT_SEPARATOR: &str = " - ";

static HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\w+-?\d?)\s*\((\d+)\s*(?i:bars?)\)").expect("valid regex"));

static REFERENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"%(\w+(?:-\d+)?)").expect("valid regex"));

impl MusicalMarkup {
    /// Parse an outline.
    ///
    /// Text before the first `##` is ignored. Each section header must carry
    /// a bar count, and every non-blank line after it must be
    /// `instrument - description`.
    pub fn parse(outline: &str) -> Result<Self, FormatError> {
        let mut chunks = outline.split(SECTION_MARKER);
        chunks.next();

        let mut sections: Vec<MarkupSection> = Vec::new();
        for chunk in chunks {
            let section = parse_section(chunk)?;
            if sections.iter().any(|s| s.name == section.name) {
                return Err(FormatError::DuplicateSection(section.name));
            }
            sections.push(section);
        }

        if sections.is_empty() {
            return Err(FormatError::NoSections);
        }

        Ok(Self {
            original_text: outline.to_string(),
            sections,
        })
    }
}

fn parse_section(chunk: &str) -> Result<MarkupSection, FormatError> {
    let mut lines = chunk.lines();
    let header = lines.next().unwrap_or_default();
    let caps = HEADER_RE
        .captures(header)
        .ok_or_else(|| FormatError::BadHeader(header.to_string()))?;
    let name = caps[1].to_string();
    let number_bars = caps[2]
        .parse::<usize>()
        .map_err(|_| FormatError::BadHeader(header.to_string()))?;

    let mut instruments: Vec<MarkupInstrument> = Vec::new();
    for line in lines.filter(|l| !l.trim().is_empty()) {
        let instrument = parse_instrument(line)?;
        match instruments.iter_mut().find(|i| i.name == instrument.name) {
            Some(existing) => *existing = instrument,
            None => instruments.push(instrument),
        }
    }

    Ok(MarkupSection {
        name,
        number_bars,
        instruments,
    })
}

fn parse_instrument(line: &str) -> Result<MarkupInstrument, FormatError> {
    let (instrument, description) = line
        .split_once(INSTRUMENT_SEPARATOR)
        .ok_or_else(|| FormatError::BadInstrumentLine(line.to_string()))?;

    let name = instrument.replace('*', "").trim().to_string();
    if name.is_empty() {
        return Err(FormatError::EmptyInstrument(line.to_string()));
    }

    let dependencies = REFERENCE_RE
        .captures_iter(description)
        .map(|caps| caps[1].to_string())
        .collect();

    Ok(MarkupInstrument {
        name,
        description: description.trim().to_string(),
        dependencies,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTLINE: &str = "Here is your outline!\n\
##Intro (4 bars)\n\
*Pad - The pad starts quietly.\n\
*Bass - Silent.\n\
*Drums - Only the hi-hat plays.\n\
\n\
##verse-1 (8 Bars)\n\
*Pad - Sustained chords.\n\
*Bass - A deep groove.\n\
*Drums - Full kit.\n\
*Effects - Lowpass opens over the section.\n\
\n\
##Chorus (16 bar)\n\
*Pad - Uplifting chords, different from %verse-1 and %Intro, unlike %verse-1.\n";

    #[test]
    fn parses_sections_in_order() {
        let markup = MusicalMarkup::parse(OUTLINE).unwrap();
        let names: Vec<&str> = markup.sections().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Intro", "verse-1", "Chorus"]);
        assert_eq!(markup.section("verse-1").unwrap().number_bars, 8);
        assert_eq!(markup.section("Chorus").unwrap().number_bars, 16);
        assert_eq!(markup.total_bars(), 28);
        assert_eq!(markup.original_text, OUTLINE);
    }

    #[test]
    fn strips_bullets_and_trims() {
        let markup = MusicalMarkup::parse(OUTLINE).unwrap();
        let intro = markup.section("Intro").unwrap();
        let names: Vec<&str> = intro.instruments.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["Pad", "Bass", "Drums"]);
        assert_eq!(intro.instruments[1].description, "Silent.");
    }

    #[test]
    fn collects_references_in_order_with_duplicates() {
        let markup = MusicalMarkup::parse(OUTLINE).unwrap();
        let pad = markup.section("Chorus").unwrap().instrument("Pad").unwrap();
        assert_eq!(pad.dependencies, ["verse-1", "Intro", "verse-1"]);
    }

    #[test]
    fn no_marker_is_format_error() {
        assert_eq!(
            MusicalMarkup::parse("just some prose"),
            Err(FormatError::NoSections)
        );
    }

    #[test]
    fn header_without_bar_count_is_format_error() {
        let err = MusicalMarkup::parse("##Intro\n*Pad - chords").unwrap_err();
        assert_eq!(err, FormatError::BadHeader("Intro".to_string()));
    }

    #[test]
    fn line_without_separator_is_format_error() {
        let err = MusicalMarkup::parse("##Intro (4 bars)\n*Pad: chords").unwrap_err();
        assert_eq!(err, FormatError::BadInstrumentLine("*Pad: chords".to_string()));
    }

    #[test]
    fn bullet_only_instrument_is_format_error() {
        let err = MusicalMarkup::parse("##Intro (4 bars)\n* - chords").unwrap_err();
        assert!(matches!(err, FormatError::EmptyInstrument(_)));
    }

    #[test]
    fn repeated_section_is_format_error() {
        let text = "##Intro (4 bars)\n*Pad - a\n##Intro (2 bars)\n*Pad - b";
        assert_eq!(
            MusicalMarkup::parse(text),
            Err(FormatError::DuplicateSection("Intro".to_string()))
        );
    }

    #[test]
    fn repeated_instrument_replaces_in_place() {
        let text = "##Intro (4 bars)\n*Pad - a\n*Bass - b\n*Pad - c";
        let markup = MusicalMarkup::parse(text).unwrap();
        let intro = &markup.sections()[0];
        assert_eq!(intro.instruments.len(), 2);
        assert_eq!(intro.instruments[0].description, "c");
    }

    #[test]
    fn description_may_contain_separator() {
        let text = "##Drop (2 bars)\n*Drums - kick - snare - kick";
        let markup = MusicalMarkup::parse(text).unwrap();
        assert_eq!(
            markup.sections()[0].instruments[0].description,
            "kick - snare - kick"
        );
    }
}
