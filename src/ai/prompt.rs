//! Prompt text for the three model requests: outline, section notes, and
//! section automation.

use std::fmt;

use crate::grid::{Bar, Instrument, STEPS};

const OUTLINE_FORMAT: &str = "Your format should be a musical markup language.

The music should be formatted as follows:

##section name (number of bars)
*instrument1 - detailed description of what instrument1 will do in section
*instrument2 - detailed description of what instrument2 will do in section
*Effects - how the filters on drums, bass, and pad move through the section

Reference an earlier section by writing %section-name in a description.";

const DEFAULT_SONG: &str = "make me an outline for a house track using only pad, bass, and drums \
consisting of snare, kick, and hi-hat. Provide how the material will develop.";

/// What a prompt asks for. Generators that cannot read prose use this to
/// shape their answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Outline,
    Section {
        name: String,
        bars: usize,
    },
    Effects {
        name: String,
        bars: usize,
        values_per_bar: usize,
    },
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Request::Outline => f.write_str("outline"),
            Request::Section { name, bars } => write!(f, "section {name} ({bars} bars)"),
            Request::Effects { name, .. } => write!(f, "effects for {name}"),
        }
    }
}

/// A system/user message pair plus the structured request behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
    pub request: Request,
}

impl Prompt {
    /// Ask for a song outline. `None` asks for a generic house track.
    pub fn outline(song_description: Option<&str>) -> Self {
        let user = match song_description {
            Some(description) => format!(
                "make me an outline for a house track using only pad, bass, and drums: {description}"
            ),
            None => DEFAULT_SONG.to_string(),
        };
        Self {
            system: format!("Perform the following task.\n{OUTLINE_FORMAT}"),
            user,
            request: Request::Outline,
        }
    }

    /// Ask for the bars of one section. `descriptions` are already resolved
    /// against earlier sections.
    pub fn section(name: &str, bars: usize, descriptions: &[(Instrument, String)]) -> Self {
        let system = format!(
            "Answer the user query.
FORMAT INSTRUCTIONS:

1. Structure:
    - Section format: list of bars: bar, bar, bar, bar
    - Each instrument: {STEPS} notes per bar.
    - Note separation: Spaces.
    - A rest is written 0. Pad chords are written in brackets, [] for silence.

2. Bar Formatting:
    - Bar enclosure: {{{{{{ and }}}}}}.
    - Bar example:
{}

Ensure adherence to this format for accurate parsing.",
            Bar::example().to_prompt_block()
        );

        let mut user =
            format!("generate {bars} bars for the {name} section of a house song using the following descriptions:");
        for (instrument, description) in descriptions {
            user.push_str(&format!("\n{instrument}: {description}"));
        }

        Self {
            system,
            user,
            request: Request::Section {
                name: name.to_string(),
                bars,
            },
        }
    }

    /// Ask for filter automation of one section.
    pub fn effects(name: &str, bars: usize, values_per_bar: usize, description: &str) -> Self {
        let total = bars * values_per_bar;
        let system = format!(
            "Your job is to take a text description of the effects of a section of a song \
and express it in a machine readable format.

# Formatting:
- Give one line each for drums, bass, and pad. Preface each line with a #.
- After the instrument, give the filter type (lowpass, hipass, or bandpass).
- Then give {total} filter values separated by spaces, {values_per_bar} per bar, \
normalized between 0 and 1.
- If you do not want an effect to be present, give it a value of 1.

example for 1 bar:
#drums lowpass 1 0.8 0.6 0.4
#bass hipass 0 0 0.2 0.4
#pad bandpass 1 1 1 1

The text you produce will be programatically parsed into a song. \
Please follow the format instructions carefully."
        );
        let user = format!(
            "Realize the following description for {bars} bars into the required format: {description}"
        );
        Self {
            system,
            user,
            request: Request::Effects {
                name: name.to_string(),
                bars,
                values_per_bar,
            },
        }
    }
}
