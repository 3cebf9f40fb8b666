//! Note tokens: `C3`, `G#4`, `Bb2`, or the rest token `0`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The literal rest token.
pub const REST_TOKEN: &str = "0";

const MAX_OCTAVE: u8 = 8;

/// Sharp, flat, or neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accidental {
    Natural,
    Sharp,
    Flat,
}

/// A pitched note token matching `[A-G][#b]?[0-8]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pitch {
    letter: char,
    accidental: Accidental,
    octave: u8,
}

impl Pitch {
    /// Parse a pitch token.
    ///
    /// Format: `<letter><optional accidental><octave>`
    /// - Letter: C, D, E, F, G, A, B
    /// - Accidental: # (sharp) or b (flat)
    /// - Octave: a single digit 0 to 8
    pub fn parse(token: &str) -> Option<Self> {
        let mut chars = token.chars();

        let letter = chars.next().filter(|c| ('A'..='G').contains(c))?;

        let mut rest = chars.as_str();
        let accidental = if let Some(r) = rest.strip_prefix('#') {
            rest = r;
            Accidental::Sharp
        } else if let Some(r) = rest.strip_prefix('b') {
            rest = r;
            Accidental::Flat
        } else {
            Accidental::Natural
        };

        let mut digits = rest.chars();
        let octave = digits.next()?.to_digit(10)? as u8;
        if digits.next().is_some() || octave > MAX_OCTAVE {
            return None;
        }

        Some(Self {
            letter,
            accidental,
            octave,
        })
    }

    /// MIDI note number. C4 = middle C = 60, so `Cb0` = 11 and `B#8` = 120.
    pub fn midi(&self) -> u8 {
        let base: i32 = match self.letter {
            'C' => 0,
            'D' => 2,
            'E' => 4,
            'F' => 5,
            'G' => 7,
            'A' => 9,
            _ => 11,
        };
        let accidental = match self.accidental {
            Accidental::Natural => 0,
            Accidental::Sharp => 1,
            Accidental::Flat => -1,
        };
        // MIDI note = (octave + 1) * 12 + base + accidental
        ((self.octave as i32 + 1) * 12 + base + accidental) as u8
    }

    /// Spell a MIDI number with sharps. `None` when the octave falls outside 0–8.
    pub fn from_midi(midi: u8) -> Option<Self> {
        const SPELLING: [(char, Accidental); 12] = [
            ('C', Accidental::Natural),
            ('C', Accidental::Sharp),
            ('D', Accidental::Natural),
            ('D', Accidental::Sharp),
            ('E', Accidental::Natural),
            ('F', Accidental::Natural),
            ('F', Accidental::Sharp),
            ('G', Accidental::Natural),
            ('G', Accidental::Sharp),
            ('A', Accidental::Natural),
            ('A', Accidental::Sharp),
            ('B', Accidental::Natural),
        ];
        let octave = (midi / 12).checked_sub(1)?;
        if octave > MAX_OCTAVE {
            return None;
        }
        let (letter, accidental) = SPELLING[(midi % 12) as usize];
        Some(Self {
            letter,
            accidental,
            octave,
        })
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let accidental = match self.accidental {
            Accidental::Natural => "",
            Accidental::Sharp => "#",
            Accidental::Flat => "b",
        };
        write!(f, "{}{}{}", self.letter, accidental, self.octave)
    }
}

impl TryFrom<String> for Pitch {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("{value} is not a valid note format"))
    }
}

impl From<Pitch> for String {
    fn from(pitch: Pitch) -> Self {
        pitch.to_string()
    }
}

/// A bass step: a pitch or a rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Note {
    #[default]
    Rest,
    Pitch(Pitch),
}

impl Note {
    /// Parse a pitch token or the rest token `0`.
    pub fn parse(token: &str) -> Option<Self> {
        if token == REST_TOKEN {
            Some(Note::Rest)
        } else {
            Pitch::parse(token).map(Note::Pitch)
        }
    }

    pub fn is_rest(&self) -> bool {
        matches!(self, Note::Rest)
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Note::Rest => f.write_str(REST_TOKEN),
            Note::Pitch(p) => p.fmt(f),
        }
    }
}

impl TryFrom<String> for Note {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("{value} is not a valid note format"))
    }
}

impl From<Note> for String {
    fn from(note: Note) -> Self {
        note.to_string()
    }
}
