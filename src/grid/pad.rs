//! Pad track: a chord per sixteenth step, written as bracket groups.
//!
//! The model may send 1, 2, 4, 8, or 16 groups; shorter sequences are
//! stretched to 16 slots by repeating each chord in a contiguous run.

use std::fmt;

use log::info;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::note::Pitch;
use super::STEPS;
use crate::effects::FilterInformation;
use crate::error::ValidationError;

/// Pre-expansion lengths a pad line may have.
pub const ALLOWED_LENGTHS: [usize; 5] = [1, 2, 4, 8, 16];

static GROUP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]*)\]").expect("valid regex"));

/// An ordered set of pitches sounding together. Empty = rest.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Chord {
    pub notes: Vec<Pitch>,
}

impl Chord {
    pub fn new(notes: Vec<Pitch>) -> Self {
        Self { notes }
    }

    pub fn rest() -> Self {
        Self::default()
    }

    pub fn is_rest(&self) -> bool {
        self.notes.is_empty()
    }

    /// Parse the inside of a bracket group, e.g. `C3 E3 G3` or ``.
    pub fn parse(inner: &str) -> Result<Self, ValidationError> {
        inner
            .split_whitespace()
            .map(|token| {
                Pitch::parse(token).ok_or_else(|| {
                    ValidationError::new("pad", format!("{token} is not a valid note format"), inner)
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let notes: Vec<String> = self.notes.iter().map(Pitch::to_string).collect();
        write!(f, "[{}]", notes.join(" "))
    }
}

/// Repeat each item `len / items.len()` times in place.
///
/// `[X, Y, Z, A]` stretched to 16 → `[X, X, X, X, Y, Y, Y, Y, Z, Z, Z, Z, A, A, A, A]`.
pub fn expand<T: Clone>(items: &[T], len: usize) -> Vec<T> {
    if items.is_empty() {
        return Vec::new();
    }
    let factor = len / items.len();
    items
        .iter()
        .flat_map(|item| std::iter::repeat(item.clone()).take(factor))
        .collect()
}

/// Pad chords of one bar, always exactly 16 slots after construction.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PadBar {
    pub chords: [Chord; STEPS],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterInformation>,
}

impl PadBar {
    /// Build from a chord sequence of an allowed length, expanding it to 16 slots.
    pub fn from_sequence(sequence: Vec<Chord>) -> Result<Self, ValidationError> {
        if !ALLOWED_LENGTHS.contains(&sequence.len()) {
            let shown: Vec<String> = sequence.iter().map(Chord::to_string).collect();
            return Err(ValidationError::new(
                "pad",
                format!(
                    "chord count must be one of {ALLOWED_LENGTHS:?}, got {}",
                    sequence.len()
                ),
                shown.join(" "),
            ));
        }
        if sequence.len() != STEPS {
            info!(
                "did not receive {STEPS} chords for pad, expanding {} to {STEPS}",
                sequence.len()
            );
        }

        let chords: [Chord; STEPS] = expand(&sequence, STEPS)
            .try_into()
            .map_err(|_| ValidationError::new("pad", "expansion did not fill the bar", ""))?;
        Ok(Self {
            chords,
            filter: None,
        })
    }

    /// Parse the data part of a pad line, e.g. `[C3 E3 G3 B3] [] [] [] ...`.
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        let sequence = GROUP_RE
            .captures_iter(text)
            .map(|caps| Chord::parse(&caps[1]))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_sequence(sequence)
    }

    pub fn encode(&self) -> String {
        self.chords
            .iter()
            .map(Chord::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn is_silent(&self) -> bool {
        self.chords.iter().all(Chord::is_rest)
    }
}
