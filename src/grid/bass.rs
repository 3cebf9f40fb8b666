//! Bass track: 16 sixteenth-note steps, each a pitch or a rest.

use serde::{Deserialize, Serialize};

use super::note::Note;
use super::STEPS;
use crate::effects::FilterInformation;
use crate::error::ValidationError;

/// Bass line of one bar.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BassBar {
    pub pattern: [Note; STEPS],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterInformation>,
}

impl BassBar {
    pub fn new(pattern: [Note; STEPS]) -> Self {
        Self {
            pattern,
            filter: None,
        }
    }

    /// Parse the data part of a bass line, e.g. `C2 0 0 0 A2 0 0 0 ...`.
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.len() != STEPS {
            return Err(ValidationError::new(
                "bass",
                format!("bass line must be {STEPS} notes long, got {}", tokens.len()),
                text,
            ));
        }

        let mut pattern = [Note::Rest; STEPS];
        for (slot, token) in pattern.iter_mut().zip(&tokens) {
            *slot = Note::parse(token).ok_or_else(|| {
                ValidationError::new("bass", format!("{token} is not a valid note format"), text)
            })?;
        }
        Ok(Self::new(pattern))
    }

    pub fn encode(&self) -> String {
        self.pattern
            .iter()
            .map(Note::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn is_silent(&self) -> bool {
        self.pattern.iter().all(Note::is_rest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_notes_and_rests() {
        let bar = BassBar::parse("C2 0 0 0 A2 0 0 0 F2 0 0 0 G#2 0 0 Bb1").unwrap();
        assert_eq!(bar.pattern[0].to_string(), "C2");
        assert!(bar.pattern[1].is_rest());
        assert_eq!(bar.pattern[15].to_string(), "Bb1");
    }

    #[test]
    fn rejects_short_line() {
        let err = BassBar::parse("C2 0 0 0").unwrap_err();
        assert_eq!(err.track, "bass");
        assert_eq!(err.value, "C2 0 0 0");
    }

    #[test]
    fn rejects_invalid_note() {
        let err = BassBar::parse("H2 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0").unwrap_err();
        assert!(err.reason.contains("H2"));
    }

    #[test]
    fn default_is_silent() {
        assert!(BassBar::default().is_silent());
        assert_eq!(BassBar::default().encode(), vec!["0"; 16].join(" "));
    }
}
