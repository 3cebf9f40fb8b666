//! Drum track: hi-hat, kick, and snare as 16-step hit/rest grids.

use serde::{Deserialize, Serialize};

use super::STEPS;
use crate::effects::FilterInformation;
use crate::error::ValidationError;

/// One drum voice for one bar. `true` = hit.
pub type DrumPattern = [bool; STEPS];

/// Drum voices of a bar. Each voice is either absent or exactly 16 steps.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DrumBar {
    pub hi_hat: Option<DrumPattern>,
    pub kick: Option<DrumPattern>,
    pub snare: Option<DrumPattern>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterInformation>,
}

impl DrumBar {
    /// All three voices present and silent.
    pub fn rest() -> Self {
        Self {
            hi_hat: Some([false; STEPS]),
            kick: Some([false; STEPS]),
            snare: Some([false; STEPS]),
            filter: None,
        }
    }

    /// Parse the data part of a drum line, e.g. `1 0 0 0 1 0 0 0 1 0 0 0 1 0 0 0`.
    pub fn parse_pattern(voice: &str, text: &str) -> Result<DrumPattern, ValidationError> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.len() != STEPS {
            return Err(ValidationError::new(
                voice,
                format!("drum track must be {STEPS} steps long, got {}", tokens.len()),
                text,
            ));
        }

        let mut pattern = [false; STEPS];
        for (slot, token) in pattern.iter_mut().zip(&tokens) {
            *slot = match *token {
                "0" => false,
                "1" => true,
                _ => {
                    return Err(ValidationError::new(
                        voice,
                        format!("drum values must be 0 or 1, got {token:?}"),
                        text,
                    ))
                }
            };
        }
        Ok(pattern)
    }

    pub fn encode_pattern(pattern: &DrumPattern) -> String {
        pattern
            .iter()
            .map(|&hit| if hit { "1" } else { "0" })
            .collect::<Vec<_>>()
            .join(" ")
    }
}
