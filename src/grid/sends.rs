//! Delay and reverb send levels, one per sixteenth step.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::STEPS;
use crate::error::ValidationError;

/// A send level in `[0.00, 1.00]`, quantized to hundredths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Level(u8);

impl Level {
    pub const MAX: Level = Level(100);

    /// Quantize a decimal to two places. `None` outside `[0, 1]` or non-finite.
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return None;
        }
        Some(Self((value * 100.0).round() as u8))
    }

    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl TryFrom<f64> for Level {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::from_f64(value).ok_or_else(|| format!("{value} is outside 0.0..=1.0"))
    }
}

impl From<Level> for f64 {
    fn from(level: Level) -> Self {
        level.as_f64()
    }
}

/// Per-step delay and reverb amounts for one bar.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EffectsBar {
    pub delay: [Level; STEPS],
    pub reverb: [Level; STEPS],
}

impl EffectsBar {
    /// Parse the data part of a `delay` or `reverb` line.
    pub fn parse_levels(key: &str, text: &str) -> Result<[Level; STEPS], ValidationError> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.len() != STEPS {
            return Err(ValidationError::new(
                key,
                format!("effects track must be {STEPS} values long, got {}", tokens.len()),
                text,
            ));
        }

        let mut levels = [Level::default(); STEPS];
        for (slot, token) in levels.iter_mut().zip(&tokens) {
            *slot = token
                .parse::<f64>()
                .ok()
                .and_then(Level::from_f64)
                .ok_or_else(|| {
                    ValidationError::new(
                        key,
                        format!("effects values must be between 0 and 1, got {token:?}"),
                        text,
                    )
                })?;
        }
        Ok(levels)
    }

    pub fn encode_levels(levels: &[Level; STEPS]) -> String {
        levels
            .iter()
            .map(Level::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Delay ramping up from 0 to 1 while reverb ramps down.
    pub fn crossfade() -> Self {
        let mut delay = [Level::default(); STEPS];
        for (i, slot) in delay.iter_mut().enumerate() {
            *slot = Level::from_f64(i as f64 / (STEPS - 1) as f64).unwrap_or(Level::MAX);
        }
        let mut reverb = delay;
        reverb.reverse();
        Self { delay, reverb }
    }
}
