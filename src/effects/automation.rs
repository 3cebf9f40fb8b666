//! Automation text: `#<instrument> <filter_type> <v1> ... <vN>`, one line per
//! instrument, values chunked into bars of `values_per_bar`.

use std::str::FromStr;

use log::debug;

use super::{EffectBar, FilterInformation, SectionEffects};
use crate::error::{DecodeError, FormatError, ValidationError};
use crate::grid::Instrument;

const LINE_MARKER: char = '#';

impl SectionEffects {
    /// Parse a section's automation text.
    ///
    /// Lines not starting with `#` are ignored, as are markdown headings
    /// (`#` followed by a space or another `#`). An instrument without a line
    /// gets empty placeholders, as many as the first supplied line has bars.
    pub fn parse(
        text: &str,
        name: impl Into<String>,
        values_per_bar: usize,
    ) -> Result<Self, DecodeError> {
        if values_per_bar == 0 {
            return Err(
                ValidationError::new("effects", "values per bar must be positive", "0").into(),
            );
        }

        let mut supplied: Vec<(Instrument, Vec<FilterInformation>)> = Vec::new();
        for line in text
            .lines()
            .map(str::trim)
            .filter(|l| l.starts_with(LINE_MARKER))
        {
            if is_heading(line) {
                debug!("skipping heading in automation: {line:?}");
                continue;
            }
            let (instrument, bars) = parse_line(line, values_per_bar)?;
            if supplied.iter().any(|(i, _)| *i == instrument) {
                return Err(FormatError::DuplicateEffects(instrument.to_string()).into());
            }
            supplied.push((instrument, bars));
        }

        let name = name.into();
        let Some(bar_count) = supplied.first().map(|(_, bars)| bars.len()) else {
            debug!("no automation lines for section {name}");
            return Ok(Self {
                name,
                bars: Vec::new(),
            });
        };

        if let Some((instrument, bars)) = supplied.iter().find(|(_, b)| b.len() != bar_count) {
            return Err(ValidationError::new(
                instrument.as_str(),
                format!(
                    "automation covers {} bar(s) but the first line covers {bar_count}",
                    bars.len()
                ),
                format!("{} values", bars.len() * values_per_bar),
            )
            .into());
        }

        let mut take = |instrument: Instrument| {
            supplied
                .iter()
                .position(|(i, _)| *i == instrument)
                .map(|idx| supplied.swap_remove(idx).1)
                .unwrap_or_else(|| vec![FilterInformation::empty(); bar_count])
        };
        let drums = take(Instrument::Drums);
        let bass = take(Instrument::Bass);
        let pad = take(Instrument::Pad);

        let bars = drums
            .into_iter()
            .zip(bass)
            .zip(pad)
            .map(|((drums, bass), pad)| EffectBar { drums, bass, pad })
            .collect();

        Ok(Self { name, bars })
    }

    /// Automation text for this section, one line per non-placeholder instrument.
    pub fn to_automation_text(&self) -> String {
        let mut lines = Vec::new();
        for instrument in Instrument::ALL {
            let chunks: Vec<&FilterInformation> =
                self.bars.iter().map(|b| b.get(instrument)).collect();
            let Some(first) = chunks.first() else {
                continue;
            };
            if first.is_empty() {
                continue;
            }
            let values: Vec<String> = chunks
                .iter()
                .flat_map(|f| f.filter_value.iter().map(f64::to_string))
                .collect();
            lines.push(format!(
                "{LINE_MARKER}{instrument} {} {}",
                first.filter_type,
                values.join(" ")
            ));
        }
        lines.join("\n")
    }
}

/// `#`, `# Title`, `## Title`: no instrument name right after the marker.
fn is_heading(line: &str) -> bool {
    line.trim_start_matches(LINE_MARKER)
        .chars()
        .next()
        .map_or(true, char::is_whitespace)
}

fn parse_line(
    line: &str,
    values_per_bar: usize,
) -> Result<(Instrument, Vec<FilterInformation>), DecodeError> {
    let mut parts = line.split_whitespace();
    let head = parts.next().unwrap_or_default();
    let instrument_name = head.trim_start_matches(LINE_MARKER);
    let instrument = Instrument::from_str(instrument_name)
        .map_err(|_| FormatError::UnknownEffectsInstrument(instrument_name.to_string()))?;

    let filter_type = parts
        .next()
        .filter(|t| t.parse::<f64>().is_err())
        .ok_or_else(|| FormatError::BadEffectsLine(line.to_string()))?;

    let raw: Vec<&str> = parts.collect();
    let shown = raw.join(" ");
    if raw.len() % values_per_bar != 0 {
        return Err(ValidationError::new(
            instrument.as_str(),
            format!(
                "value count must be a multiple of {values_per_bar}, got {}",
                raw.len()
            ),
            shown,
        )
        .into());
    }

    let values = raw
        .iter()
        .map(|token| {
            token
                .parse::<f64>()
                .ok()
                .filter(|v| (0.0..=1.0).contains(v))
                .ok_or_else(|| {
                    ValidationError::new(
                        instrument.as_str(),
                        format!("filter values must be numbers between 0 and 1, got {token:?}"),
                        shown.as_str(),
                    )
                })
        })
        .collect::<Result<Vec<f64>, _>>()?;

    let bars = values
        .chunks(values_per_bar)
        .map(|chunk| FilterInformation::new(filter_type, chunk.to_vec()))
        .collect();
    Ok((instrument, bars))
}
