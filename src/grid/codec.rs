//! Text forms of a [`Bar`]: canonical key→line pairs and the `{{{ }}}` prompt block.
//!
//! ```text
//! {{{
//! hi_hat 1 0 1 0 1 0 1 0 1 0 1 0 1 0 1 0
//! kick 1 0 0 0 1 0 0 0 1 0 0 0 1 0 0 0
//! snare 0 0 0 0 1 0 0 0 0 0 0 0 1 0 0 0
//! bass C2 0 0 0 A2 0 0 0 F2 0 0 0 G2 0 0 0
//! pad [C3 E3 G3 B3] [] [] [] [A3 C4 E4 G4] [] [] [] [F3 A3 C4 E4] [] [] [] [G3 B3 D4 F4] [] [] []
//! }}}
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use super::bass::BassBar;
use super::drums::{DrumBar, DrumPattern};
use super::pad::PadBar;
use super::sends::EffectsBar;
use super::{Bar, STEPS};
use crate::error::{DecodeError, FormatError};

pub const BLOCK_OPEN: &str = "{{{";
pub const BLOCK_CLOSE: &str = "}}}";

/// Line keys of the canonical form, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKey {
    HiHat,
    Kick,
    Snare,
    Bass,
    Pad,
    Delay,
    Reverb,
}

impl TrackKey {
    pub const ALL: [TrackKey; 7] = [
        TrackKey::HiHat,
        TrackKey::Kick,
        TrackKey::Snare,
        TrackKey::Bass,
        TrackKey::Pad,
        TrackKey::Delay,
        TrackKey::Reverb,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TrackKey::HiHat => "hi_hat",
            TrackKey::Kick => "kick",
            TrackKey::Snare => "snare",
            TrackKey::Bass => "bass",
            TrackKey::Pad => "pad",
            TrackKey::Delay => "delay",
            TrackKey::Reverb => "reverb",
        }
    }

    /// Data part of `line` if the line belongs to this key.
    ///
    /// The key must be followed by a single space or end the line, so `hi`
    /// would never claim a `hi_hat` line.
    pub fn strip_from<'a>(&self, line: &'a str) -> Option<&'a str> {
        let rest = line.strip_prefix(self.as_str())?;
        if rest.is_empty() {
            Some(rest)
        } else {
            rest.strip_prefix(' ')
        }
    }
}

impl fmt::Display for TrackKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do when a core track line is missing entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingTrack {
    /// Substitute an all-rest track.
    #[default]
    Rest,
    /// Leave drum voices absent; bass and pad still fall back to rests.
    Absent,
    /// Refuse the bar.
    Reject,
}

/// Decode tolerance settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeOptions {
    pub missing: MissingTrack,
}

impl DecodeOptions {
    pub fn new(missing: MissingTrack) -> Self {
        Self { missing }
    }
}

impl Bar {
    /// Decode canonical lines or a prompt block with default options.
    pub fn decode(text: &str) -> Result<Bar, DecodeError> {
        Self::decode_with(text, &DecodeOptions::default())
    }

    /// Decode canonical lines or a prompt block.
    ///
    /// Unrecognised lines (the braces, model chatter) are ignored. A key that
    /// shows up on more than one line is a format error.
    pub fn decode_with(text: &str, options: &DecodeOptions) -> Result<Bar, DecodeError> {
        let lines: Vec<&str> = text.lines().map(str::trim).collect();

        let mut pairs = Vec::new();
        for key in TrackKey::ALL {
            let found: Vec<&str> = lines.iter().filter_map(|l| key.strip_from(l)).collect();
            match found.as_slice() {
                [] => {}
                [value] => pairs.push((key, value.to_string())),
                _ => {
                    return Err(FormatError::DuplicateTrack {
                        key: key.as_str(),
                        count: found.len(),
                    }
                    .into())
                }
            }
        }

        Self::from_keypairs_with(&pairs, options)
    }

    /// Build a bar from key→data pairs with default options.
    pub fn from_keypairs(pairs: &[(TrackKey, String)]) -> Result<Bar, DecodeError> {
        Self::from_keypairs_with(pairs, &DecodeOptions::default())
    }

    /// Build a bar from key→data pairs. Values carry data only, never the key.
    pub fn from_keypairs_with(
        pairs: &[(TrackKey, String)],
        options: &DecodeOptions,
    ) -> Result<Bar, DecodeError> {
        let drums = DrumBar {
            hi_hat: drum_voice(pairs, TrackKey::HiHat, options)?,
            kick: drum_voice(pairs, TrackKey::Kick, options)?,
            snare: drum_voice(pairs, TrackKey::Snare, options)?,
            filter: None,
        };

        let bass = match lookup(pairs, TrackKey::Bass)? {
            Some(value) => BassBar::parse(value)?,
            None if options.missing == MissingTrack::Reject => {
                return Err(FormatError::MissingTrack("bass").into())
            }
            None => BassBar::default(),
        };

        let pad = match lookup(pairs, TrackKey::Pad)? {
            Some(value) => PadBar::parse(value)?,
            None if options.missing == MissingTrack::Reject => {
                return Err(FormatError::MissingTrack("pad").into())
            }
            None => PadBar::default(),
        };

        let effects = match (lookup(pairs, TrackKey::Delay)?, lookup(pairs, TrackKey::Reverb)?) {
            (Some(delay), Some(reverb)) => Some(EffectsBar {
                delay: EffectsBar::parse_levels("delay", delay)?,
                reverb: EffectsBar::parse_levels("reverb", reverb)?,
            }),
            (None, None) => None,
            _ => return Err(FormatError::UnpairedSends.into()),
        };

        Ok(Bar {
            drums,
            bass,
            pad,
            effects,
        })
    }

    /// Canonical key→data pairs in emission order. Absent tracks are skipped.
    pub fn to_keypairs(&self) -> Vec<(TrackKey, String)> {
        let mut pairs = Vec::with_capacity(TrackKey::ALL.len());
        let voices = [
            (TrackKey::HiHat, &self.drums.hi_hat),
            (TrackKey::Kick, &self.drums.kick),
            (TrackKey::Snare, &self.drums.snare),
        ];
        for (key, voice) in voices {
            if let Some(pattern) = voice {
                pairs.push((key, DrumBar::encode_pattern(pattern)));
            }
        }
        pairs.push((TrackKey::Bass, self.bass.encode()));
        pairs.push((TrackKey::Pad, self.pad.encode()));
        if let Some(fx) = &self.effects {
            pairs.push((TrackKey::Delay, EffectsBar::encode_levels(&fx.delay)));
            pairs.push((TrackKey::Reverb, EffectsBar::encode_levels(&fx.reverb)));
        }
        pairs
    }

    /// Canonical form: one `<key> <values>` line per present track.
    pub fn encode(&self) -> String {
        join_lines(&self.to_keypairs())
    }

    /// Canonical form wrapped in `{{{` / `}}}` for the model.
    pub fn to_prompt_block(&self) -> String {
        format!("{BLOCK_OPEN}\n{}\n{BLOCK_CLOSE}", self.encode())
    }
}

/// The single data value for `key`, if present.
fn lookup(pairs: &[(TrackKey, String)], key: TrackKey) -> Result<Option<&str>, FormatError> {
    let mut matching = pairs.iter().filter(|(k, _)| *k == key);
    let Some((_, value)) = matching.next() else {
        return Ok(None);
    };
    let extra = matching.count();
    if extra > 0 {
        return Err(FormatError::DuplicateTrack {
            key: key.as_str(),
            count: extra + 1,
        });
    }
    if value.starts_with(&format!("{key} ")) {
        return Err(FormatError::KeyInValue {
            key: key.as_str(),
            value: value.clone(),
        });
    }
    Ok(Some(value.as_str()))
}

fn drum_voice(
    pairs: &[(TrackKey, String)],
    key: TrackKey,
    options: &DecodeOptions,
) -> Result<Option<DrumPattern>, DecodeError> {
    match lookup(pairs, key)? {
        Some(value) => Ok(Some(DrumBar::parse_pattern(key.as_str(), value)?)),
        None => match options.missing {
            MissingTrack::Rest => Ok(Some([false; STEPS])),
            MissingTrack::Absent => Ok(None),
            MissingTrack::Reject => Err(FormatError::MissingTrack(key.as_str()).into()),
        },
    }
}

pub(crate) fn join_lines(pairs: &[(TrackKey, String)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{key} {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const KICK: &str = "kick 1 0 0 0 1 0 0 0 1 0 0 0 1 0 0 0";

    #[test]
    fn strip_from_requires_space_boundary() {
        assert_eq!(TrackKey::Kick.strip_from("kick 1 0"), Some("1 0"));
        assert_eq!(TrackKey::Kick.strip_from("kick"), Some(""));
        assert_eq!(TrackKey::Kick.strip_from("kicks 1 0"), None);
        assert_eq!(TrackKey::Pad.strip_from("padding 1"), None);
    }

    #[test]
    fn duplicate_key_is_format_error() {
        let text = format!("{{{{{{\n{KICK}\n{KICK}\n}}}}}}");
        let err = Bar::decode(&text).unwrap_err();
        assert_eq!(
            err,
            DecodeError::Format(FormatError::DuplicateTrack {
                key: "kick",
                count: 2
            })
        );
    }

    #[test]
    fn fifteen_kick_values_is_validation_error() {
        let err = Bar::decode("kick 1 0 0 0 1 0 0 0 1 0 0 0 1 0 0").unwrap_err();
        match err {
            DecodeError::Validation(v) => {
                assert_eq!(v.track, "kick");
                assert_eq!(v.value, "1 0 0 0 1 0 0 0 1 0 0 0 1 0 0");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn missing_tracks_default_to_rest() {
        let bar = Bar::decode(KICK).unwrap();
        assert_eq!(bar.drums.hi_hat, Some([false; STEPS]));
        assert!(bar.bass.is_silent());
        assert!(bar.pad.is_silent());
        assert_eq!(bar.effects, None);
    }

    #[test]
    fn absent_policy_keeps_drum_voices_empty() {
        let bar = Bar::decode_with(KICK, &DecodeOptions::new(MissingTrack::Absent)).unwrap();
        assert_eq!(bar.drums.hi_hat, None);
        assert!(bar.drums.kick.is_some());
    }

    #[test]
    fn reject_policy_fails_on_missing_pad() {
        let text = Bar::example().encode().replace(&format!("\n{}", pad_line()), "");
        let err = Bar::decode_with(&text, &DecodeOptions::new(MissingTrack::Reject)).unwrap_err();
        assert_eq!(err, DecodeError::Format(FormatError::MissingTrack("pad")));
    }

    fn pad_line() -> String {
        format!("pad {}", Bar::example().pad.encode())
    }

    #[test]
    fn unpaired_delay_is_format_error() {
        let text = format!("{KICK}\ndelay {}", vec!["0.5"; 16].join(" "));
        assert_eq!(
            Bar::decode(&text).unwrap_err(),
            DecodeError::Format(FormatError::UnpairedSends)
        );
    }

    #[test]
    fn keypair_value_must_not_repeat_key() {
        let pairs = vec![(TrackKey::Bass, format!("bass {}", vec!["0"; 16].join(" ")))];
        assert!(matches!(
            Bar::from_keypairs(&pairs),
            Err(DecodeError::Format(FormatError::KeyInValue { key: "bass", .. }))
        ));
    }

    #[test]
    fn tolerates_chatter_and_indentation() {
        let text = format!(
            "Sure! Here is your bar:\n{{{{{{\n    {KICK}\n  bass C2 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0\n}}}}}}\nEnjoy."
        );
        let bar = Bar::decode(&text).unwrap();
        assert_eq!(bar.bass.pattern[0].to_string(), "C2");
        assert_eq!(bar.drums.kick.map(|k| k[4]), Some(true));
    }

    #[test]
    fn keypairs_emit_in_canonical_order() {
        let mut bar = Bar::example();
        bar.effects = Some(EffectsBar::crossfade());
        let keys: Vec<TrackKey> = bar.to_keypairs().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, TrackKey::ALL.to_vec());
    }

    #[test]
    fn keypairs_round_trip() {
        let bar = Bar::example();
        assert_eq!(Bar::from_keypairs(&bar.to_keypairs()).unwrap(), bar);
    }

    #[test]
    fn prompt_block_is_wrapped() {
        let block = Bar::example().to_prompt_block();
        assert!(block.starts_with("{{{\nhi_hat "));
        assert!(block.ends_with("\n}}}"));
    }
}
