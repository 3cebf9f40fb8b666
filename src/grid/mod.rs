//! Grid codec: fixed-width per-instrument tracks for one bar, and their text forms.
//!
//! Every track is 16 sixteenth-note steps. A [`Bar`] holds drums, bass, pad,
//! and optional delay/reverb sends; each instrument track can also carry a
//! filter automation overlay attached after generation.

pub mod bass;
pub mod codec;
pub mod drums;
pub mod note;
pub mod pad;
pub mod sends;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use bass::BassBar;
pub use codec::{DecodeOptions, MissingTrack, TrackKey};
pub use drums::{DrumBar, DrumPattern};
pub use note::{Note, Pitch};
pub use pad::{Chord, PadBar};
pub use sends::{EffectsBar, Level};

use crate::effects::{EffectBar, FilterInformation};

/// Steps per bar (sixteenth notes in 4/4).
pub const STEPS: usize = 16;

/// The instruments a bar is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Instrument {
    Drums,
    Bass,
    Pad,
}

impl Instrument {
    pub const ALL: [Instrument; 3] = [Instrument::Drums, Instrument::Bass, Instrument::Pad];

    pub fn as_str(&self) -> &'static str {
        match self {
            Instrument::Drums => "drums",
            Instrument::Bass => "bass",
            Instrument::Pad => "pad",
        }
    }

    /// Canonical line keys owned by this instrument.
    pub fn keys(&self) -> &'static [TrackKey] {
        match self {
            Instrument::Drums => &[TrackKey::HiHat, TrackKey::Kick, TrackKey::Snare],
            Instrument::Bass => &[TrackKey::Bass],
            Instrument::Pad => &[TrackKey::Pad],
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lookup of an instrument name that is not drums, bass, or pad.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no instrument named `{0}` in a bar")]
pub struct UnknownInstrument(pub String);

impl FromStr for Instrument {
    type Err = UnknownInstrument;

    /// Case-insensitive: `Drums`, `BASS`, and `pad` all resolve.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Instrument::ALL
            .into_iter()
            .find(|i| i.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownInstrument(s.to_string()))
    }
}

/// Borrowed view of one instrument's track within a bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Track<'a> {
    Drums(&'a DrumBar),
    Bass(&'a BassBar),
    Pad(&'a PadBar),
}

impl<'a> Track<'a> {
    pub fn instrument(&self) -> Instrument {
        match self {
            Track::Drums(_) => Instrument::Drums,
            Track::Bass(_) => Instrument::Bass,
            Track::Pad(_) => Instrument::Pad,
        }
    }

    /// Attached filter automation, if any.
    pub fn filter(&self) -> Option<&'a FilterInformation> {
        match *self {
            Track::Drums(d) => d.filter.as_ref(),
            Track::Bass(b) => b.filter.as_ref(),
            Track::Pad(p) => p.filter.as_ref(),
        }
    }
}

/// One measure of aligned drum, bass, and pad tracks.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Bar {
    pub drums: DrumBar,
    pub bass: BassBar,
    pub pad: PadBar,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effects: Option<EffectsBar>,
}

impl Bar {
    /// A bar with every track present and silent.
    pub fn rest() -> Self {
        Self {
            drums: DrumBar::rest(),
            ..Self::default()
        }
    }

    pub fn track(&self, instrument: Instrument) -> Track<'_> {
        match instrument {
            Instrument::Drums => Track::Drums(&self.drums),
            Instrument::Bass => Track::Bass(&self.bass),
            Instrument::Pad => Track::Pad(&self.pad),
        }
    }

    /// Canonical lines belonging to one instrument, e.g. the three drum lines.
    pub fn instrument_lines(&self, instrument: Instrument) -> String {
        let owned = instrument.keys();
        let pairs: Vec<(TrackKey, String)> = self
            .to_keypairs()
            .into_iter()
            .filter(|(key, _)| owned.contains(key))
            .collect();
        codec::join_lines(&pairs)
    }

    pub fn attach_filter(&mut self, instrument: Instrument, filter: FilterInformation) {
        let slot = match instrument {
            Instrument::Drums => &mut self.drums.filter,
            Instrument::Bass => &mut self.bass.filter,
            Instrument::Pad => &mut self.pad.filter,
        };
        *slot = Some(filter);
    }

    /// Attach every instrument's filter from one bar of automation.
    pub fn apply_effects(&mut self, effects: &EffectBar) {
        for instrument in Instrument::ALL {
            self.attach_filter(instrument, effects.get(instrument).clone());
        }
    }

    /// The reference bar shown to the model as a formatting example.
    pub fn example() -> Self {
        let pitch = |t: &str| Pitch::parse(t).expect("example pitches are valid");
        let chord = |tokens: &[&str]| Chord::new(tokens.iter().map(|t| pitch(t)).collect());
        let beat = |hits: &[usize]| {
            let mut p = [false; STEPS];
            for &i in hits {
                p[i] = true;
            }
            p
        };

        let mut bass = [Note::Rest; STEPS];
        for (i, t) in [(0, "C2"), (4, "A2"), (8, "F2"), (12, "G2")] {
            bass[i] = Note::Pitch(pitch(t));
        }

        let mut chords: [Chord; STEPS] = Default::default();
        chords[0] = chord(&["C3", "E3", "G3", "B3"]);
        chords[4] = chord(&["A3", "C4", "E4", "G4"]);
        chords[8] = chord(&["F3", "A3", "C4", "E4"]);
        chords[12] = chord(&["G3", "B3", "D4", "F4"]);

        Self {
            drums: DrumBar {
                hi_hat: Some(beat(&[0, 2, 4, 6, 8, 10, 12, 14])),
                kick: Some(beat(&[0, 4, 8, 12])),
                snare: Some(beat(&[4, 12])),
                filter: None,
            },
            bass: BassBar::new(bass),
            pad: PadBar {
                chords,
                filter: None,
            },
            effects: None,
        }
    }
}
