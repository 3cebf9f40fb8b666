//! Offline generator: seeded and deterministic, always well-formed.
//!
//! Reads the structured [`Request`] instead of the prose, so every reply
//! decodes cleanly. Useful for dry runs and tests without a model.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::prompt::{Prompt, Request};
use super::Generator;
use crate::error::GenerateError;
use crate::grid::{Bar, BassBar, Chord, DrumBar, Instrument, Note, PadBar, Pitch, STEPS};

/// Chord roots as semitone offsets from the key root.
const PROGRESSIONS: [[u8; 4]; 4] = [[0, 8, 3, 10], [0, 5, 7, 5], [9, 5, 0, 7], [0, 3, 5, 3]];

/// Minor seventh voicing.
const VOICING: [u8; 4] = [0, 3, 7, 10];

/// MIDI numbers of the key roots used for bass (C2, D2, F2, G2, A1).
const KEY_ROOTS: [u8; 5] = [36, 38, 41, 43, 33];

const FILTER_TYPES: [&str; 3] = ["lowpass", "hipass", "bandpass"];

const PAD_IDEAS: [&str; 4] = [
    "sustained minor seventh chords that swell slowly",
    "short stabs on the offbeat",
    "long washes holding one chord per bar",
    "a bright progression that lifts the energy",
];
const BASS_IDEAS: [&str; 4] = [
    "a deep rolling groove on the root notes",
    "silent",
    "octave jumps locked to the kick",
    "syncopated notes between the kicks",
];
const DRUM_IDEAS: [&str; 4] = [
    "four on the floor kick with offbeat hats",
    "only the hi-hat, ticking sixteenths",
    "full kit with snare on two and four",
    "kick drops out, hats and snare rolls build",
];
const EFFECT_IDEAS: [&str; 3] = [
    "lowpass slowly opening on the pad",
    "hipass sweep rising on the drums",
    "filters fully open",
];

pub struct OfflineGenerator {
    rng: ChaCha8Rng,
    calls: usize,
}

impl OfflineGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            calls: 0,
        }
    }

    /// Number of completions served so far.
    pub fn calls(&self) -> usize {
        self.calls
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items.choose(&mut self.rng).copied().unwrap_or_default()
    }

    fn outline(&mut self) -> String {
        let plan = [
            ("Intro", None),
            ("verse-1", None),
            ("Chorus", Some("verse-1")),
            ("verse-2", Some("verse-1")),
            ("Outro", Some("verse-2")),
        ];

        let mut text = String::from("Here is an outline for your house track.\n");
        for (name, reference) in plan {
            let bars = [2usize, 4, 8][self.rng.gen_range(0..3)];
            let suffix = reference
                .map(|r| format!(", building on %{r}"))
                .unwrap_or_default();
            text.push_str(&format!("\n##{name} ({bars} bars)\n"));
            text.push_str(&format!("*Pad - {}{suffix}\n", self.pick(&PAD_IDEAS)));
            text.push_str(&format!("*Bass - {}{suffix}\n", self.pick(&BASS_IDEAS)));
            text.push_str(&format!("*Drums - {}\n", self.pick(&DRUM_IDEAS)));
            text.push_str(&format!("*Effects - {}\n", self.pick(&EFFECT_IDEAS)));
        }
        text
    }

    fn bar(&mut self) -> Bar {
        let mut hi_hat = [false; STEPS];
        let mut kick = [false; STEPS];
        let mut snare = [false; STEPS];
        for step in 0..STEPS {
            kick[step] = step % 4 == 0;
            hi_hat[step] = step % 4 == 2 || self.rng.gen_bool(0.15);
            snare[step] = step % 8 == 4 || (step % 2 == 1 && self.rng.gen_bool(0.05));
        }

        let root = KEY_ROOTS[self.rng.gen_range(0..KEY_ROOTS.len())];
        let progression = PROGRESSIONS[self.rng.gen_range(0..PROGRESSIONS.len())];

        let mut bass = [Note::Rest; STEPS];
        for (step, slot) in bass.iter_mut().enumerate() {
            let degree = progression[step / 4];
            let hit = step % 4 == 0 || (step % 2 == 1 && self.rng.gen_bool(0.25));
            if hit {
                let octave_up = if self.rng.gen_bool(0.2) { 12 } else { 0 };
                if let Some(p) = Pitch::from_midi(root + degree + octave_up) {
                    *slot = Note::Pitch(p);
                }
            }
        }

        let chord_count = [1usize, 2, 4][self.rng.gen_range(0..3)];
        let chords: Vec<Chord> = progression
            .iter()
            .take(chord_count)
            .map(|degree| {
                let chord_root = root + 12 + degree;
                Chord::new(
                    VOICING
                        .iter()
                        .filter_map(|i| Pitch::from_midi(chord_root + i))
                        .collect(),
                )
            })
            .collect();
        let pad = PadBar::from_sequence(chords).unwrap_or_default();

        Bar {
            drums: DrumBar {
                hi_hat: Some(hi_hat),
                kick: Some(kick),
                snare: Some(snare),
                filter: None,
            },
            bass: BassBar::new(bass),
            pad,
            effects: None,
        }
    }

    fn effects(&mut self, bars: usize, values_per_bar: usize) -> String {
        let total = bars.max(1) * values_per_bar.max(1);
        let mut lines = vec!["Here is the automation:".to_string()];
        for instrument in Instrument::ALL {
            let filter_type = self.pick(&FILTER_TYPES);
            let start: f64 = self.rng.gen_range(0.0..=1.0);
            let end: f64 = self.rng.gen_range(0.0..=1.0);
            let values: Vec<String> = (0..total)
                .map(|i| {
                    let t = if total > 1 {
                        i as f64 / (total - 1) as f64
                    } else {
                        0.0
                    };
                    format!("{:.2}", start + (end - start) * t)
                })
                .collect();
            lines.push(format!("#{instrument} {filter_type} {}", values.join(" ")));
        }
        lines.join("\n")
    }
}

impl Generator for OfflineGenerator {
    fn complete(&mut self, prompt: &Prompt) -> Result<String, GenerateError> {
        self.calls += 1;
        let text = match &prompt.request {
            Request::Outline => self.outline(),
            Request::Section { bars, .. } => (0..(*bars).max(1))
                .map(|_| self.bar().to_prompt_block())
                .collect::<Vec<_>>()
                .join("\n"),
            Request::Effects {
                bars,
                values_per_bar,
                ..
            } => self.effects(*bars, *values_per_bar),
        };
        Ok(text)
    }
}
