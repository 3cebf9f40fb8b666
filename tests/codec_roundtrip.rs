//! Grid codec round-trip tests: encode then decode gives the bar back, in
//! canonical, prompt-block, and key→line form.

use housegen::ai::Generator;
use housegen::grid::{
    Bar, Chord, DecodeOptions, EffectsBar, Level, MissingTrack, PadBar, Pitch, TrackKey, STEPS,
};
use housegen::{DecodeError, FormatError, OfflineGenerator, Prompt, SongSection};

fn with_sends() -> Bar {
    let mut bar = Bar::example();
    let mut delay = [Level::default(); STEPS];
    delay[3] = Level::from_f64(0.35).unwrap();
    delay[11] = Level::MAX;
    bar.effects = Some(EffectsBar {
        delay,
        reverb: EffectsBar::crossfade().reverb,
    });
    bar
}

/// Canonical and prompt-block forms decode to the same bar.
#[test]
fn example_round_trips_every_form() {
    for bar in [Bar::example(), Bar::rest(), with_sends()] {
        assert_eq!(Bar::decode(&bar.encode()).unwrap(), bar);
        assert_eq!(Bar::decode(&bar.to_prompt_block()).unwrap(), bar);
        assert_eq!(Bar::from_keypairs(&bar.to_keypairs()).unwrap(), bar);
    }
}

/// Offline bars exercise random patterns and pad lengths.
#[test]
fn generated_bars_round_trip() {
    let mut generator = OfflineGenerator::new(99);
    let text = generator.complete(&Prompt::section("Any", 16, &[])).unwrap();
    let section = SongSection::from_prompt_text(&text, "Any").unwrap();
    assert_eq!(section.bars.len(), 16);
    for bar in &section.bars {
        assert_eq!(&Bar::decode(&bar.to_prompt_block()).unwrap(), bar);
    }
}

/// Under the absent policy, a bar missing drum voices survives the trip.
#[test]
fn absent_voices_round_trip_under_absent_policy() {
    let options = DecodeOptions::new(MissingTrack::Absent);
    let mut bar = Bar::example();
    bar.drums.hi_hat = None;
    bar.drums.snare = None;

    let encoded = bar.encode();
    assert!(!encoded.contains("hi_hat"));
    assert_eq!(Bar::decode_with(&encoded, &options).unwrap(), bar);

    // Default policy fills them with rests instead.
    let filled = Bar::decode(&encoded).unwrap();
    assert_eq!(filled.drums.hi_hat, Some([false; STEPS]));
}

/// Two pad groups expand eight-fold and re-encode as sixteen.
#[test]
fn short_pad_line_expands() {
    let text = "pad [C3 Eb3 G3] [F3 Ab3 C4]";
    let bar = Bar::decode(text).unwrap();
    let c_minor = Chord::new(["C3", "Eb3", "G3"].iter().filter_map(|t| Pitch::parse(t)).collect());
    assert!(bar.pad.chords[..8].iter().all(|c| *c == c_minor));
    assert_eq!(bar.pad.chords[8].notes[0].to_string(), "F3");
    assert_eq!(
        PadBar::parse(&bar.pad.encode()).unwrap(),
        bar.pad,
        "expanded form is stable"
    );
}

/// Key order in the input does not matter; emission order is canonical.
#[test]
fn shuffled_lines_decode_to_canonical_order() {
    let bar = with_sends();
    let mut lines: Vec<String> = bar.encode().lines().map(str::to_string).collect();
    lines.reverse();
    let decoded = Bar::decode(&lines.join("\n")).unwrap();
    assert_eq!(decoded, bar);
    let keys: Vec<TrackKey> = decoded.to_keypairs().into_iter().map(|(k, _)| k).collect();
    assert_eq!(keys, TrackKey::ALL);
}

/// Send levels are quantized before they are compared.
#[test]
fn send_levels_quantize_on_decode() {
    let mut text = Bar::example().encode();
    let ramp: Vec<String> = (0..STEPS).map(|i| format!("{:.3}", i as f64 / 15.0)).collect();
    text.push_str(&format!("\ndelay {}\nreverb {}", ramp.join(" "), ramp.join(" ")));
    let bar = Bar::decode(&text).unwrap();
    let fx = bar.effects.unwrap();
    assert_eq!(fx.delay[1].to_string(), "0.07");
    assert_eq!(fx.delay, EffectsBar::crossfade().delay);
}

/// A reply with no braces at all is a format error, not an empty section.
#[test]
fn section_without_blocks_fails() {
    assert_eq!(
        SongSection::from_prompt_text(&Bar::example().encode(), "Intro"),
        Err(DecodeError::Format(FormatError::MissingBlock))
    );
}
