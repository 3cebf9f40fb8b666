//! Section assembler: walks an outline in order, one generator call per
//! section, feeding earlier sections back in as context.

use log::{debug, info, warn};

use crate::ai::{generate_with_retries, GenerationConfig, Generator, Prompt};
use crate::effects::{SectionEffects, SongEffects};
use crate::error::{AssembleError, DecodeError};
use crate::grid::Instrument;
use crate::markup::{MarkupInstrument, MarkupSection, MusicalMarkup};
use crate::song::{Song, SongSection};

/// Sent for an instrument the outline leaves out of a section.
const UNDESCRIBED: &str = "rests for the whole section";

pub struct Assembler<G> {
    generator: G,
    settings: GenerationConfig,
}

impl<G: Generator> Assembler<G> {
    pub fn new(generator: G) -> Self {
        Self::with_settings(generator, GenerationConfig::default())
    }

    pub fn with_settings(generator: G, settings: GenerationConfig) -> Self {
        Self {
            generator,
            settings,
        }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Ask the generator for an outline and parse it.
    pub fn request_outline(
        &mut self,
        song_description: Option<&str>,
    ) -> Result<MusicalMarkup, AssembleError> {
        let prompt = Prompt::outline(song_description);
        generate_with_retries(
            &mut self.generator,
            &prompt,
            self.settings.max_attempts,
            |text| MusicalMarkup::parse(text).map_err(DecodeError::from),
        )
    }

    /// Generate every section of `markup`, in outline order.
    ///
    /// A section that cannot be generated aborts the whole song; nothing
    /// partial is returned.
    pub fn assemble(&mut self, markup: &MusicalMarkup) -> Result<Song, AssembleError> {
        let mut song = Song::new();
        for section in markup.sections() {
            let generated = self.generate_section(section, &song)?;
            info!(
                "generated section {} ({} bars)",
                generated.name,
                generated.bars.len()
            );
            song.append_section(generated);
        }
        Ok(song)
    }

    /// Generate one section, resolving its references against `song`.
    pub fn generate_section(
        &mut self,
        section: &MarkupSection,
        song: &Song,
    ) -> Result<SongSection, AssembleError> {
        let descriptions: Vec<(Instrument, String)> = Instrument::ALL
            .into_iter()
            .map(|instrument| {
                let description = match section.instrument(instrument.as_str()) {
                    Some(markup) => Self::resolve_description(song, markup, instrument),
                    None => UNDESCRIBED.to_string(),
                };
                (instrument, description)
            })
            .collect();

        let prompt = Prompt::section(&section.name, section.number_bars, &descriptions);
        let options = self.settings.decode_options();
        generate_with_retries(
            &mut self.generator,
            &prompt,
            self.settings.max_attempts,
            |text| {
                SongSection::from_prompt_text_expecting(
                    text,
                    section.name.as_str(),
                    section.number_bars,
                    &options,
                )
            },
        )
    }

    /// Description plus one context fragment per reference to an
    /// already generated section.
    ///
    /// The fragment quotes that section's first bar for `target`. References
    /// to sections not yet generated contribute nothing.
    pub fn resolve_description(
        song: &Song,
        instrument: &MarkupInstrument,
        target: Instrument,
    ) -> String {
        let mut description = instrument.description.clone();
        for dependency in &instrument.dependencies {
            match song.find(dependency).and_then(|s| s.bars.first()) {
                Some(bar) => description.push_str(&format!(
                    "\nFor reference, the {target} of %{dependency} started like this:\n{}",
                    bar.instrument_lines(target)
                )),
                None => debug!("no generated section %{dependency} to quote for {target}"),
            }
        }
        description
    }

    /// Generate automation for every section that has an `Effects` line.
    ///
    /// Bar counts follow the generated song where the section exists there.
    pub fn generate_effects(
        &mut self,
        markup: &MusicalMarkup,
        song: &Song,
    ) -> Result<SongEffects, AssembleError> {
        let values_per_bar = self.settings.values_per_bar;
        let mut effects = SongEffects::new();

        for section in markup.sections() {
            let Some(description) = section.effects_description() else {
                debug!("section {} has no effects description", section.name);
                continue;
            };
            let bars = song
                .find(&section.name)
                .map(|s| s.bars.len())
                .unwrap_or(section.number_bars);

            let prompt = Prompt::effects(&section.name, bars, values_per_bar, description);
            let parsed = generate_with_retries(
                &mut self.generator,
                &prompt,
                self.settings.max_attempts,
                |text| SectionEffects::parse(text, section.name.as_str(), values_per_bar),
            )?;

            if let Err(e) = effects.add_section(parsed) {
                warn!("{e}");
            }
        }
        Ok(effects)
    }
}
