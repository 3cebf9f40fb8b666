//! housegen: command-line front end.
//!
//! `outline` and `bar` check hand-written text against the parsers;
//! `compose` runs the whole pipeline: outline, sections, automation, save.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};

use housegen::ai::{Config, Generator};
use housegen::grid::{Bar, Instrument};
use housegen::store::SongStore;
use housegen::{Assembler, MusicalMarkup, OfflineGenerator};

const DEFAULT_SEED: u64 = 42;

#[derive(Parser)]
#[command(name = "housegen", version, about = "Generate house tracks from outlines")]
struct Cli {
    /// Config file (default: ~/.housegen/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse an outline and print its sections and references
    Outline { file: PathBuf },
    /// Decode a bar and print its canonical form
    Bar { file: PathBuf },
    /// Generate a full song
    Compose(ComposeArgs),
}

#[derive(clap::Args)]
struct ComposeArgs {
    /// Use this outline instead of asking for one
    #[arg(long, conflicts_with = "describe")]
    outline: Option<PathBuf>,

    /// Describe the song the outline should be written for
    #[arg(long)]
    describe: Option<String>,

    /// Use the seeded offline generator instead of the model
    #[arg(long)]
    offline: bool,

    /// Seed for the offline generator
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Skip filter automation
    #[arg(long)]
    no_effects: bool,

    /// Do not write the song to the store
    #[arg(long)]
    no_save: bool,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(cli) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Outline { file } => print_outline(&file),
        Command::Bar { file } => print_bar(&file),
        Command::Compose(args) => {
            let config = Config::load(cli.config.as_deref()).context("loading config")?;
            if args.offline {
                compose(OfflineGenerator::new(args.seed), &config, &args)
            } else {
                compose(online_generator(&config)?, &config, &args)
            }
        }
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn print_outline(path: &Path) -> Result<()> {
    let markup = MusicalMarkup::parse(&read(path)?)?;
    for section in markup.sections() {
        println!("{} ({} bars)", section.name, section.number_bars);
        for instrument in &section.instruments {
            if instrument.dependencies.is_empty() {
                println!("  {}", instrument.name);
            } else {
                println!(
                    "  {} -> {}",
                    instrument.name,
                    instrument.dependencies.join(", ")
                );
            }
        }
    }
    Ok(())
}

fn print_bar(path: &Path) -> Result<()> {
    let bar = Bar::decode(&read(path)?)?;
    println!("{}", bar.encode());
    Ok(())
}

#[cfg(feature = "llm")]
fn online_generator(config: &Config) -> Result<housegen::ai::llm::ChatClient> {
    Ok(housegen::ai::llm::ChatClient::new(config.llm.clone())?)
}

#[cfg(not(feature = "llm"))]
fn online_generator(_config: &Config) -> Result<OfflineGenerator> {
    anyhow::bail!("built without the `llm` feature; pass --offline or rebuild with --features llm")
}

fn compose<G: Generator>(generator: G, config: &Config, args: &ComposeArgs) -> Result<()> {
    let mut assembler = Assembler::with_settings(generator, config.generation);

    let markup = match &args.outline {
        Some(path) => MusicalMarkup::parse(&read(path)?)?,
        None => assembler.request_outline(args.describe.as_deref())?,
    };
    info!(
        "outline has {} sections, {} bars",
        markup.sections().len(),
        markup.total_bars()
    );

    let mut song = assembler.assemble(&markup)?;

    if !args.no_effects {
        let effects = assembler.generate_effects(&markup, &song)?;
        let report = song.apply_effects(&effects);
        if !report.is_complete() {
            warn!(
                "automation incomplete: {} bar(s) skipped, sections without effects: {:?}",
                report.skipped_bars.len(),
                report.untouched_sections
            );
        }
    }

    for section in song.iter() {
        println!("## {} ({} bars)", section.name, section.bars.len());
        println!("{}", section.to_prompt_text());
        for instrument in Instrument::ALL {
            if let Some(filter) = section
                .bars
                .first()
                .and_then(|b| b.track(instrument).filter())
                .filter(|f| !f.is_empty())
            {
                println!("#{instrument} {} {:?}", filter.filter_type, filter.filter_value);
            }
        }
    }

    if !args.no_save {
        let store = SongStore::new(
            config
                .store
                .dir
                .clone()
                .unwrap_or_else(SongStore::default_dir),
        );
        let id = store.save(&song).context("saving song")?;
        println!("saved {id}");
    }
    Ok(())
}
