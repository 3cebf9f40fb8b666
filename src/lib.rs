//! housegen: assembles house tracks from language-model outlines.
//!
//! An outline (`##Intro (4 bars)` / `*Pad - ...`) is parsed into ordered
//! sections, each section is generated bar-by-bar through a compact grid
//! text codec, and filter automation is overlaid at the end.

pub mod ai;
pub mod assembler;
pub mod effects;
pub mod error;
pub mod grid;
pub mod markup;
pub mod song;
pub mod store;

pub use ai::{Generator, OfflineGenerator, Prompt};
pub use assembler::Assembler;
pub use error::{AssembleError, DecodeError, FormatError, GenerateError, ValidationError};
pub use grid::{Bar, Instrument};
pub use markup::MusicalMarkup;
pub use song::{Song, SongSection};
