//! Error types for the codecs, the assembler, and the generation collaborators.
//!
//! Parsers never swallow these: a [`FormatError`] means the text did not have
//! the required shape, a [`ValidationError`] means a decoded value broke a
//! length, range, or token constraint.

use thiserror::Error;

/// Input text does not match a required delimiter or shape.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    #[error("no sections found: outline has no `##` marker")]
    NoSections,

    #[error("improper format for title and bars in section header: {0:?}")]
    BadHeader(String),

    #[error("expected `instrument - description`, got: {0:?}")]
    BadInstrumentLine(String),

    #[error("invalid instrument name in line: {0:?}")]
    EmptyInstrument(String),

    #[error("section `{0}` appears more than once in the outline")]
    DuplicateSection(String),

    #[error("no {{{{{{...}}}}}} block found in response")]
    MissingBlock,

    #[error("track `{key}` must not be duplicated, got {count} lines")]
    DuplicateTrack { key: &'static str, count: usize },

    #[error("track `{0}` is missing")]
    MissingTrack(&'static str),

    #[error("`delay` and `reverb` must appear together")]
    UnpairedSends,

    #[error("value for `{key}` must hold data only, got {value:?}")]
    KeyInValue { key: &'static str, value: String },

    #[error("malformed effects line: {0:?}")]
    BadEffectsLine(String),

    #[error("invalid effects instrument name: {0:?}")]
    UnknownEffectsInstrument(String),

    #[error("effects for `{0}` given more than once")]
    DuplicateEffects(String),
}

/// A decoded value violates a length, range, or token constraint.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid `{track}`: {reason} (got {value:?})")]
pub struct ValidationError {
    /// Track, key, or instrument the value belongs to.
    pub track: String,
    pub reason: String,
    /// The offending value as received.
    pub value: String,
}

impl ValidationError {
    pub fn new(
        track: impl Into<String>,
        reason: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            track: track.into(),
            reason: reason.into(),
            value: value.into(),
        }
    }
}

/// Any failure turning model text into structured data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Failure inside a generation collaborator (transport, configuration).
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("generator is not configured: {0}")]
    NotConfigured(String),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("model returned an empty completion")]
    EmptyCompletion,
}

/// Failure of an assembly step. Aborts the whole assembly.
#[derive(Debug, Error)]
pub enum AssembleError {
    #[error("generation failed: {0}")]
    Generate(#[from] GenerateError),

    #[error("{context}: output still malformed after {attempts} attempt(s): {source}")]
    Exhausted {
        context: String,
        attempts: u32,
        #[source]
        source: DecodeError,
    },
}
