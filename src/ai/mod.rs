//! Generation collaborators: the [`Generator`] seam, prompts, and the retry
//! helper every model call goes through.
//!
//! Two generators ship: [`OfflineGenerator`] (seeded, no network) and, with
//! the `llm` feature, an HTTP chat-completions client.

pub mod config;
#[cfg(feature = "llm")]
pub mod llm;
pub mod offline;
pub mod prompt;

use log::{debug, warn};

pub use config::{Config, ConfigError, GenerationConfig, LlmConfig, StoreConfig};
pub use offline::OfflineGenerator;
pub use prompt::{Prompt, Request};

use crate::error::{AssembleError, DecodeError, GenerateError};

/// Attempts per model request before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Anything that turns a prompt into completion text.
pub trait Generator {
    fn complete(&mut self, prompt: &Prompt) -> Result<String, GenerateError>;
}

impl<F> Generator for F
where
    F: FnMut(&Prompt) -> Result<String, GenerateError>,
{
    fn complete(&mut self, prompt: &Prompt) -> Result<String, GenerateError> {
        self(prompt)
    }
}

/// Call `generator` and decode its output, retrying on decode failures only.
///
/// Generator errors abort immediately. After `attempts` malformed responses
/// the last decode error is returned inside [`AssembleError::Exhausted`].
pub fn generate_with_retries<G, T, D>(
    generator: &mut G,
    prompt: &Prompt,
    attempts: u32,
    mut decode: D,
) -> Result<T, AssembleError>
where
    G: Generator + ?Sized,
    D: FnMut(&str) -> Result<T, DecodeError>,
{
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        let text = generator.complete(prompt)?;
        debug!("{} response (attempt {attempt}):\n{text}", prompt.request);

        match decode(&text) {
            Ok(value) => return Ok(value),
            Err(source) if attempt >= attempts => {
                return Err(AssembleError::Exhausted {
                    context: prompt.request.to_string(),
                    attempts,
                    source,
                })
            }
            Err(e) => {
                warn!(
                    "{}: attempt {attempt}/{attempts} was malformed, retrying: {e}",
                    prompt.request
                );
                attempt += 1;
            }
        }
    }
}
