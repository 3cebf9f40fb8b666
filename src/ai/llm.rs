//! Chat-completions client (feature `llm`).
//!
//! Blocking POST to `{api_url}/chat/completions`; token usage is logged at
//! info level after each call.

use std::time::Duration;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::config::LlmConfig;
use super::prompt::Prompt;
use super::Generator;
use crate::error::GenerateError;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f64,
    messages: [Message<'a>; 2],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    prompt_tokens: u64,
    completion_tokens: u64,
    total_tokens: u64,
}

pub struct ChatClient {
    http: reqwest::blocking::Client,
    config: LlmConfig,
}

impl ChatClient {
    pub fn new(config: LlmConfig) -> Result<Self, GenerateError> {
        if config.api_key.trim().is_empty() {
            return Err(GenerateError::NotConfigured(format!(
                "no API key; set llm.api_key or {}",
                super::config::API_KEY_ENV
            )));
        }
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenerateError::Transport(e.to_string()))?;
        Ok(Self { http, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.api_url.trim_end_matches('/')
        )
    }
}

impl Generator for ChatClient {
    fn complete(&mut self, prompt: &Prompt) -> Result<String, GenerateError> {
        let body = ChatRequest {
            model: &self.config.model,
            temperature: self.config.temperature,
            messages: [
                Message {
                    role: "system",
                    content: &prompt.system,
                },
                Message {
                    role: "user",
                    content: &prompt.user,
                },
            ],
        };
        debug!("Prompt:\nsystem: {}\nuser: {}", prompt.system, prompt.user);
        info!("requesting {} (this may take a while)...", prompt.request);

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .map_err(|e| GenerateError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().unwrap_or_default();
            return Err(GenerateError::Transport(format!("{status}: {detail}")));
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| GenerateError::Transport(e.to_string()))?;

        if let Some(usage) = &parsed.usage {
            info!(
                "Used {} tokens ({} prompt, {} completion)",
                usage.total_tokens, usage.prompt_tokens, usage.completion_tokens
            );
        }

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(GenerateError::EmptyCompletion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_not_configured() {
        let err = ChatClient::new(LlmConfig::default()).err();
        assert!(matches!(err, Some(GenerateError::NotConfigured(_))));
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let config = LlmConfig {
            api_url: "https://example.test/v1/".to_string(),
            api_key: "sk-test".to_string(),
            ..LlmConfig::default()
        };
        let client = ChatClient::new(config).unwrap();
        assert_eq!(client.endpoint(), "https://example.test/v1/chat/completions");
    }

    #[test]
    fn response_parsing_reads_first_choice() {
        let json = r#"{"choices":[{"message":{"role":"assistant","content":"{{{\nkick 1\n}}}"}}],
                       "usage":{"prompt_tokens":10,"completion_tokens":5,"total_tokens":15}}"#;
        let parsed: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.usage.map(|u| u.total_tokens), Some(15));
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("{{{\nkick 1\n}}}")
        );
    }
}
