//! LLM gateway — the boundary to the external generative-text API.
//!
//! A single [`LlmClient::generate`] call sends a one-turn prompt to the
//! configured `generateContent` endpoint and extracts the first candidate's
//! text. Three fixed [`PromptKind`] templates wrap a caller-supplied subject
//! string; the generate-title result is additionally post-processed by
//! stripping quote characters and surrounding whitespace.
//!
//! The API key comes from the `LLM_API_KEY` environment variable, checked per
//! request. No retry or backoff: a failed upstream call propagates as
//! [`Error::Upstream`] and fails only the request that made it.

use std::time::Duration;

use crate::config::LlmConfig;
use crate::error::{Error, Result};

/// The three fixed prompt templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Summarize,
    GenerateTitle,
    Elaborate,
}

impl PromptKind {
    /// Parse the wire name used by `POST /api/notes/llm`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "summarize" => Some(Self::Summarize),
            "generate-title" => Some(Self::GenerateTitle),
            "elaborate" => Some(Self::Elaborate),
            _ => None,
        }
    }

    /// Wrap the subject text in this template's instruction.
    pub fn render(&self, subject: &str) -> String {
        match self {
            Self::Summarize => {
                format!("Summarize the following text concisely: \"{}\"", subject)
            }
            Self::GenerateTitle => format!(
                "Generate a short, relevant title (less than 5 words) for this text: \"{}\"",
                subject
            ),
            Self::Elaborate => format!(
                "Elaborate on the following idea and expand it into a full, well-written paragraph: \"{}\"",
                subject
            ),
        }
    }

    /// Clean up the raw model output. Titles come back quoted often enough
    /// that all `"` characters and surrounding whitespace are stripped.
    pub fn postprocess(&self, raw: &str) -> String {
        match self {
            Self::GenerateTitle => raw.replace('"', "").trim().to_string(),
            _ => raw.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    config: LlmConfig,
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }

    /// Send a single-turn prompt and return the first candidate's text.
    ///
    /// Returns empty text when the response carries no candidates.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let api_key = std::env::var("LLM_API_KEY")
            .map_err(|_| Error::Config("LLM_API_KEY is not set.".to_string()))?;

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.config.api_url, self.config.model, api_key
        );

        let body = serde_json::json!({
            "contents": [
                {
                    "role": "user",
                    "parts": [ { "text": prompt } ]
                }
            ]
        });

        let response = self.http.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let json: serde_json::Value = response.json().await?;
        Ok(extract_candidate_text(&json))
    }
}

/// Pull `candidates[0].content.parts[0].text` out of a `generateContent`
/// response, or empty text if any link in that chain is absent.
fn extract_candidate_text(json: &serde_json::Value) -> String {
    json.get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.get(0))
        .and_then(|p| p.get("text"))
        .and_then(|t| t.as_str())
        .unwrap_or_default()
        .to_string()
}
