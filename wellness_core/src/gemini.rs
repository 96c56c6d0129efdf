//! Gemini `generateContent` client.
//!
//! A blocking [`CompletionService`] over the hosted Gemini REST API. One
//! request per call: no retries, no streaming.

use crate::coach::{CompletionRequest, CompletionService, ResponseFormat};
use crate::config::CoachConfig;
use crate::{Error, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<TextPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TextPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<GeminiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

// ============================================================================
// Client
// ============================================================================

/// Blocking Gemini client
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    model: String,
    client: Client,
}

impl GeminiClient {
    /// Build a client from coach settings and an explicit key
    pub fn new(api_key: impl Into<String>, config: &CoachConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            api_key: api_key.into(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            client,
        })
    }

    /// Build a client reading the key from `config.api_key_env`
    pub fn from_env(config: &CoachConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                Error::Config(format!("{} environment variable not set", config.api_key_env))
            })?;
        Self::new(api_key, config)
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

impl CompletionService for GeminiClient {
    fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = build_request(request);
        tracing::debug!(model = %self.model, turns = request.turns.len(), "Sending Gemini request");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()?;

        let status = response.status();
        let text = response.text()?;

        if !status.is_success() {
            tracing::error!(status = %status, "Gemini API error");
            return Err(api_error(status.as_u16(), &text));
        }

        let text = extract_text(&text)?;
        tracing::debug!(chars = text.len(), "Received Gemini reply");
        Ok(text)
    }
}

fn build_request(request: &CompletionRequest) -> GeminiRequest {
    let contents = request
        .turns
        .iter()
        .map(|turn| GeminiContent {
            role: Some(turn.role.as_str().to_string()),
            parts: vec![TextPart {
                text: turn.text.clone(),
            }],
        })
        .collect();

    let system_instruction = request.system_instruction.as_ref().map(|text| GeminiContent {
        role: None,
        parts: vec![TextPart { text: text.clone() }],
    });

    let (response_mime_type, response_schema) = match request.format {
        ResponseFormat::Text => (None, None),
        ResponseFormat::MealEstimateJson => (
            Some("application/json"),
            Some(json!({
                "type": "OBJECT",
                "properties": {
                    "calories": {
                        "type": "INTEGER",
                        "description": "Estimated calories as an integer."
                    },
                    "explanation": {
                        "type": "STRING",
                        "description": "Very brief explanation of the estimate."
                    }
                },
                "required": ["calories", "explanation"]
            })),
        ),
    };

    let generation_config = if request.temperature.is_some() || response_mime_type.is_some() {
        Some(GenerationConfig {
            temperature: request.temperature,
            response_mime_type,
            response_schema,
        })
    } else {
        None
    };

    GeminiRequest {
        contents,
        system_instruction,
        generation_config,
    }
}

/// Concatenate the text parts of the first candidate
///
/// A candidate with no text yields an empty string; the caller decides what
/// an empty reply means.
fn extract_text(body: &str) -> Result<String> {
    let response: GeminiResponse = serde_json::from_str(body)
        .map_err(|e| Error::Completion(format!("Failed to parse Gemini response: {}", e)))?;

    if let Some(error) = response.error {
        return Err(Error::Completion(format!("Gemini API error: {}", error.message)));
    }

    let text = response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default();
    Ok(text)
}

fn api_error(status: u16, body: &str) -> Error {
    let message = serde_json::from_str::<GeminiResponse>(body)
        .ok()
        .and_then(|r| r.error)
        .map_or_else(|| body.to_string(), |e| e.message);
    Error::Completion(format!("Gemini API error ({}): {}", status, message))
}
