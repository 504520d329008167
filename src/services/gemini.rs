use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::AppError;

/// Model identifier sent with every generation request.
pub const GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Client for the Gemini `generateContent` endpoint. Built once at startup
/// and handed to request handlers through the application state.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct SystemInstruction<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.gemini_base_url.clone(),
            api_key: config.gemini_api_key.clone(),
            model: GEMINI_MODEL.to_string(),
        }
    }

    /// Sends one prompt and returns the trimmed response text, or `Ok(None)`
    /// when the model produced no usable text so the call site can apply its
    /// own fallback.
    pub async fn generate(
        &self,
        prompt: &str,
        system_instruction: Option<&str>,
    ) -> Result<Option<String>, AppError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            system_instruction: system_instruction
                .map(|text| SystemInstruction {
                    parts: vec![Part { text }],
                }),
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::LlmError(format!("Gemini request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::LlmError(format!(
                "Gemini returned {status}: {detail}"
            )));
        }

        let payload: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AppError::LlmError(format!("Gemini response invalid: {e}")))?;

        Ok(extract_text(payload))
    }
}

/// First candidate's concatenated part texts, trimmed; `None` when empty.
fn extract_text(payload: GenerateResponse) -> Option<String> {
    let text = payload
        .candidates
        .into_iter()
        .next()
        .map(|candidate| {
            candidate
                .content
                .parts
                .into_iter()
                .map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default();

    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
