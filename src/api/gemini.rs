//! Gemini API client
//!
//! Builds the `generateContent` request (inline image + fixed instruction +
//! structured output schema), sends it, and validates the two-substructure
//! response into an [`AnalysisResult`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::analyzer::Analyzer;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::image::EncodedPayload;
use crate::types::AnalysisResult;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const SYSTEM_INSTRUCTION: &str = "You are an AI assistant for traffic safety analysis. \
    Your task is to analyze images of bikers and provide a structured JSON response \
    about helmet usage and rule compliance.";

const USER_INSTRUCTION: &str = "Analyze this image of a biker. Determine if they are \
    wearing a helmet and if they are following observable traffic rules. Provide your \
    analysis in the requested JSON format.";

/// Gemini API request
#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "systemInstruction")]
    system_instruction: Content,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
    #[serde(rename = "responseSchema")]
    response_schema: serde_json::Value,
}

/// Gemini API response
#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Deserialize)]
struct ResponseContent {
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: String,
}

/// Structured output schema: two required object fields, each with one
/// required boolean and one required string.
fn response_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "helmetStatus": {
                "type": "OBJECT",
                "properties": {
                    "wearsHelmet": {
                        "type": "BOOLEAN",
                        "description": "True if the biker is wearing a helmet, false otherwise."
                    },
                    "reason": {
                        "type": "STRING",
                        "description": "A brief explanation for the helmet status conclusion."
                    }
                },
                "required": ["wearsHelmet", "reason"]
            },
            "ruleCompliance": {
                "type": "OBJECT",
                "properties": {
                    "isCompliant": {
                        "type": "BOOLEAN",
                        "description": "True if the biker appears to be following observable traffic rules, false otherwise."
                    },
                    "reason": {
                        "type": "STRING",
                        "description": "A brief explanation of observed rule compliance or violations."
                    }
                },
                "required": ["isCompliant", "reason"]
            }
        },
        "required": ["helmetStatus", "ruleCompliance"]
    })
}

fn build_request(payload: &EncodedPayload) -> GeminiRequest {
    GeminiRequest {
        contents: vec![Content {
            parts: vec![
                Part::InlineData {
                    inline_data: InlineData {
                        mime_type: payload.mime_type.as_str().to_string(),
                        data: payload.data.clone(),
                    },
                },
                Part::Text {
                    text: USER_INSTRUCTION.to_string(),
                },
            ],
        }],
        system_instruction: Content {
            parts: vec![Part::Text {
                text: SYSTEM_INSTRUCTION.to_string(),
            }],
        },
        generation_config: GenerationConfig {
            temperature: 0.1,
            response_mime_type: "application/json".to_string(),
            response_schema: response_schema(),
        },
    }
}

/// Extracts the text of the first candidate.
fn candidate_text(response: GeminiResponse) -> Result<String> {
    response
        .candidates
        .first()
        .and_then(|c| c.content.parts.first())
        .map(|p| p.text.clone())
        .ok_or_else(|| Error::MalformedResponse("response contained no candidate text".into()))
}

/// Strips a ```json ... ``` fence if the model wrapped its output in one.
fn strip_json_fence(text: &str) -> &str {
    if let Some(start_marker) = text.find("```json") {
        let start = start_marker + 7; // length of "```json"
        if let Some(end_offset) = text[start..].find("```") {
            return text[start..start + end_offset].trim();
        }
    }
    text.trim()
}

/// Parses candidate text into an [`AnalysisResult`], rejecting any payload
/// that does not strictly match the two-substructure schema.
pub fn parse_analysis_result(text: &str) -> Result<AnalysisResult> {
    let json_str = strip_json_fence(text);
    serde_json::from_str(json_str).map_err(|e| {
        warn!(error = %e, "remote response violated the output schema");
        Error::MalformedResponse(format!("schema violation: {e}"))
    })
}

/// HTTP client for the Gemini `generateContent` endpoint
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    /// Custom base URL, used to point the client at a mock server in tests.
    pub fn with_base_url(api_key: String, base_url: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::MissingApiKey);
        }
        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: DEFAULT_MODEL.to_string(),
            base_url,
        })
    }

    /// Builds a client from configuration; fails at startup when the API key
    /// is missing.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut client = Self::new(config.require_api_key()?)?;
        client.model = config.model.clone();
        Ok(client)
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Analyzer for GeminiClient {
    async fn analyze(&self, payload: &EncodedPayload) -> Result<AnalysisResult> {
        let url = format!(
            "{}/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let request = build_request(payload);

        debug!(model = %self.model, mime_type = %payload.mime_type, "sending analysis request");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Transport(format!("API error {status}: {body}")));
        }

        let envelope: GeminiResponse = response
            .json()
            .await
            .map_err(|e| Error::MalformedResponse(format!("invalid response envelope: {e}")))?;

        let text = candidate_text(envelope)?;
        debug!(bytes = text.len(), "received candidate text");

        parse_analysis_result(&text)
    }
}
