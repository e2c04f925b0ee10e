// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::GeminiConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const PREAMBLE: &str = "You are a helpful energy assistant. Help users save money on electricity bills and provide energy-saving tips. Keep responses concise and practical.";
pub const PROBE_PROMPT: &str = "Say hello and confirm you're working.";

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("GEMINI_API_KEY not configured")]
    NotConfigured,
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("upstream returned {status}: {body}")]
    Upstream {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("response contained no text")]
    EmptyResponse,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    top_k: u32,
    top_p: f64,
    max_output_tokens: u32,
}

static CHAT_GENERATION: GenerationConfig = GenerationConfig {
    temperature: 0.7,
    top_k: 40,
    top_p: 0.95,
    max_output_tokens: 150,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<&'a GenerationConfig>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

/// Full prompt sent for a user question. Household context, when the client
/// sent one, goes between the preamble and the question.
pub fn build_prompt(message: &str, context: Option<&serde_json::Value>) -> String {
    let mut prompt = String::from(PREAMBLE);
    if let Some(ctx) = context.filter(|c| !c.is_null()) {
        prompt.push_str("\n\nUser context: ");
        prompt.push_str(&ctx.to_string());
    }
    prompt.push_str("\n\nUser question: ");
    prompt.push_str(message);
    prompt.push_str("\n\nAssistant response:");
    prompt
}

pub async fn generate(
    http: &reqwest::Client,
    cfg: &GeminiConfig,
    prompt: &str,
    tuned: bool,
) -> Result<String, GeminiError> {
    let key = cfg
        .api_key
        .as_deref()
        .filter(|k| !k.trim().is_empty())
        .ok_or(GeminiError::NotConfigured)?;
    let url = format!(
        "{}/models/{}:generateContent",
        cfg.base_url.trim_end_matches('/'),
        cfg.model
    );
    let body = GenerateRequest {
        contents: [Content {
            parts: [Part { text: prompt }],
        }],
        generation_config: tuned.then_some(&CHAT_GENERATION),
    };
    let resp = http
        .post(&url)
        .query(&[("key", key)])
        .timeout(Duration::from_secs(cfg.timeout_seconds))
        .json(&body)
        .send()
        .await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(GeminiError::Upstream { status, body });
    }
    let parsed: GenerateResponse = resp.json().await?;
    extract_text(parsed)
}

fn extract_text(resp: GenerateResponse) -> Result<String, GeminiError> {
    resp.candidates
        .into_iter()
        .next()
        .and_then(|c| c.content.parts.into_iter().next())
        .map(|p| p.text.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or(GeminiError::EmptyResponse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_wraps_question() {
        let p = build_prompt("How do I save?", None);
        assert!(p.starts_with("You are a helpful energy assistant."));
        assert!(p.ends_with("User question: How do I save?\n\nAssistant response:"));
        assert!(!p.contains("User context"));

        let ctx = serde_json::json!({"userName": "Sam"});
        assert!(build_prompt("hi", Some(&ctx)).contains("User context: {\"userName\":\"Sam\"}"));
    }

    #[test]
    fn request_body_shape() {
        let body = GenerateRequest {
            contents: [Content {
                parts: [Part { text: "x" }],
            }],
            generation_config: Some(&CHAT_GENERATION),
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["contents"][0]["parts"][0]["text"], "x");
        assert_eq!(v["generationConfig"]["topK"], 40);
        assert_eq!(v["generationConfig"]["maxOutputTokens"], 150);
    }

    #[test]
    fn extracts_first_candidate_trimmed() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"  Use LEDs.\n"}]}}]}"#;
        let parsed: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(extract_text(parsed).unwrap(), "Use LEDs.");

        let empty: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(matches!(extract_text(empty), Err(GeminiError::EmptyResponse)));
    }
}
