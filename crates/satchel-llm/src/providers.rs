//! External LLM provider completion implementations.
//!
//! Single-shot (non-streaming) completions. OpenAI and Groq use the
//! same wire format; Anthropic uses a different one. Every failure
//! mode — transport error, non-2xx status, missing content — maps to
//! `ClassificationUnavailable` so callers can engage the fallback.

use reqwest::Client;
use serde_json::json;
use tracing::debug;

use satchel_core::{Error, Result};

use crate::types::LLMProvider;

const MAX_TOKENS: usize = 1024;

/// Request a single completion from the given provider.
pub async fn complete(
    client: &Client,
    provider: LLMProvider,
    prompt: &str,
    model: &str,
    api_key: &str,
    temperature: f64,
) -> Result<String> {
    match provider {
        LLMProvider::OpenAI => {
            complete_openai_compat(
                client,
                "https://api.openai.com/v1/chat/completions",
                prompt,
                model,
                api_key,
                temperature,
            )
            .await
        }
        LLMProvider::Groq => {
            complete_openai_compat(
                client,
                "https://api.groq.com/openai/v1/chat/completions",
                prompt,
                model,
                api_key,
                temperature,
            )
            .await
        }
        LLMProvider::Anthropic => {
            complete_anthropic(client, prompt, model, api_key, temperature).await
        }
    }
}

/// Completion via OpenAI-compatible APIs (OpenAI, Groq).
async fn complete_openai_compat(
    client: &Client,
    url: &str,
    prompt: &str,
    model: &str,
    api_key: &str,
    temperature: f64,
) -> Result<String> {
    let body = json!({
        "model": model,
        "messages": [{"role": "user", "content": prompt}],
        "temperature": temperature,
        "max_tokens": MAX_TOKENS,
        "response_format": {"type": "json_object"},
    });

    debug!("Requesting completion from {} with model {}", url, model);

    let response = client
        .post(url)
        .header("Authorization", format!("Bearer {}", api_key))
        .header("Content-Type", "application/json")
        .json(&body)
        .send()
        .await
        .map_err(|e| Error::ClassificationUnavailable(format!("request failed: {}", e)))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(Error::ClassificationUnavailable(format!(
            "API error {}: {}",
            status, body
        )));
    }

    let parsed: serde_json::Value = response
        .json()
        .await
        .map_err(|e| Error::ClassificationUnavailable(format!("bad response body: {}", e)))?;

    parsed["choices"][0]["message"]["content"]
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| Error::ClassificationUnavailable("response had no content".into()))
}

/// Completion via Anthropic's Messages API.
async fn complete_anthropic(
    client: &Client,
    prompt: &str,
    model: &str,
    api_key: &str,
    temperature: f64,
) -> Result<String> {
    let body = json!({
        "model": model,
        "messages": [{"role": "user", "content": prompt}],
        "temperature": temperature,
        "max_tokens": MAX_TOKENS,
    });

    debug!("Requesting completion from Anthropic with model {}", model);

    let response = client
        .post("https://api.anthropic.com/v1/messages")
        .header("x-api-key", api_key)
        .header("anthropic-version", "2023-06-01")
        .header("Content-Type", "application/json")
        .json(&body)
        .send()
        .await
        .map_err(|e| Error::ClassificationUnavailable(format!("request failed: {}", e)))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(Error::ClassificationUnavailable(format!(
            "API error {}: {}",
            status, body
        )));
    }

    let parsed: serde_json::Value = response
        .json()
        .await
        .map_err(|e| Error::ClassificationUnavailable(format!("bad response body: {}", e)))?;

    parsed["content"][0]["text"]
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| Error::ClassificationUnavailable("response had no content".into()))
}
