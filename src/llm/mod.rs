//! Chat-completion calls against Ollama or an OpenAI-compatible API, plus the
//! prompts that turn free text into structured OSDR filters.

pub mod assay_filter;
pub mod gap_filter;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: String,
    pub content: String,
}

impl PromptMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CompletionParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for CompletionParams {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            max_tokens: 60,
        }
    }
}

/// One non-streaming completion over `messages`; returns the assistant text.
pub async fn complete(
    client: &reqwest::Client,
    config: &LlmConfig,
    messages: Vec<PromptMessage>,
    params: CompletionParams,
) -> Result<String> {
    match config.provider.as_str() {
        "ollama" => call_ollama(client, config, messages, params).await,
        "openai" => call_openai(client, config, messages, params).await,
        other => anyhow::bail!("Unknown LLM provider: {other}"),
    }
}

/// The JSON object in an LLM reply: the whole text when it parses, otherwise
/// the span from the first `{` to the last `}`.
pub fn extract_json_object(content: &str) -> Result<serde_json::Value> {
    let content = content.trim();
    if content.is_empty() {
        anyhow::bail!("LLM returned an empty reply");
    }
    if let Ok(value @ serde_json::Value::Object(_)) =
        serde_json::from_str::<serde_json::Value>(content)
    {
        return Ok(value);
    }

    let (start, end) = match (content.find('{'), content.rfind('}')) {
        (Some(s), Some(e)) if s < e => (s, e),
        _ => anyhow::bail!("No JSON object in LLM reply: {content}"),
    };
    match serde_json::from_str::<serde_json::Value>(&content[start..=end])
        .with_context(|| format!("Unparseable JSON in LLM reply: {content}"))?
    {
        value @ serde_json::Value::Object(_) => Ok(value),
        _ => anyhow::bail!("LLM reply is not a JSON object: {content}"),
    }
}

// ─── Ollama ──────────────────────────────────────────────

#[derive(Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<PromptMessage>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: PromptMessage,
}

async fn call_ollama(
    client: &reqwest::Client,
    config: &LlmConfig,
    messages: Vec<PromptMessage>,
    params: CompletionParams,
) -> Result<String> {
    let url = format!("{}/api/chat", config.base_url);

    let req = OllamaChatRequest {
        model: config.chat_model.clone(),
        messages,
        stream: false,
        options: OllamaOptions {
            temperature: params.temperature,
            num_predict: params.max_tokens,
        },
    };

    let resp = client
        .post(&url)
        .json(&req)
        .send()
        .await
        .context("Failed to call Ollama chat API")?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("Ollama chat API returned {status}: {body}");
    }

    let body: OllamaChatResponse = resp.json().await?;
    Ok(body.message.content)
}

// ─── OpenAI-compatible ───────────────────────────────────

#[derive(Serialize)]
struct OpenAiChatRequest {
    model: String,
    messages: Vec<PromptMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Deserialize)]
struct OpenAiResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

async fn call_openai(
    client: &reqwest::Client,
    config: &LlmConfig,
    messages: Vec<PromptMessage>,
    params: CompletionParams,
) -> Result<String> {
    let url = format!("{}/v1/chat/completions", config.base_url);
    let api_key = config.api_key.as_deref().unwrap_or_default();

    let req = OpenAiChatRequest {
        model: config.chat_model.clone(),
        messages,
        temperature: params.temperature,
        max_tokens: params.max_tokens,
    };

    let resp = client
        .post(&url)
        .header("Authorization", format!("Bearer {api_key}"))
        .json(&req)
        .send()
        .await
        .context("Failed to call OpenAI chat API")?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("OpenAI chat API returned {status}: {body}");
    }

    let body: OpenAiChatResponse = resp.json().await?;
    Ok(body
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .unwrap_or_default())
}
