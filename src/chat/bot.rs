use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::config::{Config, LlmConfig};
use crate::llm::{self, CompletionParams, PromptMessage};

use super::service::ChatError;
use super::ChatMessage;

const LLM_SYSTEM_PROMPT: &str = "You are a helpful assistant for NASA space biology research. \
     Answer questions about OSDR studies, assays, organisms and spaceflight conditions \
     concisely. Say so when you do not know.";

const LLM_CHAT_PARAMS: CompletionParams = CompletionParams {
    temperature: 0.3,
    max_tokens: 1024,
};

/// Knowledge-graph search mode forwarded to the RAG service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMethod {
    Local,
    Global,
    Drift,
}

impl FromStr for SearchMethod {
    type Err = ChatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "global" => Ok(Self::Global),
            "drift" => Ok(Self::Drift),
            _ => Err(ChatError::InvalidMethod(s.to_string())),
        }
    }
}

/// Where assistant replies come from.
pub enum ChatBackend {
    /// Echoes the user's text reversed. No network.
    Dummy,
    /// Proxies to an external graph-RAG query service.
    Rag {
        client: reqwest::Client,
        base_url: String,
        timeout: Duration,
    },
    /// Plain chat completion over the conversation so far.
    Llm {
        client: reqwest::Client,
        config: LlmConfig,
    },
}

impl ChatBackend {
    pub fn from_config(config: &Config, client: reqwest::Client) -> anyhow::Result<Self> {
        match config.chat.backend.as_str() {
            "dummy" => Ok(Self::Dummy),
            "rag" => Ok(Self::Rag {
                client,
                base_url: config.chat.rag_base_url.clone(),
                timeout: Duration::from_secs(config.chat.rag_timeout_secs),
            }),
            "llm" => Ok(Self::Llm {
                client,
                config: config.llm.clone(),
            }),
            other => anyhow::bail!("Unknown chat backend: {other} (expected dummy, rag or llm)"),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Dummy => "dummy",
            Self::Rag { .. } => "rag",
            Self::Llm { .. } => "llm",
        }
    }

    pub async fn reply(
        &self,
        user_input: &str,
        history: &[ChatMessage],
        method: &str,
    ) -> Result<String, ChatError> {
        match self {
            Self::Dummy => Ok(user_input.chars().rev().collect()),
            Self::Rag {
                client,
                base_url,
                timeout,
            } => {
                let method: SearchMethod = method.parse()?;
                Ok(rag_query(client, base_url, *timeout, user_input, history, method).await?)
            }
            Self::Llm { client, config } => {
                let mut messages = vec![PromptMessage::system(LLM_SYSTEM_PROMPT)];
                messages.extend(history.iter().map(|m| PromptMessage {
                    role: m.role.as_str().to_string(),
                    content: m.content.clone(),
                }));
                messages.push(PromptMessage::user(user_input));
                Ok(llm::complete(client, config, messages, LLM_CHAT_PARAMS).await?)
            }
        }
    }
}

// ─── RAG service ─────────────────────────────────────────

#[derive(Serialize)]
struct RagQueryRequest<'a> {
    query: &'a str,
    method: SearchMethod,
    history: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct RagQueryResponse {
    response: String,
}

async fn rag_query(
    client: &reqwest::Client,
    base_url: &str,
    timeout: Duration,
    query: &str,
    history: &[ChatMessage],
    method: SearchMethod,
) -> anyhow::Result<String> {
    let url = format!("{base_url}/query");

    let resp = client
        .post(&url)
        .timeout(timeout)
        .json(&RagQueryRequest {
            query,
            method,
            history,
        })
        .send()
        .await
        .context("Failed to call RAG query service")?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("RAG query service returned {status}: {body}");
    }

    let body: RagQueryResponse = resp.json().await?;
    Ok(body.response)
}
