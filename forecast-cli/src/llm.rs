use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use forecast_core::ChatMessage;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};

use crate::auth;
use crate::config::LlmSection;

/// Anything that turns a list of role-tagged messages into one reply.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}

/// OpenAI-compatible `/v1/chat/completions` client
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
    temperature: f32,
}

#[derive(Serialize)]
struct Req<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Deserialize)]
struct Resp {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MsgOut,
}

#[derive(Deserialize)]
struct MsgOut {
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(section: &LlmSection, api_key: impl Into<String>) -> Result<Self> {
        if section.provider != "openai" {
            bail!(
                "unsupported llm.provider '{}' (only \"openai\" is supported)",
                section.provider
            );
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(section.timeout_secs))
            .build()
            .context("build http client")?;

        Ok(Self {
            http,
            base_url: section.base_url.trim_end_matches('/').to_string(),
            model: section.model.clone(),
            api_key: api_key.into(),
            temperature: section.temperature,
        })
    }

    /// Build a client from config plus the stored or exported API key.
    pub fn from_config(section: &LlmSection) -> Result<Self> {
        let key = auth::resolve_api_key()?.ok_or_else(|| {
            anyhow!(
                "missing OpenAI API key; set {} or run: forecast auth paste-openai-api-key",
                auth::API_KEY_ENV
            )
        })?;
        Self::new(section, key)
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let body = Req {
            model: &self.model,
            messages,
            temperature: self.temperature,
        };

        tracing::debug!(model = %self.model, messages = messages.len(), "chat completion request");

        let resp = self
            .http
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .context("openai request")?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("openai error: {status} {txt}");
        }

        let out: Resp = resp.json().await.context("parse openai response")?;
        let content = out
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        let content = content.trim();
        if content.is_empty() {
            bail!("openai returned an empty reply");
        }
        Ok(content.to_string())
    }
}

/// Run a completion from synchronous code (the chat view's event loop).
pub fn complete_blocking(client: &dyn CompletionClient, messages: &[ChatMessage]) -> Result<String> {
    // `main` runs inside a tokio runtime; a nested block_on would panic.
    if let Ok(handle) = tokio::runtime::Handle::try_current() {
        tokio::task::block_in_place(|| handle.block_on(client.complete(messages)))
    } else {
        let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
        rt.block_on(client.complete(messages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn section(base_url: String) -> LlmSection {
        LlmSection {
            base_url,
            timeout_secs: 5,
            ..LlmSection::default()
        }
    }

    #[tokio::test]
    async fn test_complete_sends_messages_and_reads_reply() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|headers: axum::http::HeaderMap, Json(body): Json<Value>| async move {
                assert_eq!(headers["authorization"], "Bearer sk-test");
                assert_eq!(body["model"], "gpt-4o");
                assert_eq!(body["messages"][0]["role"], "system");
                assert_eq!(body["messages"][1]["content"], "hello");
                Json(json!({
                    "choices": [{ "message": { "role": "assistant", "content": "  Consider ETFs.\n" } }]
                }))
            }),
        );
        let url = serve(app).await;

        let client = OpenAiClient::new(&section(url), "sk-test").unwrap();
        let reply = client
            .complete(&[ChatMessage::system("sys"), ChatMessage::user("hello")])
            .await
            .unwrap();
        assert_eq!(reply, "Consider ETFs.");
    }

    #[tokio::test]
    async fn test_http_error_is_reported() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|| async { (StatusCode::UNAUTHORIZED, "invalid api key") }),
        );
        let url = serve(app).await;

        let client = OpenAiClient::new(&section(url), "sk-bad").unwrap();
        let err = client
            .complete(&[ChatMessage::user("hi")])
            .await
            .unwrap_err()
            .to_string();
        assert!(err.contains("401"), "{err}");
        assert!(err.contains("invalid api key"), "{err}");
    }

    #[tokio::test]
    async fn test_empty_reply_is_an_error() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|| async { Json(json!({ "choices": [] })) }),
        );
        let url = serve(app).await;

        let client = OpenAiClient::new(&section(url), "sk-test").unwrap();
        assert!(client.complete(&[ChatMessage::user("hi")]).await.is_err());
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let s = LlmSection {
            provider: "anthropic".to_string(),
            ..LlmSection::default()
        };
        assert!(OpenAiClient::new(&s, "sk-test").is_err());
    }
}
