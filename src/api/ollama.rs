//! Runtime client for an Ollama-compatible local server.
//!
//! `load` drives `/api/pull` and reports layer progress through the caller's
//! callback; `generate` runs one non-streaming `/api/chat` completion. Both
//! absorb HTTP details so the rest of the application only sees the
//! [`ModelRuntime`] contract.

use async_trait::async_trait;
use futures_util::StreamExt;
use memchr::memchr;
use tracing::debug;

use crate::api::{ChatMessage, ChatOptions, ChatReply, ChatRequest, PullChunk, PullRequest, VersionResponse};
use crate::core::runtime::{BoxError, EngineHandle, ModelRuntime, ProgressFn, SamplingParams};
use crate::utils::url::construct_api_url;

pub struct OllamaRuntime {
    client: reqwest::Client,
    base_url: String,
}

impl OllamaRuntime {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Startup probe: the server is considered present iff `/api/version`
    /// answers. Called before any terminal setup.
    pub async fn probe_version(&self) -> Result<String, BoxError> {
        let url = construct_api_url(&self.base_url, "api/version");
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(format!("version probe returned HTTP {}", response.status()).into());
        }
        let version: VersionResponse = response.json().await?;
        Ok(version.version)
    }
}

/// Digest a server error body down to one log-friendly line: prefer the JSON
/// `error` field (string or `{message}` object), fall back to the collapsed
/// raw text.
fn summarize_error_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        let summary = value
            .pointer("/error/message")
            .and_then(|v| v.as_str())
            .map(str::to_owned)
            .or_else(|| {
                value.get("error").and_then(|v| match v {
                    serde_json::Value::String(s) => Some(s.clone()),
                    _ => None,
                })
            });
        if let Some(summary) = summary {
            return summary;
        }
    }

    trimmed.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Handle one NDJSON line from `/api/pull`. Returns true once the server
/// reported success.
fn process_pull_line(line: &str, on_progress: &ProgressFn) -> Result<bool, BoxError> {
    let chunk: PullChunk = match serde_json::from_str(line) {
        Ok(chunk) => chunk,
        Err(err) => {
            debug!(%err, line, "unparseable pull status line");
            return Ok(false);
        }
    };

    if let Some(error) = chunk.error {
        return Err(error.into());
    }
    if let Some(fraction) = chunk.fraction() {
        on_progress(fraction);
    }
    if chunk.is_success() {
        on_progress(1.0);
        return Ok(true);
    }
    Ok(false)
}

#[async_trait]
impl ModelRuntime for OllamaRuntime {
    async fn load(&self, model_id: &str, on_progress: ProgressFn) -> Result<EngineHandle, BoxError> {
        let url = construct_api_url(&self.base_url, "api/pull");
        let request = PullRequest {
            model: model_id.to_string(),
            stream: true,
        };

        let response = self.client.post(url).json(&request).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "<no body>".to_string());
            return Err(format!("pull failed: HTTP {status}: {}", summarize_error_body(&body)).into());
        }

        let mut stream = response.bytes_stream();
        let mut buffer: Vec<u8> = Vec::new();
        let mut succeeded = false;

        while let Some(chunk) = stream.next().await {
            let chunk_bytes = chunk?;
            buffer.extend_from_slice(&chunk_bytes);

            while let Some(newline_pos) = memchr(b'\n', &buffer) {
                let line = match std::str::from_utf8(&buffer[..newline_pos]) {
                    Ok(s) => s.trim().to_string(),
                    Err(err) => {
                        debug!(%err, "invalid UTF-8 in pull stream");
                        buffer.drain(..=newline_pos);
                        continue;
                    }
                };
                buffer.drain(..=newline_pos);
                if line.is_empty() {
                    continue;
                }
                if process_pull_line(&line, &on_progress)? {
                    succeeded = true;
                }
            }
        }

        if !succeeded {
            return Err("pull stream ended before the server reported success".into());
        }

        debug!(model = model_id, "model pull complete");
        Ok(EngineHandle {
            model: model_id.to_string(),
        })
    }

    async fn generate(
        &self,
        engine: &EngineHandle,
        messages: &[ChatMessage],
        params: SamplingParams,
    ) -> Result<String, BoxError> {
        let url = construct_api_url(&self.base_url, "api/chat");
        let request = ChatRequest {
            model: engine.model.clone(),
            messages: messages.to_vec(),
            stream: false,
            options: ChatOptions {
                temperature: params.temperature,
                num_predict: params.max_tokens,
            },
        };

        let response = self.client.post(url).json(&request).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "<no body>".to_string());
            return Err(format!("chat failed: HTTP {status}: {}", summarize_error_body(&body)).into());
        }

        let reply: ChatReply = response.json().await?;
        Ok(reply.message.content)
    }
}
