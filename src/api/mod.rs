//! Wire payloads for the local model runtime's HTTP API
//!
//! The runtime speaks the Ollama surface: `/api/version` for the startup
//! probe, `/api/pull` for model download (streamed NDJSON status lines), and
//! `/api/chat` for non-streaming completion.

pub mod ollama;

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Serialize, Clone, Debug)]
pub struct ChatOptions {
    pub temperature: f64,
    pub num_predict: u32,
}

#[derive(Serialize, Clone, Debug)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    pub options: ChatOptions,
}

#[derive(Deserialize, Debug)]
pub struct ChatReply {
    pub message: ChatMessage,
    #[serde(default)]
    pub done: bool,
}

#[derive(Serialize, Debug)]
pub struct PullRequest {
    pub model: String,
    pub stream: bool,
}

/// One NDJSON status line from `/api/pull`. Fields come and go between layers
/// of the download, so everything past `status` is optional.
#[derive(Deserialize, Debug, Default)]
pub struct PullChunk {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub completed: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
}

impl PullChunk {
    /// Progress of the current layer as a fraction, when the chunk carries
    /// byte counts.
    pub fn fraction(&self) -> Option<f64> {
        match (self.completed, self.total) {
            (Some(completed), Some(total)) if total > 0 => {
                Some(completed as f64 / total as f64)
            }
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

#[derive(Deserialize, Debug)]
pub struct VersionResponse {
    pub version: String,
}
