//! Boundary to the external model runtime.
//!
//! Everything the application knows about inference fits in [`ModelRuntime`]:
//! load a model once (reporting coarse progress), then ask it for one reply at
//! a time. Implementations live under [`crate::api`]; tests substitute scripted
//! doubles.

use async_trait::async_trait;

use crate::api::ChatMessage;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Callback invoked with download/load progress fractions. Raw values are
/// forwarded as-is; the consumer clamps them to `[0, 1]`.
pub type ProgressFn = Box<dyn Fn(f64) + Send + Sync>;

/// Opaque proof that a model finished loading. Only the runtime that issued a
/// handle can use it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineHandle {
    pub(crate) model: String,
}

impl EngineHandle {
    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Fixed sampling parameters sent with every generation request.
#[derive(Debug, Clone, Copy)]
pub struct SamplingParams {
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: crate::core::constants::TEMPERATURE,
            max_tokens: crate::core::constants::MAX_TOKENS,
        }
    }
}

#[async_trait]
pub trait ModelRuntime: Send + Sync {
    /// Prepare the given model for inference, reporting progress along the way.
    async fn load(&self, model_id: &str, on_progress: ProgressFn) -> Result<EngineHandle, BoxError>;

    /// Produce one complete reply for the given message sequence.
    async fn generate(
        &self,
        engine: &EngineHandle,
        messages: &[ChatMessage],
        params: SamplingParams,
    ) -> Result<String, BoxError>;
}
