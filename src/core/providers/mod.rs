//! C1 — Provider Adapter.
//!
//! A uniform, typed wrapper over one remote LLM. Everything vendor-specific
//! (HTTP transport, auth, model selection, error encodings) lives behind one
//! operation: [`ProviderAdapter::call`]. The orchestrator never sees a
//! vendor exception — only a [`crate::core::types::ProviderReply`].

pub mod anthropic;
pub mod gemini;
pub mod openai;
pub mod registry;
mod shared;

use crate::core::types::ProviderReply;
use async_trait::async_trait;
use std::time::Duration;

/// Uniform operation every provider adapter implements.
///
/// An adapter instance is safe for use by one orchestration call at a time;
/// the orchestrator invokes N adapters in N parallel tasks and adapters
/// must not share mutable state between calls. `call` is infallible — every
/// failure mode, including exceeding `deadline`, is reported through
/// [`ProviderReply::status`] rather than an `Err`.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Stable provider id, e.g. `"chatgpt"`, `"claude"`, `"gemini"`.
    fn provider_id(&self) -> &str;

    /// Send `prompt` and return within `deadline`. The adapter must not
    /// exceed `deadline`; on expiry it returns `TimeoutErr` with
    /// `latency == deadline`.
    async fn call(&self, prompt: &str, deadline: Duration) -> ProviderReply;
}

pub use anthropic::ClaudeAdapter;
pub use gemini::GeminiAdapter;
pub use openai::ChatGptAdapter;
pub use registry::{ProviderAvailability, ProviderRegistry};
