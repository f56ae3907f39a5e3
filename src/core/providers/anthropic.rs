//! Claude (Anthropic) adapter.

use super::shared::{dispatch, HttpOutcome};
use super::ProviderAdapter;
use crate::core::types::{ProviderReply, ProviderStatus};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

pub struct ClaudeAdapter {
    provider_id: String,
    model: String,
    api_key: String,
    base_url: String,
    max_retries: u32,
    client: reqwest::Client,
}

impl ClaudeAdapter {
    pub fn new(provider_id: impl Into<String>, model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
            model: model.into(),
            api_key: api_key.into(),
            base_url: "https://api.anthropic.com/v1".to_string(),
            max_retries: 0,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Override the vendor's default API base (e.g. a self-hosted proxy, or
    /// a test double); mirrors the `*_API_BASE` environment override pattern
    /// litellm-rs's provider configs expose.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[async_trait]
impl ProviderAdapter for ClaudeAdapter {
    fn provider_id(&self) -> &str {
        &self.provider_id
    }

    async fn call(&self, prompt: &str, deadline: Duration) -> ProviderReply {
        let url = format!("{}/messages", self.base_url);
        let body = json!({
            "model": self.model,
            "max_tokens": 1024,
            "messages": [{"role": "user", "content": prompt}],
        });

        let outcome = dispatch(
            &self.client,
            || {
                self.client
                    .post(&url)
                    .header("x-api-key", &self.api_key)
                    .header("anthropic-version", "2023-06-01")
                    .json(&body)
            },
            deadline,
            self.max_retries,
        )
        .await;

        match outcome {
            HttpOutcome::Success { body, latency } => {
                match serde_json::from_str::<MessagesResponse>(&body) {
                    Ok(parsed) => {
                        let text = parsed
                            .content
                            .into_iter()
                            .find_map(|block| block.text)
                            .unwrap_or_default();
                        if text.trim().is_empty() {
                            ProviderReply {
                                provider_id: self.provider_id.clone(),
                                status: ProviderStatus::ParseUnavailable,
                                raw_text: String::new(),
                                latency,
                                usage: None,
                            }
                        } else {
                            ProviderReply {
                                provider_id: self.provider_id.clone(),
                                status: ProviderStatus::Ok,
                                raw_text: text,
                                latency,
                                usage: None,
                            }
                        }
                    }
                    Err(_) => ProviderReply {
                        provider_id: self.provider_id.clone(),
                        status: ProviderStatus::ParseUnavailable,
                        raw_text: String::new(),
                        latency,
                        usage: None,
                    },
                }
            }
            HttpOutcome::Failed { status, latency } => ProviderReply {
                provider_id: self.provider_id.clone(),
                status,
                raw_text: String::new(),
                latency,
                usage: None,
            },
        }
    }
}
