//! Gemini (Google) adapter.

use super::shared::{dispatch, HttpOutcome};
use super::ProviderAdapter;
use crate::core::types::{ProviderReply, ProviderStatus};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

pub struct GeminiAdapter {
    provider_id: String,
    model: String,
    api_key: String,
    base_url: String,
    max_retries: u32,
    client: reqwest::Client,
}

impl GeminiAdapter {
    pub fn new(provider_id: impl Into<String>, model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
            model: model.into(),
            api_key: api_key.into(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
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
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[async_trait]
impl ProviderAdapter for GeminiAdapter {
    fn provider_id(&self) -> &str {
        &self.provider_id
    }

    async fn call(&self, prompt: &str, deadline: Duration) -> ProviderReply {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let body = json!({
            "contents": [{"parts": [{"text": prompt}]}],
        });

        let outcome = dispatch(&self.client, || self.client.post(&url).json(&body), deadline, self.max_retries)
            .await;

        match outcome {
            HttpOutcome::Success { body, latency } => {
                match serde_json::from_str::<GenerateContentResponse>(&body) {
                    Ok(parsed) => {
                        let text = parsed
                            .candidates
                            .into_iter()
                            .next()
                            .and_then(|c| c.content.parts.into_iter().next())
                            .and_then(|p| p.text)
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
