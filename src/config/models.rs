//! Configuration data model (spec.md §6).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

fn default_min_consensus_score() -> f64 {
    0.60
}

fn default_min_confidence() -> f64 {
    0.60
}

fn default_signal_cache_minutes() -> u64 {
    60
}

fn default_lookback_candles() -> usize {
    50
}

fn default_lookback_min() -> usize {
    50
}

fn default_lookback_max() -> usize {
    500
}

fn default_min_participants() -> usize {
    1
}

fn default_enabled() -> bool {
    true
}

fn default_provider_timeout_ms() -> u64 {
    8_000
}

/// spec.md §3: "`max_retries` (0 by default for this core; retries happen
/// only for transient/rate-limit classes)".
fn default_max_retries() -> u32 {
    0
}

fn default_weight() -> f64 {
    1.0
}

/// Top-level configuration for the consensus core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsensusConfig {
    pub providers: Vec<ProviderConfig>,

    #[serde(default = "default_min_consensus_score")]
    pub min_consensus_score: f64,

    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,

    #[serde(default)]
    pub require_all_providers: bool,

    #[serde(default = "default_signal_cache_minutes")]
    pub signal_cache_minutes: u64,

    #[serde(default = "default_lookback_candles")]
    pub lookback_candles: usize,

    /// Lower bound on accepted `bars` length (spec.md §3 `lookback_min`).
    /// Distinct from `lookback_candles`: this gates request validity, while
    /// `lookback_candles` caps how many of those bars the prompt renders.
    /// They share the same default (50) but are independently configurable.
    #[serde(default = "default_lookback_min")]
    pub lookback_min: usize,

    /// Upper bound on accepted `bars` length (spec.md §3 `lookback_max`).
    /// Not independently configurable in the document's `ai.*` section, so
    /// this is a fixed default rather than a file field.
    #[serde(default = "default_lookback_max")]
    pub lookback_max: usize,

    /// Minimum number of contributors required for `should_trade` (spec.md
    /// §4.4 step 8).
    #[serde(default = "default_min_participants")]
    pub min_participants: usize,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            providers: Vec::new(),
            min_consensus_score: default_min_consensus_score(),
            min_confidence: default_min_confidence(),
            require_all_providers: false,
            signal_cache_minutes: default_signal_cache_minutes(),
            lookback_candles: default_lookback_candles(),
            lookback_min: default_lookback_min(),
            lookback_max: default_lookback_max(),
            min_participants: default_min_participants(),
        }
    }
}

/// One provider entry. `api_key` is populated from the environment at load
/// time (spec.md §6) — it is never read from the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Stable id, e.g. `"chatgpt"`, `"claude"`, `"gemini"`.
    pub id: String,

    /// Vendor kind: `"openai"`, `"anthropic"`, or `"gemini"`.
    pub kind: String,

    pub model: String,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_weight")]
    pub weight: f64,

    #[serde(default = "default_provider_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Resolved from `<KIND>_API_KEY` during loading; empty until then.
    #[serde(default, skip_serializing)]
    pub api_key: String,

    #[serde(default)]
    pub tags: HashMap<String, String>,
}

impl ProviderConfig {
    /// The environment variable this provider's credential is read from.
    pub fn credential_env_var(&self) -> String {
        format!("{}_API_KEY", self.kind.to_uppercase())
    }
}
