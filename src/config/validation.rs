//! Load-time configuration validation.

use super::models::{ConsensusConfig, ProviderConfig};
use std::collections::HashSet;
use tracing::debug;

/// Validation for configuration structures, checked once at load time.
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

const SUPPORTED_KINDS: &[&str] = &["openai", "anthropic", "gemini"];
const WEIGHT_SUM_EPSILON: f64 = 1e-6;

impl Validate for ConsensusConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("validating consensus configuration");

        if self.providers.is_empty() {
            return Err("at least one provider must be configured".to_string());
        }

        let mut ids = HashSet::new();
        for provider in &self.providers {
            if !ids.insert(&provider.id) {
                return Err(format!("duplicate provider id: {}", provider.id));
            }
            provider.validate()?;
        }

        let weight_sum: f64 = self
            .providers
            .iter()
            .filter(|p| p.enabled)
            .map(|p| p.weight)
            .sum();
        if (weight_sum - 1.0).abs() > WEIGHT_SUM_EPSILON {
            return Err(format!(
                "AI provider weights must sum to 1.0, got {}",
                weight_sum
            ));
        }

        if !(0.0..=1.0).contains(&self.min_consensus_score) {
            return Err("min_consensus_score must be within [0, 1]".to_string());
        }

        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err("min_confidence must be within [0, 1]".to_string());
        }

        if self.lookback_candles == 0 {
            return Err("lookback_candles must be greater than 0".to_string());
        }

        if self.lookback_min == 0 || self.lookback_min > self.lookback_max {
            return Err("lookback_min must be greater than 0 and at most lookback_max".to_string());
        }

        Ok(())
    }
}

impl Validate for ProviderConfig {
    fn validate(&self) -> Result<(), String> {
        if self.id.is_empty() {
            return Err("provider id cannot be empty".to_string());
        }

        if !SUPPORTED_KINDS.contains(&self.kind.as_str()) {
            return Err(format!(
                "unsupported provider kind: {}. supported kinds: {:?}",
                self.kind, SUPPORTED_KINDS
            ));
        }

        if self.model.is_empty() {
            return Err(format!("provider {} model cannot be empty", self.id));
        }

        if self.weight < 0.0 {
            return Err(format!("provider {} weight must be non-negative", self.id));
        }

        if self.timeout_ms == 0 {
            return Err(format!("provider {} timeout must be greater than 0", self.id));
        }

        Ok(())
    }
}
