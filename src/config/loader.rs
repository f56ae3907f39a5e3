//! Configuration loading: YAML file + environment-sourced credentials.

use super::models::ConsensusConfig;
use super::validation::Validate;
use crate::utils::error::{CoreError, Result};
use std::path::Path;
use tracing::{debug, info, warn};

impl ConsensusConfig {
    /// Load from a YAML file, then resolve provider credentials from the
    /// environment and validate. `.env` (if present) is loaded first so
    /// local development can keep credentials out of the shell.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("loading consensus configuration from {:?}", path);
        let _ = dotenvy::dotenv();

        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix("CONSENSUS").separator("__"))
            .build()?;

        let mut parsed: ConsensusConfig = settings
            .try_deserialize()
            .map_err(|e| CoreError::configuration(format!("failed to parse configuration: {}", e)))?;

        parsed.resolve_credentials();
        parsed
            .validate()
            .map_err(CoreError::configuration)?;

        debug!("consensus configuration loaded and validated");
        Ok(parsed)
    }

    /// Fill each provider's `api_key` from `<KIND>_API_KEY`. Providers whose
    /// credential is absent are left with an empty key; the caller decides
    /// whether to start them disabled (spec.md §6).
    pub fn resolve_credentials(&mut self) {
        let _ = dotenvy::dotenv();
        for provider in &mut self.providers {
            let var = provider.credential_env_var();
            match std::env::var(&var) {
                Ok(key) if !key.trim().is_empty() => provider.api_key = key,
                _ => warn!(
                    "no credential found in {} for provider {}; it will start disabled",
                    var, provider.id
                ),
            }
        }
    }

    /// Provider ids whose credential could not be resolved.
    pub fn providers_missing_credentials(&self) -> Vec<&str> {
        self.providers
            .iter()
            .filter(|p| p.api_key.trim().is_empty())
            .map(|p| p.id.as_str())
            .collect()
    }
}
