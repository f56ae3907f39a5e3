//! Process-local provider availability.
//!
//! The only piece of mutable shared state in the orchestrator (spec.md §9).
//! A provider moves `ENABLED -> DISABLED_SESSION` on `AuthErr` or `QuotaErr`
//! and never comes back until the process restarts. Guarded by a single
//! short-held lock; never held across a network call.

use crate::core::types::ProviderStatus;
use parking_lot::RwLock;
use std::collections::HashMap;

/// A provider's current standing for the remainder of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderAvailability {
    Enabled,
    DisabledSession { reason: ProviderStatus },
}

impl ProviderAvailability {
    pub fn is_available(self) -> bool {
        matches!(self, ProviderAvailability::Enabled)
    }
}

/// Shared, process-local availability map. Constructed once and handed to
/// the orchestrator; never a singleton.
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    availability: RwLock<HashMap<String, ProviderAvailability>>,
    last_error: RwLock<HashMap<String, ProviderStatus>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `provider_id` is still considered available. Providers with
    /// no recorded entry are available by default (fresh process).
    pub fn is_available(&self, provider_id: &str) -> bool {
        self.availability
            .read()
            .get(provider_id)
            .map(|a| a.is_available())
            .unwrap_or(true)
    }

    /// Record the outcome of one provider call. Session-fatal statuses
    /// (`AuthErr`, `QuotaErr`) disable the provider for the remainder of the
    /// process; everything else is a single-call failure and leaves the
    /// provider `ENABLED`.
    pub fn record_outcome(&self, provider_id: &str, status: ProviderStatus) {
        if status != ProviderStatus::Ok {
            self.last_error.write().insert(provider_id.to_string(), status);
        }
        if status.is_session_fatal() {
            self.availability.write().insert(
                provider_id.to_string(),
                ProviderAvailability::DisabledSession { reason: status },
            );
        }
    }

    pub fn last_error(&self, provider_id: &str) -> Option<ProviderStatus> {
        self.last_error.read().get(provider_id).copied()
    }

    pub fn availability_of(&self, provider_id: &str) -> ProviderAvailability {
        self.availability
            .read()
            .get(provider_id)
            .copied()
            .unwrap_or(ProviderAvailability::Enabled)
    }
}
