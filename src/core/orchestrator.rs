//! C4 — Consensus Orchestrator.
//!
//! The hardest component: fan-out under a deadline, dynamic reweighting over
//! whichever providers actually contributed, and the direction/confidence
//! aggregation that decides `should_trade`. See spec.md §4.4 for the
//! numbered algorithm this module implements step-for-step.

use crate::config::{ConsensusConfig, ProviderConfig};
use crate::core::cache::SignalCache;
use crate::core::parser;
use crate::core::prompt::{PromptAssembler, TemplateKey};
use crate::core::providers::{ProviderAdapter, ProviderAvailability, ProviderRegistry};
use crate::core::types::{
    ConsensusSignal, Direction, ProviderReply, ProviderStatus, RejectReason, ScoredReply,
    SignalRequest,
};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Grace period added on top of `max(provider.timeout)` for the global
/// orchestration deadline (spec.md §4.4 step 3).
const DEFAULT_GRACE: Duration = Duration::from_secs(2);
const DEFAULT_MAX_CONCURRENCY: usize = 32;

/// The reasoning-assembly order spec.md §4.4 step 9 fixes for stable caller
/// logs and tests.
const REASONING_ORDER: &[&str] = &["chatgpt", "claude", "gemini"];

/// The full internal trace of one orchestration call: the public signal plus
/// the per-provider detail the public `ConsensusSignal` does not carry
/// (spec.md §4 "Audit trail for malformed replies").
#[derive(Debug, Clone)]
pub struct ConsensusReport {
    pub signal: ConsensusSignal,
    pub raw_replies: Vec<ProviderReply>,
    pub scored_replies: Vec<ScoredReply>,
}

/// Read-only introspection snapshot for one configured provider (spec.md §6,
/// shape pinned by the expanded spec's §6).
#[derive(Debug, Clone, Copy)]
pub struct ProviderStatusSnapshot {
    pub configured_weight: f64,
    pub effective_weight_if_alone: f64,
    pub availability: ProviderAvailability,
    pub last_error_kind: Option<ProviderStatus>,
}

pub struct ConsensusOrchestrator {
    config: ConsensusConfig,
    registry: Arc<ProviderRegistry>,
    adapters: HashMap<String, Arc<dyn ProviderAdapter>>,
    cache: SignalCache,
    prompt_assembler: PromptAssembler,
    semaphore: Arc<Semaphore>,
    grace: Duration,
}

impl ConsensusOrchestrator {
    pub fn new(config: ConsensusConfig, adapters: Vec<Arc<dyn ProviderAdapter>>) -> Self {
        let adapters = adapters
            .into_iter()
            .map(|a| (a.provider_id().to_string(), a))
            .collect();
        let cache = SignalCache::new(Duration::from_secs(config.signal_cache_minutes * 60));
        let prompt_assembler = PromptAssembler::new(config.lookback_candles);
        Self {
            config,
            registry: Arc::new(ProviderRegistry::new()),
            adapters,
            cache,
            prompt_assembler,
            semaphore: Arc::new(Semaphore::new(DEFAULT_MAX_CONCURRENCY)),
            grace: DEFAULT_GRACE,
        }
    }

    /// Build an orchestrator wired to real vendor adapters, one per
    /// configured provider whose credential resolved (spec.md §6
    /// "Environment"). A provider without a credential is pre-registered as
    /// session-disabled rather than attempted and timing out on every call.
    pub fn from_config(config: ConsensusConfig) -> Self {
        let mut adapters: Vec<Arc<dyn ProviderAdapter>> = Vec::new();
        let registry = ProviderRegistry::new();

        for provider in &config.providers {
            if provider.api_key.trim().is_empty() {
                registry.record_outcome(&provider.id, ProviderStatus::AuthErr);
                continue;
            }
            let adapter: Arc<dyn ProviderAdapter> = match provider.kind.as_str() {
                "openai" => Arc::new(
                    crate::core::providers::ChatGptAdapter::new(
                        provider.id.clone(),
                        provider.model.clone(),
                        provider.api_key.clone(),
                    )
                    .with_max_retries(provider.max_retries),
                ),
                "anthropic" => Arc::new(
                    crate::core::providers::ClaudeAdapter::new(
                        provider.id.clone(),
                        provider.model.clone(),
                        provider.api_key.clone(),
                    )
                    .with_max_retries(provider.max_retries),
                ),
                "gemini" => Arc::new(
                    crate::core::providers::GeminiAdapter::new(
                        provider.id.clone(),
                        provider.model.clone(),
                        provider.api_key.clone(),
                    )
                    .with_max_retries(provider.max_retries),
                ),
                other => {
                    warn!("unknown provider kind {} for {}, skipping", other, provider.id);
                    continue;
                }
            };
            adapters.push(adapter);
        }

        let cache = SignalCache::new(Duration::from_secs(config.signal_cache_minutes * 60));
        let prompt_assembler = PromptAssembler::new(config.lookback_candles);
        let adapters = adapters
            .into_iter()
            .map(|a| (a.provider_id().to_string(), a))
            .collect();

        Self {
            config,
            registry: Arc::new(registry),
            adapters,
            cache,
            prompt_assembler,
            semaphore: Arc::new(Semaphore::new(DEFAULT_MAX_CONCURRENCY)),
            grace: DEFAULT_GRACE,
        }
    }

    pub fn with_max_concurrency(mut self, permits: usize) -> Self {
        self.semaphore = Arc::new(Semaphore::new(permits.max(1)));
        self
    }

    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// The public entry point (spec.md §6). Callable concurrently.
    pub async fn generate_signal(&self, req: &SignalRequest) -> ConsensusSignal {
        self.generate_signal_detailed(req).await.signal
    }

    /// Supplemented entry point exposing the full per-provider trace
    /// (spec.md §4, "Audit trail for malformed replies").
    pub async fn generate_signal_detailed(&self, req: &SignalRequest) -> ConsensusReport {
        let correlation_id = Uuid::new_v4();
        let span = tracing::info_span!("generate_signal", %correlation_id, pair = %req.pair);
        let _enter = span.enter();

        let pair = req.normalized_pair();

        // Step 1: cache lookup.
        if let Some(signal) = self.cache.get(&pair, req.timeframe, req.as_of) {
            debug!("cache hit for {} {}", pair, req.timeframe.as_str());
            return ConsensusReport {
                signal,
                raw_replies: Vec::new(),
                scored_replies: Vec::new(),
            };
        }

        if req
            .validate(self.config.lookback_min, self.config.lookback_max)
            .is_err()
        {
            warn!("request validation failed for {}", pair);
            let signal = ConsensusSignal::neutral_no_trade(
                pair,
                req.timeframe,
                req.as_of,
                Utc::now(),
                RejectReason::ValidationFailed,
            );
            return ConsensusReport {
                signal,
                raw_replies: Vec::new(),
                scored_replies: Vec::new(),
            };
        }

        // Step 2: enabled set.
        let enabled: Vec<&ProviderConfig> = self
            .config
            .providers
            .iter()
            .filter(|p| p.enabled && self.registry.is_available(&p.id))
            .collect();

        if enabled.is_empty() {
            let signal = ConsensusSignal::neutral_no_trade(
                pair,
                req.timeframe,
                req.as_of,
                Utc::now(),
                RejectReason::NoEnabledProviders,
            );
            return ConsensusReport {
                signal,
                raw_replies: Vec::new(),
                scored_replies: Vec::new(),
            };
        }
        let enabled_count = enabled.len();

        // Step 3-4: fan-out under a global deadline.
        let raw_replies = self.fan_out(req, &enabled).await;

        // Step 5: parse, filter, and apply session-disabling.
        let mut scored_replies = Vec::with_capacity(raw_replies.len());
        for reply in &raw_replies {
            self.registry.record_outcome(&reply.provider_id, reply.status);
            if reply.status.is_session_fatal() {
                warn!(
                    provider = %reply.provider_id,
                    status = ?reply.status,
                    "provider session-disabled"
                );
            } else if reply.status != ProviderStatus::Ok {
                warn!(provider = %reply.provider_id, status = ?reply.status, "provider call failed");
            }
            scored_replies.push(parser::parse(reply));
        }

        let weight_of: HashMap<&str, f64> = enabled
            .iter()
            .map(|p| (p.id.as_str(), p.weight))
            .collect();

        // Contributors: parse-ok/partial-ok AND meeting the configured
        // confidence floor (spec.md §6 `min_confidence`; see DESIGN.md for
        // how this distinct-from-`min_consensus_score` threshold is applied).
        let contributors: Vec<&ScoredReply> = scored_replies
            .iter()
            .filter(|s| s.is_contributor() && s.confidence >= self.config.min_confidence)
            .collect();

        // Step 6: reweighting.
        let total_weight: f64 = contributors
            .iter()
            .filter_map(|s| weight_of.get(s.provider_id.as_str()))
            .sum();

        if contributors.is_empty() || total_weight <= 0.0 {
            let signal = ConsensusSignal::neutral_no_trade(
                pair,
                req.timeframe,
                req.as_of,
                Utc::now(),
                RejectReason::NoContributors,
            );
            self.cache.put(&signal.pair, req.timeframe, req.as_of, signal.clone());
            return ConsensusReport {
                signal,
                raw_replies,
                scored_replies,
            };
        }

        let effective_weights: HashMap<String, f64> = contributors
            .iter()
            .map(|s| {
                let w = weight_of.get(s.provider_id.as_str()).copied().unwrap_or(0.0);
                (s.provider_id.clone(), w / total_weight)
            })
            .collect();

        // Step 7: direction aggregation with NEUTRAL > LONG > SHORT tie-break.
        let mut scores: HashMap<Direction, f64> = HashMap::new();
        for s in &contributors {
            let w = effective_weights.get(&s.provider_id).copied().unwrap_or(0.0);
            *scores.entry(s.direction).or_insert(0.0) += w * s.confidence;
        }
        let neutral_score = scores.get(&Direction::Neutral).copied().unwrap_or(0.0);
        let long_score = scores.get(&Direction::Long).copied().unwrap_or(0.0);
        let short_score = scores.get(&Direction::Short).copied().unwrap_or(0.0);

        let (direction, confidence) = if neutral_score >= long_score && neutral_score >= short_score
        {
            (Direction::Neutral, neutral_score)
        } else if long_score >= short_score {
            (Direction::Long, long_score)
        } else {
            (Direction::Short, short_score)
        };

        // Step 8: trade gate.
        let required_participants = if req.require_all_providers {
            enabled_count
        } else {
            self.config.min_participants
        };
        let should_trade = direction != Direction::Neutral
            && confidence >= self.config.min_consensus_score
            && contributors.len() >= required_participants;

        // Step 9: reasoning assembly in the fixed vendor order.
        let combined_reasoning = assemble_reasoning(&contributors);

        let active_providers: Vec<String> =
            contributors.iter().map(|s| s.provider_id.clone()).collect();

        let signal = ConsensusSignal {
            pair,
            timeframe: req.timeframe,
            as_of: req.as_of,
            direction,
            confidence,
            combined_reasoning,
            active_providers,
            effective_weights,
            should_trade,
            generated_at: Utc::now(),
            reject_reason: None,
        };

        // Step 10: cache store.
        self.cache.put(&signal.pair, req.timeframe, req.as_of, signal.clone());

        info!(
            direction = ?signal.direction,
            confidence = signal.confidence,
            should_trade = signal.should_trade,
            "consensus signal generated"
        );

        ConsensusReport {
            signal,
            raw_replies,
            scored_replies,
        }
    }

    /// Run one task per enabled provider under a shared global deadline.
    /// Each task is individually raced against the deadline (spec.md §4.4
    /// step 4, §5 "Cancellation & timeouts") so a straggler is reported as a
    /// lone `TimeoutErr` without discarding replies that already finished —
    /// a single `timeout(join_all(..))` around the whole batch would instead
    /// drop every result, including completed ones, the moment one task ran
    /// late.
    async fn fan_out(&self, req: &SignalRequest, enabled: &[&ProviderConfig]) -> Vec<ProviderReply> {
        let global_deadline = enabled
            .iter()
            .map(|p| Duration::from_millis(p.timeout_ms))
            .max()
            .unwrap_or(Duration::ZERO)
            + self.grace;
        let deadline_instant = tokio::time::Instant::now() + global_deadline;

        let calls = enabled.iter().map(|p| {
            let id = p.id.clone();
            let call = self.call_one(req, p);
            async move {
                match tokio::time::timeout_at(deadline_instant, call).await {
                    Ok(reply) => reply,
                    Err(_) => {
                        warn!(provider = %id, "provider missed the global orchestration deadline");
                        ProviderReply::synthetic_timeout(id, global_deadline)
                    }
                }
            }
        });
        futures::future::join_all(calls).await
    }

    async fn call_one(&self, req: &SignalRequest, provider: &ProviderConfig) -> ProviderReply {
        let deadline = Duration::from_millis(provider.timeout_ms);
        let Some(adapter) = self.adapters.get(&provider.id) else {
            return ProviderReply::synthetic_timeout(provider.id.clone(), deadline);
        };
        let prompt = self
            .prompt_assembler
            .render(req, template_for(&provider.kind));

        let _permit = self.semaphore.acquire().await;
        adapter.call(&prompt, deadline).await
    }

    /// Read-only introspection (spec.md §6); never mutates state.
    pub fn get_provider_status(&self) -> HashMap<String, ProviderStatusSnapshot> {
        self.config
            .providers
            .iter()
            .map(|p| {
                let availability = self.registry.availability_of(&p.id);
                let effective_weight_if_alone = if availability.is_available() { 1.0 } else { 0.0 };
                (
                    p.id.clone(),
                    ProviderStatusSnapshot {
                        configured_weight: p.weight,
                        effective_weight_if_alone,
                        availability,
                        last_error_kind: self.registry.last_error(&p.id),
                    },
                )
            })
            .collect()
    }
}

fn template_for(kind: &str) -> TemplateKey {
    match kind {
        "anthropic" => TemplateKey::RiskAssessment,
        "gemini" => TemplateKey::Sentiment,
        _ => TemplateKey::TechnicalAnalysis,
    }
}

fn assemble_reasoning(contributors: &[&ScoredReply]) -> String {
    let mut by_id: HashMap<&str, &ScoredReply> =
        contributors.iter().map(|s| (s.provider_id.as_str(), *s)).collect();

    let mut parts = Vec::with_capacity(contributors.len());
    for &provider_id in REASONING_ORDER {
        if let Some(s) = by_id.remove(provider_id) {
            parts.push(format!("{}: {}", provider_id, s.rationale));
        }
    }
    // Any contributor outside the fixed vendor order (custom ids) is still
    // included, appended in encounter order.
    for s in contributors {
        if by_id.remove(s.provider_id.as_str()).is_some() {
            parts.push(format!("{}: {}", s.provider_id, s.rationale));
        }
    }
    parts.join(" | ")
}
