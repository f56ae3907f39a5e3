//! The core's data model: requests, per-provider replies, scored replies,
//! and the final consensus signal. Every inter-component value here is a
//! typed record — no free-form maps cross a component boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// A single OHLCV candle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Closed set of timeframes this core reasons about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "4h")]
    FourHour,
    #[serde(rename = "1d")]
    OneDay,
}

impl Timeframe {
    /// Bucket duration used for cache keying (spec.md §4.4 step 1).
    pub fn duration(self) -> Duration {
        match self {
            Timeframe::OneHour => Duration::from_secs(3600),
            Timeframe::FourHour => Duration::from_secs(4 * 3600),
            Timeframe::OneDay => Duration::from_secs(24 * 3600),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Timeframe::OneHour => "1h",
            Timeframe::FourHour => "4h",
            Timeframe::OneDay => "1d",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "1h" => Some(Timeframe::OneHour),
            "4h" => Some(Timeframe::FourHour),
            "1d" => Some(Timeframe::OneDay),
            _ => None,
        }
    }
}

/// The core's input. Caller-owned and read-only inside the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalRequest {
    pub pair: String,
    pub timeframe: Timeframe,
    pub as_of: DateTime<Utc>,
    pub bars: Vec<Candle>,
    #[serde(default)]
    pub indicators: HashMap<String, f64>,
    /// Forces `should_trade` to require every provider enabled at request
    /// start to have contributed (spec.md §4.4 step 8).
    #[serde(default)]
    pub require_all_providers: bool,
}

impl SignalRequest {
    /// Case-normalize the pair the way the orchestrator and cache expect.
    pub fn normalized_pair(&self) -> String {
        self.pair.to_uppercase()
    }

    /// Validate against spec.md §3: bar count bounds and strictly increasing,
    /// contiguous timestamps spaced by exactly one timeframe duration.
    /// Run by the orchestrator before fan-out; a violation never panics or
    /// propagates as an `Err` — it becomes `RejectReason::ValidationFailed`.
    pub fn validate(&self, lookback_min: usize, lookback_max: usize) -> Result<(), ()> {
        if self.pair.trim().is_empty() {
            return Err(());
        }
        if self.bars.len() < lookback_min || self.bars.len() > lookback_max {
            return Err(());
        }
        let expected_gap = self.timeframe.duration();
        for pair in self.bars.windows(2) {
            let gap = pair[1].timestamp - pair[0].timestamp;
            let gap = gap.to_std().map_err(|_| ())?;
            if gap != expected_gap {
                return Err(());
            }
        }
        Ok(())
    }
}

/// Trading direction. A pure enum, never a free-form string, once past C3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Long,
    Short,
    Neutral,
}

impl Direction {
    pub fn as_token(self) -> &'static str {
        match self {
            Direction::Long => "LONG",
            Direction::Short => "SHORT",
            Direction::Neutral => "NEUTRAL",
        }
    }
}

/// The closed error/status taxonomy a provider adapter can report.
/// `raw_text` is only meaningful when `status == Ok`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderStatus {
    Ok,
    TimeoutErr,
    AuthErr,
    RateLimitErr,
    QuotaErr,
    ServerErr,
    ParseUnavailable,
    TransportErr,
}

impl ProviderStatus {
    /// Faults that permanently disable a provider for the rest of the
    /// process (spec.md §4.4 step 5, the `DISABLED_SESSION` transition).
    pub fn is_session_fatal(self) -> bool {
        matches!(self, ProviderStatus::AuthErr | ProviderStatus::QuotaErr)
    }
}

/// One provider call's raw output (C1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderReply {
    pub provider_id: String,
    pub status: ProviderStatus,
    /// Only non-empty and meaningful when `status == ProviderStatus::Ok`.
    pub raw_text: String,
    pub latency: Duration,
    pub usage: Option<TokenUsage>,
}

impl ProviderReply {
    pub fn synthetic_timeout(provider_id: impl Into<String>, latency: Duration) -> Self {
        Self {
            provider_id: provider_id.into(),
            status: ProviderStatus::TimeoutErr,
            raw_text: String::new(),
            latency,
            usage: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// How C3 classifies a parsed reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseStatus {
    Ok,
    PartialOk,
    Malformed,
}

/// C3's output: a typed, scored reply. Malformed entries are excluded from
/// aggregation but retained in the audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredReply {
    pub provider_id: String,
    pub direction: Direction,
    /// Normalized to `[0, 1]`.
    pub confidence: f64,
    pub rationale: String,
    pub key_factors: Vec<String>,
    pub parse_status: ParseStatus,
}

impl ScoredReply {
    /// A [`ScoredReply`] contributes to aggregation iff its parse status is
    /// `Ok` or `PartialOk` (spec.md glossary, "Contributor").
    pub fn is_contributor(&self) -> bool {
        matches!(self.parse_status, ParseStatus::Ok | ParseStatus::PartialOk)
    }
}

/// Why a signal was not produced from a fresh fan-out (for introspection and
/// for `ConsensusSignal::reject_reason`). Never an `Err` — see
/// [`crate::utils::error::CoreError`] docs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    ValidationFailed,
    NoEnabledProviders,
    NoContributors,
    BelowConsensusThreshold,
}

/// The core's output. Immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsensusSignal {
    pub pair: String,
    pub timeframe: Timeframe,
    pub as_of: DateTime<Utc>,
    pub direction: Direction,
    /// `[0, 1]`, at least 4 fractional digits of precision when serialized.
    pub confidence: f64,
    pub combined_reasoning: String,
    pub active_providers: Vec<String>,
    pub effective_weights: HashMap<String, f64>,
    pub should_trade: bool,
    pub generated_at: DateTime<Utc>,
    /// Populated when the signal is the materialized form of a fault
    /// (spec.md §7) rather than a genuine consensus outcome.
    pub reject_reason: Option<RejectReason>,
}

impl ConsensusSignal {
    /// The canonical "nothing to report" signal: no contributors, no trade.
    pub fn neutral_no_trade(
        pair: String,
        timeframe: Timeframe,
        as_of: DateTime<Utc>,
        now: DateTime<Utc>,
        reason: RejectReason,
    ) -> Self {
        Self {
            pair,
            timeframe,
            as_of,
            direction: Direction::Neutral,
            confidence: 0.0,
            combined_reasoning: format!("no tradable consensus: {:?}", reason),
            active_providers: Vec::new(),
            effective_weights: HashMap::new(),
            should_trade: false,
            generated_at: now,
            reject_reason: Some(reason),
        }
    }
}
