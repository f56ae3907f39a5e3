//! Request and configuration builders shared by the integration tests.

use ai_signal_consensus::{Candle, ConsensusConfig, ProviderConfig, SignalRequest, Timeframe};
use chrono::{TimeZone, Utc};
use std::collections::HashMap;

/// `n_bars` contiguous hourly candles ending at the returned request's
/// `as_of`.
pub fn sample_request(n_bars: usize) -> SignalRequest {
    let start = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    let bars: Vec<Candle> = (0..n_bars)
        .map(|i| Candle {
            timestamp: start + chrono::Duration::hours(i as i64),
            open: 65_000.0 + i as f64,
            high: 65_100.0 + i as f64,
            low: 64_900.0 + i as f64,
            close: 65_050.0 + i as f64,
            volume: 12.5,
        })
        .collect();
    SignalRequest {
        pair: "btc/usdt".to_string(),
        timeframe: Timeframe::OneHour,
        as_of: bars.last().unwrap().timestamp,
        bars,
        indicators: HashMap::new(),
        require_all_providers: false,
    }
}

/// One provider config entry with sane defaults for tests.
pub fn provider_config(id: &str, kind: &str, weight: f64) -> ProviderConfig {
    ProviderConfig {
        id: id.to_string(),
        kind: kind.to_string(),
        model: "test-model".to_string(),
        enabled: true,
        weight,
        timeout_ms: 5_000,
        max_retries: 0,
        api_key: "test-key".to_string(),
        tags: HashMap::new(),
    }
}

/// The three-provider weighting from spec.md's end-to-end scenarios
/// (chatgpt 0.40 / claude 0.35 / gemini 0.25).
pub fn three_provider_config() -> ConsensusConfig {
    ConsensusConfig {
        providers: vec![
            provider_config("chatgpt", "openai", 0.40),
            provider_config("claude", "anthropic", 0.35),
            provider_config("gemini", "gemini", 0.25),
        ],
        min_consensus_score: 0.60,
        min_confidence: 0.0,
        require_all_providers: false,
        signal_cache_minutes: 60,
        lookback_candles: 50,
        lookback_min: 50,
        lookback_max: 500,
        min_participants: 1,
    }
}
