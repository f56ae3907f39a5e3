//! Scheduling-model properties (spec.md §5): fan-out runs truly in
//! parallel, a slow provider doesn't stall the others, and the global
//! deadline is a hard backstop.

use crate::common::{ok_reply, provider_config, sample_request, SlowAdapter};
use ai_signal_consensus::{ConsensusConfig, ConsensusOrchestrator, Direction};
use std::time::{Duration, Instant};

fn config_with(timeout_ms: u64) -> ConsensusConfig {
    ConsensusConfig {
        providers: vec![
            {
                let mut p = provider_config("chatgpt", "openai", 0.5);
                p.timeout_ms = timeout_ms;
                p
            },
            {
                let mut p = provider_config("claude", "anthropic", 0.5);
                p.timeout_ms = timeout_ms;
                p
            },
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

#[tokio::test]
async fn latency_tracks_the_slowest_provider_not_the_sum() {
    let adapters = vec![
        SlowAdapter::new(
            "chatgpt",
            Duration::from_millis(50),
            ok_reply("chatgpt", "LONG", 90, "fast"),
        ),
        SlowAdapter::new(
            "claude",
            Duration::from_millis(150),
            ok_reply("claude", "LONG", 90, "slower"),
        ),
    ];
    let orchestrator = ConsensusOrchestrator::new(config_with(5_000), adapters);

    let started = Instant::now();
    let signal = orchestrator.generate_signal(&sample_request(50)).await;
    let elapsed = started.elapsed();

    assert_eq!(signal.direction, Direction::Long);
    assert_eq!(signal.active_providers.len(), 2);
    // Sum of both providers' delays would be 200ms; parallel execution
    // should land close to the slowest single provider (150ms).
    assert!(elapsed < Duration::from_millis(195), "elapsed was {:?}", elapsed);
}

#[tokio::test]
async fn provider_exceeding_global_deadline_is_dropped_as_timeout() {
    // Per-provider timeout is 30ms + 2s grace; claude sleeps 3s, well past
    // the global deadline, so it must be reported as a timeout rather than
    // block the whole call for 3s.
    let adapters = vec![
        SlowAdapter::new(
            "chatgpt",
            Duration::from_millis(10),
            ok_reply("chatgpt", "LONG", 90, "on time"),
        ),
        SlowAdapter::new(
            "claude",
            Duration::from_secs(3),
            ok_reply("claude", "LONG", 90, "too slow"),
        ),
    ];
    let orchestrator = ConsensusOrchestrator::new(config_with(30), adapters)
        .with_grace(Duration::from_millis(50));

    let started = Instant::now();
    let signal = orchestrator.generate_signal(&sample_request(50)).await;
    let elapsed = started.elapsed();

    assert!(elapsed < Duration::from_secs(1), "elapsed was {:?}", elapsed);
    assert!(!signal.active_providers.contains(&"claude".to_string()));
}
