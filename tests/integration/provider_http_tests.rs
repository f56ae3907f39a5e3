//! HTTP-layer integration tests: real vendor adapters (pointed at a
//! `wiremock` double instead of the live vendor) wired into a full
//! `ConsensusOrchestrator::generate_signal` call.

use crate::common::{provider_config, sample_request, three_provider_config};
use ai_signal_consensus::{ChatGptAdapter, ConsensusOrchestrator, Direction, ProviderAdapter};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn orchestrator_consumes_a_real_adapter_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "DIRECTION: LONG\nCONFIDENCE: 75\nRATIONALE: breakout confirmed on volume"}}]
        })))
        .mount(&server)
        .await;

    let adapter: Arc<dyn ProviderAdapter> =
        Arc::new(ChatGptAdapter::new("chatgpt", "gpt-4o", "sk-test").with_base_url(server.uri()));

    let mut config = three_provider_config();
    config.providers = vec![provider_config("chatgpt", "openai", 1.0)];

    let orchestrator = ConsensusOrchestrator::new(config, vec![adapter]);
    let signal = orchestrator.generate_signal(&sample_request(50)).await;

    assert_eq!(signal.direction, Direction::Long);
    assert!((signal.confidence - 0.75).abs() < 1e-9);
    assert!(signal.should_trade);
    assert_eq!(signal.active_providers, vec!["chatgpt".to_string()]);
}

#[tokio::test]
async fn auth_error_from_the_wire_session_disables_the_provider() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let adapter: Arc<dyn ProviderAdapter> =
        Arc::new(ChatGptAdapter::new("chatgpt", "gpt-4o", "sk-bad").with_base_url(server.uri()));

    let mut config = three_provider_config();
    config.providers = vec![provider_config("chatgpt", "openai", 1.0)];

    let orchestrator = ConsensusOrchestrator::new(config, vec![adapter]);
    let signal = orchestrator.generate_signal(&sample_request(50)).await;

    assert_eq!(signal.direction, Direction::Neutral);
    assert!(!signal.should_trade);

    let status = orchestrator.get_provider_status();
    assert!(!status["chatgpt"].availability.is_available());

    // The cached result (and, were the bucket different, the session-disable
    // flag) means a follow-up request never re-attempts the wire.
    let second = orchestrator.generate_signal(&sample_request(50)).await;
    assert_eq!(second.direction, Direction::Neutral);
}
