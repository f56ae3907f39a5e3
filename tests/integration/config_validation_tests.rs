//! Configuration validation integration tests (spec.md §6 "Configuration",
//! §8 Scenario F).

use ai_signal_consensus::config::Validate;
use ai_signal_consensus::ConsensusConfig;

fn parse(yaml: &str) -> ConsensusConfig {
    serde_yaml::from_str(yaml).expect("fixture yaml must deserialize")
}

#[test]
fn weights_summing_to_one_within_epsilon_pass() {
    let config = parse(
        r#"
providers:
  - id: chatgpt
    kind: openai
    model: gpt-4o
    weight: 0.4
  - id: claude
    kind: anthropic
    model: claude-3-5-sonnet
    weight: 0.35
  - id: gemini
    kind: gemini
    model: gemini-1.5-pro
    weight: 0.25
"#,
    );
    assert!(config.validate().is_ok());
}

#[test]
fn scenario_f_weight_validation_failure_message() {
    let config = parse(
        r#"
providers:
  - id: chatgpt
    kind: openai
    model: gpt-4o
    weight: 0.40
  - id: claude
    kind: anthropic
    model: claude-3-5-sonnet
    weight: 0.35
  - id: gemini
    kind: gemini
    model: gemini-1.5-pro
    weight: 0.30
"#,
    );
    let err = config.validate().unwrap_err();
    assert!(err.contains("must sum to 1.0"));
    assert!(err.contains("1.05"));
}

#[test]
fn disabled_provider_weight_excluded_from_sum() {
    // A disabled provider's weight does not count toward the sum-to-one
    // constraint (spec.md §6: "over enabled providers at load").
    let config = parse(
        r#"
providers:
  - id: chatgpt
    kind: openai
    model: gpt-4o
    weight: 1.0
  - id: claude
    kind: anthropic
    model: claude-3-5-sonnet
    weight: 0.5
    enabled: false
"#,
    );
    assert!(config.validate().is_ok());
}

#[test]
fn unknown_timeframe_string_does_not_parse() {
    assert!(ai_signal_consensus::Timeframe::parse("15m").is_none());
    assert!(ai_signal_consensus::Timeframe::parse("1h").is_some());
}
