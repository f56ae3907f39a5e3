//! C3 — Response Parser & Scorer.
//!
//! Turns one provider's free-form [`ProviderReply::raw_text`] into a typed
//! [`ScoredReply`]. A reply that cannot be reduced to a direction and a
//! confidence is `Malformed` and is excluded from aggregation, but is never
//! discarded — callers can still see it via the audit trail.

use crate::core::types::{Direction, ParseStatus, ProviderReply, ScoredReply};
use once_cell::sync::Lazy;
use regex::Regex;

const MAX_RATIONALE_CHARS: usize = 500;

static DIRECTION_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^\s*DIRECTION\s*:\s*([A-Za-z]+)").unwrap());
static CONFIDENCE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^\s*CONFIDENCE\s*:\s*([0-9]+(?:\.[0-9]+)?)\s*%?").unwrap());
static RATIONALE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?ims)^\s*RATIONALE\s*:\s*(.+)").unwrap());

static LONG_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(LONG|BUY|BULLISH)\b").unwrap());
static SHORT_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(SHORT|SELL|BEARISH)\b").unwrap());
static NEUTRAL_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(NEUTRAL|HOLD|WAIT)\b").unwrap());
static LOOSE_CONFIDENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]{1,3}(?:\.[0-9]+)?)\s*%").unwrap());

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "with", "that", "this", "from", "into", "over", "near", "given",
    "while", "likely", "still", "remains", "could", "would", "should", "there", "have", "been",
];

/// Parse one provider's raw text into a [`ScoredReply`].
pub fn parse(reply: &ProviderReply) -> ScoredReply {
    let text = reply.raw_text.as_str();

    let structured_direction = DIRECTION_LINE
        .captures(text)
        .and_then(|c| token_to_direction(c.get(1).unwrap().as_str()));
    let structured_confidence = CONFIDENCE_LINE
        .captures(text)
        .and_then(|c| c.get(1).unwrap().as_str().parse::<f64>().ok());
    let structured_rationale = RATIONALE_LINE
        .captures(text)
        .map(|c| c.get(1).unwrap().as_str().trim().to_string());

    let (direction, direction_was_structured) = match structured_direction {
        Some(d) => (Some(d), true),
        None => (fallback_direction(text), false),
    };

    let (confidence_raw, confidence_was_structured) = match structured_confidence {
        Some(c) => (Some(c), true),
        None => (fallback_confidence(text), false),
    };

    let (direction, confidence_raw) = match (direction, confidence_raw) {
        (Some(d), Some(c)) => (d, c),
        _ => {
            return ScoredReply {
                provider_id: reply.provider_id.clone(),
                direction: Direction::Neutral,
                confidence: 0.0,
                rationale: String::new(),
                key_factors: Vec::new(),
                parse_status: ParseStatus::Malformed,
            };
        }
    };

    let confidence = normalize_confidence(confidence_raw);
    let rationale_raw = structured_rationale.as_deref().unwrap_or(text).trim();
    let rationale_truncated = rationale_raw.chars().count() > MAX_RATIONALE_CHARS;
    let rationale = truncate_rationale(rationale_raw);
    let key_factors = extract_key_factors(&rationale);

    // Out-of-range confidence (spec.md §4.3: "clamp to the range with
    // parse_status = PartialOK") and rationale truncation both downgrade an
    // otherwise fully-structured reply from Ok to PartialOk.
    let confidence_out_of_range = !(0.0..=100.0).contains(&confidence_raw);
    let parse_status = if direction_was_structured
        && confidence_was_structured
        && !confidence_out_of_range
        && !rationale_truncated
    {
        ParseStatus::Ok
    } else {
        ParseStatus::PartialOk
    };

    ScoredReply {
        provider_id: reply.provider_id.clone(),
        direction,
        confidence,
        rationale,
        key_factors,
        parse_status,
    }
}

fn token_to_direction(token: &str) -> Option<Direction> {
    match token.to_uppercase().as_str() {
        "LONG" | "BUY" | "BULLISH" => Some(Direction::Long),
        "SHORT" | "SELL" | "BEARISH" => Some(Direction::Short),
        "NEUTRAL" | "HOLD" | "WAIT" => Some(Direction::Neutral),
        _ => None,
    }
}

fn fallback_direction(text: &str) -> Option<Direction> {
    if LONG_TOKEN.is_match(text) {
        Some(Direction::Long)
    } else if SHORT_TOKEN.is_match(text) {
        Some(Direction::Short)
    } else if NEUTRAL_TOKEN.is_match(text) {
        Some(Direction::Neutral)
    } else {
        None
    }
}

fn fallback_confidence(text: &str) -> Option<f64> {
    LOOSE_CONFIDENCE
        .captures(text)
        .and_then(|c| c.get(1).unwrap().as_str().parse::<f64>().ok())
}

/// Clamp to `[0, 100]` then scale to `[0, 1]`, the normalized form every
/// downstream component expects (spec.md §4.3).
fn normalize_confidence(raw: f64) -> f64 {
    let clamped = raw.clamp(0.0, 100.0);
    if clamped <= 1.0 && raw <= 1.0 && raw > 0.0 {
        // Already expressed on a 0-1 scale; treat as such rather than
        // collapsing a provider's "0.8" into 0.008.
        return clamped;
    }
    clamped / 100.0
}

fn truncate_rationale(text: &str) -> String {
    if text.chars().count() <= MAX_RATIONALE_CHARS {
        return text.to_string();
    }
    let truncated: String = text.chars().take(MAX_RATIONALE_CHARS).collect();
    format!("{}...", truncated.trim_end())
}

/// Pull a short list of salient terms out of the rationale. There is no
/// vendor-provided structured field for this, so it is derived heuristically:
/// longest distinct non-stopword tokens, in order of first appearance.
fn extract_key_factors(rationale: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut factors = Vec::new();
    for word in rationale.split_whitespace() {
        let cleaned: String = word
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>();
        if cleaned.len() < 4 {
            continue;
        }
        let lower = cleaned.to_lowercase();
        if STOPWORDS.contains(&lower.as_str()) {
            continue;
        }
        if seen.insert(lower) {
            factors.push(cleaned);
        }
        if factors.len() == 3 {
            break;
        }
    }
    factors
}
