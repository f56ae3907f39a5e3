//! C2 — Prompt Assembler.
//!
//! Renders a [`SignalRequest`] into the exact text an adapter sends.
//! Rendering is a pure function of its inputs: identical requests produce
//! identical prompts, which both the cache key (§4.4 step 1) and the test
//! suite depend on.

use crate::core::types::{Candle, SignalRequest};

/// Fixed template keys, one per provider role. The distilled spec allows
/// prompt-template tuning as a non-goal; the response schema instruction
/// below is not tunable — the parser in [`crate::core::parser`] depends on
/// it verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKey {
    TechnicalAnalysis,
    RiskAssessment,
    Sentiment,
}

impl TemplateKey {
    fn role_framing(self) -> &'static str {
        match self {
            TemplateKey::TechnicalAnalysis => {
                "You are a technical analyst. Base your call on price action, volume, and the \
                 supplied indicators."
            }
            TemplateKey::RiskAssessment => {
                "You are a risk manager. Weigh downside scenarios and volatility as heavily as \
                 the upside case before taking a position."
            }
            TemplateKey::Sentiment => {
                "You are a market-sentiment analyst. Infer positioning and momentum from the \
                 recent candle sequence."
            }
        }
    }
}

const RESPONSE_SCHEMA_INSTRUCTION: &str = r#"Respond with exactly three lines:
DIRECTION: <LONG|SHORT|NEUTRAL>
CONFIDENCE: <integer 0-100>
RATIONALE: <one or two sentences>"#;

pub struct PromptAssembler {
    lookback_candles: usize,
}

impl PromptAssembler {
    pub fn new(lookback_candles: usize) -> Self {
        Self {
            lookback_candles: lookback_candles.max(1),
        }
    }

    /// Render the prompt for one provider role. Deterministic: the same
    /// `(request, template)` pair always yields the same string.
    pub fn render(&self, req: &SignalRequest, template: TemplateKey) -> String {
        let bars = select_window(&req.bars, self.lookback_candles);
        let bars_section = render_bars(bars);
        let indicators_section = render_indicators(req);

        format!(
            "{framing}\n\n\
             Pair: {pair}\n\
             Timeframe: {timeframe}\n\
             As-of: {as_of}\n\n\
             Recent candles (oldest to newest):\n{bars_section}\n\n\
             Indicators:\n{indicators_section}\n\n\
             {schema}",
            framing = template.role_framing(),
            pair = req.normalized_pair(),
            timeframe = req.timeframe.as_str(),
            as_of = req.as_of.to_rfc3339(),
            bars_section = bars_section,
            indicators_section = indicators_section,
            schema = RESPONSE_SCHEMA_INSTRUCTION,
        )
    }
}

fn select_window(bars: &[Candle], lookback_candles: usize) -> &[Candle] {
    let start = bars.len().saturating_sub(lookback_candles);
    &bars[start..]
}

fn render_bars(bars: &[Candle]) -> String {
    bars.iter()
        .map(|c| {
            format!(
                "{} O:{} H:{} L:{} C:{} V:{}",
                c.timestamp.to_rfc3339(),
                format_price(c.open),
                format_price(c.high),
                format_price(c.low),
                format_price(c.close),
                format_price(c.volume),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_indicators(req: &SignalRequest) -> String {
    if req.indicators.is_empty() {
        return "(none provided)".to_string();
    }
    let mut entries: Vec<_> = req.indicators.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
        .into_iter()
        .map(|(name, value)| format!("{}: {}", name, format_percent(*value)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render a price with 6 significant digits, the precision spec.md §4.2
/// fixes for numeric values.
fn format_price(value: f64) -> String {
    format_sig_figs(value, 6)
}

/// Render an indicator value with 2 fractional digits, the precision
/// spec.md §4.2 fixes for indicator percents.
fn format_percent(value: f64) -> String {
    format!("{:.2}", value)
}

fn format_sig_figs(value: f64, sig_figs: i32) -> String {
    if value == 0.0 || !value.is_finite() {
        return format!("{:.*}", (sig_figs - 1).max(0) as usize, 0.0);
    }
    let magnitude = value.abs().log10().floor() as i32;
    let decimals = (sig_figs - 1 - magnitude).max(0) as usize;
    format!("{:.*}", decimals, value)
}
