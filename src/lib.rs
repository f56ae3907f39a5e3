//! # ai-signal-consensus
//!
//! Multi-provider AI signal consensus core for an algorithmic crypto-trading
//! system. Fans a market-data request out to several independent LLM
//! providers, scores their responses, and combines them under a
//! weighted-voting rule that dynamically compensates for provider failures.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use ai_signal_consensus::{ConsensusConfig, ConsensusOrchestrator};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConsensusConfig::load("config/consensus.yaml")?;
//!     let orchestrator = ConsensusOrchestrator::from_config(config);
//!
//!     // let signal = orchestrator.generate_signal(&request).await;
//!     let _ = orchestrator.get_provider_status();
//!     Ok(())
//! }
//! ```
//!
//! Only the consensus core is implemented here: market-data ingestion,
//! backtesting, position sizing, risk gating, dashboards, and CLI are
//! external collaborators that call into this crate or consume its output.

pub mod config;
pub mod core;
pub mod utils;

pub use config::{ConsensusConfig, ProviderConfig};
pub use core::cache::SignalCache;
pub use core::orchestrator::{ConsensusOrchestrator, ConsensusReport, ProviderStatusSnapshot};
pub use core::parser;
pub use core::prompt::{PromptAssembler, TemplateKey};
pub use core::providers::{
    ChatGptAdapter, ClaudeAdapter, GeminiAdapter, ProviderAdapter, ProviderAvailability,
    ProviderRegistry,
};
pub use core::types::{
    Candle, ConsensusSignal, Direction, ParseStatus, ProviderReply, ProviderStatus, RejectReason,
    ScoredReply, SignalRequest, Timeframe, TokenUsage,
};
pub use utils::error::{CoreError, Result};
