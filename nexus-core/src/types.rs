pub mod classification;
pub mod plan;
pub mod token_signal;

// Re-export common types
pub use classification::{Classification, MarketPhase, PriceData, Strategy, TokenType};
pub use plan::{AnalysisSource, AnalyzedPlan, Decision, TakeProfitLevel};
pub use token_signal::{FlaggedItem, RawSignal, TokenCategory, VoteType, MAX_URGENCY};

/// Timestamp in milliseconds since Unix epoch
pub type TimestampMS = u64;

/// Current wall-clock time in milliseconds since Unix epoch
pub fn now_ms() -> TimestampMS {
    chrono::Utc::now().timestamp_millis() as TimestampMS
}
