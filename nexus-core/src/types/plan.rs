use crate::types::TimestampMS;
use serde::{Deserialize, Serialize};

/// Tier-2 verdict for a flagged token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    Short,
    Monitor,
    Pass,
}

/// One rung of the take-profit ladder
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TakeProfitLevel {
    /// Price move (%) at which this rung triggers, negative for shorts
    pub target_percent: f64,
    /// Share of the position (%) closed at this rung
    pub close_percent: f64,
}

/// Where an analyzed plan came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisSource {
    Remote { model: String },
    LocalFallback,
}

/// Trade recommendation produced exactly once per flagged item by Tier 2
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedPlan {
    pub symbol: String,
    pub address: String,
    pub chain: String,

    pub decision: Decision,
    pub confidence: u8, // 0-100

    pub sizing_percent: f64,
    pub leverage: u32,
    pub take_profit_levels: [TakeProfitLevel; 3],
    pub stop_loss_percent: f64,
    pub execution_chain: String,

    pub reasoning: String,
    pub risk_factors: Vec<String>,

    pub urgency_score: u8,
    pub analyzed_at: TimestampMS,
    pub source: AnalysisSource,
}

impl AnalyzedPlan {
    pub fn is_short(&self) -> bool {
        self.decision == Decision::Short
    }

    pub fn from_local_fallback(&self) -> bool {
        self.source == AnalysisSource::LocalFallback
    }
}
