use serde::{Deserialize, Serialize};

/// Execution strategy a plan is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Strategy {
    /// Direct perpetual short on a supported blue-chip
    GmxShort,
    /// Short a liquid proxy when the token itself cannot be shorted
    CorrelatedShort,
    /// Buy the dip after a completed rug for a dead-cat bounce
    DipBuy,
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenType {
    BlueChip,
    Memecoin,
    Defi,
    Unknown,
}

/// Recent price trajectory of a non blue-chip token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketPhase {
    PreRug,
    PostRug,
    Bounce,
    Unclear,
}

/// Spot quote used to detect the market phase
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceData {
    pub current: f64,
    pub change_24h: f64, // % change
    pub volume_spike: bool,
    pub liquidity: f64,
}

/// Routing decision for one analyzed plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub strategy: Strategy,
    pub token_type: TokenType,
    pub market_phase: Option<MarketPhase>,
    pub correlated_asset: Option<String>,
    pub current_price: Option<f64>,
    pub price_drop_24h: Option<f64>,
    pub bounce_target: Option<f64>,
    pub confidence_multiplier: f64,
    pub reason: String,
}

impl Classification {
    /// A classification with no phase or price details
    pub fn new(
        strategy: Strategy,
        token_type: TokenType,
        confidence_multiplier: f64,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            strategy,
            token_type,
            market_phase: None,
            correlated_asset: None,
            current_price: None,
            price_drop_24h: None,
            bounce_target: None,
            confidence_multiplier,
            reason: reason.into(),
        }
    }

    pub fn skip(token_type: TokenType, reason: impl Into<String>) -> Self {
        Self::new(Strategy::Skip, token_type, 1.0, reason)
    }

    pub fn is_actionable(&self) -> bool {
        self.strategy != Strategy::Skip
    }
}
