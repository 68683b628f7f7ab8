use async_trait::async_trait;
use nexus_core::PriceData;
use std::collections::HashMap;

/// Source of spot price and volatility data for a token
#[async_trait]
pub trait PriceOracle: Send + Sync {
    /// Returns `None` when no quote is available for the token
    async fn get_price_data(&self, address: &str, chain: &str) -> Option<PriceData>;
}

/// Oracle answering from fixed quotes
///
/// Per-address quotes take precedence over the fallback quote. Addresses
/// are matched case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct StaticPriceOracle {
    quotes: HashMap<String, PriceData>,
    fallback: Option<PriceData>,
}

impl StaticPriceOracle {
    /// Oracle returning `fallback` for every token without a specific quote
    pub fn new(fallback: Option<PriceData>) -> Self {
        Self {
            quotes: HashMap::new(),
            fallback,
        }
    }

    /// Oracle that never has data
    pub fn unavailable() -> Self {
        Self::new(None)
    }

    /// Oracle quoting every token as freshly rugged (-85% in 24h)
    pub fn post_rug() -> Self {
        Self::new(Some(PriceData {
            current: 0.000_001_2,
            change_24h: -85.0,
            volume_spike: false,
            liquidity: 50_000.0,
        }))
    }

    /// Add a quote for a specific token address
    pub fn with_quote(mut self, address: &str, quote: PriceData) -> Self {
        self.quotes.insert(address.to_lowercase(), quote);
        self
    }
}

#[async_trait]
impl PriceOracle for StaticPriceOracle {
    async fn get_price_data(&self, address: &str, _chain: &str) -> Option<PriceData> {
        self.quotes
            .get(&address.to_lowercase())
            .copied()
            .or(self.fallback)
    }
}
