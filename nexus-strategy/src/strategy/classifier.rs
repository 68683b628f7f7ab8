//! Execution-strategy classification
//!
//! Maps an analyzed plan plus optional spot quote to a strategy:
//!
//! - blue chips are shorted directly on GMX
//! - memecoins and DeFi tokens about to rug are shorted through a liquid
//!   correlated asset
//! - tokens that already rugged are bought for the bounce
//! - anything else is skipped

use nexus_core::{AnalyzedPlan, Classification, MarketPhase, PriceData, Strategy, TokenType};
use nexus_data::PriceOracle;
use tracing::{debug, info, warn};

use crate::llm::AnalysisError;

/// GMX-supported tokens on Arbitrum
const BLUE_CHIP_TOKENS: [(&str, &str); 4] = [
    ("WETH", "0x82aF49447D8a07e3bd95BD0d56f35241523fBab1"),
    ("WBTC", "0x2f2a2543B76A4166549F7aaB2e75Bef0aefC5B0f"),
    ("LINK", "0xf97f4df75117a78c1A5a0DBb814Af92458539FB4"),
    ("UNI", "0xFa7F8980b0f1E64A2062791cc3b0871572f1F7f0"),
];

/// Well-known non-blue-chip token addresses
const OTHER_TOKEN_ADDRESSES: [(&str, &str); 3] = [
    ("PEPE", "0x6982508145454Ce325dDbE47a25d4ec3d2311933"),
    ("SHIB", "0x95aD61b0a150d79219dCF64E1E6Cc01f0B64C4cE"),
    ("DOGE", "0xbA2aE424d960c26247Dd6c32edC70B295c744C43"),
];

const MEMECOIN_KEYWORDS: [&str; 7] = ["PEPE", "SHIB", "DOGE", "FLOKI", "ELON", "WOJAK", "TURBO"];
const DEFI_KEYWORDS: [&str; 7] = ["AAVE", "UNI", "CRV", "SNX", "MKR", "COMP", "SUSHI"];

/// Chain → blue chip shorted when a token on that chain rugs
const CHAIN_CORRELATIONS: [(&str, &str); 6] = [
    ("base", "WETH"),
    ("ethereum", "WETH"),
    ("arbitrum", "WETH"),
    ("optimism", "WETH"),
    ("polygon", "WETH"),
    ("bsc", "WBTC"),
];
const DEFAULT_CORRELATED_ASSET: &str = "WETH";

// Market phase bands (% change over 24h)
const POST_RUG_CHANGE: f64 = -60.0;
const PRE_RUG_DROP_CHANGE: f64 = -20.0;
const PRE_RUG_PUMP_CHANGE: f64 = 20.0;

const BLUE_CHIP_MULTIPLIER: f64 = 1.0;
const CORRELATED_SHORT_MULTIPLIER: f64 = 0.7;
const DIP_BUY_MULTIPLIER: f64 = 0.8;
const BOUNCE_TARGET_RATIO: f64 = 1.4;

/// Deterministic router from analyzed plan to execution strategy
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalClassifier;

impl SignalClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Token type from symbol and address
    pub fn token_type(symbol: &str, address: &str) -> TokenType {
        let is_blue_chip = BLUE_CHIP_TOKENS
            .iter()
            .any(|(sym, addr)| *sym == symbol || addr.eq_ignore_ascii_case(address));
        if is_blue_chip {
            return TokenType::BlueChip;
        }

        let upper = symbol.to_uppercase();
        if MEMECOIN_KEYWORDS.iter().any(|k| upper.contains(k)) {
            TokenType::Memecoin
        } else if DEFI_KEYWORDS.iter().any(|k| upper.contains(k)) {
            TokenType::Defi
        } else {
            // unclassified tokens are treated as the riskiest class
            TokenType::Memecoin
        }
    }

    /// Market phase from a 24h quote
    ///
    /// Post-rug is checked first; exactly -60% falls in neither band.
    pub fn market_phase(price: &PriceData) -> MarketPhase {
        let change = price.change_24h;
        if change < POST_RUG_CHANGE {
            MarketPhase::PostRug
        } else if change > PRE_RUG_PUMP_CHANGE && price.volume_spike {
            MarketPhase::PreRug
        } else if change > POST_RUG_CHANGE && change < PRE_RUG_DROP_CHANGE {
            MarketPhase::PreRug
        } else {
            MarketPhase::Unclear
        }
    }

    pub fn correlated_asset(chain: &str) -> &'static str {
        let chain = chain.to_lowercase();
        CHAIN_CORRELATIONS
            .iter()
            .find(|(c, _)| *c == chain)
            .map(|(_, asset)| *asset)
            .unwrap_or(DEFAULT_CORRELATED_ASSET)
    }

    /// Known contract address for a symbol
    pub fn token_address(symbol: &str) -> Option<&'static str> {
        let upper = symbol.to_uppercase();
        BLUE_CHIP_TOKENS
            .iter()
            .chain(OTHER_TOKEN_ADDRESSES.iter())
            .find(|(sym, _)| *sym == upper)
            .map(|(_, addr)| *addr)
    }

    /// Whether classifying this plan needs a price quote
    pub fn needs_price(plan: &AnalyzedPlan) -> bool {
        Self::token_type(&plan.symbol, &plan.address) != TokenType::BlueChip
    }

    /// Classify a plan given the quote for its token, if any
    pub fn classify(&self, plan: &AnalyzedPlan, price: Option<&PriceData>) -> Classification {
        let token_type = Self::token_type(&plan.symbol, &plan.address);

        if token_type == TokenType::BlueChip {
            info!("Blue-chip detected: {} -> GMX_SHORT", plan.symbol);
            return Classification::new(
                Strategy::GmxShort,
                token_type,
                BLUE_CHIP_MULTIPLIER,
                format!("GMX supports {} perpetual shorts", plan.symbol),
            );
        }

        if token_type == TokenType::Defi {
            debug!("DeFi token {} routed like a memecoin", plan.symbol);
        }

        let Some(price) = price else {
            let missing = AnalysisError::NoPriceData(plan.symbol.clone());
            warn!("{}, skipping", missing);
            return Classification::skip(token_type, missing.to_string());
        };

        match Self::market_phase(price) {
            MarketPhase::PreRug => {
                let asset = Self::correlated_asset(&plan.chain);
                info!("PRE_RUG detected: {} -> CORRELATED_SHORT {}", plan.symbol, asset);
                Classification {
                    market_phase: Some(MarketPhase::PreRug),
                    correlated_asset: Some(asset.to_string()),
                    ..Classification::new(
                        Strategy::CorrelatedShort,
                        token_type,
                        CORRELATED_SHORT_MULTIPLIER,
                        format!("Rug imminent, shorting correlated {}", asset),
                    )
                }
            }
            MarketPhase::PostRug => {
                info!("POST_RUG detected: {} -> DIP_BUY", plan.symbol);
                Classification {
                    market_phase: Some(MarketPhase::PostRug),
                    current_price: Some(price.current),
                    price_drop_24h: Some(price.change_24h),
                    bounce_target: Some(price.current * BOUNCE_TARGET_RATIO),
                    ..Classification::new(
                        Strategy::DipBuy,
                        token_type,
                        DIP_BUY_MULTIPLIER,
                        format!(
                            "Rug complete ({:.1}% drop), buying dip for bounce",
                            price.change_24h
                        ),
                    )
                }
            }
            MarketPhase::Bounce | MarketPhase::Unclear => {
                info!("Unclear market phase for {}, skipping", plan.symbol);
                Classification {
                    market_phase: Some(MarketPhase::Unclear),
                    ..Classification::skip(token_type, "Market phase unclear, not trading")
                }
            }
        }
    }

    /// Classify, fetching a quote from the oracle only when the token type needs one
    pub async fn classify_with_oracle(
        &self,
        plan: &AnalyzedPlan,
        oracle: &dyn PriceOracle,
    ) -> Classification {
        let price = if Self::needs_price(plan) {
            oracle.get_price_data(&plan.address, &plan.chain).await
        } else {
            None
        };
        self.classify(plan, price.as_ref())
    }
}
