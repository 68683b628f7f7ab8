use crate::types::TimestampMS;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Highest urgency a Tier-1 screener may assign
pub const MAX_URGENCY: u8 = 10;

/// Token category as reported by the signal source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenCategory {
    Memecoin,
    Defi,
    Lsd,
    Gaming,
    Infra,
}

impl fmt::Display for TokenCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenCategory::Memecoin => "memecoin",
            TokenCategory::Defi => "defi",
            TokenCategory::Lsd => "lsd",
            TokenCategory::Gaming => "gaming",
            TokenCategory::Infra => "infra",
        };
        f.write_str(name)
    }
}

/// Type of the most recent governance vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteType {
    Inflation,
    FeeIncrease,
    TreasuryRaid,
    Neutral,
}

impl VoteType {
    /// Votes that dilute or drain holders when passed
    pub fn is_bearish(&self) -> bool {
        matches!(
            self,
            VoteType::Inflation | VoteType::TreasuryRaid | VoteType::FeeIncrease
        )
    }
}

impl fmt::Display for VoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VoteType::Inflation => "inflation",
            VoteType::FeeIncrease => "fee_increase",
            VoteType::TreasuryRaid => "treasury_raid",
            VoteType::Neutral => "neutral",
        };
        f.write_str(name)
    }
}

/// Complete signal bundle for a single token at a point in time.
/// This is the input to Tier-1 screening and is never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSignal {
    // ═══════════════════════════════════════════════════
    // IDENTIFICATION
    // ═══════════════════════════════════════════════════
    pub symbol: String,
    pub address: String,
    pub chain: String,
    pub category: TokenCategory,
    pub timestamp: TimestampMS,

    // ═══════════════════════════════════════════════════
    // ON-CHAIN (24h)
    // ═══════════════════════════════════════════════════
    pub tvl_usd: f64,
    pub tvl_change_24h: f64,       // % change
    pub liquidity_change_24h: f64, // % change
    pub holder_concentration_top10: f64,
    pub insider_sells_24h: u32,
    pub insider_sell_volume_usd: f64,

    // ═══════════════════════════════════════════════════
    // SOCIAL
    // ═══════════════════════════════════════════════════
    pub twitter_engagement_change_48h: f64, // % change
    pub twitter_mentions_24h: u32,
    pub twitter_sentiment_score: f64, // -1.0 to 1.0
    pub influencer_silence_hours: f64,

    // ═══════════════════════════════════════════════════
    // PROTOCOL HEALTH
    // ═══════════════════════════════════════════════════
    pub github_commits_7d: u32,
    pub github_commit_change: f64, // % vs previous week
    pub dev_departures_30d: u32,

    // ═══════════════════════════════════════════════════
    // GOVERNANCE
    // ═══════════════════════════════════════════════════
    pub recent_vote_type: VoteType,
    pub vote_passed: bool,

    // ═══════════════════════════════════════════════════
    // PRICE ACTION
    // ═══════════════════════════════════════════════════
    pub price_change_24h: f64,
    pub volume_24h_usd: f64,
    pub market_cap_usd: f64,
}

impl RawSignal {
    /// Create a signal with neutral feature values
    pub fn new(
        symbol: impl Into<String>,
        address: impl Into<String>,
        chain: impl Into<String>,
        category: TokenCategory,
        timestamp: TimestampMS,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            address: address.into(),
            chain: chain.into(),
            category,
            timestamp,
            tvl_usd: 0.0,
            tvl_change_24h: 0.0,
            liquidity_change_24h: 0.0,
            holder_concentration_top10: 0.0,
            insider_sells_24h: 0,
            insider_sell_volume_usd: 0.0,
            twitter_engagement_change_48h: 0.0,
            twitter_mentions_24h: 0,
            twitter_sentiment_score: 0.0,
            influencer_silence_hours: 0.0,
            github_commits_7d: 0,
            github_commit_change: 0.0,
            dev_departures_30d: 0,
            recent_vote_type: VoteType::Neutral,
            vote_passed: false,
            price_change_24h: 0.0,
            volume_24h_usd: 0.0,
            market_cap_usd: 0.0,
        }
    }

    /// True when a bearish governance proposal actually passed
    pub fn passed_bearish_vote(&self) -> bool {
        self.vote_passed && self.recent_vote_type.is_bearish()
    }
}

/// A signal flagged by Tier-1 screening and awaiting Tier-2 analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlaggedItem {
    pub signal: RawSignal,
    pub urgency_score: u8, // 0-10
    pub reason: String,
    pub flagged_at: TimestampMS,
}

impl FlaggedItem {
    /// Flag a signal, capping urgency at [`MAX_URGENCY`]
    pub fn new(
        signal: RawSignal,
        urgency_score: u8,
        reason: impl Into<String>,
        flagged_at: TimestampMS,
    ) -> Self {
        Self {
            signal,
            urgency_score: urgency_score.min(MAX_URGENCY),
            reason: reason.into(),
            flagged_at,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.signal.symbol
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_creation() {
        let signal = RawSignal::new("$PEPEINU", "0xabc", "base", TokenCategory::Memecoin, 1000);
        assert_eq!(signal.symbol, "$PEPEINU");
        assert_eq!(signal.recent_vote_type, VoteType::Neutral);
        assert!(!signal.passed_bearish_vote());
    }

    #[test]
    fn test_bearish_vote() {
        let mut signal = RawSignal::new("$VAULT", "0xabc", "ethereum", TokenCategory::Defi, 1000);
        signal.recent_vote_type = VoteType::FeeIncrease;
        assert!(!signal.passed_bearish_vote());

        signal.vote_passed = true;
        assert!(signal.passed_bearish_vote());

        signal.recent_vote_type = VoteType::Neutral;
        assert!(!signal.passed_bearish_vote());
    }

    #[test]
    fn test_flagged_urgency_is_capped() {
        let signal = RawSignal::new("$MOON", "0xabc", "base", TokenCategory::Memecoin, 1000);
        let flagged = FlaggedItem::new(signal, 14, "many red flags", 2000);
        assert_eq!(flagged.urgency_score, MAX_URGENCY);
        assert_eq!(flagged.symbol(), "$MOON");
    }

    #[test]
    fn test_category_serde_names() {
        let json = serde_json::to_string(&TokenCategory::Memecoin).unwrap();
        assert_eq!(json, "\"memecoin\"");

        let vote: VoteType = serde_json::from_str("\"treasury_raid\"").unwrap();
        assert_eq!(vote, VoteType::TreasuryRaid);
        assert_eq!(vote.to_string(), "treasury_raid");
    }
}
