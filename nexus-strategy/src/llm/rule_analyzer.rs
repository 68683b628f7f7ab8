//! Deterministic rule-based Tier-2 analyzer
//!
//! Serves both as the analyzer when no remote model is configured and as the
//! terminal fallback of the batch analyzer. It never fails and the plan it
//! produces is a pure function of the flagged item and the analysis time.

use nexus_core::{
    now_ms, AnalysisSource, AnalyzedPlan, Decision, FlaggedItem, RawSignal, TakeProfitLevel,
    TimestampMS, TokenCategory, VoteType,
};

// Red-flag thresholds
const INSIDER_SELLS_MIN: u32 = 5;
const INSIDER_VOLUME_MIN_USD: f64 = 500_000.0;
const LIQUIDITY_DROP_PCT: f64 = -40.0;
const TVL_DROP_PCT: f64 = -40.0;
const ENGAGEMENT_DROP_PCT: f64 = -60.0;
const DEV_DEPARTURES_MIN: u32 = 2;
const INFLUENCER_SILENCE_HOURS: f64 = 72.0;

// Confidence increments
const INSIDER_DUMP_WEIGHT: u32 = 25;
const LIQUIDITY_WEIGHT: u32 = 20;
const TVL_WEIGHT: u32 = 20;
const ENGAGEMENT_WEIGHT: u32 = 15;
const DEV_EXIT_WEIGHT: u32 = 10;
const SILENCE_WEIGHT: u32 = 10;
const TREASURY_RAID_WEIGHT: u32 = 15;
const INFLATION_WEIGHT: u32 = 10;

const MAX_CONFIDENCE: u32 = 100;
pub const SHORT_THRESHOLD: u8 = 70;
pub const MONITOR_THRESHOLD: u8 = 50;
const HIGH_LEVERAGE_THRESHOLD: u8 = 85;

const STOP_LOSS_PCT: f64 = 12.0;
const CLOSE_PERCENTS: [f64; 3] = [30.0, 40.0, 30.0];

/// Share of TVL assumed reachable on each execution chain, in tie-break order
const CHAIN_LIQUIDITY_WEIGHTS: [(&str, f64); 4] = [
    ("ethereum", 0.5),
    ("arbitrum", 0.3),
    ("base", 0.15),
    ("optimism", 0.05),
];

/// Rule-based analyzer producing one plan per flagged item
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedAnalyzer;

impl RuleBasedAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Analyze a batch, one plan per item in input order
    pub fn analyze_batch(&self, items: &[FlaggedItem]) -> Vec<AnalyzedPlan> {
        let analyzed_at = now_ms();
        items
            .iter()
            .map(|item| self.analyze_at(item, analyzed_at))
            .collect()
    }

    pub fn analyze(&self, item: &FlaggedItem) -> AnalyzedPlan {
        self.analyze_at(item, now_ms())
    }

    /// Analyze with an explicit analysis timestamp
    pub fn analyze_at(&self, item: &FlaggedItem, analyzed_at: TimestampMS) -> AnalyzedPlan {
        let signal = &item.signal;
        let (confidence, risk_factors) = Self::score(signal);
        let decision = Self::decision_for(confidence);
        let execution_chain = Self::best_execution_chain(signal.tvl_usd);
        let targets = Self::take_profit_targets(signal.category);

        let take_profit_levels = [0, 1, 2].map(|i| TakeProfitLevel {
            target_percent: targets[i],
            close_percent: CLOSE_PERCENTS[i],
        });

        let reasoning = match decision {
            Decision::Short => format!(
                "High-confidence short opportunity. {}. Execute on {} for optimal liquidity.",
                risk_factors.iter().take(3).cloned().collect::<Vec<_>>().join(" + "),
                execution_chain
            ),
            Decision::Monitor => format!(
                "Moderate concerns detected: {}. Requires additional confirmation before entering position.",
                risk_factors.iter().take(2).cloned().collect::<Vec<_>>().join(", ")
            ),
            Decision::Pass => {
                "Insufficient evidence for short position. Signals below confidence threshold."
                    .to_string()
            }
        };

        AnalyzedPlan {
            symbol: signal.symbol.clone(),
            address: signal.address.clone(),
            chain: signal.chain.clone(),
            decision,
            confidence,
            sizing_percent: Self::position_size_percent(confidence),
            leverage: if confidence < HIGH_LEVERAGE_THRESHOLD { 2 } else { 5 },
            take_profit_levels,
            stop_loss_percent: STOP_LOSS_PCT,
            execution_chain: execution_chain.to_string(),
            reasoning,
            risk_factors,
            urgency_score: item.urgency_score,
            analyzed_at,
            source: AnalysisSource::LocalFallback,
        }
    }

    /// Confidence (0-100) and triggered risk factors, strongest first
    pub fn score(signal: &RawSignal) -> (u8, Vec<String>) {
        let mut confidence = 0u32;
        let mut risk_factors = Vec::new();
        let mut flag = |hit: bool, weight: u32, description: &str| {
            if hit {
                confidence += weight;
                risk_factors.push(description.to_string());
            }
        };

        flag(
            signal.insider_sells_24h > INSIDER_SELLS_MIN
                && signal.insider_sell_volume_usd > INSIDER_VOLUME_MIN_USD,
            INSIDER_DUMP_WEIGHT,
            "Major insider dump detected",
        );
        flag(
            signal.liquidity_change_24h < LIQUIDITY_DROP_PCT,
            LIQUIDITY_WEIGHT,
            "Severe liquidity removal",
        );
        flag(signal.tvl_change_24h < TVL_DROP_PCT, TVL_WEIGHT, "TVL collapse");
        flag(
            signal.twitter_engagement_change_48h < ENGAGEMENT_DROP_PCT,
            ENGAGEMENT_WEIGHT,
            "Twitter engagement crash",
        );
        flag(
            signal.dev_departures_30d > DEV_DEPARTURES_MIN,
            DEV_EXIT_WEIGHT,
            "Multiple developer exits",
        );
        flag(
            signal.influencer_silence_hours > INFLUENCER_SILENCE_HOURS,
            SILENCE_WEIGHT,
            "Prolonged influencer silence",
        );

        if signal.vote_passed {
            match signal.recent_vote_type {
                VoteType::TreasuryRaid => {
                    flag(true, TREASURY_RAID_WEIGHT, "Treasury raid vote passed")
                }
                VoteType::Inflation => flag(true, INFLATION_WEIGHT, "Token inflation approved"),
                VoteType::FeeIncrease | VoteType::Neutral => {}
            }
        }

        (confidence.min(MAX_CONFIDENCE) as u8, risk_factors)
    }

    pub fn decision_for(confidence: u8) -> Decision {
        if confidence >= SHORT_THRESHOLD {
            Decision::Short
        } else if confidence >= MONITOR_THRESHOLD {
            Decision::Monitor
        } else {
            Decision::Pass
        }
    }

    /// Position size as % of portfolio, stepped by confidence
    pub fn position_size_percent(confidence: u8) -> f64 {
        if confidence >= 90 {
            20.0
        } else if confidence >= 80 {
            15.0
        } else if confidence >= SHORT_THRESHOLD {
            10.0
        } else {
            0.0
        }
    }

    /// Take-profit targets (%) by token category
    pub fn take_profit_targets(category: TokenCategory) -> [f64; 3] {
        match category {
            TokenCategory::Memecoin => [-33.0, -67.0, -85.0],
            TokenCategory::Defi => [-25.0, -50.0, -70.0],
            _ => [-20.0, -40.0, -60.0],
        }
    }

    /// Chain with the deepest estimated liquidity; ties go to the earlier chain
    pub fn best_execution_chain(tvl_usd: f64) -> &'static str {
        let mut best = CHAIN_LIQUIDITY_WEIGHTS[0];
        for candidate in &CHAIN_LIQUIDITY_WEIGHTS[1..] {
            if tvl_usd * candidate.1 > tvl_usd * best.1 {
                best = *candidate;
            }
        }
        best.0
    }
}
