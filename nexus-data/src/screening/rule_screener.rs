use nexus_core::{now_ms, FlaggedItem, RawSignal, MAX_URGENCY};
use serde::Serialize;
use std::time::Instant;

// Red-flag thresholds
const INSIDER_SELLS_MIN: u32 = 3;
const INSIDER_VOLUME_MIN_USD: f64 = 100_000.0;
const LIQUIDITY_DROP_PCT: f64 = -20.0;
const TVL_DROP_PCT: f64 = -30.0;
const ENGAGEMENT_DROP_PCT: f64 = -50.0;
const INFLUENCER_SILENCE_HOURS: f64 = 48.0;
const DEV_DEPARTURES_MIN: u32 = 1;

/// Urgency at which a signal is flagged with its four strongest reasons
const HIGH_URGENCY: u8 = 5;
/// Urgency at which a signal is flagged at all
const FLAG_URGENCY: u8 = 3;

/// Tier-1 screening contract: flag a signal for Tier-2 analysis or let it pass
pub trait Screener: Send {
    fn screen(&mut self, signal: &RawSignal) -> Option<FlaggedItem>;

    /// Screen a batch, keeping only flagged signals in input order
    fn screen_batch(&mut self, signals: &[RawSignal]) -> Vec<FlaggedItem> {
        signals.iter().filter_map(|s| self.screen(s)).collect()
    }

    fn stats(&self) -> ScreeningStats;
}

/// Tier-1 screening counters
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScreeningStats {
    pub total_processed: u64,
    pub total_flagged: u64,
    pub total_passed: u64,
    pub batch_count: u64,
    pub avg_batch_time_ms: f64,
}

impl ScreeningStats {
    pub fn flag_rate(&self) -> f64 {
        self.total_flagged as f64 / self.total_processed.max(1) as f64
    }
}

/// Fast rule-based Tier-1 classifier
///
/// Scores a fixed set of red flags into an urgency value and flags the
/// signal once urgency reaches [`FLAG_URGENCY`].
#[derive(Debug, Default)]
pub struct RuleBasedScreener {
    stats: ScreeningStats,
}

impl RuleBasedScreener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Score a signal's red flags
    ///
    /// # Returns
    /// (urgency 0-10, red flag descriptions in evaluation order)
    pub fn score(signal: &RawSignal) -> (u8, Vec<String>) {
        let mut red_flags = Vec::new();
        let mut urgency: u8 = 0;

        if signal.insider_sells_24h > INSIDER_SELLS_MIN
            && signal.insider_sell_volume_usd > INSIDER_VOLUME_MIN_USD
        {
            red_flags.push(format!(
                "Insider dumps: {} sells, ${:.0}",
                signal.insider_sells_24h, signal.insider_sell_volume_usd
            ));
            urgency += 3;
        }

        if signal.liquidity_change_24h < LIQUIDITY_DROP_PCT {
            red_flags.push(format!(
                "Liquidity removal: {:.1}%",
                signal.liquidity_change_24h
            ));
            urgency += 2;
        }

        if signal.tvl_change_24h < TVL_DROP_PCT {
            red_flags.push(format!("TVL collapse: {:.1}%", signal.tvl_change_24h));
            urgency += 2;
        }

        if signal.twitter_engagement_change_48h < ENGAGEMENT_DROP_PCT {
            red_flags.push(format!(
                "Engagement crash: {:.1}%",
                signal.twitter_engagement_change_48h
            ));
            urgency += 2;
        }

        if signal.influencer_silence_hours > INFLUENCER_SILENCE_HOURS {
            red_flags.push(format!(
                "Influencer silent: {:.0}h",
                signal.influencer_silence_hours
            ));
            urgency += 1;
        }

        if signal.dev_departures_30d > DEV_DEPARTURES_MIN {
            red_flags.push(format!("Dev departures: {}", signal.dev_departures_30d));
            urgency += 1;
        }

        if signal.passed_bearish_vote() {
            red_flags.push(format!("Bearish vote: {}", signal.recent_vote_type));
            urgency += 1;
        }

        (urgency.min(MAX_URGENCY), red_flags)
    }
}

impl Screener for RuleBasedScreener {
    fn screen(&mut self, signal: &RawSignal) -> Option<FlaggedItem> {
        let (urgency, red_flags) = Self::score(signal);
        self.stats.total_processed += 1;

        let top = if urgency >= HIGH_URGENCY {
            4
        } else if urgency >= FLAG_URGENCY {
            2
        } else {
            self.stats.total_passed += 1;
            tracing::debug!("PASSED: {}", signal.symbol);
            return None;
        };

        let reason = red_flags
            .iter()
            .take(top)
            .cloned()
            .collect::<Vec<_>>()
            .join(" | ");

        self.stats.total_flagged += 1;
        tracing::info!(
            "FLAGGED: {} (urgency: {}/10) - {}",
            signal.symbol,
            urgency,
            reason
        );

        Some(FlaggedItem::new(signal.clone(), urgency, reason, now_ms()))
    }

    fn screen_batch(&mut self, signals: &[RawSignal]) -> Vec<FlaggedItem> {
        let start = Instant::now();
        tracing::info!("Screening batch of {} tokens...", signals.len());

        let flagged: Vec<FlaggedItem> = signals.iter().filter_map(|s| self.screen(s)).collect();

        let batch_ms = start.elapsed().as_secs_f64() * 1000.0;
        self.stats.batch_count += 1;
        self.stats.avg_batch_time_ms = (self.stats.avg_batch_time_ms
            * (self.stats.batch_count - 1) as f64
            + batch_ms)
            / self.stats.batch_count as f64;

        tracing::info!(
            "Screening complete: {}/{} flagged ({:.1}ms)",
            flagged.len(),
            signals.len(),
            batch_ms
        );

        flagged
    }

    fn stats(&self) -> ScreeningStats {
        self.stats.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexus_core::{TokenCategory, VoteType};

    fn rug_pull() -> RawSignal {
        let mut s = RawSignal::new("$PEPEINU", "0xdead", "base", TokenCategory::Memecoin, 1000);
        s.insider_sells_24h = 8;
        s.insider_sell_volume_usd = 600_000.0;
        s.liquidity_change_24h = -55.0;
        s.tvl_change_24h = -45.0;
        s.twitter_engagement_change_48h = -70.0;
        s.influencer_silence_hours = 90.0;
        s.dev_departures_30d = 3;
        s.recent_vote_type = VoteType::TreasuryRaid;
        s.vote_passed = true;
        s
    }

    #[test]
    fn test_rug_pull_flagged_with_top_four_reasons() {
        let mut screener = RuleBasedScreener::new();
        let flagged = screener.screen(&rug_pull()).expect("should flag");

        assert_eq!(flagged.urgency_score, 10);
        assert_eq!(flagged.reason.split(" | ").count(), 4);
        assert!(flagged.reason.starts_with("Insider dumps: 8 sells"));
    }

    #[test]
    fn test_moderate_signal_flagged_with_two_reasons() {
        let mut s = RawSignal::new("$VAULT", "0x1", "ethereum", TokenCategory::Defi, 1000);
        s.liquidity_change_24h = -25.0; // +2
        s.influencer_silence_hours = 50.0; // +1
        s.dev_departures_30d = 2; // +1

        let mut screener = RuleBasedScreener::new();
        let flagged = screener.screen(&s).expect("urgency 4 should flag");
        assert_eq!(flagged.urgency_score, 4);
        assert_eq!(
            flagged.reason,
            "Liquidity removal: -25.0% | Influencer silent: 50h"
        );
    }

    #[test]
    fn test_healthy_signal_passes() {
        let s = RawSignal::new("$SWAP", "0x2", "arbitrum", TokenCategory::Defi, 1000);
        let mut screener = RuleBasedScreener::new();
        assert!(screener.screen(&s).is_none());

        let stats = screener.stats();
        assert_eq!(stats.total_processed, 1);
        assert_eq!(stats.total_passed, 1);
        assert_eq!(stats.flag_rate(), 0.0);
    }

    #[test]
    fn test_batch_preserves_order() {
        let healthy = RawSignal::new("$SWAP", "0x2", "arbitrum", TokenCategory::Defi, 1000);
        let mut second = rug_pull();
        second.symbol = "$DOGEAI".to_string();

        let mut screener = RuleBasedScreener::new();
        let flagged = screener.screen_batch(&[rug_pull(), healthy, second]);

        assert_eq!(flagged.len(), 2);
        assert_eq!(flagged[0].symbol(), "$PEPEINU");
        assert_eq!(flagged[1].symbol(), "$DOGEAI");
        assert_eq!(screener.stats().batch_count, 1);
    }
}
