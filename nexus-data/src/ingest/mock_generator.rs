//! Mock signal source
//!
//! Generates realistic token signal bundles for three risk profiles:
//! - rug pulls (should be flagged and shorted)
//! - moderate risk (edge cases around the screening thresholds)
//! - healthy projects (should pass screening)
//!
//! Seeded, so a given seed always yields the same feature values.

use nexus_core::{now_ms, RawSignal, TokenCategory, VoteType};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const CHAINS: [&str; 4] = ["ethereum", "arbitrum", "base", "optimism"];

const MEMECOIN_PREFIXES: [&str; 10] = [
    "PEPE", "DOGE", "SHIB", "FLOKI", "WOJAK", "BONK", "MEME", "MOON", "SAFE", "ELON",
];
const MEMECOIN_SUFFIXES: [&str; 6] = ["", "INU", "COIN", "TOKEN", "2.0", "AI"];
const DEFI_PREFIXES: [&str; 10] = [
    "PROTOCOL", "SWAP", "VAULT", "LEND", "YIELD", "FARM", "STAKE", "LIQUID", "SYNTH", "CURVE",
];
const LSD_SYMBOLS: [&str; 8] = [
    "stETH", "rETH", "cbETH", "frxETH", "sfrxETH", "wstETH", "ankrETH", "stMATIC",
];
const OTHER_PREFIXES: [&str; 4] = ["GAME", "PLAY", "META", "BUILD"];

/// Share of each generated batch drawn from the moderate-risk profile
const MODERATE_RATIO: f64 = 0.15;

/// Seeded generator of mock [`RawSignal`] batches
pub struct MockSignalGenerator {
    rng: StdRng,
    generated_count: u64,
}

impl MockSignalGenerator {
    pub fn new(seed: u64) -> Self {
        tracing::info!("Initializing mock signal generator (seed={})", seed);
        Self {
            rng: StdRng::seed_from_u64(seed),
            generated_count: 0,
        }
    }

    /// Total number of signals generated so far
    pub fn generated_count(&self) -> u64 {
        self.generated_count
    }

    /// Generate a shuffled batch of mixed signals
    ///
    /// # Arguments
    /// * `size` - Number of signals to generate
    /// * `rug_pull_ratio` - Share of the batch (0.0-1.0) that should look like rug pulls
    pub fn generate_batch(&mut self, size: usize, rug_pull_ratio: f64) -> Vec<RawSignal> {
        let ratio = rug_pull_ratio.clamp(0.0, 1.0);
        let num_rug_pulls = (size as f64 * ratio) as usize;
        let num_moderate = ((size as f64 * MODERATE_RATIO) as usize).min(size - num_rug_pulls);
        let num_healthy = size - num_rug_pulls - num_moderate;

        let mut signals = Vec::with_capacity(size);
        for _ in 0..num_rug_pulls {
            signals.push(self.rug_pull_signal());
        }
        for _ in 0..num_moderate {
            signals.push(self.moderate_risk_signal());
        }
        for _ in 0..num_healthy {
            signals.push(self.healthy_signal());
        }

        signals.shuffle(&mut self.rng);
        self.generated_count += signals.len() as u64;

        tracing::debug!(
            "Generated {} signals ({} rug pulls, {} moderate, {} healthy)",
            signals.len(),
            num_rug_pulls,
            num_moderate,
            num_healthy
        );

        signals
    }

    /// High-confidence rug pull profile
    pub fn rug_pull_signal(&mut self) -> RawSignal {
        let mut signal = self.base_signal(TokenCategory::Memecoin);

        signal.tvl_change_24h = self.rng.gen_range(-60.0..-30.0);
        signal.tvl_usd = self.rng.gen_range(500_000.0..5_000_000.0);
        signal.liquidity_change_24h = self.rng.gen_range(-70.0..-40.0);
        signal.holder_concentration_top10 = self.rng.gen_range(70.0..95.0);
        signal.insider_sells_24h = self.rng.gen_range(5..=15);
        signal.insider_sell_volume_usd = self.rng.gen_range(200_000.0..1_000_000.0);

        signal.twitter_engagement_change_48h = self.rng.gen_range(-80.0..-50.0);
        signal.twitter_mentions_24h = self.rng.gen_range(100..=500);
        signal.twitter_sentiment_score = self.rng.gen_range(-0.8..-0.4);
        signal.influencer_silence_hours = self.rng.gen_range(48.0..120.0);

        signal.github_commits_7d = self.rng.gen_range(0..=2);
        signal.github_commit_change = self.rng.gen_range(-90.0..-60.0);
        signal.dev_departures_30d = self.rng.gen_range(2..=5);

        signal.recent_vote_type = if self.rng.gen_bool(0.5) {
            VoteType::Inflation
        } else {
            VoteType::TreasuryRaid
        };
        signal.vote_passed = true;

        signal.price_change_24h = self.rng.gen_range(-70.0..-40.0);
        signal.volume_24h_usd = self.rng.gen_range(1_000_000.0..10_000_000.0);
        signal.market_cap_usd = self.rng.gen_range(5_000_000.0..50_000_000.0);
        signal
    }

    /// Healthy project profile
    pub fn healthy_signal(&mut self) -> RawSignal {
        let category = *[TokenCategory::Defi, TokenCategory::Infra, TokenCategory::Gaming]
            .choose(&mut self.rng)
            .unwrap_or(&TokenCategory::Defi);
        let mut signal = self.base_signal(category);

        signal.tvl_change_24h = self.rng.gen_range(-5.0..15.0);
        signal.tvl_usd = self.rng.gen_range(10_000_000.0..500_000_000.0);
        signal.liquidity_change_24h = self.rng.gen_range(-3.0..10.0);
        signal.holder_concentration_top10 = self.rng.gen_range(15.0..35.0);
        signal.insider_sells_24h = self.rng.gen_range(0..=2);
        signal.insider_sell_volume_usd = self.rng.gen_range(0.0..50_000.0);

        signal.twitter_engagement_change_48h = self.rng.gen_range(-10.0..20.0);
        signal.twitter_mentions_24h = self.rng.gen_range(500..=5000);
        signal.twitter_sentiment_score = self.rng.gen_range(0.2..0.7);
        signal.influencer_silence_hours = self.rng.gen_range(0.0..24.0);

        signal.github_commits_7d = self.rng.gen_range(10..=50);
        signal.github_commit_change = self.rng.gen_range(-10.0..30.0);
        signal.dev_departures_30d = 0;

        signal.recent_vote_type = VoteType::Neutral;
        signal.vote_passed = self.rng.gen_bool(0.5);

        signal.price_change_24h = self.rng.gen_range(-10.0..15.0);
        signal.volume_24h_usd = self.rng.gen_range(5_000_000.0..100_000_000.0);
        signal.market_cap_usd = self.rng.gen_range(50_000_000.0..1_000_000_000.0);
        signal
    }

    /// Mixed indicators around the screening thresholds
    pub fn moderate_risk_signal(&mut self) -> RawSignal {
        let category = *[
            TokenCategory::Memecoin,
            TokenCategory::Defi,
            TokenCategory::Lsd,
            TokenCategory::Gaming,
            TokenCategory::Infra,
        ]
        .choose(&mut self.rng)
        .unwrap_or(&TokenCategory::Defi);
        let mut signal = self.base_signal(category);

        signal.tvl_change_24h = self.rng.gen_range(-25.0..-10.0);
        signal.tvl_usd = self.rng.gen_range(2_000_000.0..20_000_000.0);
        signal.liquidity_change_24h = self.rng.gen_range(-20.0..5.0);
        signal.holder_concentration_top10 = self.rng.gen_range(40.0..60.0);
        signal.insider_sells_24h = self.rng.gen_range(2..=5);
        signal.insider_sell_volume_usd = self.rng.gen_range(50_000.0..200_000.0);

        signal.twitter_engagement_change_48h = self.rng.gen_range(-40.0..-10.0);
        signal.twitter_mentions_24h = self.rng.gen_range(200..=1000);
        signal.twitter_sentiment_score = self.rng.gen_range(-0.3..0.1);
        signal.influencer_silence_hours = self.rng.gen_range(12.0..48.0);

        signal.github_commits_7d = self.rng.gen_range(3..=10);
        signal.github_commit_change = self.rng.gen_range(-30.0..10.0);
        signal.dev_departures_30d = self.rng.gen_range(0..=1);

        signal.recent_vote_type = if self.rng.gen_bool(0.5) {
            VoteType::FeeIncrease
        } else {
            VoteType::Neutral
        };
        signal.vote_passed = self.rng.gen_bool(0.5);

        signal.price_change_24h = self.rng.gen_range(-30.0..-5.0);
        signal.volume_24h_usd = self.rng.gen_range(500_000.0..5_000_000.0);
        signal.market_cap_usd = self.rng.gen_range(10_000_000.0..100_000_000.0);
        signal
    }

    fn base_signal(&mut self, category: TokenCategory) -> RawSignal {
        let symbol = self.symbol_for(category);
        let address = self.address();
        let chain = *CHAINS.choose(&mut self.rng).unwrap_or(&CHAINS[0]);
        RawSignal::new(symbol, address, chain, category, now_ms())
    }

    fn symbol_for(&mut self, category: TokenCategory) -> String {
        match category {
            TokenCategory::Memecoin => {
                let prefix = MEMECOIN_PREFIXES.choose(&mut self.rng).unwrap_or(&"MEME");
                let suffix = MEMECOIN_SUFFIXES.choose(&mut self.rng).unwrap_or(&"");
                format!("${}{}", prefix, suffix)
            }
            TokenCategory::Defi => {
                let prefix = DEFI_PREFIXES.choose(&mut self.rng).unwrap_or(&"SWAP");
                format!("${}", prefix)
            }
            TokenCategory::Lsd => LSD_SYMBOLS.choose(&mut self.rng).unwrap_or(&"stETH").to_string(),
            TokenCategory::Gaming | TokenCategory::Infra => {
                let prefix = OTHER_PREFIXES.choose(&mut self.rng).unwrap_or(&"META");
                format!("${}{}", prefix, self.rng.gen_range(1..=999))
            }
        }
    }

    fn address(&mut self) -> String {
        const HEX: &[u8] = b"0123456789abcdef";
        let body: String = (0..40)
            .map(|_| HEX[self.rng.gen_range(0..HEX.len())] as char)
            .collect();
        format!("0x{}", body)
    }
}
