use nexus_core::FlaggedItem;

const SECTION_RULE: &str =
    "================================================================================";

/// Formatter for Tier-2 batch analysis prompts
pub struct BatchPromptFormatter;

impl BatchPromptFormatter {
    /// Format the full batch prompt: instructions, every item, output schema
    pub fn format_batch_prompt(items: &[FlaggedItem]) -> String {
        let mut prompt = String::new();

        prompt.push_str(
            "You are an expert crypto trading analyst specializing in short-selling opportunities.\n\n",
        );
        prompt.push_str(&format!(
            "I will provide you with {} flagged tokens that have been pre-screened. \
             Analyze ALL of them in a SINGLE response and provide trade recommendations for each.\n\n",
            items.len()
        ));

        prompt.push_str("FLAGGED TOKENS DATA:\n");
        prompt.push_str(&Self::format_items(items));
        prompt.push_str("\n\n");

        prompt.push_str("ANALYSIS REQUIREMENTS FOR EACH TOKEN:\n");
        prompt.push_str("1. Evaluate if this is a HIGH-CONFIDENCE short opportunity (>=70% confidence)\n");
        prompt.push_str("2. Consider cross-chain liquidity for optimal execution\n");
        prompt.push_str("3. Provide risk-adjusted position sizing\n");
        prompt.push_str("4. Set realistic take-profit levels based on historical crash patterns\n");
        prompt.push_str("5. Define protective stop-loss\n\n");

        prompt.push_str("OUTPUT FORMAT (JSON ARRAY - ONE OBJECT PER TOKEN, SAME ORDER AS INPUT):\n");
        prompt.push_str("[\n");
        prompt.push_str("  {\n");
        prompt.push_str("    \"token_symbol\": \"TOKEN1\",\n");
        prompt.push_str("    \"decision\": \"SHORT\" | \"MONITOR\" | \"PASS\",\n");
        prompt.push_str("    \"confidence\": 0-100,\n");
        prompt.push_str("    \"position_size_percent\": 0-20,\n");
        prompt.push_str("    \"take_profit_levels\": [\n");
        prompt.push_str("      {\"price_target\": -20.0, \"close_percent\": 30},\n");
        prompt.push_str("      {\"price_target\": -50.0, \"close_percent\": 40},\n");
        prompt.push_str("      {\"price_target\": -75.0, \"close_percent\": 30}\n");
        prompt.push_str("    ],\n");
        prompt.push_str("    \"stop_loss_percent\": 12.0,\n");
        prompt.push_str("    \"leverage\": 2-10,\n");
        prompt.push_str("    \"best_execution_chain\": \"ethereum\" | \"arbitrum\" | \"base\" | \"optimism\",\n");
        prompt.push_str("    \"reasoning\": \"2-3 sentence explanation focusing on strongest signals\",\n");
        prompt.push_str("    \"risk_factors\": [\"list\", \"of\", \"3-5\", \"key\", \"risks\"]\n");
        prompt.push_str("  }\n");
        prompt.push_str("]\n\n");

        prompt.push_str("DECISION CRITERIA:\n");
        prompt.push_str("- SHORT: Confidence >= 70%, multiple red flags, clear catalyst\n");
        prompt.push_str("- MONITOR: Confidence 50-69%, some concerns, needs more data\n");
        prompt.push_str("- PASS: Confidence < 50%, insufficient evidence\n\n");

        prompt.push_str("CRITICAL CONSIDERATIONS:\n");
        prompt.push_str("- Insider dumps + liquidity removal = STRONG SHORT\n");
        prompt.push_str("- Twitter silence + dev exits = STRONG SHORT\n");
        prompt.push_str("- Governance risks alone = MONITOR unless severe\n");
        prompt.push_str("- Position sizing: Higher confidence = larger position (max 20%)\n");
        prompt.push_str("- Chain selection: Deepest liquidity = best execution\n\n");

        prompt.push_str(&format!(
            "Analyze all {} tokens and return a JSON array with complete analysis for each token:",
            items.len()
        ));

        prompt
    }

    /// Format the per-item data blocks only
    ///
    /// This is also what the batch sizer measures, so it must stay
    /// proportional to the full prompt size.
    pub fn format_items(items: &[FlaggedItem]) -> String {
        let blocks: Vec<String> = items
            .iter()
            .enumerate()
            .map(|(i, item)| Self::format_item(i + 1, item))
            .collect();

        format!("\n{}{}", SECTION_RULE, blocks.join("\n"))
    }

    /// Format a single flagged item block
    pub fn format_item(position: usize, item: &FlaggedItem) -> String {
        let s = &item.signal;
        let mut block = String::new();

        block.push_str(&format!("\nTOKEN {}:\n", position));
        block.push_str(&format!("Symbol: {}\n", s.symbol));
        block.push_str(&format!("Address: {}\n", s.address));
        block.push_str(&format!("Chain: {}\n", s.chain));
        block.push_str(&format!("Category: {}\n", s.category));
        block.push_str(&format!("Market Cap: ${:.0}\n", s.market_cap_usd));
        block.push_str(&format!("Urgency Score: {}/10\n\n", item.urgency_score));

        block.push_str("ON-CHAIN SIGNALS (24h):\n");
        block.push_str(&format!(
            "- TVL: ${:.0} ({:+.1}%)\n",
            s.tvl_usd, s.tvl_change_24h
        ));
        block.push_str(&format!(
            "- Liquidity Change: {:+.1}%\n",
            s.liquidity_change_24h
        ));
        block.push_str(&format!(
            "- Top 10 Holder Concentration: {:.1}%\n",
            s.holder_concentration_top10
        ));
        block.push_str(&format!(
            "- Insider Sells: {} transactions, ${:.0}\n\n",
            s.insider_sells_24h, s.insider_sell_volume_usd
        ));

        block.push_str("SOCIAL SIGNALS:\n");
        block.push_str(&format!(
            "- Twitter Engagement Change (48h): {:+.1}%\n",
            s.twitter_engagement_change_48h
        ));
        block.push_str(&format!(
            "- Twitter Mentions (24h): {}\n",
            s.twitter_mentions_24h
        ));
        block.push_str(&format!(
            "- Sentiment Score: {:.2}\n",
            s.twitter_sentiment_score
        ));
        block.push_str(&format!(
            "- Influencer Silence: {:.0} hours\n\n",
            s.influencer_silence_hours
        ));

        block.push_str("PROTOCOL HEALTH:\n");
        block.push_str(&format!("- GitHub Commits (7d): {}\n", s.github_commits_7d));
        block.push_str(&format!(
            "- Commit Change: {:+.1}%\n",
            s.github_commit_change
        ));
        block.push_str(&format!(
            "- Developer Departures (30d): {}\n\n",
            s.dev_departures_30d
        ));

        block.push_str("GOVERNANCE:\n");
        block.push_str(&format!("- Recent Vote: {}\n", s.recent_vote_type));
        block.push_str(&format!("- Vote Passed: {}\n\n", s.vote_passed));

        block.push_str(&format!("TIER 1 REASONING: {}\n", item.reason));

        block
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexus_core::{RawSignal, TokenCategory};

    fn item(symbol: &str) -> FlaggedItem {
        let mut signal = RawSignal::new(symbol, "0xabc", "base", TokenCategory::Memecoin, 1000);
        signal.tvl_usd = 1_250_000.0;
        signal.tvl_change_24h = -42.5;
        FlaggedItem::new(signal, 7, "Liquidity removal: -50.0%", 2000)
    }

    #[test]
    fn test_item_block_contents() {
        let block = BatchPromptFormatter::format_item(3, &item("$PEPE"));

        assert!(block.contains("TOKEN 3:"));
        assert!(block.contains("Symbol: $PEPE"));
        assert!(block.contains("Category: memecoin"));
        assert!(block.contains("- TVL: $1250000 (-42.5%)"));
        assert!(block.contains("Urgency Score: 7/10"));
        assert!(block.contains("TIER 1 REASONING: Liquidity removal: -50.0%"));
    }

    #[test]
    fn test_batch_prompt_numbers_items_in_order() {
        let items = vec![item("$AAA"), item("$BBB")];
        let prompt = BatchPromptFormatter::format_batch_prompt(&items);

        let first = prompt.find("TOKEN 1:").unwrap();
        let second = prompt.find("TOKEN 2:").unwrap();
        assert!(first < second);
        assert!(prompt.contains("I will provide you with 2 flagged tokens"));
        assert!(prompt.contains("DECISION CRITERIA"));
    }
}
