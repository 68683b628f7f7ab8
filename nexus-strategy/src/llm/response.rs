use nexus_core::{AnalysisSource, AnalyzedPlan, Decision, FlaggedItem, TakeProfitLevel, TimestampMS};
use serde::Deserialize;

use super::AnalysisError;

const DEFAULT_LEVERAGE: u32 = 2;
const TAKE_PROFIT_RUNGS: usize = 3;

fn default_leverage() -> u32 {
    DEFAULT_LEVERAGE
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteTakeProfit {
    pub price_target: f64,
    pub close_percent: f64,
}

/// One element of the remote analyzer's JSON array
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteDecision {
    pub decision: Decision,
    pub confidence: f64,
    pub position_size_percent: f64,
    pub take_profit_levels: Vec<RemoteTakeProfit>,
    pub stop_loss_percent: f64,
    #[serde(default = "default_leverage")]
    pub leverage: u32,
    pub best_execution_chain: String,
    pub reasoning: String,
    #[serde(default)]
    pub risk_factors: Vec<String>,
}

impl RemoteDecision {
    /// Build the plan for the item this decision was aligned with
    ///
    /// Identity fields always come from the input item, never from the
    /// model's echo of them. Fails unless exactly three rungs are present.
    pub fn into_plan(
        self,
        item: &FlaggedItem,
        model: &str,
        analyzed_at: TimestampMS,
    ) -> Result<AnalyzedPlan, AnalysisError> {
        let levels: Vec<TakeProfitLevel> = self
            .take_profit_levels
            .iter()
            .map(|tp| TakeProfitLevel {
                target_percent: tp.price_target,
                close_percent: tp.close_percent,
            })
            .collect();
        let take_profit_levels = <[TakeProfitLevel; TAKE_PROFIT_RUNGS]>::try_from(levels)
            .map_err(|levels| {
                AnalysisError::MalformedResponse(format!(
                    "{} take-profit levels for {}, expected {}",
                    levels.len(),
                    item.signal.symbol,
                    TAKE_PROFIT_RUNGS
                ))
            })?;

        Ok(AnalyzedPlan {
            symbol: item.signal.symbol.clone(),
            address: item.signal.address.clone(),
            chain: item.signal.chain.clone(),
            decision: self.decision,
            confidence: self.confidence.round().clamp(0.0, 100.0) as u8,
            sizing_percent: self.position_size_percent,
            leverage: self.leverage,
            take_profit_levels,
            stop_loss_percent: self.stop_loss_percent,
            execution_chain: self.best_execution_chain,
            reasoning: self.reasoning,
            risk_factors: self.risk_factors,
            urgency_score: item.urgency_score,
            analyzed_at,
            source: AnalysisSource::Remote {
                model: model.to_string(),
            },
        })
    }
}

/// Strip a markdown code fence wrapping the payload, if any
pub fn strip_code_fences(text: &str) -> &str {
    let body = if let Some((_, rest)) = text.split_once("```json") {
        rest.split("```").next().unwrap_or(rest)
    } else if let Some((_, rest)) = text.split_once("```") {
        rest.split("```").next().unwrap_or(rest)
    } else {
        text
    };
    body.trim()
}

/// Parse the remote response text into per-item decisions
///
/// Every decision must carry exactly three take-profit rungs; anything
/// else is a malformed response. Length alignment against the input batch
/// is the caller's concern.
pub fn parse_decisions(text: &str) -> Result<Vec<RemoteDecision>, AnalysisError> {
    let payload = strip_code_fences(text);
    let decisions: Vec<RemoteDecision> = serde_json::from_str(payload)?;

    if let Some((i, d)) = decisions
        .iter()
        .enumerate()
        .find(|(_, d)| d.take_profit_levels.len() != TAKE_PROFIT_RUNGS)
    {
        return Err(AnalysisError::MalformedResponse(format!(
            "analysis {} has {} take-profit levels, expected {}",
            i,
            d.take_profit_levels.len(),
            TAKE_PROFIT_RUNGS
        )));
    }

    Ok(decisions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexus_core::{RawSignal, TokenCategory};

    const ONE_DECISION: &str = r#"[{
        "token_symbol": "WRONG",
        "decision": "SHORT",
        "confidence": 82,
        "position_size_percent": 15.0,
        "take_profit_levels": [
            {"level": 1, "price_target": -20.0, "close_percent": 30},
            {"level": 2, "price_target": -50.0, "close_percent": 40},
            {"level": 3, "price_target": -75.0, "close_percent": 30}
        ],
        "stop_loss_percent": 12.0,
        "best_execution_chain": "arbitrum",
        "reasoning": "Insider dump plus LP removal.",
        "risk_factors": ["insider selling", "thin liquidity"]
    }]"#;

    #[test]
    fn test_strip_json_fence() {
        let wrapped = format!("Here you go:\n```json\n{}\n```\nDone.", ONE_DECISION);
        assert_eq!(strip_code_fences(&wrapped), ONE_DECISION.trim());
    }

    #[test]
    fn test_strip_plain_fence() {
        let wrapped = format!("```\n{}\n```", ONE_DECISION);
        assert_eq!(strip_code_fences(&wrapped), ONE_DECISION.trim());
        assert_eq!(strip_code_fences("  [] "), "[]");
    }

    #[test]
    fn test_parse_and_build_plan() {
        let decisions = parse_decisions(ONE_DECISION).unwrap();
        assert_eq!(decisions.len(), 1);
        assert_eq!(decisions[0].leverage, DEFAULT_LEVERAGE);

        let signal = RawSignal::new("$PEPE", "0xabc", "base", TokenCategory::Memecoin, 1000);
        let item = FlaggedItem::new(signal, 8, "flags", 1000);
        let plan = decisions
            .into_iter()
            .next()
            .unwrap()
            .into_plan(&item, "gemini-2.0-flash", 5000)
            .unwrap();

        assert_eq!(plan.symbol, "$PEPE");
        assert_eq!(plan.decision, Decision::Short);
        assert_eq!(plan.confidence, 82);
        assert_eq!(plan.take_profit_levels[2].target_percent, -75.0);
        assert_eq!(plan.execution_chain, "arbitrum");
        assert_eq!(plan.urgency_score, 8);
        assert!(!plan.from_local_fallback());
    }

    #[test]
    fn test_wrong_rung_count_is_malformed() {
        let text = ONE_DECISION.replace(
            r#"{"level": 3, "price_target": -75.0, "close_percent": 30}"#,
            "",
        );
        let text = text.replace("\"close_percent\": 40},", "\"close_percent\": 40}");
        let err = parse_decisions(&text).unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedResponse(_)));
    }

    #[test]
    fn test_not_json_is_malformed() {
        let err = parse_decisions("I cannot help with that.").unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedResponse(_)));
    }

    #[test]
    fn test_confidence_is_clamped() {
        let text = ONE_DECISION.replace("\"confidence\": 82", "\"confidence\": 140");
        let signal = RawSignal::new("$PEPE", "0xabc", "base", TokenCategory::Memecoin, 1000);
        let item = FlaggedItem::new(signal, 8, "flags", 1000);
        let plan = parse_decisions(&text)
            .unwrap()
            .remove(0)
            .into_plan(&item, "m", 0)
            .unwrap();
        assert_eq!(plan.confidence, 100);
    }

    #[test]
    fn test_unvalidated_decision_with_two_rungs_is_rejected() {
        let mut decision = parse_decisions(ONE_DECISION).unwrap().remove(0);
        decision.take_profit_levels.pop();

        let signal = RawSignal::new("$PEPE", "0xabc", "base", TokenCategory::Memecoin, 1000);
        let item = FlaggedItem::new(signal, 8, "flags", 1000);
        let err = decision.into_plan(&item, "m", 0).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::MalformedResponse(
                "2 take-profit levels for $PEPE, expected 3".to_string()
            )
        );
    }
}
