//! Shared fixtures for the nexus-strategy integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use nexus_core::{FlaggedItem, RawSignal, TokenCategory};
use nexus_strategy::{AnalysisError, BatchAnalyzerConfig, RemoteAnalyzer, RemoteResponse};
use serde_json::json;
use std::sync::Mutex;
use std::time::Duration;

/// Decides the outcome of a call from (call index, model, symbols in prompt)
pub type Responder =
    Box<dyn Fn(usize, &str, &[String]) -> Result<String, AnalysisError> + Send + Sync>;

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub model: String,
    pub symbols: Vec<String>,
}

/// Remote analyzer fake driven by a responder closure, recording every call
pub struct ScriptedRemote {
    responder: Responder,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedRemote {
    pub fn new(responder: Responder) -> Self {
        Self {
            responder,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answers every call with one well-formed decision per item
    pub fn echo() -> Self {
        Self::new(Box::new(|_, _, symbols| Ok(echo_response(symbols))))
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn models_called(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.model).collect()
    }

    pub fn chunk_sizes(&self) -> Vec<usize> {
        self.calls().iter().map(|c| c.symbols.len()).collect()
    }
}

#[async_trait]
impl RemoteAnalyzer for ScriptedRemote {
    async fn call_model(&self, model: &str, prompt: &str) -> Result<RemoteResponse, AnalysisError> {
        let symbols = symbols_in(prompt);
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(RecordedCall {
                model: model.to_string(),
                symbols: symbols.clone(),
            });
            calls.len() - 1
        };

        (self.responder)(index, model, &symbols).map(|text| RemoteResponse {
            text,
            tokens_used: None,
        })
    }
}

/// Symbols of the items in a batch prompt, in prompt order
pub fn symbols_in(prompt: &str) -> Vec<String> {
    prompt
        .lines()
        .filter_map(|line| line.strip_prefix("Symbol: "))
        .map(str::to_string)
        .collect()
}

/// JSON array with one SHORT decision per symbol; reasoning echoes the symbol
pub fn echo_response(symbols: &[String]) -> String {
    let decisions: Vec<_> = symbols
        .iter()
        .map(|symbol| {
            json!({
                "token_symbol": symbol,
                "decision": "SHORT",
                "confidence": 88,
                "position_size_percent": 15.0,
                "take_profit_levels": [
                    {"level": 1, "price_target": -25.0, "close_percent": 30},
                    {"level": 2, "price_target": -50.0, "close_percent": 40},
                    {"level": 3, "price_target": -75.0, "close_percent": 30}
                ],
                "stop_loss_percent": 12.0,
                "leverage": 3,
                "best_execution_chain": "arbitrum",
                "reasoning": symbol,
                "risk_factors": ["Insider dump"]
            })
        })
        .collect();
    serde_json::Value::Array(decisions).to_string()
}

pub fn flagged_items(count: usize) -> Vec<FlaggedItem> {
    (0..count)
        .map(|i| {
            let mut signal = RawSignal::new(
                format!("$TOK{:02}", i),
                format!("0x{:040x}", i),
                "base",
                TokenCategory::Memecoin,
                1_700_000_000_000,
            );
            signal.liquidity_change_24h = -45.0;
            signal.tvl_change_24h = -50.0;
            signal.tvl_usd = 1_000_000.0;
            FlaggedItem::new(signal, 6, "Liquidity removal | TVL collapse", 1_700_000_000_000)
        })
        .collect()
}

pub fn symbols_of(items: &[FlaggedItem]) -> Vec<String> {
    items.iter().map(|i| i.signal.symbol.clone()).collect()
}

/// Analyzer config with millisecond delays and no request spacing
pub fn fast_config(models: &[&str]) -> BatchAnalyzerConfig {
    BatchAnalyzerConfig {
        models: models.iter().map(|m| m.to_string()).collect(),
        min_request_interval: Duration::ZERO,
        retry_delays: vec![Duration::from_millis(1); 3],
        inter_chunk_delay: Duration::from_millis(1),
        ..BatchAnalyzerConfig::default()
    }
}
