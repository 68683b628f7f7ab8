use anyhow::{bail, Result};
use async_trait::async_trait;
use nexus_core::{now_ms, AnalyzedPlan, Classification, Strategy, TimestampMS};
use serde::Serialize;
use tokio::sync::Mutex;

/// One strategy hand-off accepted by an executor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionRecord {
    pub symbol: String,
    pub strategy: Strategy,
    /// Asset actually traded: the correlated asset for correlated shorts
    pub traded_asset: String,
    pub execution_chain: String,
    /// Plan confidence scaled by the classification multiplier
    pub adjusted_confidence: f64,
    pub sizing_percent: f64,
    pub leverage: u32,
    pub executed_at: TimestampMS,
}

impl ExecutionRecord {
    pub fn new(classification: &Classification, plan: &AnalyzedPlan, executed_at: TimestampMS) -> Self {
        let traded_asset = classification
            .correlated_asset
            .clone()
            .unwrap_or_else(|| plan.symbol.clone());

        Self {
            symbol: plan.symbol.clone(),
            strategy: classification.strategy,
            traded_asset,
            execution_chain: plan.execution_chain.clone(),
            adjusted_confidence: plan.confidence as f64 * classification.confidence_multiplier,
            sizing_percent: plan.sizing_percent,
            leverage: plan.leverage,
            executed_at,
        }
    }
}

/// Trade-execution backend
///
/// Failures are reported to the caller, which logs them and moves on.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, classification: &Classification, plan: &AnalyzedPlan) -> Result<ExecutionRecord>;
}

/// Executor that only records what it would have done
#[derive(Default)]
pub struct PaperExecutor {
    executions: Mutex<Vec<ExecutionRecord>>,
}

impl PaperExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn executions(&self) -> Vec<ExecutionRecord> {
        self.executions.lock().await.clone()
    }

    pub async fn execution_count(&self) -> usize {
        self.executions.lock().await.len()
    }
}

#[async_trait]
impl Executor for PaperExecutor {
    async fn execute(&self, classification: &Classification, plan: &AnalyzedPlan) -> Result<ExecutionRecord> {
        if !classification.is_actionable() {
            bail!(
                "Refusing to execute {}: {}",
                plan.symbol,
                classification.reason
            );
        }

        let record = ExecutionRecord::new(classification, plan, now_ms());
        tracing::info!(
            "[paper] {:?} {} via {} on {} (size {:.0}%, {}x, adjusted confidence {:.1})",
            record.strategy,
            record.symbol,
            record.traded_asset,
            record.execution_chain,
            record.sizing_percent,
            record.leverage,
            record.adjusted_confidence
        );

        self.executions.lock().await.push(record.clone());
        Ok(record)
    }
}
