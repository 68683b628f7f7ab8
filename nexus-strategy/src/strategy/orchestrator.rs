use chrono::{DateTime, Utc};
use futures::future::join_all;
use nexus_core::{now_ms, AnalyzedPlan, Classification, Decision, FlaggedItem, RawSignal, TimestampMS};
use nexus_data::{PriceOracle, Screener, ScreeningStats};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info};

use super::{ExecutionRecord, Executor, SignalClassifier};
use crate::llm::{AnalyzerStats, BatchAnalyzer};

/// Configuration for the screening pipeline
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Signals screened per Tier-1 batch
    pub tier1_batch_size: usize,

    /// Minimum SHORT confidence handed to the executor
    pub min_confidence: u8,

    /// Cap on executor hand-offs per cycle
    pub max_executions_per_cycle: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            tier1_batch_size: 100,
            min_confidence: 70,
            max_executions_per_cycle: 5,
        }
    }
}

/// Aggregated pipeline counters
#[derive(Debug, Clone, Default, Serialize)]
pub struct OrchestratorStats {
    pub total_signals_ingested: u64,
    pub tier1_processed: u64,
    pub tier1_flagged: u64,
    pub tier2_analyzed: u64,
    pub tier2_shorts: u64,
    pub tier2_monitors: u64,
    pub tier2_passes: u64,
    pub executions: u64,
    pub execution_failures: u64,
    pub cycles_completed: u64,
    pub total_runtime_seconds: f64,
}

/// Non-fatal error recorded by a pipeline stage
#[derive(Debug, Clone, Serialize)]
pub struct StageError {
    pub stage: String,
    pub error: String,
    pub timestamp: DateTime<Utc>,
}

/// Result of one executor hand-off
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionOutcome {
    pub symbol: String,
    pub classification: Classification,
    pub record: Option<ExecutionRecord>,
    pub error: Option<String>,
}

/// Outcome of one screening cycle
#[derive(Debug, Clone, Serialize)]
pub struct CycleSummary {
    pub cycle_number: u64,
    pub cycle_time_seconds: f64,
    pub signals_processed: usize,
    pub tier1_batches: usize,
    pub tier1_flagged: usize,
    pub tier2_analyzed: usize,
    pub tier2_shorts: usize,
    pub tier2_monitors: usize,
    pub tier2_passes: usize,
    pub executions: Vec<ExecutionOutcome>,
    pub api_cost_usd: f64,
    pub timestamp: DateTime<Utc>,
}

impl CycleSummary {
    pub fn report(&self) {
        info!("{}", "=".repeat(80));
        info!("CYCLE #{} COMPLETE", self.cycle_number);
        info!("  Time: {:.2}s", self.cycle_time_seconds);
        info!(
            "  Tier 1: {} processed -> {} flagged ({} batches)",
            self.signals_processed, self.tier1_flagged, self.tier1_batches
        );
        info!(
            "  Tier 2: {} shorts, {} monitors, {} passes",
            self.tier2_shorts, self.tier2_monitors, self.tier2_passes
        );
        info!(
            "  Executions: {} ({} failed)",
            self.executions.len(),
            self.executions.iter().filter(|e| e.error.is_some()).count()
        );
        info!("  Cost: ${:.4}", self.api_cost_usd);
        info!("{}", "=".repeat(80));
    }
}

/// Snapshot of every component's statistics
#[derive(Debug, Clone, Serialize)]
pub struct FullStats {
    pub system: OrchestratorStats,
    pub errors: Vec<StageError>,
    pub tier1: ScreeningStats,
    pub tier2: AnalyzerStats,
    pub pending_signals: usize,
    pub total_plans: usize,
    pub timestamp: DateTime<Utc>,
}

/// Two-tier screening pipeline
///
/// Raw signals are queued, screened by Tier 1 in fixed-size batches,
/// analyzed together by the batch analyzer, and the strongest SHORT plans
/// are classified and handed to the executor. Stage errors are logged and
/// recorded, never propagated.
pub struct Orchestrator {
    config: OrchestratorConfig,
    screener: Box<dyn Screener>,
    analyzer: BatchAnalyzer,
    classifier: SignalClassifier,
    oracle: Arc<dyn PriceOracle>,
    executor: Arc<dyn Executor>,
    signal_queue: VecDeque<RawSignal>,
    plans: Vec<AnalyzedPlan>,
    stats: OrchestratorStats,
    errors: Vec<StageError>,
}

impl Orchestrator {
    pub fn new(
        config: OrchestratorConfig,
        screener: Box<dyn Screener>,
        analyzer: BatchAnalyzer,
        oracle: Arc<dyn PriceOracle>,
        executor: Arc<dyn Executor>,
    ) -> Self {
        info!(
            "Orchestrator initialized: tier1_batch_size={}, min_confidence={}, max_executions={}",
            config.tier1_batch_size, config.min_confidence, config.max_executions_per_cycle
        );

        Self {
            config,
            screener,
            analyzer,
            classifier: SignalClassifier::new(),
            oracle,
            executor,
            signal_queue: VecDeque::new(),
            plans: Vec::new(),
            stats: OrchestratorStats::default(),
            errors: Vec::new(),
        }
    }

    /// Queue raw signals for the next cycle
    pub fn ingest(&mut self, signals: impl IntoIterator<Item = RawSignal>) {
        let before = self.signal_queue.len();
        self.signal_queue.extend(signals);
        let added = self.signal_queue.len() - before;
        self.stats.total_signals_ingested += added as u64;
        info!(
            "Ingested {} signals, {} pending",
            added,
            self.signal_queue.len()
        );
    }

    pub fn pending_signals(&self) -> usize {
        self.signal_queue.len()
    }

    /// Screen the next Tier-1 batch from the queue
    pub fn process_tier1_batch(&mut self) -> Vec<FlaggedItem> {
        let take = self.config.tier1_batch_size.max(1).min(self.signal_queue.len());
        if take == 0 {
            return Vec::new();
        }

        let batch: Vec<RawSignal> = self.signal_queue.drain(..take).collect();
        let flagged = self.screener.screen_batch(&batch);

        self.stats.tier1_processed += batch.len() as u64;
        self.stats.tier1_flagged += flagged.len() as u64;
        info!(
            "Tier 1 complete: {}/{} flagged ({:.1}% flag rate)",
            flagged.len(),
            batch.len(),
            flagged.len() as f64 / batch.len() as f64 * 100.0
        );
        flagged
    }

    /// Analyze flagged items and retain the plans
    pub async fn process_tier2(&mut self, flagged: &[FlaggedItem]) -> Vec<AnalyzedPlan> {
        if flagged.is_empty() {
            return Vec::new();
        }

        info!("Processing Tier 2 batch ({} items)", flagged.len());
        let plans = self.analyzer.analyze_batch(flagged).await;

        self.stats.tier2_analyzed += plans.len() as u64;
        for plan in &plans {
            match plan.decision {
                Decision::Short => self.stats.tier2_shorts += 1,
                Decision::Monitor => self.stats.tier2_monitors += 1,
                Decision::Pass => self.stats.tier2_passes += 1,
            }
        }
        self.plans.extend(plans.iter().cloned());
        plans
    }

    /// Classify and execute the strongest SHORT plans
    ///
    /// Quotes for all candidates are fetched concurrently; execution is
    /// sequential and in plan order.
    pub async fn execute_plans(&mut self, plans: &[AnalyzedPlan]) -> Vec<ExecutionOutcome> {
        let candidates: Vec<&AnalyzedPlan> = plans
            .iter()
            .filter(|p| p.is_short() && p.confidence >= self.config.min_confidence)
            .take(self.config.max_executions_per_cycle)
            .collect();
        if candidates.is_empty() {
            return Vec::new();
        }

        let oracle = &self.oracle;
        let prices = join_all(candidates.iter().map(|plan| async move {
            if SignalClassifier::needs_price(plan) {
                oracle.get_price_data(&plan.address, &plan.chain).await
            } else {
                None
            }
        }))
        .await;

        let mut outcomes = Vec::with_capacity(candidates.len());
        for (plan, price) in candidates.into_iter().zip(prices) {
            let classification = self.classifier.classify(plan, price.as_ref());
            info!(
                "{} -> {:?} (confidence {} x {:.1})",
                plan.symbol, classification.strategy, plan.confidence, classification.confidence_multiplier
            );

            let outcome = match self.executor.execute(&classification, plan).await {
                Ok(record) => {
                    self.stats.executions += 1;
                    ExecutionOutcome {
                        symbol: plan.symbol.clone(),
                        classification,
                        record: Some(record),
                        error: None,
                    }
                }
                Err(e) => {
                    error!("Execution failed for {}: {:#}", plan.symbol, e);
                    self.stats.execution_failures += 1;
                    self.record_error("execution", format!("{}: {:#}", plan.symbol, e));
                    ExecutionOutcome {
                        symbol: plan.symbol.clone(),
                        classification,
                        record: None,
                        error: Some(format!("{:#}", e)),
                    }
                }
            };
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Run one full cycle over every queued signal
    pub async fn run_cycle(&mut self) -> CycleSummary {
        let started = Instant::now();
        let cycle_number = self.stats.cycles_completed + 1;
        let signals_processed = self.signal_queue.len();

        info!("{}", "=".repeat(80));
        info!("STARTING CYCLE #{} ({} signals)", cycle_number, signals_processed);
        info!("{}", "=".repeat(80));

        let mut tier1_batches = 0;
        let mut flagged = Vec::new();
        while !self.signal_queue.is_empty() {
            flagged.extend(self.process_tier1_batch());
            tier1_batches += 1;
        }

        let plans = self.process_tier2(&flagged).await;
        let executions = self.execute_plans(&plans).await;

        let cycle_time = started.elapsed().as_secs_f64();
        self.stats.total_runtime_seconds += cycle_time;
        self.stats.cycles_completed = cycle_number;

        let count = |decision: Decision| plans.iter().filter(|p| p.decision == decision).count();
        let summary = CycleSummary {
            cycle_number,
            cycle_time_seconds: cycle_time,
            signals_processed,
            tier1_batches,
            tier1_flagged: flagged.len(),
            tier2_analyzed: plans.len(),
            tier2_shorts: count(Decision::Short),
            tier2_monitors: count(Decision::Monitor),
            tier2_passes: count(Decision::Pass),
            executions,
            api_cost_usd: self.analyzer.stats().total_api_cost_usd,
            timestamp: Utc::now(),
        };
        summary.report();
        summary
    }

    /// Retained SHORT plans at or above a confidence
    pub fn short_recommendations(&self, min_confidence: u8) -> Vec<&AnalyzedPlan> {
        self.plans
            .iter()
            .filter(|p| p.is_short() && p.confidence >= min_confidence)
            .collect()
    }

    pub fn monitor_list(&self) -> Vec<&AnalyzedPlan> {
        self.plans
            .iter()
            .filter(|p| p.decision == Decision::Monitor)
            .collect()
    }

    pub fn plans(&self) -> &[AnalyzedPlan] {
        &self.plans
    }

    /// Drop retained plans older than `max_age`; returns how many were dropped
    pub fn clear_old_plans(&mut self, max_age: Duration) -> usize {
        let cutoff = now_ms().saturating_sub(max_age.as_millis() as TimestampMS);
        self.clear_plans_before(cutoff)
    }

    /// Drop retained plans analyzed before `cutoff`
    pub fn clear_plans_before(&mut self, cutoff: TimestampMS) -> usize {
        let before = self.plans.len();
        self.plans.retain(|p| p.analyzed_at >= cutoff);
        let removed = before - self.plans.len();
        if removed > 0 {
            info!("Cleared {} plans analyzed before {}", removed, cutoff);
        }
        removed
    }

    pub fn stats(&self) -> &OrchestratorStats {
        &self.stats
    }

    pub fn errors(&self) -> &[StageError] {
        &self.errors
    }

    pub fn analyzer_stats(&self) -> &AnalyzerStats {
        self.analyzer.stats()
    }

    pub fn full_stats(&self) -> FullStats {
        FullStats {
            system: self.stats.clone(),
            errors: self.errors.clone(),
            tier1: self.screener.stats(),
            tier2: self.analyzer.stats().clone(),
            pending_signals: self.signal_queue.len(),
            total_plans: self.plans.len(),
            timestamp: Utc::now(),
        }
    }

    fn record_error(&mut self, stage: &str, error: String) {
        self.errors.push(StageError {
            stage: stage.to_string(),
            error,
            timestamp: Utc::now(),
        });
    }
}
