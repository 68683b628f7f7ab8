use anyhow::{Context, Result};
use nexus_data::{
    CachedPriceOracle, MockSignalGenerator, PriceOracle, RuleBasedScreener, StaticPriceOracle,
};
use nexus_strategy::strategy::FullStats;
use nexus_strategy::{BatchAnalyzer, OpenAiCompatClient, Orchestrator, PaperExecutor, RemoteAnalyzer};
use std::sync::Arc;

use crate::config::AgentConfig;

/// Mock-fed screening agent running orchestrator cycles
pub struct Agent {
    config: AgentConfig,
    generator: MockSignalGenerator,
    orchestrator: Orchestrator,
}

impl Agent {
    pub fn new(config: AgentConfig) -> Result<Self> {
        let remote: Option<Arc<dyn RemoteAnalyzer>> = match config.remote_api_key() {
            Some(key) => {
                let client: Arc<dyn RemoteAnalyzer> = Arc::new(
                    OpenAiCompatClient::new(config.llm_config(), key.to_string())
                        .context("Failed to initialize remote analyzer")?,
                );
                Some(client)
            }
            None => {
                tracing::warn!("No API key configured, Tier 2 runs rule-based only");
                None
            }
        };

        let oracle: Arc<dyn PriceOracle> = Arc::new(CachedPriceOracle::new(
            Arc::new(StaticPriceOracle::post_rug()),
            config.price_cache_ttl,
            10_000,
        ));

        let orchestrator = Orchestrator::new(
            config.orchestrator_config(),
            Box::new(RuleBasedScreener::new()),
            BatchAnalyzer::new(config.analyzer_config(), remote),
            oracle,
            Arc::new(PaperExecutor::new()),
        );

        Ok(Self {
            generator: MockSignalGenerator::new(config.seed),
            config,
            orchestrator,
        })
    }

    /// Run the configured number of cycles, or until ctrl-c when unbounded
    pub async fn run(&mut self) -> Result<FullStats> {
        let mut completed = 0u64;

        loop {
            let signals = self
                .generator
                .generate_batch(self.config.signals_per_cycle, self.config.rug_ratio);
            self.orchestrator.ingest(signals);
            self.orchestrator.run_cycle().await;
            completed += 1;

            if self.config.cycles != 0 && completed >= self.config.cycles {
                break;
            }

            tracing::info!(
                "Next cycle in {}s",
                self.config.cycle_interval.as_secs()
            );
            tokio::select! {
                _ = tokio::time::sleep(self.config.cycle_interval) => {}
                signal = tokio::signal::ctrl_c() => {
                    signal.context("Failed to listen for ctrl-c")?;
                    tracing::info!("Interrupted, stopping after {} cycles", completed);
                    break;
                }
            }
        }

        for plan in self.orchestrator.short_recommendations(self.config.min_confidence) {
            tracing::info!(
                "SHORT {} on {}: confidence {}%, size {:.0}%, {}x",
                plan.symbol,
                plan.execution_chain,
                plan.confidence,
                plan.sizing_percent,
                plan.leverage
            );
        }
        self.orchestrator.analyzer_stats().report();

        Ok(self.orchestrator.full_stats())
    }
}
