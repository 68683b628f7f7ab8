use nexus_strategy::{BatchAnalyzerConfig, LlmConfig, OrchestratorConfig};
use std::time::Duration;

/// Agent configuration
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Cycles to run; 0 runs until interrupted
    pub cycles: u64,
    pub cycle_interval: Duration,
    pub signals_per_cycle: usize,
    pub rug_ratio: f64,
    pub seed: u64,

    /// Remote models in preference order; ignored without an API key
    pub models: Vec<String>,
    pub api_key: Option<String>,
    pub api_base: String,
    pub min_request_interval: Duration,

    pub tier1_batch_size: usize,
    pub min_confidence: u8,
    pub max_executions_per_cycle: usize,
    pub price_cache_ttl: Duration,
}

impl Default for AgentConfig {
    fn default() -> Self {
        let analyzer = BatchAnalyzerConfig::default();
        let orchestrator = OrchestratorConfig::default();
        Self {
            cycles: 1,
            cycle_interval: Duration::from_secs(60),
            signals_per_cycle: 500,
            rug_ratio: 0.05,
            seed: 42,
            models: analyzer.models,
            api_key: None,
            api_base: LlmConfig::default().api_base,
            min_request_interval: analyzer.min_request_interval,
            tier1_batch_size: orchestrator.tier1_batch_size,
            min_confidence: orchestrator.min_confidence,
            max_executions_per_cycle: orchestrator.max_executions_per_cycle,
            price_cache_ttl: Duration::from_secs(300),
        }
    }
}

impl AgentConfig {
    /// API key, if one was given and is not blank
    pub fn remote_api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn analyzer_config(&self) -> BatchAnalyzerConfig {
        BatchAnalyzerConfig {
            models: self.models.clone(),
            min_request_interval: self.min_request_interval,
            ..BatchAnalyzerConfig::default()
        }
    }

    pub fn llm_config(&self) -> LlmConfig {
        LlmConfig {
            api_base: self.api_base.clone(),
            ..LlmConfig::default()
        }
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            tier1_batch_size: self.tier1_batch_size,
            min_confidence: self.min_confidence,
            max_executions_per_cycle: self.max_executions_per_cycle,
        }
    }
}

/// Split a comma-separated model list, dropping blanks
pub fn parse_models(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}
