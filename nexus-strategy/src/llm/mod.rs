pub mod batch_analyzer;
pub mod batch_sizer;
pub mod error;
pub mod llm_client;
pub mod metrics;
pub mod model_chain;
pub mod prompt_formatter;
pub mod rate_limiter;
pub mod response;
pub mod rule_analyzer;

// Re-export commonly used items
pub use batch_analyzer::{
    estimate_request_cost, metered_request_cost, BatchAnalyzer, BatchAnalyzerConfig,
};
pub use batch_sizer::BatchSizer;
pub use error::{AnalysisError, FailureKind};
pub use llm_client::{LlmConfig, OpenAiCompatClient, RemoteAnalyzer, RemoteResponse, TokenUsage};
pub use metrics::{AnalyzerStats, MetricsTimer};
pub use model_chain::ModelFallbackChain;
pub use prompt_formatter::BatchPromptFormatter;
pub use rate_limiter::RateLimiter;
pub use response::{parse_decisions, strip_code_fences, RemoteDecision, RemoteTakeProfit};
pub use rule_analyzer::RuleBasedAnalyzer;
