pub mod llm;
pub mod strategy;

// Re-export commonly used items from llm module
pub use llm::{
    AnalysisError, AnalyzerStats, BatchAnalyzer, BatchAnalyzerConfig, BatchSizer, FailureKind,
    LlmConfig, ModelFallbackChain, OpenAiCompatClient, RateLimiter, RemoteAnalyzer,
    RemoteResponse, RuleBasedAnalyzer, TokenUsage,
};

// Re-export commonly used items from strategy module
pub use strategy::{
    CycleSummary, ExecutionRecord, Executor, Orchestrator, OrchestratorConfig, PaperExecutor,
    SignalClassifier,
};
