/// Routing of analyzed plans to execution strategies
pub mod classifier;
pub mod executor;
pub mod orchestrator;

pub use classifier::SignalClassifier;
pub use executor::{ExecutionRecord, Executor, PaperExecutor};
pub use orchestrator::{
    CycleSummary, ExecutionOutcome, FullStats, Orchestrator, OrchestratorConfig,
    OrchestratorStats, StageError,
};
