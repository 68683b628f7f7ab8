//! Resilient batched Tier-2 analysis
//!
//! Packs flagged items into remote requests, absorbs remote failures through
//! model fallback, splitting and backoff, and falls back to the rule-based
//! analyzer once every remote avenue is spent. `analyze_batch` always returns
//! exactly one plan per input item, in input order.

use futures::future::{BoxFuture, FutureExt};
use nexus_core::{now_ms, AnalyzedPlan, FlaggedItem};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::{
    parse_decisions, AnalysisError, AnalyzerStats, BatchPromptFormatter, BatchSizer,
    FailureKind, MetricsTimer, ModelFallbackChain, RateLimiter, RemoteAnalyzer, RemoteResponse,
    RuleBasedAnalyzer, TokenUsage,
};

const CHARS_PER_TOKEN: f64 = 4.0;
const INPUT_USD_PER_MILLION_TOKENS: f64 = 1.25;
const OUTPUT_USD_PER_MILLION_TOKENS: f64 = 5.0;

/// Configuration for the batch analyzer
#[derive(Debug, Clone)]
pub struct BatchAnalyzerConfig {
    /// Models in preference order
    pub models: Vec<String>,
    pub min_request_interval: Duration,
    /// One entry per retry; its length is the retry budget of a batch job
    pub retry_delays: Vec<Duration>,
    /// Pause between sequential chunks of a split batch
    pub inter_chunk_delay: Duration,
    pub max_items_per_request: usize,
    pub max_token_budget: usize,
}

impl Default for BatchAnalyzerConfig {
    fn default() -> Self {
        Self {
            models: vec![
                "gemini-2.0-flash".to_string(),
                "gemini-1.5-flash".to_string(),
                "gemini-1.5-flash-8b".to_string(),
                "gemini-1.5-pro".to_string(),
            ],
            min_request_interval: Duration::from_secs(1),
            retry_delays: vec![
                Duration::from_secs(3),
                Duration::from_secs(6),
                Duration::from_secs(12),
            ],
            inter_chunk_delay: Duration::from_secs(2),
            max_items_per_request: 20,
            max_token_budget: 30_000,
        }
    }
}

/// Items awaiting one remote call, with the retries already spent on them
struct BatchJob<'a> {
    items: &'a [FlaggedItem],
    retries: usize,
}

/// Remote batch analyzer with local fallback
///
/// Without a remote analyzer every batch is analyzed locally.
pub struct BatchAnalyzer {
    remote: Option<Arc<dyn RemoteAnalyzer>>,
    chain: ModelFallbackChain,
    rate_limiter: RateLimiter,
    sizer: BatchSizer,
    local: RuleBasedAnalyzer,
    retry_delays: Vec<Duration>,
    inter_chunk_delay: Duration,
    stats: AnalyzerStats,
}

impl BatchAnalyzer {
    pub fn new(config: BatchAnalyzerConfig, remote: Option<Arc<dyn RemoteAnalyzer>>) -> Self {
        match &remote {
            Some(_) => info!(
                "Batch analyzer using remote models {:?} (min interval {:?}, {} retries)",
                config.models,
                config.min_request_interval,
                config.retry_delays.len()
            ),
            None => info!("Batch analyzer running in local rule-based mode"),
        }

        Self {
            remote,
            chain: ModelFallbackChain::new(config.models),
            rate_limiter: RateLimiter::new(config.min_request_interval),
            sizer: BatchSizer::new(config.max_items_per_request, config.max_token_budget),
            local: RuleBasedAnalyzer::new(),
            retry_delays: config.retry_delays,
            inter_chunk_delay: config.inter_chunk_delay,
            stats: AnalyzerStats::new(),
        }
    }

    /// Analyzer that never calls out
    pub fn local_only(config: BatchAnalyzerConfig) -> Self {
        Self::new(config, None)
    }

    pub fn is_remote(&self) -> bool {
        self.remote.is_some()
    }

    pub fn stats(&self) -> &AnalyzerStats {
        &self.stats
    }

    pub fn current_model(&self) -> &str {
        self.chain.current()
    }

    /// Analyze flagged items, one plan per item in input order
    pub async fn analyze_batch(&mut self, items: &[FlaggedItem]) -> Vec<AnalyzedPlan> {
        if items.is_empty() {
            return Vec::new();
        }

        info!("Analyzing batch of {} flagged items", items.len());
        let timer = MetricsTimer::start();

        let plans = self.process(items).await;

        self.stats.record_plans(&plans);
        self.stats.record_latency(timer.stop());
        debug_assert_eq!(plans.len(), items.len());

        info!(
            "Batch complete: {} plans ({} short, {} local fallback)",
            plans.len(),
            plans.iter().filter(|p| p.is_short()).count(),
            plans.iter().filter(|p| p.from_local_fallback()).count()
        );
        plans
    }

    /// Route one (sub-)batch: local mode, split, or remote attempt loop
    fn process<'a>(&'a mut self, items: &'a [FlaggedItem]) -> BoxFuture<'a, Vec<AnalyzedPlan>> {
        async move {
            if self.remote.is_none() {
                return self.local.analyze_batch(items);
            }
            if self.sizer.should_split(items) {
                let tokens = self.sizer.estimate_tokens(items);
                warn!(
                    "Batch of {} items (~{} tokens) exceeds request limits, splitting",
                    items.len(),
                    tokens
                );
                return self.split(items).await;
            }
            self.attempt(items).await
        }
        .boxed()
    }

    async fn split(&mut self, items: &[FlaggedItem]) -> Vec<AnalyzedPlan> {
        let chunks = self.sizer.plan_split(items);
        self.stats.batches_split += 1;
        info!(
            "Split {} items into {} chunks",
            items.len(),
            chunks.len()
        );

        let mut plans = Vec::with_capacity(items.len());
        for (i, chunk) in chunks.into_iter().enumerate() {
            if i > 0 && !self.inter_chunk_delay.is_zero() {
                tokio::time::sleep(self.inter_chunk_delay).await;
            }
            plans.extend(self.process(chunk).await);
        }
        plans
    }

    async fn attempt(&mut self, items: &[FlaggedItem]) -> Vec<AnalyzedPlan> {
        let Some(remote) = self.remote.clone() else {
            return self.local.analyze_batch(items);
        };

        let prompt = BatchPromptFormatter::format_batch_prompt(items);
        let mut job = BatchJob { items, retries: 0 };

        loop {
            self.rate_limiter.wait().await;
            let model = self.chain.current().to_string();
            debug!(
                "Remote request: model={}, items={}, retries={}",
                model,
                job.items.len(),
                job.retries
            );

            let failure = match remote.call_model(&model, &prompt).await {
                Ok(response) => match parse_decisions(&response.text) {
                    Ok(decisions) => {
                        self.stats.batch_requests += 1;
                        self.record_cost(&model, &prompt, &response);

                        if decisions.len() != job.items.len() {
                            let mismatch = AnalysisError::ResponseMismatch {
                                expected: job.items.len(),
                                got: decisions.len(),
                            };
                            warn!("{} from {}", mismatch, model);
                            return self.local_fallback(job.items, &mismatch);
                        }

                        let analyzed_at = now_ms();
                        match decisions
                            .into_iter()
                            .zip(job.items)
                            .map(|(decision, item)| decision.into_plan(item, &model, analyzed_at))
                            .collect::<Result<Vec<_>, _>>()
                        {
                            Ok(plans) => {
                                info!(
                                    "Received remote analysis for {} items from {}",
                                    plans.len(),
                                    model
                                );
                                return plans;
                            }
                            Err(err) => err,
                        }
                    }
                    Err(err) => err,
                },
                Err(err) => err,
            };

            error!("Remote analysis failed on {}: {}", model, failure);

            match failure.kind() {
                FailureKind::NotFound => {
                    if self.advance_model() {
                        continue;
                    }
                    return self.local_fallback(job.items, &failure);
                }
                FailureKind::RateLimited => {
                    self.stats.rate_limit_hits += 1;
                    if self.advance_model() {
                        continue;
                    }
                    if job.items.len() > 1 {
                        return self.split(job.items).await;
                    }
                }
                FailureKind::QuotaExhausted if job.items.len() > 1 => {
                    return self.split(job.items).await;
                }
                FailureKind::QuotaExhausted | FailureKind::Other => {
                    self.stats.api_errors += 1;
                }
            }

            match self.retry_delays.get(job.retries).copied() {
                Some(delay) => {
                    job.retries += 1;
                    warn!(
                        "Retrying in {:?} (retry {}/{})",
                        delay,
                        job.retries,
                        self.retry_delays.len()
                    );
                    tokio::time::sleep(delay).await;
                }
                None => return self.local_fallback(job.items, &failure),
            }
        }
    }

    fn advance_model(&mut self) -> bool {
        let advanced = self.chain.advance();
        if advanced {
            self.stats.model_fallbacks += 1;
        }
        advanced
    }

    fn local_fallback(&mut self, items: &[FlaggedItem], cause: &AnalysisError) -> Vec<AnalyzedPlan> {
        warn!(
            "Falling back to rule-based analysis for {} items: {}",
            items.len(),
            cause
        );
        self.stats.local_fallbacks += 1;
        self.local.analyze_batch(items)
    }

    fn record_cost(&mut self, model: &str, prompt: &str, response: &RemoteResponse) {
        let cost = match response.tokens_used {
            Some(usage) => metered_request_cost(model, usage),
            None => estimate_request_cost(model, prompt.len(), response.text.len()),
        };
        self.stats.total_api_cost_usd += cost;
        debug!("Request cost on {}: ${:.4}", model, cost);
    }
}

fn token_cost(model: &str, input_tokens: f64, output_tokens: f64) -> f64 {
    if model.to_lowercase().contains("flash") {
        return 0.0;
    }
    input_tokens / 1_000_000.0 * INPUT_USD_PER_MILLION_TOKENS
        + output_tokens / 1_000_000.0 * OUTPUT_USD_PER_MILLION_TOKENS
}

/// Estimated USD cost of one request from its character counts
///
/// Flash-class models are treated as free tier.
pub fn estimate_request_cost(model: &str, prompt_chars: usize, response_chars: usize) -> f64 {
    token_cost(
        model,
        prompt_chars as f64 / CHARS_PER_TOKEN,
        response_chars as f64 / CHARS_PER_TOKEN,
    )
}

/// USD cost of one request from the provider's reported token usage
pub fn metered_request_cost(model: &str, usage: TokenUsage) -> f64 {
    token_cost(
        model,
        f64::from(usage.prompt_tokens),
        f64::from(usage.completion_tokens),
    )
}
