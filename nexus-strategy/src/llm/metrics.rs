//! Tier-2 analysis metrics
//!
//! Counters and latency tracking for the batch analyzer:
//! - Decision distribution (short / monitor / pass)
//! - Remote resilience events (rate limits, model fallbacks, splits, errors)
//! - Local fallback usage
//! - Estimated API spend and smoothed batch latency

use nexus_core::{AnalyzedPlan, Decision};
use serde::Serialize;
use std::time::{Duration, Instant};

/// Weight of the newest sample in the processing-time moving average
const LATENCY_EMA_ALPHA: f64 = 0.2;

/// Running statistics for the batch analyzer
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalyzerStats {
    pub total_analyzed: u64,
    pub shorts: u64,
    pub monitors: u64,
    pub passes: u64,

    pub rate_limit_hits: u64,
    pub model_fallbacks: u64,
    pub batches_split: u64,
    pub batch_requests: u64,
    pub api_errors: u64,
    pub local_fallbacks: u64,

    pub total_api_cost_usd: f64,

    /// Exponential moving average of top-level batch latency
    pub avg_processing_time_ms: f64,
}

impl AnalyzerStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count decisions of freshly produced plans
    pub fn record_plans(&mut self, plans: &[AnalyzedPlan]) {
        for plan in plans {
            self.total_analyzed += 1;
            match plan.decision {
                Decision::Short => self.shorts += 1,
                Decision::Monitor => self.monitors += 1,
                Decision::Pass => self.passes += 1,
            }
        }
    }

    /// Fold a batch latency into the moving average
    pub fn record_latency(&mut self, duration: Duration) {
        let sample = duration.as_secs_f64() * 1000.0;
        if self.avg_processing_time_ms == 0.0 {
            self.avg_processing_time_ms = sample;
        } else {
            self.avg_processing_time_ms =
                LATENCY_EMA_ALPHA * sample + (1.0 - LATENCY_EMA_ALPHA) * self.avg_processing_time_ms;
        }
    }

    pub fn short_rate(&self) -> f64 {
        if self.total_analyzed == 0 {
            0.0
        } else {
            self.shorts as f64 / self.total_analyzed as f64
        }
    }

    /// Report metrics to tracing logs
    pub fn report(&self) {
        tracing::info!(
            "Analyzer Metrics: analyzed={}, short={}, monitor={}, pass={}, short_rate={:.1}%, avg_latency={:.1}ms",
            self.total_analyzed,
            self.shorts,
            self.monitors,
            self.passes,
            self.short_rate() * 100.0,
            self.avg_processing_time_ms,
        );
        tracing::info!(
            "Remote Metrics: requests={}, rate_limits={}, model_fallbacks={}, splits={}, api_errors={}, local_fallbacks={}, cost=${:.4}",
            self.batch_requests,
            self.rate_limit_hits,
            self.model_fallbacks,
            self.batches_split,
            self.api_errors,
            self.local_fallbacks,
            self.total_api_cost_usd,
        );
    }
}

/// Timer helper for measuring operation latency
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    /// Start a new timer
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Stop the timer and return elapsed duration
    pub fn stop(self) -> Duration {
        self.start.elapsed()
    }
}
