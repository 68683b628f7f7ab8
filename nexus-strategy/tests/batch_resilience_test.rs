/// Batch analyzer resilience: splitting, model fallback, retries and the
/// local fallback, driven through a scripted remote analyzer.

mod common;

use common::{echo_response, fast_config, flagged_items, symbols_of, ScriptedRemote};
use nexus_core::AnalysisSource;
use nexus_strategy::{AnalysisError, BatchAnalyzer};
use std::sync::Arc;

fn analyzer(remote: &Arc<ScriptedRemote>, models: &[&str]) -> BatchAnalyzer {
    BatchAnalyzer::new(fast_config(models), Some(remote.clone()))
}

#[tokio::test]
async fn test_oversized_batch_split_before_any_call() {
    let remote = Arc::new(ScriptedRemote::echo());
    let mut analyzer = analyzer(&remote, &["m1"]);
    let items = flagged_items(25);

    let plans = analyzer.analyze_batch(&items).await;

    // ceil(25 / 3) = 9 per chunk, in order
    assert_eq!(remote.chunk_sizes(), vec![9, 9, 7]);
    assert_eq!(analyzer.stats().batches_split, 1);
    assert_eq!(analyzer.stats().batch_requests, 3);

    let symbols: Vec<String> = plans.iter().map(|p| p.symbol.clone()).collect();
    assert_eq!(symbols, symbols_of(&items));
    // each plan came from the decision aligned with its own item
    assert!(plans.iter().all(|p| p.reasoning == p.symbol));
    assert!(plans.iter().all(|p| !p.from_local_fallback()));
}

#[tokio::test]
async fn test_single_item_rate_limited_on_every_model() {
    let remote = Arc::new(ScriptedRemote::new(Box::new(|_, _, _| {
        Err(AnalysisError::RateLimited("429 Too Many Requests".to_string()))
    })));
    let mut analyzer = analyzer(&remote, &["m1", "m2", "m3", "m4"]);

    let plans = analyzer.analyze_batch(&flagged_items(1)).await;

    assert_eq!(plans.len(), 1);
    assert!(plans[0].from_local_fallback());
    // 3 immediate advances, then the 3 retries on the last model
    assert_eq!(
        remote.models_called(),
        vec!["m1", "m2", "m3", "m4", "m4", "m4", "m4"]
    );
    let stats = analyzer.stats();
    assert_eq!(stats.model_fallbacks, 3);
    assert_eq!(stats.rate_limit_hits, 7);
    assert_eq!(stats.local_fallbacks, 1);
    assert_eq!(analyzer.current_model(), "m4");
}

#[tokio::test]
async fn test_short_response_sends_whole_batch_to_local_fallback() {
    let remote = Arc::new(ScriptedRemote::new(Box::new(|_, _, symbols| {
        Ok(echo_response(&symbols[..2]))
    })));
    let mut analyzer = analyzer(&remote, &["m1"]);
    let items = flagged_items(3);

    let plans = analyzer.analyze_batch(&items).await;

    assert_eq!(remote.calls().len(), 1);
    assert_eq!(plans.len(), 3);
    assert!(plans.iter().all(|p| p.from_local_fallback()));
    assert_eq!(
        plans.iter().map(|p| p.symbol.clone()).collect::<Vec<_>>(),
        symbols_of(&items)
    );
    assert_eq!(analyzer.stats().local_fallbacks, 1);
}

#[tokio::test]
async fn test_missing_model_advances_chain_without_backoff() {
    let remote = Arc::new(ScriptedRemote::new(Box::new(|_, model, symbols| {
        if model == "m1" {
            Err(AnalysisError::from_remote_message(
                "404 NOT_FOUND: models/m1 is not found",
            ))
        } else {
            Ok(echo_response(symbols))
        }
    })));
    let mut analyzer = analyzer(&remote, &["m1", "m2"]);

    let plans = analyzer.analyze_batch(&flagged_items(2)).await;

    assert_eq!(remote.models_called(), vec!["m1", "m2"]);
    assert_eq!(analyzer.stats().model_fallbacks, 1);
    assert_eq!(analyzer.stats().api_errors, 0);
    assert!(plans.iter().all(|p| p.source
        == AnalysisSource::Remote {
            model: "m2".to_string()
        }));

    // the chain never moves back for later batches
    analyzer.analyze_batch(&flagged_items(1)).await;
    assert_eq!(remote.models_called().last().map(String::as_str), Some("m2"));
}

#[tokio::test]
async fn test_exhausted_model_chain_falls_back_locally() {
    let remote = Arc::new(ScriptedRemote::new(Box::new(|_, _, _| {
        Err(AnalysisError::ModelNotFound("model does not exist".to_string()))
    })));
    let mut analyzer = analyzer(&remote, &["m1", "m2", "m3"]);

    let plans = analyzer.analyze_batch(&flagged_items(4)).await;

    assert_eq!(remote.models_called(), vec!["m1", "m2", "m3"]);
    assert_eq!(plans.len(), 4);
    assert!(plans.iter().all(|p| p.from_local_fallback()));
}

#[tokio::test]
async fn test_quota_exhaustion_splits_multi_item_batch() {
    let remote = Arc::new(ScriptedRemote::new(Box::new(|index, _, symbols| {
        if index == 0 {
            Err(AnalysisError::QuotaExhausted("token quota exceeded".to_string()))
        } else {
            Ok(echo_response(symbols))
        }
    })));
    let mut analyzer = analyzer(&remote, &["m1"]);
    let items = flagged_items(4);

    let plans = analyzer.analyze_batch(&items).await;

    assert_eq!(remote.chunk_sizes(), vec![4, 2, 2]);
    assert_eq!(analyzer.stats().batches_split, 1);
    assert_eq!(
        plans.iter().map(|p| p.symbol.clone()).collect::<Vec<_>>(),
        symbols_of(&items)
    );
    assert!(plans.iter().all(|p| !p.from_local_fallback()));
}

#[tokio::test]
async fn test_rate_limit_on_last_model_splits_before_backoff() {
    let remote = Arc::new(ScriptedRemote::new(Box::new(|index, _, symbols| {
        if index == 0 {
            Err(AnalysisError::RateLimited("RESOURCE_EXHAUSTED".to_string()))
        } else {
            Ok(echo_response(symbols))
        }
    })));
    let mut analyzer = analyzer(&remote, &["only"]);

    let plans = analyzer.analyze_batch(&flagged_items(3)).await;

    assert_eq!(remote.chunk_sizes(), vec![3, 1, 1, 1]);
    assert_eq!(analyzer.stats().rate_limit_hits, 1);
    assert_eq!(analyzer.stats().model_fallbacks, 0);
    assert!(plans.iter().all(|p| !p.from_local_fallback()));
}

#[tokio::test]
async fn test_transient_error_recovers_within_retry_budget() {
    let remote = Arc::new(ScriptedRemote::new(Box::new(|index, _, symbols| {
        if index < 2 {
            Err(AnalysisError::Transient("503 Service Unavailable".to_string()))
        } else {
            Ok(format!("```json\n{}\n```", echo_response(symbols)))
        }
    })));
    let mut analyzer = analyzer(&remote, &["m1", "m2"]);

    let plans = analyzer.analyze_batch(&flagged_items(2)).await;

    assert_eq!(remote.models_called(), vec!["m1", "m1", "m1"]);
    assert_eq!(analyzer.stats().api_errors, 2);
    assert!(plans.iter().all(|p| !p.from_local_fallback()));
}

#[tokio::test]
async fn test_no_loss_across_mixed_outcomes() {
    let remote = Arc::new(ScriptedRemote::new(Box::new(|index, _, symbols| {
        match index % 6 {
            0 => Err(AnalysisError::Transient("connection reset".to_string())),
            1 => Err(AnalysisError::RateLimited("429".to_string())),
            2 => Err(AnalysisError::QuotaExhausted("quota".to_string())),
            3 => Ok(echo_response(&symbols[..symbols.len() / 2])),
            4 => Ok("I cannot help with that".to_string()),
            _ => Ok(echo_response(symbols)),
        }
    })));
    let mut analyzer = analyzer(&remote, &["m1", "m2"]);
    let items = flagged_items(47);

    let plans = analyzer.analyze_batch(&items).await;

    assert_eq!(plans.len(), items.len());
    assert_eq!(
        plans.iter().map(|p| p.symbol.clone()).collect::<Vec<_>>(),
        symbols_of(&items)
    );
    assert_eq!(analyzer.stats().total_analyzed, 47);
}

#[tokio::test]
async fn test_fallback_plans_are_deterministic() {
    let remote = Arc::new(ScriptedRemote::new(Box::new(|_, _, _| {
        Err(AnalysisError::Transient("down".to_string()))
    })));
    let mut analyzer = analyzer(&remote, &["m1"]);
    let items = flagged_items(2);

    let first = analyzer.analyze_batch(&items).await;
    let second = analyzer.analyze_batch(&items).await;

    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.decision, b.decision);
        assert_eq!(a.confidence, b.confidence);
        assert_eq!(a.reasoning, b.reasoning);
        assert_eq!(a.risk_factors, b.risk_factors);
        assert_eq!(a.take_profit_levels, b.take_profit_levels);
    }
}
