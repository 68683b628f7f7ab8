use async_trait::async_trait;
use moka::future::Cache;
use nexus_core::PriceData;
use std::sync::Arc;
use std::time::Duration;

use super::PriceOracle;

/// TTL cache in front of another [`PriceOracle`]
///
/// Only successful lookups are cached, so a token without data is asked
/// again on the next call.
pub struct CachedPriceOracle {
    inner: Arc<dyn PriceOracle>,
    cache: Cache<String, PriceData>,
}

impl CachedPriceOracle {
    pub fn new(inner: Arc<dyn PriceOracle>, ttl: Duration, max_capacity: u64) -> Self {
        tracing::info!(
            "Initializing price cache: ttl={}s, capacity={}",
            ttl.as_secs(),
            max_capacity
        );

        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();

        Self { inner, cache }
    }

    fn key(address: &str, chain: &str) -> String {
        format!("{}:{}", chain.to_lowercase(), address.to_lowercase())
    }
}

#[async_trait]
impl PriceOracle for CachedPriceOracle {
    async fn get_price_data(&self, address: &str, chain: &str) -> Option<PriceData> {
        let key = Self::key(address, chain);

        if let Some(hit) = self.cache.get(&key).await {
            tracing::debug!("Price cache hit: {}", key);
            return Some(hit);
        }

        let quote = self.inner.get_price_data(address, chain).await?;
        self.cache.insert(key, quote).await;
        Some(quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingOracle {
        calls: AtomicUsize,
        quote: Option<PriceData>,
    }

    #[async_trait]
    impl PriceOracle for CountingOracle {
        async fn get_price_data(&self, _address: &str, _chain: &str) -> Option<PriceData> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.quote
        }
    }

    fn quote() -> PriceData {
        PriceData {
            current: 1.5,
            change_24h: -30.0,
            volume_spike: false,
            liquidity: 10_000.0,
        }
    }

    #[tokio::test]
    async fn test_second_lookup_is_cached() {
        let inner = Arc::new(CountingOracle {
            calls: AtomicUsize::new(0),
            quote: Some(quote()),
        });
        let cached = CachedPriceOracle::new(inner.clone(), Duration::from_secs(60), 100);

        let first = cached.get_price_data("0xAbC", "Base").await;
        let second = cached.get_price_data("0xabc", "base").await;

        assert_eq!(first, second);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_misses_are_not_cached() {
        let inner = Arc::new(CountingOracle {
            calls: AtomicUsize::new(0),
            quote: None,
        });
        let cached = CachedPriceOracle::new(inner.clone(), Duration::from_secs(60), 100);

        assert!(cached.get_price_data("0xabc", "base").await.is_none());
        assert!(cached.get_price_data("0xabc", "base").await.is_none());
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }
}
