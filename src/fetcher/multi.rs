use std::sync::Arc;

use crate::domain::{VerseRecord, VerseReference};
use crate::fetcher::alquran_cloud::AlquranCloudProvider;
use crate::fetcher::quran_com::QuranComProvider;
use crate::fetcher::quranapi_ir::QuranapiIrProvider;
use crate::fetcher::{
    FetchConfig, HttpClient, ProviderKind, ProviderOutcome, RetryPolicy, VerseProvider,
};
use crate::store::KvStore;

struct ProviderSlot {
    provider: Arc<dyn VerseProvider>,
    enabled: bool,
}

/// Fetches verses through an ordered chain of providers, with a
/// write-through cache in front.
///
/// Each enabled provider gets `attempts_per_provider` tries with exponential
/// back-off; the whole chain is repeated up to `max_cycles` times with a
/// fixed pause between passes. The first complete record wins.
pub struct MultiSourceFetcher {
    providers: Vec<ProviderSlot>,
    cache: Box<dyn KvStore<VerseRecord> + Send + Sync>,
    policy: RetryPolicy,
}

impl MultiSourceFetcher {
    pub fn new(cache: Box<dyn KvStore<VerseRecord> + Send + Sync>, policy: RetryPolicy) -> Self {
        Self {
            providers: Vec::new(),
            cache,
            policy,
        }
    }

    /// Build the provider chain described by `config`, sharing one HTTP client.
    pub fn from_config(
        config: &FetchConfig,
        http: HttpClient,
        cache: Box<dyn KvStore<VerseRecord> + Send + Sync>,
    ) -> Self {
        let mut fetcher = Self::new(cache, config.retry_policy());

        for toggle in &config.providers {
            let provider: Arc<dyn VerseProvider> = match toggle.name {
                ProviderKind::QuranCom => Arc::new(QuranComProvider::new(
                    http.clone(),
                    config.translation_edition.clone(),
                )),
                ProviderKind::AlquranCloud => Arc::new(AlquranCloudProvider::new(
                    http.clone(),
                    config.translation_edition.clone(),
                )),
                ProviderKind::QuranapiIr => Arc::new(QuranapiIrProvider::new(http.clone())),
            };
            fetcher = fetcher.with_provider(provider, toggle.enabled);
        }

        fetcher
    }

    /// Append a provider to the end of the chain.
    pub fn with_provider(mut self, provider: Arc<dyn VerseProvider>, enabled: bool) -> Self {
        self.providers.push(ProviderSlot { provider, enabled });
        self
    }

    /// Enable or disable every provider called `name`. Returns whether any matched.
    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> bool {
        let mut found = false;
        for slot in self.providers.iter_mut().filter(|s| s.provider.name() == name) {
            slot.enabled = enabled;
            found = true;
        }
        found
    }

    pub fn provider_names(&self) -> Vec<(&str, bool)> {
        self.providers
            .iter()
            .map(|s| (s.provider.name(), s.enabled))
            .collect()
    }

    pub fn cached(&self, reference: VerseReference) -> Option<VerseRecord> {
        self.cache.get(&reference.key())
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Return the record for `reference`, or `None` once every provider has
    /// failed on every pass.
    pub async fn get(&self, reference: VerseReference) -> Option<VerseRecord> {
        let key = reference.key();
        match self.cache.get(&key) {
            Some(record) if record.is_complete() => {
                tracing::debug!("Cache hit for {}", key);
                return Some(record);
            }
            Some(_) => tracing::warn!("Cached record for {} is incomplete, refetching", key),
            None => {}
        }

        let enabled: Vec<&ProviderSlot> = self.providers.iter().filter(|s| s.enabled).collect();
        if enabled.is_empty() {
            tracing::error!("No verse providers enabled, cannot fetch {}", key);
            return None;
        }

        for cycle in 0..self.policy.max_cycles {
            if cycle > 0 {
                tracing::info!(
                    "Pass {}/{} for {} after {:?} pause",
                    cycle + 1,
                    self.policy.max_cycles,
                    key,
                    self.policy.cycle_delay
                );
                sleep(self.policy.cycle_delay).await;
            }

            for slot in &enabled {
                if let Some(record) = self.try_provider(slot.provider.as_ref(), reference).await {
                    self.cache.put(&key, record.clone());
                    tracing::info!("Fetched {} from {}", key, record.provenance);
                    return Some(record);
                }
            }
        }

        tracing::error!(
            "All providers failed for {} after {} passes",
            key,
            self.policy.max_cycles
        );
        None
    }

    async fn try_provider(
        &self,
        provider: &dyn VerseProvider,
        reference: VerseReference,
    ) -> Option<VerseRecord> {
        let attempts = self.policy.attempts_per_provider;

        for attempt in 0..attempts {
            let wait = self.policy.backoff(attempt);
            if !wait.is_zero() {
                tracing::debug!("Retrying {} in {:?}", provider.name(), wait);
                sleep(wait).await;
            }

            match provider.fetch(reference).await {
                Ok(ProviderOutcome::Record(record)) if record.is_complete() => {
                    return Some(record);
                }
                Ok(ProviderOutcome::Record(_)) => {
                    tracing::warn!(
                        "{} returned an incomplete record for {} (try {}/{})",
                        provider.name(),
                        reference,
                        attempt + 1,
                        attempts
                    );
                }
                Ok(ProviderOutcome::Incomplete(reason)) => {
                    tracing::warn!(
                        "{} incomplete for {}: {} (try {}/{})",
                        provider.name(),
                        reference,
                        reason,
                        attempt + 1,
                        attempts
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        "{} failed for {}: {} (try {}/{})",
                        provider.name(),
                        reference,
                        e,
                        attempt + 1,
                        attempts
                    );
                }
            }
        }

        None
    }
}

async fn sleep(duration: std::time::Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{NectarError, Result};
    use crate::domain::verse::sample_record;
    use crate::store::JsonFileStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Copy)]
    enum Behaviour {
        Healthy,
        Failing,
        EmptyTranslation,
        Incomplete,
    }

    struct FakeProvider {
        name: &'static str,
        behaviour: Behaviour,
        calls: AtomicUsize,
    }

    impl FakeProvider {
        fn new(name: &'static str, behaviour: Behaviour) -> Arc<Self> {
            Arc::new(Self {
                name,
                behaviour,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl VerseProvider for FakeProvider {
        fn name(&self) -> &str {
            self.name
        }

        async fn fetch(&self, reference: VerseReference) -> Result<ProviderOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut record = sample_record(self.name);
            record.chapter = reference.chapter();
            record.verse = reference.verse();

            match self.behaviour {
                Behaviour::Healthy => Ok(ProviderOutcome::Record(record)),
                Behaviour::Failing => Err(NectarError::Provider("connection reset".into())),
                Behaviour::EmptyTranslation => {
                    record.translation.clear();
                    Ok(ProviderOutcome::Record(record))
                }
                Behaviour::Incomplete => Ok(ProviderOutcome::Incomplete("no data".into())),
            }
        }
    }

    fn fetcher(policy: RetryPolicy) -> MultiSourceFetcher {
        MultiSourceFetcher::new(Box::new(JsonFileStore::<VerseRecord>::in_memory()), policy)
    }

    fn reference(c: u16, v: u16) -> VerseReference {
        VerseReference::new(c, v).unwrap()
    }

    #[tokio::test]
    async fn test_second_fetch_hits_cache() {
        let provider = FakeProvider::new("first", Behaviour::Healthy);
        let fetcher =
            fetcher(RetryPolicy::immediate(10, 3)).with_provider(provider.clone(), true);

        let first = fetcher.get(reference(2, 255)).await.unwrap();
        let second = fetcher.get(reference(2, 255)).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(provider.calls(), 1);
        assert!(fetcher.cached(reference(2, 255)).is_some());
    }

    #[tokio::test]
    async fn test_incomplete_cache_entry_is_refetched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("verse_cache.json");
        let mut stale = sample_record("older build");
        stale.chapter = 1;
        stale.verse = 1;
        stale.translation.clear();
        JsonFileStore::<VerseRecord>::open(&path).put("1:1", stale);

        let provider = FakeProvider::new("first", Behaviour::Healthy);
        let fetcher = MultiSourceFetcher::new(
            Box::new(JsonFileStore::<VerseRecord>::open(&path)),
            RetryPolicy::immediate(1, 1),
        )
        .with_provider(provider.clone(), true);

        let record = fetcher.get(reference(1, 1)).await.unwrap();

        assert_eq!(provider.calls(), 1);
        assert!(record.is_complete());
        assert_eq!(record.provenance, "first");
        assert!(fetcher.cached(reference(1, 1)).unwrap().is_complete());
    }

    #[tokio::test]
    async fn test_failing_first_provider_falls_back() {
        let first = FakeProvider::new("first", Behaviour::Failing);
        let second = FakeProvider::new("second", Behaviour::Healthy);
        let fetcher = fetcher(RetryPolicy::immediate(10, 3))
            .with_provider(first.clone(), true)
            .with_provider(second.clone(), true);

        let record = fetcher.get(reference(1, 1)).await.unwrap();

        assert_eq!(record.provenance, "second");
        assert_eq!(first.calls(), 3);
        assert_eq!(second.calls(), 1);
    }

    #[tokio::test]
    async fn test_disabled_provider_is_skipped() {
        let first = FakeProvider::new("first", Behaviour::Healthy);
        let second = FakeProvider::new("second", Behaviour::Healthy);
        let mut fetcher = fetcher(RetryPolicy::immediate(10, 3))
            .with_provider(first.clone(), true)
            .with_provider(second.clone(), true);

        assert!(fetcher.set_enabled("first", false));
        let record = fetcher.get(reference(1, 1)).await.unwrap();

        assert_eq!(record.provenance, "second");
        assert_eq!(first.calls(), 0);
    }

    #[tokio::test]
    async fn test_incomplete_records_are_rejected() {
        let empty = FakeProvider::new("empty", Behaviour::EmptyTranslation);
        let partial = FakeProvider::new("partial", Behaviour::Incomplete);
        let healthy = FakeProvider::new("healthy", Behaviour::Healthy);
        let fetcher = fetcher(RetryPolicy::immediate(1, 2))
            .with_provider(empty.clone(), true)
            .with_provider(partial.clone(), true)
            .with_provider(healthy, true);

        let record = fetcher.get(reference(3, 8)).await.unwrap();

        assert_eq!(record.provenance, "healthy");
        assert!(record.is_complete());
        assert_eq!(empty.calls(), 2);
        assert_eq!(partial.calls(), 2);
    }

    #[tokio::test]
    async fn test_exhaustion_makes_exactly_max_cycles_passes() {
        let first = FakeProvider::new("first", Behaviour::Failing);
        let second = FakeProvider::new("second", Behaviour::Incomplete);
        let fetcher = fetcher(RetryPolicy::immediate(4, 3))
            .with_provider(first.clone(), true)
            .with_provider(second.clone(), true);

        assert!(fetcher.get(reference(1, 1)).await.is_none());
        assert_eq!(first.calls(), 4 * 3);
        assert_eq!(second.calls(), 4 * 3);
        assert_eq!(fetcher.cache_len(), 0);
    }

    #[tokio::test]
    async fn test_all_disabled_returns_none() {
        let provider = FakeProvider::new("only", Behaviour::Healthy);
        let fetcher = fetcher(RetryPolicy::immediate(10, 3)).with_provider(provider.clone(), false);

        assert!(fetcher.get(reference(1, 1)).await.is_none());
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_success_is_written_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("verse_cache.json");
        let provider = FakeProvider::new("first", Behaviour::Healthy);

        let fetcher = MultiSourceFetcher::new(
            Box::new(JsonFileStore::<VerseRecord>::open(&path)),
            RetryPolicy::immediate(1, 1),
        )
        .with_provider(provider, true);
        fetcher.get(reference(2, 255)).await.unwrap();

        let reopened: JsonFileStore<VerseRecord> = JsonFileStore::open(&path);
        assert_eq!(reopened.get("2:255").unwrap().provenance, "first");
    }

    #[test]
    fn test_from_config_respects_toggles() {
        let mut config = FetchConfig::default();
        config.providers[1].enabled = false;
        let http = HttpClient::new(config.timeout(), &config.user_agent).unwrap();

        let fetcher =
            MultiSourceFetcher::from_config(&config, http, Box::new(JsonFileStore::<VerseRecord>::in_memory()));

        assert_eq!(
            fetcher.provider_names(),
            vec![
                ("quran_com", true),
                ("alquran_cloud", false),
                ("quranapi_ir", true)
            ]
        );
    }
}
