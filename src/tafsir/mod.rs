//! Verse commentary: fetching, cleaning, caching and optional summarizing.
//!
//! Commentary is never synthesized. A reference with no commentary from the
//! provider resolves to `None`; the only non-fetched text is the configured
//! fallback, which is always tagged [`Commentary::Generic`].

pub mod clean;
pub mod config;
pub mod provider;
pub mod summarize;

use async_trait::async_trait;

use crate::app::Result;
use crate::domain::{Commentary, VerseReference};
use crate::store::KvStore;

pub use clean::Cleaner;
pub use config::TafsirConfig;
pub use provider::PagesTafsirProvider;
pub use summarize::{summarize, SummaryLimits};

/// A remote source of commentary text.
#[async_trait]
pub trait TafsirProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Raw commentary for `reference`, `Ok(None)` when the provider has none.
    async fn fetch(&self, reference: VerseReference) -> Result<Option<String>>;
}

pub struct TafsirFetcher {
    provider: Box<dyn TafsirProvider>,
    cache: Box<dyn KvStore<String> + Send + Sync>,
    cleaner: Cleaner,
    config: TafsirConfig,
}

impl TafsirFetcher {
    pub fn new(
        provider: Box<dyn TafsirProvider>,
        cache: Box<dyn KvStore<String> + Send + Sync>,
        config: TafsirConfig,
    ) -> Result<Self> {
        Ok(Self {
            provider,
            cache,
            cleaner: Cleaner::new()?,
            config,
        })
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Cleaned commentary for `reference`, or `None` when unavailable.
    ///
    /// Provider errors are logged and resolve to `None`.
    pub async fn get(&self, reference: VerseReference) -> Option<String> {
        let key = reference.key();
        if let Some(text) = self.cache.get(&key) {
            tracing::debug!("Using cached commentary for {}", key);
            return Some(text);
        }

        tracing::info!("Fetching commentary for {} from {}", key, self.provider.name());

        let raw = match self.provider.fetch(reference).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::warn!("No commentary matching '{}' for {}", self.config.author_match, key);
                return None;
            }
            Err(e) => {
                tracing::warn!("Commentary fetch failed for {}: {}", key, e);
                return None;
            }
        };

        let text = self.cleaner.clean(&raw);
        if text.is_empty() {
            tracing::warn!("Commentary for {} was empty after cleaning", key);
            return None;
        }

        self.cache.put(&key, text.clone());
        tracing::info!("Commentary for {}: {} chars", key, text.chars().count());
        Some(text)
    }

    /// Commentary ready for rendering: summarized when configured, or the
    /// generic fallback when nothing was fetched.
    pub async fn commentary(&self, reference: VerseReference, shorten: bool) -> Option<Commentary> {
        match self.get(reference).await {
            Some(text) if shorten => Some(Commentary::Verse(summarize(
                &text,
                &self.config.summary_limits(),
            ))),
            Some(text) => Some(Commentary::Verse(text)),
            None => self
                .config
                .fallback_text
                .as_ref()
                .filter(|text| !text.trim().is_empty())
                .map(|text| Commentary::Generic(text.clone())),
        }
    }

    pub fn config(&self) -> &TafsirConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::NectarError;
    use crate::store::JsonFileStore;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FakeTafsir {
        response: Option<&'static str>,
        fail: bool,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl TafsirProvider for FakeTafsir {
        fn name(&self) -> &str {
            "fake"
        }

        async fn fetch(&self, _reference: VerseReference) -> Result<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(NectarError::Provider("timed out".into()));
            }
            Ok(self.response.map(str::to_string))
        }
    }

    fn fetcher(
        response: Option<&'static str>,
        fail: bool,
        config: TafsirConfig,
    ) -> (TafsirFetcher, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = FakeTafsir {
            response,
            fail,
            calls: calls.clone(),
        };
        let fetcher = TafsirFetcher::new(
            Box::new(provider),
            Box::new(JsonFileStore::<String>::in_memory()),
            config,
        )
        .unwrap();
        (fetcher, calls)
    }

    fn reference() -> VerseReference {
        VerseReference::new(2, 255).unwrap()
    }

    #[tokio::test]
    async fn test_cleans_and_caches() {
        let (fetcher, calls) = fetcher(Some("<p>Allah &amp; His   throne.</p>"), false, TafsirConfig::default());

        assert_eq!(fetcher.get(reference()).await.as_deref(), Some("Allah & His throne."));
        assert_eq!(fetcher.get(reference()).await.as_deref(), Some("Allah & His throne."));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(fetcher.cache_len(), 1);
    }

    #[tokio::test]
    async fn test_no_commentary_is_absent() {
        let (fetcher, _) = fetcher(None, false, TafsirConfig::default());

        assert!(fetcher.get(reference()).await.is_none());
        assert!(fetcher.commentary(reference(), false).await.is_none());
        assert_eq!(fetcher.cache_len(), 0);
    }

    #[tokio::test]
    async fn test_provider_error_is_absent() {
        let (fetcher, _) = fetcher(Some("unused"), true, TafsirConfig::default());
        assert!(fetcher.get(reference()).await.is_none());
    }

    #[tokio::test]
    async fn test_markup_only_is_absent() {
        let (fetcher, _) = fetcher(Some("<div></div>"), false, TafsirConfig::default());
        assert!(fetcher.get(reference()).await.is_none());
        assert_eq!(fetcher.cache_len(), 0);
    }

    #[tokio::test]
    async fn test_fallback_is_generic() {
        let config = TafsirConfig {
            fallback_text: Some("Reflect on this verse.".into()),
            ..Default::default()
        };
        let (fetcher, _) = fetcher(None, false, config);

        let commentary = fetcher.commentary(reference(), false).await.unwrap();
        assert!(!commentary.is_verse_specific());
        assert_eq!(commentary.text(), "Reflect on this verse.");
    }

    #[tokio::test]
    async fn test_commentary_summarizes_when_asked() {
        let long: &'static str = Box::leak(
            "A sentence about patience and prayer. "
                .repeat(100)
                .into_boxed_str(),
        );
        let (fetcher, _) = fetcher(Some(long), false, TafsirConfig::default());

        let full = fetcher.commentary(reference(), false).await.unwrap();
        let short = fetcher.commentary(reference(), true).await.unwrap();

        assert!(full.text().chars().count() > 1200);
        assert!(short.text().chars().count() <= 1200);
        assert!(short.is_verse_specific());
    }
}
