//! One posting run: select, fetch, enrich, compose, publish, record.
//!
//! A verse is only marked posted after the publisher confirms the post.
//! Story sharing and cleanup happen afterwards and never fail the run.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use crate::app::{NectarError, Result};
use crate::cleanup::{self, CleanupReport};
use crate::compose::Composer;
use crate::config::{Palette, ThemeConfig};
use crate::domain::{EnrichedVerse, Theme, VerseReference};
use crate::fetcher::MultiSourceFetcher;
use crate::publish::{build_caption, Publisher};
use crate::tafsir::TafsirFetcher;
use crate::tracker::SelectionTracker;

/// Knobs the pipeline needs from the loaded configuration.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub theme: ThemeConfig,
    pub summarize: bool,
    pub share_to_story: bool,
    pub cleanup_days: u64,
    pub output_dir: PathBuf,
}

/// What a successful run did.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub index: usize,
    pub reference: VerseReference,
    pub theme: Theme,
    pub palette: Palette,
    pub provenance: String,
    pub commentary: bool,
    pub slides: Vec<PathBuf>,
    pub post_id: String,
    pub permalink: Option<String>,
    pub story_id: Option<String>,
    pub cleanup: CleanupReport,
}

pub struct Pipeline {
    tracker: Arc<SelectionTracker>,
    fetcher: Arc<MultiSourceFetcher>,
    tafsir: Arc<TafsirFetcher>,
    composer: Arc<dyn Composer>,
    publisher: Arc<dyn Publisher>,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(
        tracker: Arc<SelectionTracker>,
        fetcher: Arc<MultiSourceFetcher>,
        tafsir: Arc<TafsirFetcher>,
        composer: Arc<dyn Composer>,
        publisher: Arc<dyn Publisher>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            tracker,
            fetcher,
            tafsir,
            composer,
            publisher,
            options,
        }
    }

    async fn enrich(&self, reference: VerseReference) -> Result<EnrichedVerse> {
        let record = self
            .fetcher
            .get(reference)
            .await
            .ok_or(NectarError::FetchExhausted(reference))?;
        let commentary = self.tafsir.commentary(reference, self.options.summarize).await;

        Ok(EnrichedVerse::new(record).with_commentary(commentary))
    }

    /// Render slides for `reference` (or the next pick) without publishing
    /// or touching the posted set.
    pub async fn generate(
        &self,
        reference: Option<VerseReference>,
        palette: Option<Palette>,
    ) -> Result<Vec<PathBuf>> {
        let (reference, theme) = match reference {
            Some(reference) => (reference, None),
            None => {
                let selection = self
                    .tracker
                    .peek()
                    .ok_or_else(|| NectarError::Other("verse catalog is empty".into()))?;
                (selection.reference, Some(selection.theme))
            }
        };

        let mut verse = self.enrich(reference).await?;
        if let Some(theme) = theme {
            verse = verse.with_theme(theme);
        }
        let palette = palette.unwrap_or_else(|| self.options.theme.palette_for(self.tracker.posted_count()));

        self.composer.compose(&verse, palette).await
    }

    /// Post the next catalog verse.
    pub async fn run_once(&self) -> Result<RunReport> {
        let selection = self.tracker.next()?;
        tracing::info!(
            "Selected {} (#{} of {}, theme {})",
            selection.reference,
            selection.index + 1,
            self.tracker.catalog_len(),
            selection.theme.label()
        );

        let verse = match self.enrich(selection.reference).await {
            Ok(verse) => verse.with_theme(selection.theme),
            Err(e) => {
                tracing::error!("Skipping run, {} stays unposted: {}", selection.reference, e);
                return Err(e);
            }
        };

        let palette = self.options.theme.palette_for(self.tracker.posted_count());
        let slides = self.composer.compose(&verse, palette).await?;
        let caption = build_caption(&verse.record);

        let post_id = match self.publisher.publish(&slides, &caption).await {
            Ok(id) => id,
            Err(e) => {
                tracing::error!(
                    "Publishing via {} failed, {} stays unposted: {}",
                    self.publisher.name(),
                    selection.reference,
                    e
                );
                return Err(e);
            }
        };
        tracing::info!("Published {} as {}", selection.reference, post_id);

        // The post is live; a tracker write failure only risks a repeat.
        if let Err(e) = self.tracker.mark_posted(selection.index) {
            tracing::error!("Posted {} but could not record it: {}", selection.reference, e);
        }

        let permalink = self.publisher.permalink(&post_id).await;
        let story_id = match slides.first() {
            Some(first) if self.options.share_to_story => self.share_story(first, permalink.as_deref()).await,
            _ => None,
        };

        let cleanup = match cleanup::remove_old_slides(
            &self.options.output_dir,
            cleanup::days(self.options.cleanup_days),
        ) {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!("Cleanup failed: {}", e);
                CleanupReport::default()
            }
        };

        Ok(RunReport {
            index: selection.index,
            reference: selection.reference,
            theme: selection.theme,
            palette,
            provenance: verse.record.provenance.clone(),
            commentary: verse.commentary.is_some(),
            slides,
            post_id,
            permalink,
            story_id,
            cleanup,
        })
    }

    async fn share_story(&self, first: &std::path::Path, link: Option<&str>) -> Option<String> {
        let story = match self.composer.story_card(first).await {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!("Could not build story image: {}", e);
                return None;
            }
        };

        let result = self.publisher.share_to_story(&story, link).await;
        if let Err(e) = fs::remove_file(&story) {
            tracing::debug!("Could not remove {}: {}", story.display(), e);
        }

        match result {
            Ok(id) => {
                tracing::info!("Shared story {}", id);
                Some(id)
            }
            Err(e) => {
                tracing::warn!("Story sharing failed: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::verse::sample_record;
    use crate::domain::{CatalogEntry, VerseRecord};
    use crate::fetcher::{ProviderOutcome, RetryPolicy, VerseProvider};
    use crate::store::JsonFileStore;
    use crate::tafsir::{TafsirConfig, TafsirProvider};
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct StaticProvider {
        healthy: bool,
    }

    #[async_trait]
    impl VerseProvider for StaticProvider {
        fn name(&self) -> &str {
            "static"
        }

        async fn fetch(&self, reference: VerseReference) -> Result<ProviderOutcome> {
            if !self.healthy {
                return Err(NectarError::Provider("down".into()));
            }
            Ok(ProviderOutcome::Record(VerseRecord {
                chapter: reference.chapter(),
                verse: reference.verse(),
                ..sample_record("static")
            }))
        }
    }

    struct FixedTafsir;

    #[async_trait]
    impl TafsirProvider for FixedTafsir {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn fetch(&self, _reference: VerseReference) -> Result<Option<String>> {
            Ok(Some("<p>Commentary text.</p>".into()))
        }
    }

    struct FakeComposer {
        dir: PathBuf,
    }

    #[async_trait]
    impl Composer for FakeComposer {
        async fn compose(&self, verse: &EnrichedVerse, _palette: Palette) -> Result<Vec<PathBuf>> {
            let count = if verse.commentary.is_some() { 4 } else { 3 };
            (1..=count)
                .map(|n| -> Result<PathBuf> {
                    let path = self.dir.join(format!("slide{}.png", n));
                    fs::write(&path, b"png")?;
                    Ok(path)
                })
                .collect()
        }

        async fn story_card(&self, first: &Path) -> Result<PathBuf> {
            let path = crate::compose::story_path(first);
            fs::copy(first, &path)?;
            Ok(path)
        }
    }

    #[derive(Default)]
    struct FakePublisher {
        fail: AtomicBool,
        posts: Mutex<Vec<(usize, String)>>,
        stories: AtomicUsize,
    }

    #[async_trait]
    impl Publisher for FakePublisher {
        fn name(&self) -> &str {
            "fake"
        }

        async fn publish(&self, paths: &[PathBuf], caption: &str) -> Result<String> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(NectarError::Publish("rejected".into()));
            }
            let mut posts = self.posts.lock().unwrap();
            posts.push((paths.len(), caption.to_string()));
            Ok(format!("post-{}", posts.len()))
        }

        async fn share_to_story(&self, path: &Path, _link: Option<&str>) -> Result<String> {
            assert!(path.exists());
            self.stories.fetch_add(1, Ordering::SeqCst);
            Ok("story-1".into())
        }

        async fn permalink(&self, post_id: &str) -> Option<String> {
            Some(format!("https://example.org/p/{}", post_id))
        }
    }

    fn catalog() -> Vec<CatalogEntry> {
        vec![
            CatalogEntry {
                chapter: 1,
                verse: 1,
                theme: Theme::Mercy,
            },
            CatalogEntry {
                chapter: 2,
                verse: 255,
                theme: Theme::Trust,
            },
        ]
    }

    struct Harness {
        dir: tempfile::TempDir,
        tracker: Arc<SelectionTracker>,
        publisher: Arc<FakePublisher>,
        pipeline: Pipeline,
    }

    fn harness(provider_healthy: bool) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let tracker = Arc::new(SelectionTracker::open(dir.path().join("posted.json"), catalog()));
        let fetcher = MultiSourceFetcher::new(
            Box::new(JsonFileStore::<VerseRecord>::in_memory()),
            RetryPolicy::immediate(2, 2),
        )
        .with_provider(Arc::new(StaticProvider { healthy: provider_healthy }), true);
        let tafsir = TafsirFetcher::new(
            Box::new(FixedTafsir),
            Box::new(JsonFileStore::<String>::in_memory()),
            TafsirConfig::default(),
        )
        .unwrap();
        let publisher = Arc::new(FakePublisher::default());

        let pipeline = Pipeline::new(
            tracker.clone(),
            Arc::new(fetcher),
            Arc::new(tafsir),
            Arc::new(FakeComposer {
                dir: dir.path().to_path_buf(),
            }),
            publisher.clone(),
            PipelineOptions {
                theme: ThemeConfig::default(),
                summarize: false,
                share_to_story: true,
                cleanup_days: 7,
                output_dir: dir.path().to_path_buf(),
            },
        );

        Harness {
            dir,
            tracker,
            publisher,
            pipeline,
        }
    }

    #[tokio::test]
    async fn test_run_publishes_and_marks() {
        let h = harness(true);

        let report = h.pipeline.run_once().await.unwrap();

        assert_eq!(report.index, 0);
        assert_eq!(report.post_id, "post-1");
        assert_eq!(report.slides.len(), 4);
        assert!(report.commentary);
        assert_eq!(report.story_id.as_deref(), Some("story-1"));
        assert_eq!(report.permalink.as_deref(), Some("https://example.org/p/post-1"));
        assert_eq!(h.tracker.posted_count(), 1);

        let posts = h.publisher.posts.lock().unwrap();
        assert!(posts[0].1.contains("#NectarFromQuran"));
    }

    #[tokio::test]
    async fn test_story_image_removed_after_sharing() {
        let h = harness(true);
        let report = h.pipeline.run_once().await.unwrap();

        let story = crate::compose::story_path(&report.slides[0]);
        assert!(!story.exists());
        assert_eq!(h.publisher.stories.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_second_run_takes_next_verse() {
        let h = harness(true);
        h.pipeline.run_once().await.unwrap();
        let second = h.pipeline.run_once().await.unwrap();

        assert_eq!(second.index, 1);
        assert_eq!(second.reference.key(), "2:255");
    }

    #[tokio::test]
    async fn test_fetch_failure_leaves_verse_unposted() {
        let h = harness(false);

        let err = h.pipeline.run_once().await.unwrap_err();

        assert!(matches!(err, NectarError::FetchExhausted(_)));
        assert_eq!(h.tracker.posted_count(), 0);
        assert!(h.publisher.posts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_publish_failure_leaves_verse_unposted() {
        let h = harness(true);
        h.publisher.fail.store(true, Ordering::SeqCst);

        assert!(h.pipeline.run_once().await.is_err());
        assert_eq!(h.tracker.posted_count(), 0);
        assert_eq!(h.publisher.stories.load(Ordering::SeqCst), 0);

        h.publisher.fail.store(false, Ordering::SeqCst);
        assert_eq!(h.pipeline.run_once().await.unwrap().index, 0);
    }

    #[tokio::test]
    async fn test_generate_does_not_touch_tracker() {
        let h = harness(true);
        let reference = VerseReference::new(3, 7).unwrap();

        let slides = h.pipeline.generate(Some(reference), Some(Palette::SageCream)).await.unwrap();

        assert_eq!(slides.len(), 4);
        assert!(slides.iter().all(|p| p.starts_with(h.dir.path())));
        assert_eq!(h.tracker.posted_count(), 0);
        assert!(h.publisher.posts.lock().unwrap().is_empty());
    }
}
