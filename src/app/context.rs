use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::app::error::Result;
use crate::compose::{Composer, SlideComposer};
use crate::config::Config;
use crate::domain::{VerseRecord, CATALOG};
use crate::fetcher::{HttpClient, MultiSourceFetcher};
use crate::pipeline::{Pipeline, PipelineOptions};
use crate::publish::{build_publisher, Publisher};
use crate::store::JsonFileStore;
use crate::tafsir::{PagesTafsirProvider, TafsirFetcher};
use crate::tracker::SelectionTracker;

/// Where persistent state lives under the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub root: PathBuf,
    pub verse_cache: PathBuf,
    pub tafsir_cache: PathBuf,
    pub posted: PathBuf,
    pub output: PathBuf,
    pub outbox: PathBuf,
}

impl DataPaths {
    pub fn new(root: PathBuf) -> Self {
        Self {
            verse_cache: root.join("verse_cache.json"),
            tafsir_cache: root.join("tafsir_cache.json"),
            posted: root.join("posted_verses.json"),
            output: root.join("output"),
            outbox: root.join("outbox"),
            root,
        }
    }
}

/// Everything a command needs, built once from the configuration.
///
/// The composer and publisher are built on demand: loading fonts or
/// checking publisher credentials should not block `fetch` or `status`.
pub struct AppContext {
    pub config: Config,
    pub paths: DataPaths,
    pub http: HttpClient,
    pub tracker: Arc<SelectionTracker>,
    pub fetcher: Arc<MultiSourceFetcher>,
    pub tafsir: Arc<TafsirFetcher>,
}

impl AppContext {
    pub fn new(config_path: Option<&Path>, data_dir: Option<PathBuf>) -> Result<Self> {
        let config = Config::load(config_path)?;
        let data_dir = match data_dir {
            Some(dir) => dir,
            None => Config::default_data_dir()?,
        };
        Self::with_config(config, data_dir)
    }

    pub fn with_config(config: Config, data_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&data_dir)?;
        let paths = DataPaths::new(data_dir);

        let http = HttpClient::new(config.fetch.timeout(), &config.fetch.user_agent)?;
        let fetcher = MultiSourceFetcher::from_config(
            &config.fetch,
            http.clone(),
            Box::new(JsonFileStore::<VerseRecord>::open(&paths.verse_cache)),
        );

        let tafsir_http = HttpClient::new(config.tafsir.timeout(), &config.fetch.user_agent)?;
        let tafsir = TafsirFetcher::new(
            Box::new(PagesTafsirProvider::new(
                tafsir_http,
                config.tafsir.base_url.clone(),
                config.tafsir.author_match.clone(),
            )),
            Box::new(JsonFileStore::<String>::open(&paths.tafsir_cache)),
            config.tafsir.clone(),
        )?;

        let tracker = SelectionTracker::open(&paths.posted, CATALOG.to_vec());

        Ok(Self {
            config,
            paths,
            http,
            tracker: Arc::new(tracker),
            fetcher: Arc::new(fetcher),
            tafsir: Arc::new(tafsir),
        })
    }

    pub fn composer(&self) -> Result<Arc<dyn Composer>> {
        let composer = SlideComposer::from_config(
            &self.config.fonts,
            self.config.layout.clone(),
            self.paths.output.clone(),
        )?;
        Ok(Arc::new(composer))
    }

    pub fn publisher(&self) -> Result<Arc<dyn Publisher>> {
        build_publisher(&self.config.publisher, self.http.clone(), &self.paths.outbox)
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            theme: self.config.theme.clone(),
            summarize: self.config.tafsir.summarize,
            share_to_story: self.config.publisher.share_to_story,
            cleanup_days: self.config.schedule.cleanup_days,
            output_dir: self.paths.output.clone(),
        }
    }

    /// A pipeline with the configured composer and publisher.
    pub fn pipeline(&self) -> Result<Pipeline> {
        self.pipeline_with(self.composer()?, self.publisher()?)
    }

    pub fn pipeline_with(
        &self,
        composer: Arc<dyn Composer>,
        publisher: Arc<dyn Publisher>,
    ) -> Result<Pipeline> {
        Ok(Pipeline::new(
            self.tracker.clone(),
            self.fetcher.clone(),
            self.tafsir.clone(),
            composer,
            publisher,
            self.pipeline_options(),
        ))
    }
}
