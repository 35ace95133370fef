pub mod config;
pub mod font;
pub mod layout;
pub mod render;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Local;

use crate::app::{NectarError, Result};
use crate::config::Palette;
use crate::domain::EnrichedVerse;

pub use config::{FontConfig, Headings, LayoutConfig, TextStyle};
pub use font::{FontFace, FontSet};
pub use layout::{plan_slides, split_text_by_height, FontRole, SlideKind, SlidePlan, TextMeasurer};

/// Turns a verse into an ordered list of slide images on disk.
#[async_trait]
pub trait Composer: Send + Sync {
    /// Render every slide. The first path is the cover slide.
    async fn compose(&self, verse: &EnrichedVerse, palette: Palette) -> Result<Vec<PathBuf>>;

    /// Derive a story image from the cover slide.
    async fn story_card(&self, first: &Path) -> Result<PathBuf>;
}

struct Inner {
    fonts: FontSet,
    layout: LayoutConfig,
    output_dir: PathBuf,
}

/// PNG renderer. Fonts are loaded once and shared with the blocking
/// render tasks.
#[derive(Clone)]
pub struct SlideComposer {
    inner: Arc<Inner>,
}

impl SlideComposer {
    pub fn new(fonts: FontSet, layout: LayoutConfig, output_dir: PathBuf) -> Self {
        Self {
            inner: Arc::new(Inner {
                fonts,
                layout,
                output_dir,
            }),
        }
    }

    pub fn from_config(fonts: &FontConfig, layout: LayoutConfig, output_dir: PathBuf) -> Result<Self> {
        Ok(Self::new(FontSet::load(fonts)?, layout, output_dir))
    }

    pub fn output_dir(&self) -> &Path {
        &self.inner.output_dir
    }
}

pub fn slide_file_name(stamp: &str, n: usize) -> String {
    format!("quran_post_{}_slide{}.png", stamp, n)
}

pub fn story_path(first: &Path) -> PathBuf {
    let stem = first
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "slide".to_string());
    first.with_file_name(format!("{}_story.png", stem))
}

fn render_all(inner: &Inner, verse: &EnrichedVerse, palette: Palette) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(&inner.output_dir)?;

    let plans = plan_slides(&inner.fonts, &inner.layout, verse);
    let colors = palette.colors();
    let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let base_seed = u64::from(verse.record.chapter) * 1000 + u64::from(verse.record.verse);

    let mut paths = Vec::with_capacity(plans.len());
    for (i, plan) in plans.iter().enumerate() {
        let img = render::render_slide(&inner.fonts, &inner.layout, plan, &colors, base_seed + i as u64);
        let path = inner.output_dir.join(slide_file_name(&stamp, i + 1));
        img.save(&path)?;
        tracing::debug!("Wrote {:?} slide {}", plan.kind, path.display());
        paths.push(path);
    }

    tracing::info!(
        "Composed {} slides for {} in {}",
        paths.len(),
        verse.record.display_reference(),
        palette
    );
    Ok(paths)
}

fn join_error(e: tokio::task::JoinError) -> NectarError {
    NectarError::Render(format!("render task failed: {}", e))
}

#[async_trait]
impl Composer for SlideComposer {
    async fn compose(&self, verse: &EnrichedVerse, palette: Palette) -> Result<Vec<PathBuf>> {
        let inner = Arc::clone(&self.inner);
        let verse = verse.clone();

        tokio::task::spawn_blocking(move || render_all(&inner, &verse, palette))
            .await
            .map_err(join_error)?
    }

    async fn story_card(&self, first: &Path) -> Result<PathBuf> {
        let inner = Arc::clone(&self.inner);
        let first = first.to_path_buf();

        tokio::task::spawn_blocking(move || {
            let cover = image::open(&first)?.to_rgb8();
            let story = render::render_story(&inner.fonts, &inner.layout, &cover);
            let path = story_path(&first);
            story.save(&path)?;
            Ok(path)
        })
        .await
        .map_err(join_error)?
    }
}
