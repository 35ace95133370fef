use async_trait::async_trait;
use serde::Deserialize;

use crate::app::Result;
use crate::domain::VerseReference;
use crate::fetcher::http::{join_url, HttpClient};
use crate::tafsir::TafsirProvider;

#[derive(Debug, Deserialize)]
struct TafsirPayload {
    #[serde(default)]
    tafsirs: Vec<TafsirEntry>,
}

#[derive(Debug, Deserialize)]
struct TafsirEntry {
    #[serde(default)]
    author: String,
    #[serde(default)]
    content: String,
}

/// Commentary from the quranapi.pages.dev static JSON files.
pub struct PagesTafsirProvider {
    http: HttpClient,
    base_url: String,
    author_match: String,
}

impl PagesTafsirProvider {
    pub fn new(http: HttpClient, base_url: impl Into<String>, author_match: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            author_match: author_match.into(),
        }
    }
}

/// Content of the first entry whose author contains `author_match`.
fn select_entry(payload: TafsirPayload, author_match: &str) -> Option<String> {
    payload
        .tafsirs
        .into_iter()
        .find(|t| t.author.contains(author_match))
        .map(|t| t.content)
        .filter(|content| !content.trim().is_empty())
}

#[async_trait]
impl TafsirProvider for PagesTafsirProvider {
    fn name(&self) -> &str {
        "quranapi_pages"
    }

    async fn fetch(&self, reference: VerseReference) -> Result<Option<String>> {
        let path = format!("tafsir/{}_{}.json", reference.chapter(), reference.verse());
        let url = join_url(&self.base_url, &path)?;
        let payload: TafsirPayload = self.http.get_json(url).await?;
        Ok(select_entry(payload, &self.author_match))
    }
}
