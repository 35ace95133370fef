use async_trait::async_trait;
use serde::Deserialize;

use crate::app::Result;
use crate::domain::{chapters, VerseRecord, VerseReference};
use crate::fetcher::alquran_cloud::{self, AyahEnvelope};
use crate::fetcher::http::{join_url, HttpClient};
use crate::fetcher::{outcome_from, ProviderOutcome, VerseProvider};

pub const DEFAULT_BASE_URL: &str = "https://api.quran.com/api/v4";
pub const PROVENANCE: &str = "Quran.com API (Arabic) + AlQuran.cloud (Translation)";

#[derive(Debug, Deserialize)]
struct VerseEnvelope {
    verse: Option<VerseBody>,
}

#[derive(Debug, Deserialize)]
struct VerseBody {
    text_uthmani: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChapterEnvelope {
    chapter: Option<ChapterBody>,
}

#[derive(Debug, Deserialize)]
struct ChapterBody {
    name_simple: Option<String>,
    name_arabic: Option<String>,
}

/// Uthmani script from Quran.com, translation from AlQuran.cloud.
pub struct QuranComProvider {
    http: HttpClient,
    base_url: String,
    translation_base_url: String,
    edition: String,
}

impl QuranComProvider {
    pub fn new(http: HttpClient, edition: impl Into<String>) -> Self {
        Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            translation_base_url: alquran_cloud::DEFAULT_BASE_URL.to_string(),
            edition: edition.into(),
        }
    }

    async fn chapter_names(&self, chapter: u16) -> Option<ChapterBody> {
        let url = join_url(&self.base_url, &format!("chapters/{}", chapter)).ok()?;
        match self.http.get_json::<ChapterEnvelope>(url).await {
            Ok(envelope) => envelope.chapter,
            Err(e) => {
                tracing::debug!("Chapter lookup for {} failed: {}", chapter, e);
                None
            }
        }
    }
}

fn build_record(
    reference: VerseReference,
    verse: VerseEnvelope,
    translation: &AyahEnvelope,
    names: Option<ChapterBody>,
) -> Result<ProviderOutcome> {
    let arabic = verse
        .verse
        .and_then(|v| v.text_uthmani)
        .unwrap_or_default();
    let translation = translation.text()?;

    let (name, name_arabic) = match names {
        Some(body) => (body.name_simple, body.name_arabic),
        None => (None, None),
    };
    let chapter_name = name
        .or_else(|| chapters::chapter_name(reference.chapter()).map(str::to_string))
        .unwrap_or_default();

    Ok(outcome_from(VerseRecord {
        arabic,
        translation,
        chapter_name,
        chapter_name_arabic: name_arabic.unwrap_or_default(),
        chapter: reference.chapter(),
        verse: reference.verse(),
        provenance: PROVENANCE.to_string(),
    }))
}

#[async_trait]
impl VerseProvider for QuranComProvider {
    fn name(&self) -> &str {
        "quran_com"
    }

    async fn fetch(&self, reference: VerseReference) -> Result<ProviderOutcome> {
        let mut url = join_url(&self.base_url, &format!("verses/by_key/{}", reference.key()))?;
        url.query_pairs_mut()
            .append_pair("fields", "text_uthmani")
            .append_pair("words", "false")
            .append_pair("language", "en");

        let verse: VerseEnvelope = self.http.get_json(url).await?;
        let translation = alquran_cloud::fetch_edition(
            &self.http,
            &self.translation_base_url,
            reference,
            &self.edition,
        )
        .await?;

        // Names are cosmetic; a failed lookup falls back to the local table.
        let names = self.chapter_names(reference.chapter()).await;

        build_record(reference, verse, &translation, names)
    }
}
