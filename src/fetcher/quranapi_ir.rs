use async_trait::async_trait;
use serde::Deserialize;

use crate::app::{NectarError, Result};
use crate::domain::{chapters, VerseRecord, VerseReference};
use crate::fetcher::http::{join_url, HttpClient};
use crate::fetcher::{outcome_from, ProviderOutcome, VerseProvider};

pub const DEFAULT_BASE_URL: &str = "https://quranapi.ir/api/v2";
pub const PROVENANCE: &str = "Quran-API.ir";

#[derive(Debug, Deserialize)]
struct AyatEnvelope {
    code: u16,
    data: Option<AyatData>,
}

#[derive(Debug, Deserialize)]
struct AyatData {
    text: Option<String>,
    translation: Option<AyatTranslation>,
    surah_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AyatTranslation {
    text: Option<String>,
}

pub struct QuranapiIrProvider {
    http: HttpClient,
    base_url: String,
}

impl QuranapiIrProvider {
    pub fn new(http: HttpClient) -> Self {
        Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

fn build_record(reference: VerseReference, envelope: AyatEnvelope) -> Result<ProviderOutcome> {
    if envelope.code != 200 {
        return Err(NectarError::Provider(format!(
            "Quran-API.ir returned code {}",
            envelope.code
        )));
    }

    let Some(data) = envelope.data else {
        return Ok(ProviderOutcome::Incomplete("response has no data".into()));
    };

    let translation = data
        .translation
        .and_then(|t| t.text)
        .unwrap_or_default();
    let chapter_name = chapters::chapter_name(reference.chapter())
        .map(str::to_string)
        .unwrap_or_default();

    Ok(outcome_from(VerseRecord {
        arabic: data.text.unwrap_or_default(),
        translation,
        chapter_name,
        chapter_name_arabic: data.surah_name.unwrap_or_default(),
        chapter: reference.chapter(),
        verse: reference.verse(),
        provenance: PROVENANCE.to_string(),
    }))
}

#[async_trait]
impl VerseProvider for QuranapiIrProvider {
    fn name(&self) -> &str {
        "quranapi_ir"
    }

    async fn fetch(&self, reference: VerseReference) -> Result<ProviderOutcome> {
        let url = join_url(&self.base_url, &format!("ayat/{}", reference.key()))?;
        let envelope: AyatEnvelope = self.http.get_json(url).await?;
        build_record(reference, envelope)
    }
}
