use async_trait::async_trait;
use serde::Deserialize;

use crate::app::{NectarError, Result};
use crate::domain::{chapters, VerseRecord, VerseReference};
use crate::fetcher::http::{join_url, HttpClient};
use crate::fetcher::{outcome_from, ProviderOutcome, VerseProvider};

pub const DEFAULT_BASE_URL: &str = "https://api.alquran.cloud/v1";
pub const PROVENANCE: &str = "AlQuran.cloud API";

/// Response envelope of `/ayah/{ref}/{edition}`.
#[derive(Debug, Deserialize)]
pub(crate) struct AyahEnvelope {
    pub code: u16,
    pub data: Option<AyahData>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AyahData {
    pub text: Option<String>,
    pub surah: Option<SurahInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SurahInfo {
    pub name: Option<String>,
    pub english_name: Option<String>,
}

impl AyahEnvelope {
    /// The `text` field, after checking the embedded status code.
    pub(crate) fn text(&self) -> Result<String> {
        if self.code != 200 {
            return Err(NectarError::Provider(format!(
                "AlQuran.cloud returned code {}",
                self.code
            )));
        }
        Ok(self
            .data
            .as_ref()
            .and_then(|d| d.text.clone())
            .unwrap_or_default())
    }

    fn surah(&self) -> Option<&SurahInfo> {
        self.data.as_ref().and_then(|d| d.surah.as_ref())
    }
}

/// Both editions come from AlQuran.cloud: `quran-uthmani` for the
/// original script and the configured translation edition.
pub struct AlquranCloudProvider {
    http: HttpClient,
    base_url: String,
    edition: String,
}

impl AlquranCloudProvider {
    pub fn new(http: HttpClient, edition: impl Into<String>) -> Self {
        Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            edition: edition.into(),
        }
    }
}

/// Fetch one edition of a verse. Shared with the Quran.com provider, which
/// takes its translation from here.
pub(crate) async fn fetch_edition(
    http: &HttpClient,
    base_url: &str,
    reference: VerseReference,
    edition: &str,
) -> Result<AyahEnvelope> {
    let url = join_url(base_url, &format!("ayah/{}/{}", reference.key(), edition))?;
    http.get_json(url).await
}

pub(crate) fn build_record(
    reference: VerseReference,
    arabic: &AyahEnvelope,
    translation: &AyahEnvelope,
) -> Result<ProviderOutcome> {
    let arabic_text = arabic.text()?;
    let translation_text = translation.text()?;

    let surah = arabic.surah();
    let chapter_name = surah
        .and_then(|s| s.english_name.clone())
        .or_else(|| chapters::chapter_name(reference.chapter()).map(str::to_string))
        .unwrap_or_default();
    let chapter_name_arabic = surah.and_then(|s| s.name.clone()).unwrap_or_default();

    Ok(outcome_from(VerseRecord {
        arabic: arabic_text,
        translation: translation_text,
        chapter_name,
        chapter_name_arabic,
        chapter: reference.chapter(),
        verse: reference.verse(),
        provenance: PROVENANCE.to_string(),
    }))
}

#[async_trait]
impl VerseProvider for AlquranCloudProvider {
    fn name(&self) -> &str {
        "alquran_cloud"
    }

    async fn fetch(&self, reference: VerseReference) -> Result<ProviderOutcome> {
        let arabic = fetch_edition(&self.http, &self.base_url, reference, "quran-uthmani").await?;
        let translation = fetch_edition(&self.http, &self.base_url, reference, &self.edition).await?;
        build_record(reference, &arabic, &translation)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    pub const ARABIC: &str = r#"{
        "code": 200,
        "status": "OK",
        "data": {
            "number": 1,
            "text": "بِسْمِ ٱللَّهِ ٱلرَّحْمَـٰنِ ٱلرَّحِيمِ",
            "edition": { "identifier": "quran-uthmani" },
            "surah": {
                "number": 1,
                "name": "سُورَةُ ٱلْفَاتِحَةِ",
                "englishName": "Al-Faatiha",
                "englishNameTranslation": "The Opening",
                "numberOfAyahs": 7
            },
            "numberInSurah": 1
        }
    }"#;

    pub const TRANSLATION: &str = r#"{
        "code": 200,
        "status": "OK",
        "data": {
            "number": 1,
            "text": "In the name of Allah, the Entirely Merciful, the Especially Merciful.",
            "edition": { "identifier": "en.sahih" },
            "surah": { "number": 1, "name": "سُورَةُ ٱلْفَاتِحَةِ", "englishName": "Al-Faatiha" },
            "numberInSurah": 1
        }
    }"#;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> AyahEnvelope {
        serde_json::from_str(body).unwrap()
    }

    fn reference() -> VerseReference {
        VerseReference::new(1, 1).unwrap()
    }

    #[test]
    fn test_build_record_from_fixtures() {
        let outcome = build_record(
            reference(),
            &parse(fixtures::ARABIC),
            &parse(fixtures::TRANSLATION),
        )
        .unwrap();

        match outcome {
            ProviderOutcome::Record(record) => {
                assert!(record.arabic.starts_with("بِسْمِ"));
                assert!(record.translation.starts_with("In the name of Allah"));
                assert_eq!(record.chapter_name, "Al-Faatiha");
                assert_eq!(record.chapter_name_arabic, "سُورَةُ ٱلْفَاتِحَةِ");
                assert_eq!(record.provenance, PROVENANCE);
                assert_eq!((record.chapter, record.verse), (1, 1));
            }
            other => panic!("expected record, got {:?}", other),
        }
    }

    #[test]
    fn test_non_200_code_is_error() {
        let bad = parse(r#"{"code": 404, "status": "Not Found", "data": null}"#);
        assert!(build_record(reference(), &bad, &parse(fixtures::TRANSLATION)).is_err());
    }

    #[test]
    fn test_missing_translation_text_is_incomplete() {
        let empty = parse(r#"{"code": 200, "data": {"text": ""}}"#);
        let outcome = build_record(reference(), &parse(fixtures::ARABIC), &empty).unwrap();
        assert!(matches!(outcome, ProviderOutcome::Incomplete(_)));
    }

    #[test]
    fn test_missing_data_is_incomplete() {
        let empty = parse(r#"{"code": 200}"#);
        let outcome = build_record(reference(), &empty, &parse(fixtures::TRANSLATION)).unwrap();
        assert!(matches!(outcome, ProviderOutcome::Incomplete(_)));
    }

    #[test]
    fn test_chapter_name_falls_back_to_table() {
        let bare = parse(r#"{"code": 200, "data": {"text": "نص"}}"#);
        let outcome = build_record(reference(), &bare, &parse(fixtures::TRANSLATION)).unwrap();
        match outcome {
            ProviderOutcome::Record(record) => {
                assert_eq!(
                    record.chapter_name,
                    chapters::chapter_name(1).unwrap().to_string()
                );
                assert!(record.chapter_name_arabic.is_empty());
            }
            other => panic!("expected record, got {:?}", other),
        }
    }
}
