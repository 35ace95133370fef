use serde::{Deserialize, Serialize};

use crate::domain::Theme;

/// A verse as returned by a provider. Immutable once cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseRecord {
    /// Original-script text, diacritics included
    pub arabic: String,
    pub translation: String,
    pub chapter_name: String,
    pub chapter_name_arabic: String,
    pub chapter: u16,
    pub verse: u16,
    /// Which provider supplied the data
    pub provenance: String,
}

impl VerseRecord {
    /// Both text fields must be non-empty for the record to be cached or shown.
    pub fn is_complete(&self) -> bool {
        !self.arabic.trim().is_empty() && !self.translation.trim().is_empty()
    }

    /// Display reference such as `Al-Baqarah (2:255)`
    pub fn display_reference(&self) -> String {
        format!("{} ({}:{})", self.chapter_name, self.chapter, self.verse)
    }
}

/// Commentary attached to a verse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Commentary {
    /// Fetched for this exact verse from the commentary provider.
    Verse(String),
    /// Curated general text. Never presented as verse-specific commentary.
    Generic(String),
}

impl Commentary {
    pub fn text(&self) -> &str {
        match self {
            Commentary::Verse(text) | Commentary::Generic(text) => text,
        }
    }

    pub fn is_verse_specific(&self) -> bool {
        matches!(self, Commentary::Verse(_))
    }
}

/// A fetched verse plus the additive fields the pipeline attaches.
#[derive(Debug, Clone)]
pub struct EnrichedVerse {
    pub record: VerseRecord,
    pub commentary: Option<Commentary>,
    pub theme: Option<Theme>,
}

impl EnrichedVerse {
    pub fn new(record: VerseRecord) -> Self {
        Self {
            record,
            commentary: None,
            theme: None,
        }
    }

    pub fn with_commentary(mut self, commentary: Option<Commentary>) -> Self {
        self.commentary = commentary;
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = Some(theme);
        self
    }
}

#[cfg(test)]
pub(crate) fn sample_record(provenance: &str) -> VerseRecord {
    VerseRecord {
        arabic: "ٱللَّهُ لَآ إِلَـٰهَ إِلَّا هُوَ ٱلْحَىُّ ٱلْقَيُّومُ".into(),
        translation: "Allah - there is no deity except Him, the Ever-Living, the Sustainer of existence.".into(),
        chapter_name: "Al-Baqarah".into(),
        chapter_name_arabic: "سورة البقرة".into(),
        chapter: 2,
        verse: 255,
        provenance: provenance.into(),
    }
}
