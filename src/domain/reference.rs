use std::fmt;
use std::str::FromStr;

use crate::app::{NectarError, Result};
use crate::domain::chapters;

/// A (chapter, verse) pair, validated against the chapter table on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VerseReference {
    chapter: u16,
    verse: u16,
}

impl VerseReference {
    pub fn new(chapter: u16, verse: u16) -> Result<Self> {
        let count = chapters::verse_count(chapter).ok_or_else(|| {
            NectarError::InvalidReference(format!(
                "chapter {} is outside 1..={}",
                chapter,
                chapters::CHAPTER_COUNT
            ))
        })?;

        if verse == 0 || verse > count {
            return Err(NectarError::InvalidReference(format!(
                "chapter {} has verses 1..={}, got {}",
                chapter, count, verse
            )));
        }

        Ok(Self { chapter, verse })
    }

    pub fn chapter(&self) -> u16 {
        self.chapter
    }

    pub fn verse(&self) -> u16 {
        self.verse
    }

    /// Cache key in `"chapter:verse"` form.
    pub fn key(&self) -> String {
        format!("{}:{}", self.chapter, self.verse)
    }
}

impl fmt::Display for VerseReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chapter, self.verse)
    }
}

impl FromStr for VerseReference {
    type Err = NectarError;

    fn from_str(s: &str) -> Result<Self> {
        let (chapter, verse) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| NectarError::InvalidReference(format!("expected chapter:verse, got {:?}", s)))?;

        let chapter = chapter
            .trim()
            .parse::<u16>()
            .map_err(|_| NectarError::InvalidReference(format!("bad chapter in {:?}", s)))?;
        let verse = verse
            .trim()
            .parse::<u16>()
            .map_err(|_| NectarError::InvalidReference(format!("bad verse in {:?}", s)))?;

        Self::new(chapter, verse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_format() {
        let r = VerseReference::new(2, 255).unwrap();
        assert_eq!(r.key(), "2:255");
        assert_eq!(r.to_string(), "2:255");
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(VerseReference::new(0, 1).is_err());
        assert!(VerseReference::new(115, 1).is_err());
        assert!(VerseReference::new(1, 0).is_err());
        assert!(VerseReference::new(1, 8).is_err());
        assert!(VerseReference::new(1, 7).is_ok());
    }

    #[test]
    fn test_parse() {
        let r: VerseReference = "39:53".parse().unwrap();
        assert_eq!(r.chapter(), 39);
        assert_eq!(r.verse(), 53);

        assert!("39".parse::<VerseReference>().is_err());
        assert!("x:1".parse::<VerseReference>().is_err());
        assert!("1:300".parse::<VerseReference>().is_err());
    }
}
