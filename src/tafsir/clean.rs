use html_escape::decode_html_entities;
use regex::Regex;

use crate::app::Result;

/// Turns provider commentary markup into plain text.
///
/// Block-level breaks become paragraph breaks, remaining tags are dropped,
/// entities are decoded, and whitespace runs collapse to one space inside a
/// paragraph.
#[derive(Clone)]
pub struct Cleaner {
    breaks: Regex,
    tags: Regex,
    spaces: Regex,
}

impl Cleaner {
    pub fn new() -> Result<Self> {
        Ok(Self {
            breaks: Regex::new(r"(?i)<br\s*/?>|</p\s*>|</div\s*>")?,
            tags: Regex::new(r"<[^>]+>")?,
            spaces: Regex::new(r"[^\S\n]+")?,
        })
    }

    pub fn clean(&self, raw: &str) -> String {
        let with_breaks = self.breaks.replace_all(raw, "\n");
        let stripped = self.tags.replace_all(&with_breaks, "");
        let decoded = decode_html_entities(&stripped);

        decoded
            .lines()
            .map(|line| self.spaces.replace_all(line.trim(), " ").into_owned())
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean(raw: &str) -> String {
        Cleaner::new().unwrap().clean(raw)
    }

    #[test]
    fn test_strips_tags() {
        assert_eq!(clean("<p>Allah is <b>near</b>.</p>"), "Allah is near.");
    }

    #[test]
    fn test_decodes_entities() {
        assert_eq!(clean("patience &amp; prayer &quot;together&quot;"), "patience & prayer \"together\"");
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(clean("  one \t two\u{00a0}  three  "), "one two three");
    }

    #[test]
    fn test_keeps_paragraph_breaks() {
        assert_eq!(
            clean("<p>First part.</p>\n\n<p>Second  part.</p><br/>"),
            "First part.\nSecond part."
        );
    }

    #[test]
    fn test_markup_only_is_empty() {
        assert!(clean("<div><br></div>  ").is_empty());
    }
}
