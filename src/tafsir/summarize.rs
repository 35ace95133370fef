//! Length reduction for long commentary.
//!
//! Pure text transform: no I/O, deterministic for a given input. Lengths are
//! counted in characters, not bytes.

/// Tunable limits for [`summarize`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryLimits {
    /// Target length of the summary
    pub budget: usize,
    /// Summaries shorter than this fall back to hard truncation
    pub min_chars: usize,
    /// Share of the budget above which the opening paragraph dominates the summary
    pub first_paragraph_ratio: f64,
}

impl SummaryLimits {
    pub fn new(budget: usize) -> Self {
        Self {
            budget,
            ..Self::default()
        }
    }
}

impl Default for SummaryLimits {
    fn default() -> Self {
        Self {
            budget: 1200,
            min_chars: 500,
            first_paragraph_ratio: 0.7,
        }
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn paragraphs(text: &str) -> Vec<&str> {
    let by_line: Vec<&str> = text
        .split('\n')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    if by_line.len() == 1 {
        text.split("  ")
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect()
    } else {
        by_line
    }
}

/// Split after `.`, `!` or `?` when followed by whitespace.
fn sentences(paragraph: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut chars = paragraph.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            if let Some(&(_, next)) = chars.peek() {
                if next.is_whitespace() {
                    let end = i + c.len_utf8();
                    out.push(paragraph[start..end].trim());
                    start = end;
                }
            }
        }
    }

    let tail = paragraph[start..].trim();
    if !tail.is_empty() {
        out.push(tail);
    }
    out
}

/// Accumulates pieces joined by single spaces, tracking the joined length.
struct Builder<'a> {
    parts: Vec<&'a str>,
    len: usize,
}

impl<'a> Builder<'a> {
    fn new() -> Self {
        Self {
            parts: Vec::new(),
            len: 0,
        }
    }

    fn len_with(&self, piece: &str) -> usize {
        let sep = usize::from(!self.parts.is_empty());
        self.len + sep + char_len(piece)
    }

    fn push(&mut self, piece: &'a str) {
        self.len = self.len_with(piece);
        self.parts.push(piece);
    }

    /// Add whole sentences of `paragraph` while they fit; drop the rest.
    fn push_sentences(&mut self, paragraph: &'a str, budget: usize) {
        for sentence in sentences(paragraph) {
            if self.len_with(sentence) > budget {
                break;
            }
            self.push(sentence);
        }
    }

    fn finish(self) -> String {
        self.parts.join(" ")
    }
}

/// Shorten `text` to roughly `limits.budget` characters.
///
/// Text that already fits is returned unchanged. Otherwise whole paragraphs
/// are kept greedily, the overflowing paragraph contributes complete
/// sentences only, and a degenerate result falls back to truncating at the
/// last full stop (or at a word boundary with an ellipsis).
pub fn summarize(text: &str, limits: &SummaryLimits) -> String {
    let budget = limits.budget;
    if char_len(text) <= budget {
        return text.to_string();
    }

    let paragraphs = paragraphs(text);
    let mut builder = Builder::new();

    for (i, paragraph) in paragraphs.iter().enumerate() {
        let len = char_len(paragraph);

        if i == 0 && len <= budget && len as f64 > budget as f64 * limits.first_paragraph_ratio {
            // Always included, even when it leaves little room for the rest.
            tracing::debug!("Opening paragraph takes {} of {} characters", len, budget);
            builder.push(paragraph);
            continue;
        }

        if builder.len_with(paragraph) <= budget {
            builder.push(paragraph);
        } else {
            builder.push_sentences(paragraph, budget);
            break;
        }
    }

    let summary = builder.finish();
    if char_len(&summary) >= limits.min_chars {
        return summary;
    }

    truncate(text, limits)
}

fn truncate(text: &str, limits: &SummaryLimits) -> String {
    let head: String = text.chars().take(limits.budget).collect();

    if let Some(period) = head.rfind('.') {
        if char_len(&head[..period]) > limits.min_chars {
            return head[..=period].trim().to_string();
        }
    }

    let cut = match head.rfind(char::is_whitespace) {
        Some(space) if !head[..space].trim().is_empty() => &head[..space],
        _ => head.as_str(),
    };
    format!("{}...", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_text(sentences: usize) -> String {
        (0..sentences)
            .map(|i| format!("Sentence number {} speaks of mercy and patience.", i))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_short_text_unchanged() {
        let text = "  Already short.\n\nWith odd   spacing.  ";
        assert_eq!(summarize(text, &SummaryLimits::default()), text);
    }

    #[test]
    fn test_exact_budget_unchanged() {
        let text = "a".repeat(1200);
        assert_eq!(summarize(&text, &SummaryLimits::default()), text);
    }

    #[test]
    fn test_long_single_paragraph_ends_at_sentence() {
        let text = long_text(120);
        assert!(text.chars().count() >= 5000);

        let summary = summarize(&text, &SummaryLimits::default());
        let len = summary.chars().count();

        assert!(len <= 1220, "summary too long: {}", len);
        assert!(len >= 500);
        assert!(summary.ends_with('.'));
        assert!(text.starts_with(&summary));
    }

    #[test]
    fn test_paragraphs_accumulate_whole() {
        let para = long_text(6);
        let text = vec![para.clone(); 8].join("\n");

        let summary = summarize(&text, &SummaryLimits::default());

        assert!(summary.chars().count() <= 1200);
        assert!(summary.starts_with(&para));
        assert!(summary.ends_with('.'));
    }

    #[test]
    fn test_long_first_paragraph_leaves_room_for_sentences() {
        let first = long_text(20);
        let first_len = first.chars().count();
        assert!(first_len > 840 && first_len <= 1200, "len {}", first_len);
        let text = format!("{}\n{}", first, long_text(10));

        let summary = summarize(&text, &SummaryLimits::default());
        let len = summary.chars().count();

        assert!(summary.starts_with(&first));
        assert!(len > first_len && len <= 1200, "len {}", len);
        assert!(summary.ends_with('.'));
    }

    #[test]
    fn test_paragraph_after_long_opening_is_kept() {
        let first = format!("{}.", "a".repeat(899));
        let second = format!("{}.", "b".repeat(199));
        let text = format!("{}\n{}\n{}", first, second, long_text(20));

        let summary = summarize(&text, &SummaryLimits::default());

        assert!(summary.starts_with(&format!("{} {}", first, second)));
        assert!(summary.chars().count() <= 1200);
    }

    #[test]
    fn test_double_space_paragraphs() {
        let para = long_text(5);
        let text = vec![para.clone(); 10].join("  ");

        let summary = summarize(&text, &SummaryLimits::default());
        assert!(summary.chars().count() <= 1200);
        assert!(summary.starts_with(&para));
    }

    #[test]
    fn test_degenerate_falls_back_to_ellipsis() {
        let text = "word ".repeat(400);
        let summary = summarize(&text, &SummaryLimits::default());

        assert!(summary.ends_with("word..."));
        assert!(summary.chars().count() <= 1203);
    }

    #[test]
    fn test_giant_sentence_kept_whole() {
        let mut text = "x".repeat(700);
        text.push_str(". ");
        text.push_str(&"y".repeat(2000));

        let summary = summarize(&text, &SummaryLimits::default());
        assert_eq!(summary.chars().count(), 701);
        assert!(summary.ends_with('.'));
    }

    #[test]
    fn test_short_summary_falls_back_to_full_stop() {
        // Two short sentences, then one that never ends inside the budget.
        let text = format!(
            "{}. {}. {}.{}",
            "a".repeat(100),
            "b".repeat(300),
            "c".repeat(200),
            "c".repeat(1800)
        );

        let summary = summarize(&text, &SummaryLimits::default());
        assert_eq!(summary.chars().count(), 605);
        assert!(summary.ends_with('.'));
    }

    #[test]
    fn test_full_stop_must_pass_floor() {
        let at_floor = format!("{}.{}", "a".repeat(500), "b".repeat(2000));
        let summary = summarize(&at_floor, &SummaryLimits::default());
        assert!(summary.ends_with("..."));
        assert_eq!(summary.chars().count(), 1203);

        let past_floor = format!("{}.{}", "a".repeat(501), "b".repeat(2000));
        let summary = summarize(&past_floor, &SummaryLimits::default());
        assert_eq!(summary.chars().count(), 502);
        assert!(summary.ends_with('.'));
    }

    #[test]
    fn test_never_empty() {
        let text = "z".repeat(3000);
        let summary = summarize(&text, &SummaryLimits::new(100));
        assert!(!summary.is_empty());
        assert!(summary.chars().count() <= 103);
    }

    #[test]
    fn test_sentence_split() {
        assert_eq!(
            sentences("One. Two! Three? Four"),
            vec!["One.", "Two!", "Three?", "Four"]
        );
        assert_eq!(sentences("v1.2 is fine."), vec!["v1.2 is fine."]);
    }
}
