//! Font-independent text layout: wrapping, height measurement, overflow
//! splitting and the slide plan.

use crate::compose::config::{LayoutConfig, TextStyle};
use crate::domain::{Commentary, EnrichedVerse};

/// Opening ornament of a verse.
pub const ORNAMENT: char = '۞';
/// Prostration mark some verses end with.
pub const SAJDAH: char = '۩';

/// Which font a piece of text is set in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontRole {
    Arabic,
    Latin,
    LatinBold,
}

/// Measures single lines of text.
pub trait TextMeasurer {
    /// Advance width in pixels of `text` on one line at `size` px.
    fn line_width(&self, role: FontRole, text: &str, size: f32) -> f32;
}

/// Greedy word wrap. Explicit newlines start a new line; a blank input line
/// is kept as an empty line. A word wider than `max_width` sits on its own line.
pub fn wrap_lines(
    measurer: &dyn TextMeasurer,
    role: FontRole,
    text: &str,
    size: f32,
    max_width: f32,
) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();

        for word in paragraph.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }

            let candidate = format!("{} {}", current, word);
            if measurer.line_width(role, &candidate, size) <= max_width {
                current = candidate;
            } else {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
            }
        }

        lines.push(current);
    }

    lines
}

/// Height of `text` wrapped in `style`.
pub fn text_height(measurer: &dyn TextMeasurer, role: FontRole, text: &str, style: &TextStyle) -> f32 {
    let lines = wrap_lines(measurer, role, text, style.size, style.max_width as f32);
    lines.len() as f32 * style.line_advance()
}

/// Split `text` at word boundaries into chunks whose wrapped height fits
/// `max_height`, then even out a short trailing chunk.
pub fn split_text_by_height(
    measurer: &dyn TextMeasurer,
    role: FontRole,
    text: &str,
    style: &TextStyle,
    max_height: f32,
) -> Vec<String> {
    let mut chunks: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for word in text.split_whitespace() {
        current.push(word);
        if text_height(measurer, role, &current.join(" "), style) > max_height {
            current.pop();
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            current.push(word);
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    rebalance(&mut chunks);

    if chunks.is_empty() {
        return vec![text.to_string()];
    }
    chunks.into_iter().map(|words| words.join(" ")).collect()
}

/// When the last chunk has fewer than 3 words and the one before it at
/// least 5, move words from the end of the previous chunk so the two are
/// closer to even. Never moves more than half of the previous chunk.
pub fn rebalance<T>(chunks: &mut [Vec<T>]) {
    let n = chunks.len();
    if n < 2 {
        return;
    }

    let last_len = chunks[n - 1].len();
    let prev_len = chunks[n - 2].len();
    if last_len >= 3 || prev_len < 5 {
        return;
    }

    let total = prev_len + last_len;
    let to_move = (total / 2).saturating_sub(last_len);
    if to_move == 0 || to_move > prev_len / 2 {
        return;
    }

    let mut moved = chunks[n - 2].split_off(prev_len - to_move);
    moved.append(&mut chunks[n - 1]);
    chunks[n - 1] = moved;
}

/// Render `n` with Arabic-Indic digits.
pub fn arabic_indic(n: u16) -> String {
    n.to_string()
        .chars()
        .map(|c| match c.to_digit(10) {
            Some(d) => char::from_u32(0x0660 + d).unwrap_or(c),
            None => c,
        })
        .collect()
}

/// Verse text without ornament or trailing sajdah mark, plus whether it had one.
pub fn strip_verse_marks(arabic: &str) -> (String, bool) {
    let clean = arabic.replace(ORNAMENT, "");
    let clean = clean.trim();
    match clean.strip_suffix(SAJDAH) {
        Some(rest) => (rest.trim().to_string(), true),
        None => (clean.to_string(), false),
    }
}

/// The end-of-verse marker, `﴿n﴾`, followed by the sajdah mark when present.
pub fn end_marker(verse: u16, sajdah: bool) -> String {
    let marker = format!("﴿{}﴾", arabic_indic(verse));
    if sajdah {
        format!("{}  {}", marker, SAJDAH)
    } else {
        marker
    }
}

/// Full decorated verse: ornament, text, end marker.
pub fn decorate_verse(arabic: &str, verse: u16) -> String {
    let (clean, sajdah) = strip_verse_marks(arabic);
    format!("{}  {}  {}", ORNAMENT, clean, end_marker(verse, sajdah))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideKind {
    Arabic,
    Translation,
    Commentary,
    CallToAction,
}

/// Everything needed to draw one slide, before any pixels exist.
#[derive(Debug, Clone, PartialEq)]
pub struct SlidePlan {
    pub kind: SlideKind,
    pub heading: Option<String>,
    pub body: String,
    pub role: FontRole,
    pub style: TextStyle,
    pub align: Align,
    pub footer: Option<String>,
    pub swipe_hint: bool,
}

fn chunked(
    measurer: &dyn TextMeasurer,
    role: FontRole,
    text: &str,
    style: &TextStyle,
    max_height: f32,
) -> Vec<String> {
    if text_height(measurer, role, text, style) <= max_height {
        vec![text.to_string()]
    } else {
        split_text_by_height(measurer, role, text, style, max_height)
    }
}

fn arabic_bodies(
    measurer: &dyn TextMeasurer,
    layout: &LayoutConfig,
    arabic: &str,
    verse: u16,
) -> Vec<String> {
    let max_height = layout.max_text_height();
    let full = decorate_verse(arabic, verse);
    if text_height(measurer, FontRole::Arabic, &full, &layout.arabic) <= max_height {
        return vec![full];
    }

    let (clean, sajdah) = strip_verse_marks(arabic);
    let chunks = split_text_by_height(measurer, FontRole::Arabic, &clean, &layout.arabic, max_height);
    let last = chunks.len() - 1;

    chunks
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| {
            let mut text = chunk;
            if i == 0 {
                text = format!("{}  {}", ORNAMENT, text);
            }
            if i == last {
                text = format!("{}  {}", text, end_marker(verse, sajdah));
            }
            text
        })
        .collect()
}

/// Lay out the whole carousel for `verse`: Arabic, translation, commentary
/// when present, and the closing call to action.
pub fn plan_slides(
    measurer: &dyn TextMeasurer,
    layout: &LayoutConfig,
    verse: &EnrichedVerse,
) -> Vec<SlidePlan> {
    let record = &verse.record;
    let reference = record.display_reference();
    let max_height = layout.max_text_height();
    let mut slides = Vec::new();

    for body in arabic_bodies(measurer, layout, &record.arabic, record.verse) {
        slides.push(SlidePlan {
            kind: SlideKind::Arabic,
            heading: Some(layout.headings.arabic.clone()),
            body,
            role: FontRole::Arabic,
            style: layout.arabic,
            align: Align::Right,
            footer: Some(reference.clone()),
            swipe_hint: false,
        });
    }

    let translation = format!("\"{}\"", record.translation.trim());
    for body in chunked(measurer, FontRole::Latin, &translation, &layout.translation, max_height) {
        slides.push(SlidePlan {
            kind: SlideKind::Translation,
            heading: Some(layout.headings.translation.clone()),
            body,
            role: FontRole::Latin,
            style: layout.translation,
            align: Align::Left,
            footer: Some(reference.clone()),
            swipe_hint: false,
        });
    }

    if let Some(commentary) = &verse.commentary {
        let heading = match commentary {
            Commentary::Verse(_) => &layout.headings.tafsir,
            Commentary::Generic(_) => &layout.headings.generic,
        };
        let text = format!("\"{}\"", commentary.text().trim());

        for body in chunked(measurer, FontRole::Latin, &text, &layout.tafsir, max_height) {
            slides.push(SlidePlan {
                kind: SlideKind::Commentary,
                heading: Some(heading.clone()),
                body,
                role: FontRole::Latin,
                style: layout.tafsir,
                align: Align::Left,
                footer: Some(reference.clone()),
                swipe_hint: false,
            });
        }
    }

    slides.push(SlidePlan {
        kind: SlideKind::CallToAction,
        heading: None,
        body: layout.cta_text.clone(),
        role: FontRole::Latin,
        style: layout.cta,
        align: Align::Center,
        footer: None,
        swipe_hint: false,
    });

    if layout.show_swipe_hint {
        let last = slides.len() - 1;
        for slide in &mut slides[..last] {
            slide.swipe_hint = true;
        }
    }

    slides
}
