use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Size and wrapping of one kind of body text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Em size in pixels
    pub size: f32,
    /// Baseline distance as a multiple of `size`
    pub line_height: f32,
    /// Wrap width in pixels
    pub max_width: u32,
}

impl TextStyle {
    pub const fn new(size: f32, line_height: f32, max_width: u32) -> Self {
        Self {
            size,
            line_height,
            max_width,
        }
    }

    pub fn line_advance(&self) -> f32 {
        self.size * self.line_height
    }
}

/// Slide titles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Headings {
    pub arabic: String,
    pub translation: String,
    pub tafsir: String,
    /// Used over the fallback text so it never reads as verse commentary
    pub generic: String,
}

impl Default for Headings {
    fn default() -> Self {
        Self {
            arabic: "Verse of Reflection".to_string(),
            translation: "English Translation".to_string(),
            tafsir: "Tazkirul Qur'an".to_string(),
            generic: "Reflection".to_string(),
        }
    }
}

/// Slide geometry and text parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub width: u32,
    pub height: u32,
    pub heading_y: u32,
    pub reference_y: u32,
    pub watermark_y: u32,

    pub arabic: TextStyle,
    pub translation: TextStyle,
    pub tafsir: TextStyle,
    pub cta: TextStyle,

    pub heading_size: f32,
    pub reference_size: f32,
    pub watermark_size: f32,
    pub hint_size: f32,
    pub story_label_size: f32,

    /// Blend factor of the noise layer, 0 disables grain
    pub grain_intensity: f32,
    /// Standard deviation of the noise around mid-grey
    pub grain_noise: f32,

    pub headings: Headings,
    pub watermark: String,
    pub cta_text: String,
    pub show_swipe_hint: bool,
    pub swipe_hint: String,
    pub story_label: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1350,
            heading_y: 120,
            reference_y: 1190,
            watermark_y: 1280,
            arabic: TextStyle::new(60.0, 2.0, 940),
            translation: TextStyle::new(45.0, 1.5, 850),
            tafsir: TextStyle::new(42.0, 1.4, 850),
            cta: TextStyle::new(56.0, 1.7, 880),
            heading_size: 40.0,
            reference_size: 30.0,
            watermark_size: 25.0,
            hint_size: 32.0,
            story_label_size: 48.0,
            grain_intensity: 0.3,
            grain_noise: 40.0,
            headings: Headings::default(),
            watermark: "@NectarFromQuran".to_string(),
            cta_text: "If this touched your heart\n\nLike & Follow\n\nFor daily Quranic wisdom"
                .to_string(),
            show_swipe_hint: true,
            swipe_hint: "Swipe →".to_string(),
            story_label: "New Post".to_string(),
        }
    }
}

impl LayoutConfig {
    /// Top of the body text area, below the heading band.
    pub fn text_top(&self) -> f32 {
        self.heading_y as f32 + 100.0
    }

    /// Bottom of the body text area, above the reference line.
    pub fn text_bottom(&self) -> f32 {
        self.reference_y as f32 - 50.0
    }

    /// Height available to body text on one slide.
    pub fn max_text_height(&self) -> f32 {
        self.text_bottom() - self.text_top() - 100.0
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err("layout.width and layout.height must be positive".into());
        }
        if self.reference_y >= self.height || self.watermark_y >= self.height {
            return Err("layout.reference_y and layout.watermark_y must lie on the canvas".into());
        }
        if self.max_text_height() <= 0.0 {
            return Err("layout leaves no room for text between heading and reference".into());
        }
        for (name, style) in [
            ("arabic", &self.arabic),
            ("translation", &self.translation),
            ("tafsir", &self.tafsir),
            ("cta", &self.cta),
        ] {
            if style.size <= 0.0 || style.line_height <= 0.0 {
                return Err(format!("layout.{} size and line_height must be positive", name));
            }
            if style.max_width == 0 || style.max_width > self.width {
                return Err(format!("layout.{}.max_width must be within the canvas", name));
            }
        }
        if !(0.0..=1.0).contains(&self.grain_intensity) {
            return Err("layout.grain_intensity must be between 0 and 1".into());
        }
        Ok(())
    }
}

/// Candidate font files per script, tried in order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    pub arabic: Vec<PathBuf>,
    pub latin: Vec<PathBuf>,
    pub latin_bold: Vec<PathBuf>,
}

impl Default for FontConfig {
    fn default() -> Self {
        let paths = |list: &[&str]| list.iter().map(PathBuf::from).collect::<Vec<_>>();

        Self {
            arabic: paths(&[
                "fonts/arabic/amiri/AmiriQuran.ttf",
                "fonts/arabic/amiri/Amiri-Regular.ttf",
                "fonts/arabic/noto/NotoNaskhArabic-Regular.ttf",
                "/usr/share/fonts/truetype/noto/NotoNaskhArabic-Regular.ttf",
                "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            ]),
            latin: paths(&[
                "fonts/ProductSans-Regular.ttf",
                "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
                "/System/Library/Fonts/Supplemental/Arial.ttf",
            ]),
            latin_bold: paths(&[
                "fonts/ProductSans-Bold.ttf",
                "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
                "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
            ]),
        }
    }
}
