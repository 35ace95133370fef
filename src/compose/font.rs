//! Font loading and shaping.
//!
//! Shaping goes through rustybuzz so Arabic letters join and diacritics
//! attach; rusttype then rasterizes the shaped glyph ids.

use std::fs;
use std::path::{Path, PathBuf};

use rusttype::{Font, GlyphId, Scale};

use crate::app::{NectarError, Result};
use crate::compose::config::FontConfig;
use crate::compose::layout::{FontRole, TextMeasurer};

/// A glyph placed on a line, in pixels relative to the line origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapedGlyph {
    pub id: u16,
    pub x: f32,
    pub y: f32,
}

/// One shaped line in visual (left-to-right) order.
#[derive(Debug, Clone, Default)]
pub struct ShapedLine {
    pub glyphs: Vec<ShapedGlyph>,
    pub width: f32,
}

pub struct FontFace {
    path: PathBuf,
    data: Vec<u8>,
    font: Font<'static>,
}

impl FontFace {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read(path)?;

        if rustybuzz::Face::from_slice(&data, 0).is_none() {
            return Err(NectarError::Render(format!(
                "{} is not a usable font file",
                path.display()
            )));
        }
        let font = Font::try_from_vec(data.clone()).ok_or_else(|| {
            NectarError::Render(format!("{} is not a usable font file", path.display()))
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            data,
            font,
        })
    }

    /// Load the first candidate that exists and parses.
    pub fn load_first(candidates: &[PathBuf]) -> Result<Self> {
        for path in candidates {
            if !path.exists() {
                continue;
            }
            match Self::load(path) {
                Ok(face) => {
                    tracing::debug!("Using font {}", path.display());
                    return Ok(face);
                }
                Err(e) => tracing::warn!("Skipping font {}: {}", path.display(), e),
            }
        }

        Err(NectarError::Render(format!(
            "none of the font candidates could be loaded: {}",
            candidates
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        )))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn font(&self) -> &Font<'static> {
        &self.font
    }

    /// rusttype scale that makes one em `size` pixels tall.
    pub fn scale(&self, size: f32) -> Scale {
        let metrics = self.font.v_metrics_unscaled();
        let units = f32::from(self.font.units_per_em().max(1));
        Scale::uniform(size * (metrics.ascent - metrics.descent) / units)
    }

    pub fn ascent(&self, size: f32) -> f32 {
        self.font.v_metrics(self.scale(size)).ascent
    }

    /// Shape one line of text at `size` px. Direction and script are guessed
    /// from the text itself.
    pub fn shape(&self, text: &str, size: f32) -> ShapedLine {
        let Some(face) = rustybuzz::Face::from_slice(&self.data, 0) else {
            return ShapedLine::default();
        };

        let mut buffer = rustybuzz::UnicodeBuffer::new();
        buffer.push_str(text);
        buffer.guess_segment_properties();

        let output = rustybuzz::shape(&face, &[], buffer);
        let px_per_unit = size / face.units_per_em().max(1) as f32;

        let mut x = 0.0;
        let mut glyphs = Vec::with_capacity(output.len());
        for (info, pos) in output.glyph_infos().iter().zip(output.glyph_positions()) {
            glyphs.push(ShapedGlyph {
                id: info.glyph_id as u16,
                x: x + pos.x_offset as f32 * px_per_unit,
                y: -(pos.y_offset as f32) * px_per_unit,
            });
            x += pos.x_advance as f32 * px_per_unit;
        }

        ShapedLine { glyphs, width: x }
    }

    pub fn glyph(&self, id: u16) -> rusttype::Glyph<'static> {
        self.font.glyph(GlyphId(id))
    }
}

/// The three faces a slide uses, loaded once and shared.
pub struct FontSet {
    arabic: FontFace,
    latin: FontFace,
    latin_bold: FontFace,
}

impl FontSet {
    pub fn load(config: &FontConfig) -> Result<Self> {
        let arabic = FontFace::load_first(&config.arabic)?;
        let latin = FontFace::load_first(&config.latin)?;
        // Bold falls back to the regular face.
        let latin_bold = match FontFace::load_first(&config.latin_bold) {
            Ok(face) => face,
            Err(_) => FontFace::load(latin.path())?,
        };

        tracing::info!(
            "Fonts: arabic={} latin={} bold={}",
            arabic.path().display(),
            latin.path().display(),
            latin_bold.path().display()
        );

        Ok(Self {
            arabic,
            latin,
            latin_bold,
        })
    }

    pub fn face(&self, role: FontRole) -> &FontFace {
        match role {
            FontRole::Arabic => &self.arabic,
            FontRole::Latin => &self.latin,
            FontRole::LatinBold => &self.latin_bold,
        }
    }
}

impl TextMeasurer for FontSet {
    fn line_width(&self, role: FontRole, text: &str, size: f32) -> f32 {
        self.face(role).shape(text, size).width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_first_skips_missing() {
        let dir = tempfile::tempdir().unwrap();
        let candidates = vec![dir.path().join("a.ttf"), dir.path().join("b.ttf")];

        let err = FontFace::load_first(&candidates).err().unwrap();
        assert!(err.to_string().contains("a.ttf"));
    }

    #[test]
    fn test_garbage_font_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.ttf");
        fs::write(&path, b"not a font").unwrap();

        assert!(FontFace::load(&path).is_err());
        assert!(FontFace::load_first(&[path]).is_err());
    }

    #[test]
    fn test_system_font_shapes_when_present() {
        // Only meaningful on machines with DejaVu installed.
        let path = PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf");
        let Ok(face) = FontFace::load(&path) else {
            return;
        };

        let short = face.shape("Hi", 40.0);
        let long = face.shape("Hi there", 40.0);
        assert_eq!(short.glyphs.len(), 2);
        assert!(long.width > short.width);
        assert!(face.ascent(40.0) > 0.0);
    }
}
