//! Visual palettes for rendered slides.

use std::fmt;
use std::str::FromStr;

use image::Rgb;
use serde::{Deserialize, Serialize};

/// The recognised palette identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Palette {
    SageCream,
    ElegantBlack,
    TealGold,
}

impl Palette {
    pub const ALL: [Palette; 3] = [Palette::SageCream, Palette::ElegantBlack, Palette::TealGold];

    pub fn name(&self) -> &'static str {
        match self {
            Palette::SageCream => "sage_cream",
            Palette::ElegantBlack => "elegant_black",
            Palette::TealGold => "teal_gold",
        }
    }

    fn hex_table(&self) -> [&'static str; 7] {
        // bg top, bg bottom, text, arabic, heading, source, accent
        match self {
            Palette::SageCream => [
                "#E8F3E8", "#D4E7D4", "#1B3A1B", "#2E7D32", "#2E7D32", "#4CAF50", "#2E7D32",
            ],
            Palette::ElegantBlack => [
                "#1A1A1A", "#000000", "#FFFFFF", "#FFD700", "#FFD700", "#A8A8A8", "#FFD700",
            ],
            Palette::TealGold => [
                "#0F4C5C", "#1A7A8A", "#FFFFFF", "#FFD700", "#FFD700", "#E8E8E8", "#1A7A8A",
            ],
        }
    }

    pub fn colors(&self) -> PaletteColors {
        let [bg_top, bg_bottom, text, arabic, heading, source, accent] =
            self.hex_table().map(|hex| parse_hex_color(hex).unwrap_or(Rgb([0, 0, 0])));

        PaletteColors {
            bg_top,
            bg_bottom,
            text,
            arabic,
            heading,
            source,
            accent,
        }
    }
}

impl fmt::Display for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Palette {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Palette::ALL
            .into_iter()
            .find(|p| p.name() == s.trim())
            .ok_or_else(|| {
                format!(
                    "Unknown theme: {} (expected one of sage_cream, elegant_black, teal_gold)",
                    s
                )
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteColors {
    pub bg_top: Rgb<u8>,
    pub bg_bottom: Rgb<u8>,
    pub text: Rgb<u8>,
    pub arabic: Rgb<u8>,
    pub heading: Rgb<u8>,
    pub source: Rgb<u8>,
    pub accent: Rgb<u8>,
}

/// Parse `#RRGGBB` into an RGB triple.
pub fn parse_hex_color(s: &str) -> Result<Rgb<u8>, String> {
    let digits = s.trim().trim_start_matches('#');
    if digits.len() != 6 {
        return Err(format!("Invalid hex color: {}", s));
    }

    let bytes = hex::decode(digits).map_err(|_| format!("Invalid hex color: {}", s))?;
    Ok(Rgb([bytes[0], bytes[1], bytes[2]]))
}
