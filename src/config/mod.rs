//! Configuration management for nectar.
//!
//! Configuration is read from `~/.config/nectar/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

pub mod palette;

pub use palette::{Palette, PaletteColors};

use crate::compose::{FontConfig, LayoutConfig};
use crate::fetcher::FetchConfig;
use crate::publish::PublisherConfig;
use crate::tafsir::TafsirConfig;
use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetch: FetchConfig,
    pub tafsir: TafsirConfig,
    pub theme: ThemeConfig,
    pub fonts: FontConfig,
    pub layout: LayoutConfig,
    pub publisher: PublisherConfig,
    pub schedule: ScheduleConfig,
}

/// Which palette a run uses.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub default: Palette,
    /// Cycle through `rotation_order` by posted count instead of using `default`
    pub rotation: bool,
    pub rotation_order: Vec<Palette>,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            default: Palette::TealGold,
            rotation: false,
            rotation_order: Palette::ALL.to_vec(),
        }
    }
}

impl ThemeConfig {
    /// Palette for the run after `posted_count` successful posts.
    pub fn palette_for(&self, posted_count: usize) -> Palette {
        if self.rotation && !self.rotation_order.is_empty() {
            self.rotation_order[posted_count % self.rotation_order.len()]
        } else {
            self.default
        }
    }
}

/// Daemon posting slots and output retention.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Local `HH:MM` times
    pub post_times: Vec<String>,
    pub cleanup_days: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            post_times: vec!["00:00".to_string(), "15:00".to_string()],
            cleanup_days: 7,
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from the default path when `None`.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// If the config file exists but is invalid, returns an error.
    /// Missing fields in the config file will use default values.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_config_path()?,
        };

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            tracing::info!("Wrote default config to {}", config_path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: config_path,
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path: `~/.config/nectar/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("nectar").join("config.toml"))
    }

    /// Get the default data directory: `~/.local/share/nectar`
    pub fn default_data_dir() -> Result<PathBuf, ConfigError> {
        let data_dir = dirs::data_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(data_dir.join("nectar"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.fetch.validate().map_err(ConfigError::Invalid)?;
        self.tafsir.validate().map_err(ConfigError::Invalid)?;
        self.layout.validate().map_err(ConfigError::Invalid)?;
        self.publisher.validate().map_err(ConfigError::Invalid)?;

        if self.theme.rotation && self.theme.rotation_order.is_empty() {
            return Err(ConfigError::Invalid(
                "theme.rotation_order must not be empty when rotation is on".into(),
            ));
        }

        for time in &self.schedule.post_times {
            crate::daemon::parse_time_of_day(time)
                .map_err(|e| ConfigError::Invalid(format!("schedule.post_times: {}", e)))?;
        }

        Ok(())
    }

    /// Create a default config file with comments.
    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let default_config = Self::default_config_content();

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(default_config.as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# nectar configuration
#
# Every key is optional; anything left out falls back to the value shown here.

[fetch]
# Per-request timeout in seconds
timeout_secs = 30

# Full passes over all enabled providers before a verse counts as unavailable
max_cycles = 10

# Tries per provider within one pass
attempts_per_provider = 3

# Retry n waits backoff_unit_ms * 2^n; passes after the first wait cycle_delay_ms
backoff_unit_ms = 1000
cycle_delay_ms = 5000

# Translation edition requested from AlQuran.cloud
translation_edition = "en.sahih"

# Providers in order of preference
providers = [
    { name = "quran_com", enabled = true },
    { name = "alquran_cloud", enabled = true },
    { name = "quranapi_ir", enabled = true },
]

[tafsir]
base_url = "https://quranapi.pages.dev/api"

# The commentary entry whose author contains this string is used
author_match = "Tazkirul"
timeout_secs = 15

# Shorten long commentary to roughly summary_budget characters
summarize = false
summary_budget = 1200
min_summary_chars = 500
first_paragraph_ratio = 0.7

# Shown, labelled as general reflection, when no commentary can be fetched.
# Leave unset to skip the commentary slide instead.
# fallback_text = "Reflect on this verse and what it asks of you today."

[theme]
# sage_cream, elegant_black or teal_gold
default = "teal_gold"
rotation = false
rotation_order = ["sage_cream", "elegant_black", "teal_gold"]

[fonts]
# Candidate font files, first existing file wins
arabic = [
    "fonts/arabic/amiri/AmiriQuran.ttf",
    "fonts/arabic/amiri/Amiri-Regular.ttf",
    "fonts/arabic/noto/NotoNaskhArabic-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoNaskhArabic-Regular.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
]
latin = [
    "fonts/ProductSans-Regular.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
]
latin_bold = [
    "fonts/ProductSans-Bold.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
]

[layout]
width = 1080
height = 1350
heading_y = 120
reference_y = 1190
watermark_y = 1280
heading_size = 40
reference_size = 30
watermark_size = 25

# Film grain over the gradient background
grain_intensity = 0.3
grain_noise = 40.0

watermark = "@NectarFromQuran"
cta_text = "If this touched your heart\n\nLike & Follow\n\nFor daily Quranic wisdom"
show_swipe_hint = true

[layout.arabic]
size = 60.0
line_height = 2.0
max_width = 940

[layout.translation]
size = 45.0
line_height = 1.5
max_width = 850

[layout.tafsir]
size = 42.0
line_height = 1.4
max_width = 850

[layout.cta]
size = 56.0
line_height = 1.7
max_width = 880

[layout.headings]
arabic = "Verse of Reflection"
translation = "English Translation"
tafsir = "Tazkirul Qur'an"
generic = "Reflection"

[publisher]
# "outbox" writes posts to a local directory; "instagram_graph" publishes
kind = "outbox"

# outbox_dir = "/path/to/outbox"

graph_api_base = "https://graph.facebook.com/v19.0"
# account_id = "1784..."
# access_token = "..."   (or set NECTAR_ACCESS_TOKEN)
# media_base_url = "https://example.org/nectar/output"
share_to_story = true
permalink_base = "https://www.instagram.com/p/"

[schedule]
# Local posting times, 24-hour HH:MM
post_times = ["00:00", "15:00"]

# Rendered slides older than this many days are deleted
cleanup_days = 7
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
