//! # Nectar
//!
//! Posts a Quran verse carousel: Arabic text, translation, commentary and
//! a closing slide, rendered to PNG and handed to a publisher.
//!
//! ## Architecture
//!
//! ```text
//! Tracker → Fetcher (+ Tafsir) → Composer → Publisher → Tracker
//! ```
//!
//! - [`tracker`]: which catalog verse is next, with wraparound
//! - [`fetcher`]: verse text from several providers with retry, fallback and cache
//! - [`tafsir`]: commentary fetching, cleaning and summarizing
//! - [`compose`]: slide layout and rendering
//! - [`publish`]: outbox and Instagram Graph publishers, captions
//! - [`pipeline`]: one posting run end to end
//!
//! ## Quick Start
//!
//! ```bash
//! # Print a verse and its commentary
//! nectar fetch 2:255 --tafsir
//!
//! # Render slides for the next verse without posting
//! nectar generate
//!
//! # Post now
//! nectar post
//!
//! # Post at the configured times
//! nectar daemon start
//! ```

/// Application context and error handling.
///
/// [`AppContext`](app::AppContext) builds every component once from the
/// loaded configuration and hands them out by reference.
pub mod app;

/// Removal of old rendered slides.
pub mod cleanup;

/// Command-line interface using clap.
pub mod cli;

/// Slide layout and rendering.
///
/// - [`Composer`](compose::Composer): async trait producing slide files
/// - [`SlideComposer`](compose::SlideComposer): PNG renderer over rustybuzz + rusttype
pub mod compose;

/// Configuration management.
///
/// Loads from `~/.config/nectar/config.toml`; every section has defaults.
pub mod config;

/// Scheduler daemon.
///
/// - `nectar daemon start` - Post at the configured local times
/// - `nectar daemon stop` - Stop the daemon
/// - `nectar daemon status` - Check if daemon is running
pub mod daemon;

/// Core domain models: references, verse records, commentary, the catalog.
pub mod domain;

/// Verse fetching.
///
/// - [`VerseProvider`](fetcher::VerseProvider): one remote source
/// - [`MultiSourceFetcher`](fetcher::MultiSourceFetcher): ordered fallback with retries and cache
pub mod fetcher;

pub mod pipeline;

/// Publishing and captions.
pub mod publish;

/// Flat-file key-value caches.
pub mod store;

/// Verse commentary.
pub mod tafsir;

pub mod tracker;
