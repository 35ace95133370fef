pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "nectar")]
#[command(about = "Daily Quran verse carousels: fetch, render, publish", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.config/nectar/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory for caches, the posted list and rendered slides
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Post the next verse now
    Post,
    /// Render slides without publishing
    Generate {
        /// Verse to render as chapter:verse (default: next unposted)
        #[arg(long = "ref")]
        reference: Option<String>,

        /// Palette: sage_cream, elegant_black or teal_gold
        #[arg(long)]
        theme: Option<String>,
    },
    /// Fetch and print one verse
    Fetch {
        /// Verse as chapter:verse, e.g. 2:255
        reference: String,

        /// Also fetch the commentary
        #[arg(long)]
        tafsir: bool,

        /// Summarize the commentary
        #[arg(long)]
        summarize: bool,
    },
    /// Show catalog progress and cache sizes
    Status,
    /// Delete old rendered slides
    Cleanup,
    /// Background scheduler
    Daemon {
        #[command(subcommand)]
        action: DaemonAction,
    },
}

#[derive(Subcommand)]
pub enum DaemonAction {
    /// Start the scheduler
    Start {
        /// Skip the post on start
        #[arg(long)]
        no_initial_post: bool,

        /// Log file path (default: stdout)
        #[arg(short, long)]
        log: Option<PathBuf>,

        /// Run in foreground (don't detach)
        #[arg(short, long)]
        foreground: bool,
    },
    /// Stop the running daemon
    Stop,
    /// Check daemon status
    Status,
}
