use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;

use crate::app::{AppContext, NectarError, Result};
use crate::cleanup;
use crate::config::Palette;
use crate::daemon::{self, Daemon, DaemonConfig};
use crate::domain::VerseReference;
use crate::pipeline::RunReport;
use crate::publish::OutboxPublisher;
use crate::tafsir::summarize;

pub async fn post(ctx: &AppContext) -> Result<RunReport> {
    let pipeline = ctx.pipeline()?;
    let report = pipeline.run_once().await?;

    println!(
        "Posted {} [{}] as {} ({} slides, {} palette)",
        report.reference,
        report.theme.label(),
        report.post_id,
        report.slides.len(),
        report.palette
    );
    println!("  Source: {}", report.provenance);
    if !report.commentary {
        println!("  No commentary available; posted without a commentary slide");
    }
    if let Some(link) = &report.permalink {
        println!("  {}", link);
    }
    if let Some(story) = &report.story_id {
        println!("  Shared to story: {}", story);
    }
    if report.cleanup.removed > 0 {
        println!("  Removed {} old slides", report.cleanup.removed);
    }

    Ok(report)
}

pub async fn generate(ctx: &AppContext, reference: Option<&str>, theme: Option<&str>) -> Result<()> {
    let reference = reference
        .map(|s| s.parse::<VerseReference>())
        .transpose()?;
    let palette = theme
        .map(|s| s.parse::<Palette>().map_err(NectarError::Config))
        .transpose()?;

    // Generating never publishes, so the outbox stands in for any publisher.
    let publisher = Arc::new(OutboxPublisher::new(ctx.paths.outbox.clone()));
    let pipeline = ctx.pipeline_with(ctx.composer()?, publisher)?;

    let slides = pipeline.generate(reference, palette).await?;
    println!("Generated {} slides:", slides.len());
    for path in slides {
        println!("  {}", path.display());
    }
    Ok(())
}

pub async fn fetch(ctx: &AppContext, reference: &str, tafsir: bool, shorten: bool) -> Result<()> {
    let reference: VerseReference = reference.parse()?;

    let record = ctx
        .fetcher
        .get(reference)
        .await
        .ok_or(NectarError::FetchExhausted(reference))?;

    println!("{}", record.display_reference());
    println!("  Arabic ({}): {}", record.chapter_name_arabic, record.arabic);
    println!("  Translation: {}", record.translation);
    println!("  Source: {}", record.provenance);

    if tafsir {
        match ctx.tafsir.get(reference).await {
            Some(text) => {
                let text = if shorten {
                    summarize(&text, &ctx.config.tafsir.summary_limits())
                } else {
                    text
                };
                println!("\nCommentary ({} chars):\n{}", text.chars().count(), text);
            }
            None => println!("\nNo commentary available for {}", reference),
        }
    }

    Ok(())
}

pub fn status(ctx: &AppContext) -> Result<()> {
    println!(
        "Catalog: {} verses, {} posted this round",
        ctx.tracker.catalog_len(),
        ctx.tracker.posted_count()
    );

    match ctx.tracker.peek() {
        Some(next) => println!(
            "Next: {} [{}] (#{})",
            next.reference,
            next.theme.label(),
            next.index + 1
        ),
        None => println!("Next: nothing to post"),
    }

    println!(
        "Palette: {}",
        ctx.config.theme.palette_for(ctx.tracker.posted_count())
    );
    println!("Verse cache: {} entries", ctx.fetcher.cache_len());
    println!("Commentary cache: {} entries", ctx.tafsir.cache_len());

    let providers: Vec<String> = ctx
        .fetcher
        .provider_names()
        .into_iter()
        .map(|(name, enabled)| {
            if enabled {
                name.to_string()
            } else {
                format!("{} (disabled)", name)
            }
        })
        .collect();
    println!("Providers: {}", providers.join(", "));
    println!("Publisher: {:?}", ctx.config.publisher.kind);
    println!("{}", daemon::daemon_status());
    Ok(())
}

pub fn cleanup(ctx: &AppContext) -> Result<()> {
    let days = ctx.config.schedule.cleanup_days;
    let report = cleanup::remove_old_slides(&ctx.paths.output, cleanup::days(days))?;

    println!(
        "Removed {} slides older than {} days from {}",
        report.removed,
        days,
        ctx.paths.output.display()
    );
    if report.failed > 0 {
        eprintln!("  {} files could not be removed", report.failed);
    }
    Ok(())
}

/// Options of `daemon start`, plus the global flags to hand to a detached child.
pub struct DaemonStart<'a> {
    pub config_path: Option<&'a Path>,
    pub data_dir: Option<&'a Path>,
    pub no_initial_post: bool,
    pub log: Option<PathBuf>,
    pub foreground: bool,
}

pub async fn start_daemon(ctx: AppContext, opts: DaemonStart<'_>) -> Result<()> {
    if Daemon::is_running() {
        return Err(NectarError::Other(daemon::daemon_status()));
    }

    if !opts.foreground {
        return spawn_detached(&opts);
    }

    let mut config = DaemonConfig::from_context(&ctx)?;
    config.post_on_start = !opts.no_initial_post;
    config.log_file = opts.log;

    let pipeline = Arc::new(ctx.pipeline()?);
    Daemon::new(pipeline, config).run().await
}

/// Re-run this binary in the foreground, detached from the terminal.
fn spawn_detached(opts: &DaemonStart<'_>) -> Result<()> {
    let exe = std::env::current_exe()?;
    let mut command = Command::new(exe);

    if let Some(path) = opts.config_path {
        command.arg("--config").arg(path);
    }
    if let Some(dir) = opts.data_dir {
        command.arg("--data-dir").arg(dir);
    }
    command.args(["daemon", "start", "--foreground"]);
    if opts.no_initial_post {
        command.arg("--no-initial-post");
    }
    if let Some(log) = &opts.log {
        command.arg("--log").arg(log);
    }

    let child = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    println!("Daemon started (PID: {})", child.id());
    if let Some(log) = &opts.log {
        println!("Logging to {}", log.display());
    }
    Ok(())
}

pub fn stop_daemon() -> Result<()> {
    daemon::stop_daemon().map_err(NectarError::Other)?;
    println!("Daemon stopped");
    Ok(())
}

pub fn daemon_status() {
    println!("{}", daemon::daemon_status());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn context() -> (tempfile::TempDir, AppContext) {
        let dir = tempfile::tempdir().unwrap();
        let ctx = AppContext::with_config(Config::default(), dir.path().to_path_buf()).unwrap();
        (dir, ctx)
    }

    #[tokio::test]
    async fn test_generate_rejects_bad_reference() {
        let (_dir, ctx) = context();
        assert!(generate(&ctx, Some("2:999"), None).await.is_err());
        assert!(generate(&ctx, Some("two"), None).await.is_err());
    }

    #[tokio::test]
    async fn test_generate_rejects_unknown_theme() {
        let (_dir, ctx) = context();
        let err = generate(&ctx, Some("1:1"), Some("neon")).await.unwrap_err();
        assert!(err.to_string().contains("Unknown theme"));
    }

    #[tokio::test]
    async fn test_fetch_rejects_bad_reference() {
        let (_dir, ctx) = context();
        assert!(fetch(&ctx, "115:1", false, false).await.is_err());
    }

    #[test]
    fn test_status_and_cleanup_run_offline() {
        let (_dir, ctx) = context();
        assert!(status(&ctx).is_ok());
        assert!(cleanup(&ctx).is_ok());
    }
}
