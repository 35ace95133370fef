use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use nectar::app::AppContext;
use nectar::cli::commands::{self, DaemonStart};
use nectar::cli::{Cli, Commands, DaemonAction};

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Daemon control does not need the full context.
    if let Commands::Daemon { action } = &cli.command {
        match action {
            DaemonAction::Stop => return Ok(commands::stop_daemon()?),
            DaemonAction::Status => {
                commands::daemon_status();
                return Ok(());
            }
            DaemonAction::Start { .. } => {}
        }
    }

    let ctx = AppContext::new(cli.config.as_deref(), cli.data_dir.clone())?;

    match cli.command {
        Commands::Post => {
            commands::post(&ctx).await?;
        }
        Commands::Generate { reference, theme } => {
            commands::generate(&ctx, reference.as_deref(), theme.as_deref()).await?;
        }
        Commands::Fetch {
            reference,
            tafsir,
            summarize,
        } => {
            commands::fetch(&ctx, &reference, tafsir, summarize).await?;
        }
        Commands::Status => commands::status(&ctx)?,
        Commands::Cleanup => commands::cleanup(&ctx)?,
        Commands::Daemon { action } => {
            if let DaemonAction::Start {
                no_initial_post,
                log,
                foreground,
            } = action
            {
                let opts = DaemonStart {
                    config_path: cli.config.as_deref(),
                    data_dir: cli.data_dir.as_deref(),
                    no_initial_post,
                    log,
                    foreground,
                };
                commands::start_daemon(ctx, opts).await?;
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("nectar=info")))
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
