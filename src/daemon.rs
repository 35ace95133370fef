//! Scheduler daemon.
//!
//! Sleeps until the next configured local posting time, runs one posting
//! pipeline, then goes back to sleep. SIGINT/SIGTERM end the loop at the
//! next await point.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDateTime, NaiveTime, Utc};

use crate::app::{AppContext, NectarError, Result};
use crate::cleanup;
use crate::pipeline::Pipeline;

/// Parse a local `HH:MM` time of day.
pub fn parse_time_of_day(s: &str) -> std::result::Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .map_err(|_| format!("Invalid time: {}. Use 24-hour HH:MM like '15:00'", s))
}

/// The first slot strictly after `now`, today or tomorrow.
pub fn next_slot(now: NaiveDateTime, slots: &[NaiveTime]) -> Option<NaiveDateTime> {
    let today = now.date();
    let earliest = |date: chrono::NaiveDate| {
        slots
            .iter()
            .map(|t| date.and_time(*t))
            .filter(|candidate| *candidate > now)
            .min()
    };

    earliest(today).or_else(|| earliest(today.succ_opt()?))
}

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub post_times: Vec<NaiveTime>,
    /// Post once immediately on start
    pub post_on_start: bool,
    /// Log file path (None = stdout)
    pub log_file: Option<PathBuf>,
    pub cleanup_days: u64,
    pub output_dir: PathBuf,
}

impl DaemonConfig {
    pub fn from_context(ctx: &AppContext) -> Result<Self> {
        let post_times = ctx
            .config
            .schedule
            .post_times
            .iter()
            .map(|t| parse_time_of_day(t).map_err(NectarError::Config))
            .collect::<Result<Vec<_>>>()?;

        if post_times.is_empty() {
            return Err(NectarError::Config("schedule.post_times is empty".into()));
        }

        Ok(Self {
            post_times,
            post_on_start: true,
            log_file: None,
            cleanup_days: ctx.config.schedule.cleanup_days,
            output_dir: ctx.paths.output.clone(),
        })
    }
}

/// Daemon runner
pub struct Daemon {
    pipeline: Arc<Pipeline>,
    config: DaemonConfig,
}

impl Daemon {
    pub fn new(pipeline: Arc<Pipeline>, config: DaemonConfig) -> Self {
        Self { pipeline, config }
    }

    /// Get the PID file path
    pub fn pid_file_path() -> Option<PathBuf> {
        dirs::runtime_dir()
            .or_else(dirs::cache_dir)
            .map(|d| d.join("nectar").join("daemon.pid"))
    }

    fn read_pid() -> Option<u32> {
        let path = Self::pid_file_path()?;
        fs::read_to_string(path).ok()?.trim().parse().ok()
    }

    /// Check if another daemon is already running
    pub fn is_running() -> bool {
        Self::read_pid().map(process_exists).unwrap_or(false)
    }

    fn write_pid_file(&self) -> std::io::Result<()> {
        if let Some(pid_path) = Self::pid_file_path() {
            if let Some(parent) = pid_path.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut file = fs::File::create(&pid_path)?;
            writeln!(file, "{}", std::process::id())?;
        }
        Ok(())
    }

    fn remove_pid_file(&self) {
        if let Some(pid_path) = Self::pid_file_path() {
            let _ = fs::remove_file(pid_path);
        }
    }

    /// Log a message with timestamp
    fn log(&self, msg: &str) {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let line = format!("[{}] {}", timestamp, msg);

        if let Some(ref log_path) = self.config.log_file {
            if let Ok(mut file) = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_path)
            {
                let _ = writeln!(file, "{}", line);
            }
        } else {
            println!("{}", line);
        }
    }

    fn until_next_slot(&self) -> Option<(NaiveDateTime, Duration)> {
        let now = Local::now().naive_local();
        let next = next_slot(now, &self.config.post_times)?;
        let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
        Some((next, wait))
    }

    /// Run the daemon
    pub async fn run(&self) -> Result<()> {
        if Self::is_running() {
            return Err(NectarError::Other(
                "Another daemon instance is already running".to_string(),
            ));
        }

        self.write_pid_file()
            .map_err(|e| NectarError::Other(format!("Failed to write PID file: {}", e)))?;

        let result = self.run_loop().await;

        self.log("Daemon shutting down...");
        self.remove_pid_file();
        result
    }

    async fn run_loop(&self) -> Result<()> {
        let shutdown = shutdown_signal()?;
        tokio::pin!(shutdown);

        self.log(&format!(
            "Nectar daemon started (post times: {}, PID: {})",
            self.config
                .post_times
                .iter()
                .map(|t| t.format("%H:%M").to_string())
                .collect::<Vec<_>>()
                .join(", "),
            std::process::id()
        ));

        if self.config.post_on_start {
            self.log("Running initial post...");
            tokio::select! {
                _ = self.run_post() => {}
                _ = &mut shutdown => return Ok(()),
            }
        }

        loop {
            let Some((next, wait)) = self.until_next_slot() else {
                return Err(NectarError::Config("no posting times configured".into()));
            };
            self.log(&format!("Next post at {}", next.format("%Y-%m-%d %H:%M")));

            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = &mut shutdown => return Ok(()),
            }

            self.log("Running scheduled post...");
            tokio::select! {
                _ = self.run_post() => {}
                _ = &mut shutdown => return Ok(()),
            }
        }
    }

    /// Run a single post and cleanup pass. Failures are logged, never fatal.
    async fn run_post(&self) {
        let start = Utc::now();

        match self.pipeline.run_once().await {
            Ok(report) => {
                let elapsed = Utc::now().signed_duration_since(start);
                self.log(&format!(
                    "Posted {} ({} slides, post {}) in {:.1}s",
                    report.reference,
                    report.slides.len(),
                    report.post_id,
                    elapsed.num_milliseconds() as f64 / 1000.0
                ));
                if let Some(link) = report.permalink {
                    self.log(&format!("  {}", link));
                }
            }
            Err(e) => self.log(&format!("Post failed: {}", e)),
        }

        match cleanup::remove_old_slides(&self.config.output_dir, cleanup::days(self.config.cleanup_days)) {
            Ok(report) if report.removed > 0 => {
                self.log(&format!("Cleanup removed {} old slides", report.removed))
            }
            Ok(_) => {}
            Err(e) => self.log(&format!("Cleanup failed: {}", e)),
        }
    }
}

/// Resolves on SIGINT or SIGTERM (Ctrl-C elsewhere).
#[cfg(unix)]
fn shutdown_signal() -> Result<impl std::future::Future<Output = ()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    Ok(async move {
        tokio::select! {
            _ = sigterm.recv() => {},
            _ = sigint.recv() => {},
        }
    })
}

#[cfg(not(unix))]
fn shutdown_signal() -> Result<impl std::future::Future<Output = ()>> {
    Ok(async {
        let _ = tokio::signal::ctrl_c().await;
    })
}

#[cfg(unix)]
fn process_exists(pid: u32) -> bool {
    use std::process::Command;
    Command::new("kill")
        .args(["-0", &pid.to_string()])
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(windows)]
fn process_exists(pid: u32) -> bool {
    use std::process::Command;
    Command::new("tasklist")
        .args(["/FI", &format!("PID eq {}", pid)])
        .output()
        .map(|o| String::from_utf8_lossy(&o.stdout).contains(&pid.to_string()))
        .unwrap_or(false)
}

/// Stop a running daemon by reading PID file and sending signal
pub fn stop_daemon() -> std::result::Result<(), String> {
    let pid_path =
        Daemon::pid_file_path().ok_or_else(|| "Could not determine PID file path".to_string())?;

    if !pid_path.exists() {
        return Err("No daemon is running (PID file not found)".to_string());
    }

    let pid = Daemon::read_pid().ok_or_else(|| "Invalid PID in PID file".to_string())?;

    #[cfg(unix)]
    let status = std::process::Command::new("kill")
        .args(["-TERM", &pid.to_string()])
        .status();

    #[cfg(windows)]
    let status = std::process::Command::new("taskkill")
        .args(["/PID", &pid.to_string(), "/F"])
        .status();

    let status = status.map_err(|e| format!("Failed to send signal: {}", e))?;
    if status.success() {
        let _ = fs::remove_file(&pid_path);
        Ok(())
    } else {
        Err(format!("Failed to stop daemon (PID {})", pid))
    }
}

/// Check daemon status
pub fn daemon_status() -> String {
    match Daemon::read_pid() {
        Some(pid) if process_exists(pid) => format!("Daemon is running (PID: {})", pid),
        Some(_) => "Daemon is not running (stale PID file)".to_string(),
        None => "Daemon is not running".to_string(),
    }
}
