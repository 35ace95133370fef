//! Removal of old rendered slides.

use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

use crate::app::Result;

const SECS_PER_DAY: u64 = 24 * 60 * 60;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CleanupReport {
    pub removed: usize,
    pub failed: usize,
}

pub fn days(n: u64) -> Duration {
    Duration::from_secs(n.saturating_mul(SECS_PER_DAY))
}

fn is_png(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("png"))
        .unwrap_or(false)
}

/// Delete `*.png` files in `dir` last modified more than `max_age` ago.
///
/// A missing directory is not an error. Files that cannot be inspected or
/// removed are logged and counted as failures.
pub fn remove_old_slides(dir: &Path, max_age: Duration) -> Result<CleanupReport> {
    let mut report = CleanupReport::default();
    if !dir.exists() {
        return Ok(report);
    }

    let now = SystemTime::now();
    for entry in fs::read_dir(dir)? {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(e) => {
                tracing::warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                report.failed += 1;
                continue;
            }
        };
        if !path.is_file() || !is_png(&path) {
            continue;
        }

        let age = fs::metadata(&path)
            .and_then(|m| m.modified())
            .map(|modified| now.duration_since(modified).unwrap_or_default());

        match age {
            Ok(age) if age > max_age => match fs::remove_file(&path) {
                Ok(()) => {
                    tracing::debug!("Removed {}", path.display());
                    report.removed += 1;
                }
                Err(e) => {
                    tracing::warn!("Could not remove {}: {}", path.display(), e);
                    report.failed += 1;
                }
            },
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("Could not read age of {}: {}", path.display(), e);
                report.failed += 1;
            }
        }
    }

    if report.removed > 0 {
        tracing::info!("Removed {} old slides from {}", report.removed, dir.display());
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn aged_file(dir: &Path, name: &str, age: Duration) {
        let path = dir.join(name);
        fs::write(&path, b"x").unwrap();
        let file = File::options().write(true).open(&path).unwrap();
        file.set_modified(SystemTime::now() - age).unwrap();
    }

    #[test]
    fn test_removes_only_old_pngs() {
        let dir = tempfile::tempdir().unwrap();
        aged_file(dir.path(), "old.png", days(10));
        aged_file(dir.path(), "new.png", days(1));
        aged_file(dir.path(), "old.json", days(10));

        let report = remove_old_slides(dir.path(), days(7)).unwrap();

        assert_eq!(report, CleanupReport { removed: 1, failed: 0 });
        assert!(!dir.path().join("old.png").exists());
        assert!(dir.path().join("new.png").exists());
        assert!(dir.path().join("old.json").exists());
    }

    #[test]
    fn test_uppercase_extension() {
        let dir = tempfile::tempdir().unwrap();
        aged_file(dir.path(), "OLD.PNG", days(30));

        assert_eq!(remove_old_slides(dir.path(), days(7)).unwrap().removed, 1);
    }

    #[test]
    fn test_missing_dir_is_empty_report() {
        let dir = tempfile::tempdir().unwrap();
        let report = remove_old_slides(&dir.path().join("nope"), days(7)).unwrap();
        assert_eq!(report, CleanupReport::default());
    }

    #[test]
    fn test_subdirectories_untouched() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nested.png")).unwrap();

        assert_eq!(remove_old_slides(dir.path(), Duration::ZERO).unwrap().removed, 0);
        assert!(dir.path().join("nested.png").exists());
    }
}
