//! Removal of rolled log files past their retention period.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use std::fs;
use std::path::Path;

/// Delete files in `log_dir` named `<prefix>*` whose modification time is
/// older than `retention_days`. Returns the number of files removed.
pub fn prune_expired_logs(log_dir: &Path, prefix: &str, retention_days: u32) -> Result<usize> {
    if !log_dir.exists() {
        return Ok(0);
    }
    let cutoff = Utc::now() - Duration::days(i64::from(retention_days));
    let mut removed = 0;

    for entry in fs::read_dir(log_dir)
        .with_context(|| format!("failed to read log directory {}", log_dir.display()))?
    {
        let entry = entry.context("failed to read directory entry")?;
        let path = entry.path();
        let is_log = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with(prefix));
        if !is_log || !path.is_file() {
            continue;
        }

        let modified: DateTime<Utc> = entry
            .metadata()
            .and_then(|m| m.modified())
            .context("failed to read log file metadata")?
            .into();
        if modified < cutoff {
            fs::remove_file(&path)
                .with_context(|| format!("failed to remove {}", path.display()))?;
            removed += 1;
        }
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::{Duration as StdDuration, SystemTime};
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str, age: StdDuration) {
        let file = File::create(dir.join(name)).unwrap();
        file.set_modified(SystemTime::now() - age).unwrap();
    }

    #[test]
    fn test_prunes_only_old_matching_files() {
        let dir = TempDir::new().unwrap();
        let day = StdDuration::from_secs(86_400);
        touch(dir.path(), "hackathon.log.2026-01-01", day * 40);
        touch(dir.path(), "hackathon.log.2026-10-14", day);
        touch(dir.path(), "notes.txt", day * 40);

        let removed = prune_expired_logs(dir.path(), "hackathon.log", 30).unwrap();
        assert_eq!(removed, 1);
        assert!(!dir.path().join("hackathon.log.2026-01-01").exists());
        assert!(dir.path().join("hackathon.log.2026-10-14").exists());
        assert!(dir.path().join("notes.txt").exists());
    }

    #[test]
    fn test_missing_directory_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert_eq!(prune_expired_logs(&missing, "hackathon.log", 1).unwrap(), 0);
    }
}
