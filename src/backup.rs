//! Rotating copies of the SQLite database, taken before destructive operations.

use crate::model::{format_date, today};
use crate::{utils, Config, Result};
use anyhow::Context;
use std::path::PathBuf;
use tracing::debug;

/// Prefix for SQLite backup files.
pub const SQLITE: &str = "persony.sqlite";

/// Manages backup file creation and rotation.
///
/// Create a new instance via `Config::backup()` or `Backup::new()`.
#[derive(Debug, Clone)]
pub struct Backup {
    backups_dir: PathBuf,
    backup_copies: u32,
    sqlite_path: PathBuf,
}

impl Backup {
    pub fn new(config: &Config) -> Self {
        Self {
            backups_dir: config.backups().to_path_buf(),
            backup_copies: config.backup_copies(),
            sqlite_path: config.sqlite_path().to_path_buf(),
        }
    }

    /// Copies the SQLite database file to the backups directory as
    /// `persony.sqlite.YYYY-MM-DD-NNN` and deletes the oldest copies beyond `backup_copies`.
    ///
    /// Returns the path to the created backup file.
    pub async fn copy_sqlite(&self) -> Result<PathBuf> {
        let date = format_date(today());
        let seq = self.next_sequence_number(&date).await?;
        let path = self.backups_dir.join(format!("{SQLITE}.{date}-{seq:03}"));

        utils::copy(&self.sqlite_path, &path).await?;
        debug!("Backed up the database to {}", path.display());

        self.rotate().await?;
        Ok(path)
    }

    async fn backup_file_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut dir = utils::read_dir(&self.backups_dir).await?;
        while let Some(entry) = dir
            .next_entry()
            .await
            .context("Failed to read directory entry")?
        {
            let name = entry.file_name().to_string_lossy().to_string();
            if is_backup_file(&name) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    async fn next_sequence_number(&self, date: &str) -> Result<u32> {
        let max_seq = self
            .backup_file_names()
            .await?
            .iter()
            .filter_map(|name| parse_sequence_number(name, date))
            .max()
            .unwrap_or(0);
        Ok(max_seq + 1)
    }

    /// Keeps only the newest `backup_copies` files. Names sort by date then sequence number.
    async fn rotate(&self) -> Result<()> {
        let files = self.backup_file_names().await?;
        let to_delete = files.len().saturating_sub(self.backup_copies as usize);
        for name in files.into_iter().take(to_delete) {
            utils::remove(self.backups_dir.join(name)).await?;
        }
        Ok(())
    }
}

/// Parses `NNN` out of `persony.sqlite.{date}-NNN`.
fn parse_sequence_number(filename: &str, date: &str) -> Option<u32> {
    let expected_start = format!("{SQLITE}.{date}-");
    filename.strip_prefix(&expected_start)?.parse().ok()
}

fn is_backup_file(filename: &str) -> bool {
    filename
        .strip_prefix(&format!("{SQLITE}."))
        .is_some_and(|rest| !rest.is_empty() && !rest.contains('.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[test]
    fn test_parse_sequence_number() {
        assert_eq!(
            parse_sequence_number("persony.sqlite.2025-12-14-003", "2025-12-14"),
            Some(3)
        );
        assert_eq!(
            parse_sequence_number("persony.sqlite.2025-12-14-042", "2025-12-14"),
            Some(42)
        );
        assert_eq!(
            parse_sequence_number("persony.sqlite.2025-12-13-001", "2025-12-14"),
            None
        );
        assert_eq!(parse_sequence_number("other.2025-12-14-001", "2025-12-14"), None);
    }

    #[test]
    fn test_is_backup_file() {
        assert!(is_backup_file("persony.sqlite.2025-12-14-001"));
        assert!(!is_backup_file("persony.sqlite"));
        assert!(!is_backup_file("persony.sqlite.2025-12-14-001.json"));
        assert!(!is_backup_file("notes.txt"));
    }

    #[tokio::test]
    async fn test_copy_sqlite_rotates() {
        let env = TestEnv::new().await;
        let backup = env.config().backup();

        let mut paths = Vec::new();
        for _ in 0..7 {
            paths.push(backup.copy_sqlite().await.unwrap());
        }
        let names = backup.backup_file_names().await.unwrap();
        assert_eq!(names.len(), env.config().backup_copies() as usize);

        // The two oldest copies were rotated out and the newest is kept
        assert!(!paths[0].exists());
        assert!(!paths[1].exists());
        assert!(paths[6].is_file());
        assert!(paths[6].to_string_lossy().ends_with("-007"));
    }
}
