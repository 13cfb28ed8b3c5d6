//! Configuration file handling for persony.
//!
//! The configuration file is stored at `$PERSONY_HOME/config.json` and contains the backup
//! settings and an optional override for where reports are written.

use crate::backup::Backup;
use crate::db::Db;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "persony";
const CONFIG_VERSION: u8 = 1;
const BACKUP_COPIES: u32 = 5;
const BACKUPS: &str = ".backups";
const REPORTS: &str = "reports";
const CONFIG_JSON: &str = "config.json";
const PERSONY_SQLITE: &str = "persony.sqlite";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$PERSONY_HOME` and from there it loads `$PERSONY_HOME/config.json`. It provides
/// paths to other items that are expected in a certain location within the home directory, and it
/// holds the open database.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    backups: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    db: Db,
    sqlite_path: PathBuf,
}

impl Config {
    /// Creates the data directory, its subdirectories, an initial `config.json` with default
    /// settings, and a new database.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of data directory, e.g. `$HOME/persony`
    ///
    /// # Errors
    /// - Returns an error if any file operations fail or if a database already exists in `dir`.
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the persony home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        let sqlite_path = root.join(PERSONY_SQLITE);
        for existing in [&config_path, &sqlite_path] {
            if existing.exists() {
                bail!(
                    "The directory is already initialized, '{}' exists",
                    existing.display()
                );
            }
        }

        let backups = root.join(BACKUPS);
        utils::make_dir(&backups).await?;
        utils::make_dir(root.join(REPORTS)).await?;

        let config_file = ConfigFile::default();
        config_file.save(&config_path).await?;

        let db = Db::init(&sqlite_path)
            .await
            .context("Unable to create SQLite DB")?;

        Ok(Self {
            root,
            backups,
            config_path,
            config_file,
            db,
            sqlite_path,
        })
    }

    /// This will
    /// - validate that `persony_home` exists and that the config file exists
    /// - load the config file
    /// - validate that the backups directory exists
    /// - open the database, migrating it if needed
    pub async fn load(persony_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = persony_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("Persony Home is missing, did you run 'persony init'?")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let backups = root.join(BACKUPS);
        if !backups.is_dir() {
            bail!("The backups directory is missing '{}'", backups.display())
        }

        let sqlite_path = root.join(PERSONY_SQLITE);
        let db = Db::load(&sqlite_path)
            .await
            .context("Unable to load SQLite DB")?;

        Ok(Self {
            root,
            backups,
            config_path,
            config_file,
            db,
            sqlite_path,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub(crate) fn db(&self) -> &Db {
        &self.db
    }

    pub fn backups(&self) -> &Path {
        &self.backups
    }

    pub fn sqlite_path(&self) -> &Path {
        &self.sqlite_path
    }

    pub fn backup_copies(&self) -> u32 {
        self.config_file.backup_copies
    }

    /// The directory reports are written to. A relative `reports_dir` in `config.json` is resolved
    /// against the home directory.
    pub fn reports(&self) -> PathBuf {
        let dir = self.config_file.reports_dir();
        if dir.is_absolute() {
            return dir;
        }
        self.root.join(dir)
    }

    /// Creates a new `Backup` instance for managing backup files.
    pub fn backup(&self) -> Backup {
        Backup::new(self)
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "persony",
///   "config_version": 1,
///   "backup_copies": 5,
///   "reports_dir": "reports"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "persony"
    app_name: String,

    config_version: u8,

    /// Number of SQLite backup copies to keep
    backup_copies: u32,

    /// Where reports are written (relative to the home directory or absolute).
    /// Defaults to $PERSONY_HOME/reports if not specified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reports_dir: Option<PathBuf>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            backup_copies: BACKUP_COPIES,
            reports_dir: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path and validates `app_name`.
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = utils::read(path)
            .await
            .with_context(|| format!("Failed to read config file at {}", path.display()))?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }

    fn reports_dir(&self) -> PathBuf {
        self.reports_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(REPORTS))
    }
}
