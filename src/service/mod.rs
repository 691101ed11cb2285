//! Scheduling loop that backs up a list of folders forever
//!
//! Each folder is handled by spawning the `dirbackup` binary and waiting
//! for it to exit, so one run never overlaps another. Between folders the
//! loop sleeps the folder delay; after a full pass it sleeps the long delay.

mod duration;

pub use duration::parse_duration;

use crate::types::SyncError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::time::Duration;
use tokio::process::Command;

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "BACKUP_CONFIG";

/// Config file looked up in the working directory when nothing else is given
pub const DEFAULT_CONFIG_FILE: &str = "bkservice.json";

const DEFAULT_SLEEP: &str = "30m";
const DEFAULT_FOLDER_DELAY: &str = "5m";
const DEFAULT_BINARY: &str = "dirbackup";

/// On-disk service configuration
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ServiceConfig {
    pub source_dir: PathBuf,
    pub target_dir: PathBuf,
    pub folders: Vec<String>,

    #[serde(rename = "folder-delay-duration", default)]
    pub folder_delay_duration: String,

    #[serde(rename = "sleep-duration", default)]
    pub sleep_duration: String,

    #[serde(rename = "dirbackup-path", default)]
    pub dirbackup_path: String,
}

impl ServiceConfig {
    /// Read and parse a JSON config file, filling in defaults
    pub fn load(path: &Path) -> Result<Self, SyncError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SyncError::Config(format!("cannot read config {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, SyncError> {
        let mut config: ServiceConfig = serde_json::from_str(content)
            .map_err(|e| SyncError::Config(format!("invalid service config: {}", e)))?;

        if config.sleep_duration.is_empty() {
            config.sleep_duration = DEFAULT_SLEEP.to_string();
        }
        if config.folder_delay_duration.is_empty() {
            config.folder_delay_duration = DEFAULT_FOLDER_DELAY.to_string();
        }
        if config.dirbackup_path.is_empty() {
            config.dirbackup_path = DEFAULT_BINARY.to_string();
        }
        Ok(config)
    }
}

/// Validated schedule, ready to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    pub source_dir: PathBuf,
    pub target_dir: PathBuf,
    pub folders: Vec<String>,
    pub folder_delay: Duration,
    pub sleep: Duration,
    pub binary: PathBuf,
}

impl TryFrom<ServiceConfig> for Schedule {
    type Error = SyncError;

    fn try_from(config: ServiceConfig) -> Result<Self, Self::Error> {
        if config.folders.is_empty() {
            return Err(SyncError::Config(
                "service config lists no folders".to_string(),
            ));
        }
        Ok(Self {
            folder_delay: parse_duration(&config.folder_delay_duration)?,
            sleep: parse_duration(&config.sleep_duration)?,
            source_dir: config.source_dir,
            target_dir: config.target_dir,
            folders: config.folders,
            binary: PathBuf::from(config.dirbackup_path),
        })
    }
}

impl Schedule {
    /// Arguments for one backup run of `folder`
    pub fn backup_args(&self, folder: &str) -> Vec<String> {
        vec![
            "--source".to_string(),
            self.source_dir.join(folder).display().to_string(),
            "--target".to_string(),
            self.target_dir.join(folder).display().to_string(),
            "--dry-run=false".to_string(),
            "--del-old=true".to_string(),
        ]
    }

    /// Run one backup for `folder` and wait for it to exit
    pub async fn run_folder(&self, folder: &str) -> Result<ExitStatus, SyncError> {
        let args = self.backup_args(folder);
        tracing::info!(
            binary = %self.binary.display(),
            args = %args.join(" "),
            "starting backup"
        );

        let status = Command::new(&self.binary)
            .args(&args)
            .status()
            .await
            .map_err(|e| {
                SyncError::Service(format!("failed to run {}: {}", self.binary.display(), e))
            })?;
        Ok(status)
    }

    /// One pass over every folder, sleeping the folder delay after each
    ///
    /// Spawn failures and non-zero exits are logged; the pass continues.
    pub async fn run_pass(&self) {
        for folder in &self.folders {
            match self.run_folder(folder).await {
                Ok(status) if status.success() => {
                    tracing::info!(folder = %folder, "backup finished");
                }
                Ok(status) => {
                    tracing::warn!(folder = %folder, %status, "backup exited with failure");
                }
                Err(error) => {
                    tracing::error!(folder = %folder, %error, "backup could not start");
                }
            }
            tracing::info!(delay = ?self.folder_delay, "folder sleep");
            tokio::time::sleep(self.folder_delay).await;
        }
    }

    /// Repeat passes forever, sleeping the long delay between them
    pub async fn run_forever(&self) {
        loop {
            self.run_pass().await;
            tracing::info!(delay = ?self.sleep, "pass complete, starting over after sleep");
            tokio::time::sleep(self.sleep).await;
        }
    }
}

/// Pick the config file: CLI argument, then `$BACKUP_CONFIG`, then
/// `bkservice.json` in `cwd`
pub fn resolve_config_path(
    arg: Option<PathBuf>,
    env_value: Option<String>,
    cwd: &Path,
) -> PathBuf {
    if let Some(path) = arg {
        return path;
    }
    match env_value {
        Some(value) if !value.is_empty() => PathBuf::from(value),
        _ => cwd.join(DEFAULT_CONFIG_FILE),
    }
}
