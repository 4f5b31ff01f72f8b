use std::path::Path;
use std::time::Duration;

use config::{Config, ConfigError};
use serde::{Deserialize, Deserializer};

use crate::sync::SyncDirectoriesDefinition;

/// config properties for a cataloging pass
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct CatalogSettings {
    /// how many files are processed before the changes are committed
    #[serde(rename = "batchsize")]
    pub batch_size: usize,
    /// the minimum time between two cataloging passes, e.g. `"5m"`
    #[serde(rename = "cooldown", deserialize_with = "deserialize_duration")]
    pub cooldown: Duration,
    #[serde(rename = "backupstokeep")]
    pub backups_to_keep: usize,
    /// how many folders keep their thumbnails in memory
    #[serde(rename = "thumbnailsdictionaryentriestokeep")]
    pub thumbnails_dictionary_entries_to_keep: usize,
    #[serde(rename = "recenttargetpathstokeep")]
    pub recent_target_paths_to_keep: usize,
    /// the root directory that gets cataloged
    #[serde(rename = "targetpath")]
    pub target_path: String,
    #[serde(rename = "analysevideos")]
    pub analyse_videos: bool,
}

/// which perceptual hashes get computed on top of the content hash
#[derive(Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(default)]
pub struct HashingConfig {
    #[serde(rename = "usephash")]
    pub use_phash: bool,
    #[serde(rename = "usedhash")]
    pub use_dhash: bool,
    #[serde(rename = "useahash")]
    pub use_ahash: bool,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct DbConfig {
    pub location: String,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct BackupConfig {
    pub directory: String,
}

#[derive(Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(default)]
pub struct SyncConfig {
    pub definitions: Vec<SyncDirectoriesDefinition>,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// if present, logs are written to this file as well as stdout
    pub file: Option<String>,
}

/// config properties for the whole of this application
#[derive(Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(default)]
pub struct CatalogConfig {
    pub catalog: CatalogSettings,
    pub hashing: HashingConfig,
    pub database: DbConfig,
    pub backup: BackupConfig,
    pub sync: SyncConfig,
    pub logging: LoggingConfig,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            batch_size: 100,
            cooldown: Duration::from_secs(5 * 60),
            backups_to_keep: 2,
            thumbnails_dictionary_entries_to_keep: 5,
            recent_target_paths_to_keep: 20,
            target_path: ".".to_string(),
            analyse_videos: false,
        }
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            location: "./catalog.sqlite".to_string(),
        }
    }
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            directory: "./backups".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// Parses the config file located at `path`, if it exists.
/// A missing file gives the default config, any other failure is returned
pub fn parse_config(path: &Path) -> Result<CatalogConfig, ConfigError> {
    if !path.exists() {
        log::warn!(
            "No config file found at {}. Continuing with default settings...",
            path.display()
        );
        return Ok(CatalogConfig::default());
    }
    let settings = Config::builder()
        .add_source(config::File::from(path).format(config::FileFormat::Toml))
        .build()?;
    let parsed: CatalogConfig = settings.try_deserialize()?;
    if parsed.catalog.batch_size == 0 {
        return Err(ConfigError::Message(
            "catalog.batchsize must be greater than 0".to_string(),
        ));
    }
    Ok(parsed)
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
}
