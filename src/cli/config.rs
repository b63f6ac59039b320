//! Configuration file
//!
//! Every field has a default, so an empty object (or no file at all) is a
//! valid configuration for the repository's standard layout.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::dataset::DataDir;
use crate::index::{IndexBuildOptions, SymbolMetadataPolicy};
use crate::model::is_year_file_name;
use crate::observability::Severity;

use super::errors::{CliError, CliResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory holding `YYYY.json` files and the index
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Directory holding the `*.schema.json` files
    #[serde(default = "default_schema_dir")]
    pub schema_dir: PathBuf,

    /// Index file name inside `data_dir`
    #[serde(default = "default_index_file")]
    pub index_file: String,

    /// `version` written into the index
    #[serde(default = "default_index_version")]
    pub index_version: String,

    /// `$schema` written into the index; omitted when null
    #[serde(default = "default_index_schema_ref")]
    pub index_schema_ref: Option<String>,

    /// `$schema` written into year files created by ingest; omitted when null
    #[serde(default = "default_year_file_schema_ref")]
    pub year_file_schema_ref: Option<String>,

    #[serde(default)]
    pub symbol_metadata: SymbolMetadataPolicy,

    /// `source` stamped on ingested entries
    #[serde(default = "default_ingest_source")]
    pub ingest_source: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}
fn default_schema_dir() -> PathBuf {
    PathBuf::from("schema")
}
fn default_index_file() -> String {
    crate::dataset::DEFAULT_INDEX_FILE.to_string()
}
fn default_index_version() -> String {
    crate::index::INDEX_FORMAT_VERSION.to_string()
}
fn default_index_schema_ref() -> Option<String> {
    Some("../schema/index.schema.json".to_string())
}
fn default_year_file_schema_ref() -> Option<String> {
    Some("../schema/year-file.schema.json".to_string())
}
fn default_ingest_source() -> String {
    "massive".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            schema_dir: default_schema_dir(),
            index_file: default_index_file(),
            index_version: default_index_version(),
            index_schema_ref: default_index_schema_ref(),
            year_file_schema_ref: default_year_file_schema_ref(),
            symbol_metadata: SymbolMetadataPolicy::default(),
            ingest_source: default_ingest_source(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Loads `path` if given, otherwise starts from defaults, then applies
    /// command-line overrides.
    pub fn resolve(
        path: Option<&Path>,
        data_dir: Option<PathBuf>,
        schema_dir: Option<PathBuf>,
        log_level: Option<String>,
    ) -> CliResult<Self> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if let Some(dir) = data_dir {
            config.data_dir = dir;
        }
        if let Some(dir) = schema_dir {
            config.schema_dir = dir;
        }
        if let Some(level) = log_level {
            config.log_level = level;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CliResult<()> {
        if !is_semver(&self.index_version) {
            return Err(CliError::config_error(format!(
                "Invalid index_version: '{}'. Expected MAJOR.MINOR.PATCH.",
                self.index_version
            )));
        }

        if !self.index_file.ends_with(".json") || self.index_file.contains(['/', '\\']) {
            return Err(CliError::config_error(format!(
                "Invalid index_file: '{}'. Must be a plain *.json file name.",
                self.index_file
            )));
        }

        // Would be read back as a year file
        if is_year_file_name(&self.index_file) {
            return Err(CliError::config_error(format!(
                "Invalid index_file: '{}' collides with year file naming.",
                self.index_file
            )));
        }

        if self.ingest_source.trim().is_empty() {
            return Err(CliError::config_error("ingest_source must not be empty"));
        }

        self.severity()?;

        Ok(())
    }

    pub fn severity(&self) -> CliResult<Severity> {
        Severity::parse(&self.log_level).ok_or_else(|| {
            CliError::config_error(format!(
                "Invalid log_level: '{}'. Must be one of trace, info, warn, error.",
                self.log_level
            ))
        })
    }

    pub fn data(&self) -> DataDir {
        DataDir::new(&self.data_dir).with_index_file(&self.index_file)
    }

    pub fn build_options(&self) -> IndexBuildOptions {
        IndexBuildOptions {
            version: self.index_version.clone(),
            schema_ref: self.index_schema_ref.clone(),
            metadata_policy: self.symbol_metadata,
        }
    }
}

fn is_semver(version: &str) -> bool {
    let parts: Vec<&str> = version.split('.').collect();
    parts.len() == 3
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::errors::CliErrorCode;
    use serde_json::json;
    use tempfile::TempDir;

    fn write_config(temp_dir: &TempDir, value: serde_json::Value) -> PathBuf {
        let path = temp_dir.path().join("splitdb.json");
        fs::write(&path, value.to_string()).unwrap();
        path
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(&temp_dir, json!({}));

        let config = Config::load(&path).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.symbol_metadata, SymbolMetadataPolicy::FirstSeen);
    }

    #[test]
    fn test_policy_and_refs_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(
            &temp_dir,
            json!({
                "symbol_metadata": "last_seen",
                "index_schema_ref": null,
                "ingest_source": "manual"
            }),
        );

        let config = Config::load(&path).unwrap();
        assert_eq!(config.symbol_metadata, SymbolMetadataPolicy::LastSeen);
        assert_eq!(config.index_schema_ref, None);
        assert_eq!(config.build_options().schema_ref, None);
        assert_eq!(config.ingest_source, "manual");
    }

    #[test]
    fn test_unknown_key_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(&temp_dir, json!({"data_directory": "x"}));

        let err = Config::load(&path).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::ConfigError);
    }

    #[test]
    fn test_invalid_version_rejected() {
        let config = Config {
            index_version: "1.0".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_year_like_index_file_rejected() {
        let config = Config {
            index_file: "2024.json".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides_apply_without_file() {
        let config = Config::resolve(
            None,
            Some(PathBuf::from("/srv/splits")),
            None,
            Some("warn".to_string()),
        )
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/splits"));
        assert_eq!(config.schema_dir, PathBuf::from("schema"));
        assert_eq!(config.severity().unwrap(), Severity::Warn);
    }

    #[test]
    fn test_bad_log_level_override_rejected() {
        let result = Config::resolve(None, None, None, Some("chatty".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = Config::load(&temp_dir.path().join("absent.json")).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::ConfigError);
    }
}
