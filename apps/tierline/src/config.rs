//! # Configuration
//!
//! TOML configuration for the Tierline binary.
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 8080
//!
//! [source]
//! snapshot = "creators.json"
//!
//! [graduation]
//! silver_target = 200000
//! gold_target = 500000
//! ```
//!
//! Every table and key is optional. Command-line flags override file
//! values. Security knobs (API key, rate limit, CORS) stay in the
//! environment, see the `api` module.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tierline_core::{
    GraduationAssessor, TierlineError,
    primitives::{DEFAULT_GOLD_TARGET, DEFAULT_SILVER_TARGET},
};

/// Maximum configuration file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub graduation: GraduationConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Where creator data comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    /// JSON snapshot exported from the data service.
    #[serde(default)]
    pub snapshot: Option<PathBuf>,
}

/// Program-wide default targets, used when a creator row has none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraduationConfig {
    #[serde(default = "default_silver_target")]
    pub silver_target: u64,
    #[serde(default = "default_gold_target")]
    pub gold_target: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_silver_target() -> u64 {
    DEFAULT_SILVER_TARGET
}

fn default_gold_target() -> u64 {
    DEFAULT_GOLD_TARGET
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for GraduationConfig {
    fn default() -> Self {
        Self {
            silver_target: DEFAULT_SILVER_TARGET,
            gold_target: DEFAULT_GOLD_TARGET,
        }
    }
}

impl AppConfig {
    /// Parse configuration from TOML text and validate it.
    pub fn from_toml(text: &str) -> Result<Self, TierlineError> {
        let config: AppConfig =
            toml::from_str(text).map_err(|e| TierlineError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, TierlineError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            TierlineError::ConfigError(format!("Cannot read '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(TierlineError::ConfigError(format!(
                "Config size {} bytes exceeds maximum allowed {} bytes",
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }

        let text = std::fs::read_to_string(path)
            .map_err(|e| TierlineError::ConfigError(format!("Read failed: {}", e)))?;
        let config = Self::from_toml(&text)?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load `path` if given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, TierlineError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    /// Reject values that would only fail later, at request time.
    pub fn validate(&self) -> Result<(), TierlineError> {
        if self.server.host.trim().is_empty() {
            return Err(TierlineError::ConfigError(
                "server.host must not be empty".to_string(),
            ));
        }
        self.assessor()
            .map_err(|e| TierlineError::ConfigError(format!("[graduation] {}", e)))?;
        Ok(())
    }

    /// Assessor using the configured default targets.
    pub fn assessor(&self) -> Result<GraduationAssessor, TierlineError> {
        GraduationAssessor::with_default_targets(
            self.graduation.silver_target,
            self.graduation.gold_target,
        )
    }

    /// Snapshot path: the override if given, else the configured one.
    pub fn snapshot_path(&self, override_path: Option<&Path>) -> Result<PathBuf, TierlineError> {
        override_path
            .map(Path::to_path_buf)
            .or_else(|| self.source.snapshot.clone())
            .ok_or_else(|| {
                TierlineError::ConfigError(
                    "No snapshot configured: pass --snapshot or set [source] snapshot".to_string(),
                )
            })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_is_all_defaults() {
        let config = AppConfig::from_toml("").expect("parse");
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.graduation.silver_target, DEFAULT_SILVER_TARGET);
    }

    #[test]
    fn partial_tables_keep_remaining_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [server]
            port = 9090

            [graduation]
            gold_target = 750000
            "#,
        )
        .expect("parse");

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.graduation.silver_target, DEFAULT_SILVER_TARGET);
        assert_eq!(config.assessor().expect("assessor").defaults().gold(), 750_000);
    }

    #[test]
    fn inverted_targets_rejected() {
        let result = AppConfig::from_toml(
            r#"
            [graduation]
            silver_target = 500000
            gold_target = 200000
            "#,
        );
        assert!(matches!(result, Err(TierlineError::ConfigError(_))));
    }

    #[test]
    fn unknown_keys_rejected() {
        let result = AppConfig::from_toml("[server]\nbind = \"0.0.0.0\"\n");
        assert!(matches!(result, Err(TierlineError::ConfigError(_))));
    }

    #[test]
    fn snapshot_override_wins() {
        let config = AppConfig::from_toml("[source]\nsnapshot = \"file.json\"\n").expect("parse");

        assert_eq!(
            config.snapshot_path(None).expect("path"),
            PathBuf::from("file.json")
        );
        assert_eq!(
            config
                .snapshot_path(Some(Path::new("other.json")))
                .expect("path"),
            PathBuf::from("other.json")
        );
        assert!(AppConfig::default().snapshot_path(None).is_err());
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp");
        writeln!(file, "[server]\nhost = \"0.0.0.0\"").expect("write");

        let config = AppConfig::load(file.path()).expect("load");
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn missing_file_is_config_error() {
        let result = AppConfig::load_or_default(Some(Path::new("/no/such/tierline.toml")));
        assert!(matches!(result, Err(TierlineError::ConfigError(_))));
    }
}
