//! Configuration for storage and search behaviour.
//!
//! Load order: `<data dir>/config.toml` → environment variables → defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level lineage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LineageConfig {
    pub storage: StorageConfig,
    pub search: SearchConfig,
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Write an autosave snapshot when the shell exits with unsaved changes.
    pub autosave: bool,
}

/// Name search configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Match names case-sensitively. Default: false.
    pub case_sensitive: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { autosave: true }
    }
}

/// Helper to parse an env var and apply it to a config field.
fn env_override<T: std::str::FromStr>(var: &str, target: &mut T) {
    if let Ok(v) = std::env::var(var)
        && let Ok(n) = v.parse()
    {
        *target = n;
    }
}

impl LineageConfig {
    /// Load config from `config.toml` in the data directory, with env var overrides.
    /// Falls back to defaults if no config file exists.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let config_path = data_dir.join("config.toml");

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("failed to read {}", config_path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("invalid config in {}", config_path.display()))?
        } else {
            Self::default()
        };

        env_override("LINEAGE_AUTOSAVE", &mut config.storage.autosave);
        env_override(
            "LINEAGE_CASE_SENSITIVE",
            &mut config.search.case_sensitive,
        );

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LineageConfig::default();
        assert!(config.storage.autosave);
        assert!(!config.search.case_sensitive);
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r#"
[search]
case_sensitive = true
"#;
        let config: LineageConfig = toml::from_str(toml_str).unwrap();
        assert!(config.search.case_sensitive);
        // Defaults for unspecified fields
        assert!(config.storage.autosave);
    }

    #[test]
    fn test_config_load_nonexistent() {
        let config = LineageConfig::load(Path::new("/nonexistent/path")).unwrap();
        assert!(config.storage.autosave);
    }

    #[test]
    fn test_load_from_data_dir() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("config.toml"),
            "[storage]\nautosave = false\n",
        )
        .unwrap();

        let config = LineageConfig::load(tmp.path()).unwrap();
        assert!(!config.storage.autosave);
    }

    #[test]
    fn test_load_rejects_invalid_toml() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("config.toml"), "[storage\n").unwrap();
        assert!(LineageConfig::load(tmp.path()).is_err());
    }
}
