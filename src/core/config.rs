use crate::core::dataset::CDR_CORPUS;
use crate::core::fetch::remote_file_name;
use crate::error::{FetchError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "cdrfetch.toml";
pub const DEFAULT_STAGING_DIR: &str = "downloads";
pub const DEFAULT_DATA_DIR: &str = "data";

pub const ENV_URL: &str = "CDRFETCH_URL";
pub const ENV_DATA_DIR: &str = "CDRFETCH_DATA_DIR";
pub const ENV_STAGING_DIR: &str = "CDRFETCH_STAGING_DIR";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub url: String,
    pub staging_dir: PathBuf,
    pub data_dir: PathBuf,
    /// Suffix the staging directory with a per-run identifier
    pub unique_staging: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            url: CDR_CORPUS.url.to_string(),
            staging_dir: PathBuf::from(DEFAULT_STAGING_DIR),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            unique_staging: false,
        }
    }
}

/// Values given on the command line; they win over every other layer.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub url: Option<String>,
    pub staging_dir: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub unique_staging: bool,
}

impl Settings {
    /// Defaults, then the TOML file, then the process environment.
    ///
    /// An explicitly named config file must exist; the default
    /// `cdrfetch.toml` is optional. Call [`Settings::validate`] once the
    /// command-line overrides have been applied.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let settings = match config_path {
            Some(path) => {
                if !path.is_file() {
                    return Err(FetchError::config_error(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                Self::from_file(path)?
            }
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.is_file() {
                    Self::from_file(path)?
                } else {
                    Self::default()
                }
            }
        };

        Ok(settings.with_env(|key| std::env::var(key).ok()))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| FetchError::config_error(e.to_string()))
    }

    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_URL) {
            self.url = url;
        }
        if let Some(dir) = lookup(ENV_DATA_DIR) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup(ENV_STAGING_DIR) {
            self.staging_dir = PathBuf::from(dir);
        }
        self
    }

    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(url) = overrides.url {
            self.url = url;
        }
        if let Some(dir) = overrides.staging_dir {
            self.staging_dir = dir;
        }
        if let Some(dir) = overrides.data_dir {
            self.data_dir = dir;
        }
        self.unique_staging |= overrides.unique_staging;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(FetchError::config_error("archive URL must not be empty"));
        }
        // The archive is saved under the URL's file name, so one must exist.
        remote_file_name(&self.url)?;
        if self.staging_dir.as_os_str().is_empty() {
            return Err(FetchError::config_error("staging directory must not be empty"));
        }
        if self.data_dir.as_os_str().is_empty() {
            return Err(FetchError::config_error("data directory must not be empty"));
        }
        if self.staging_dir == self.data_dir {
            return Err(FetchError::config_error(
                "staging directory and data directory must differ",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_match_reference_layout() {
        let settings = Settings::default();
        assert_eq!(settings.url, CDR_CORPUS.url);
        assert_eq!(settings.staging_dir, PathBuf::from("downloads"));
        assert_eq!(settings.data_dir, PathBuf::from("data"));
        assert!(!settings.unique_staging);
    }

    #[test]
    fn test_parse_partial_file_keeps_defaults() {
        let settings = Settings::parse(
            r#"
data_dir = "corpus/data"
unique_staging = true
"#,
        )
        .unwrap();
        assert_eq!(settings.data_dir, PathBuf::from("corpus/data"));
        assert!(settings.unique_staging);
        assert_eq!(settings.url, CDR_CORPUS.url);
    }

    #[test]
    fn test_parse_rejects_unknown_keys() {
        let err = Settings::parse("retries = 3").unwrap_err();
        assert!(matches!(err, FetchError::ConfigError { .. }));
    }

    #[test]
    fn test_layer_precedence() {
        let env: HashMap<&str, &str> = [
            (ENV_URL, "http://mirror.test/CDR_Data.zip"),
            (ENV_DATA_DIR, "env-data"),
        ]
        .into_iter()
        .collect();

        let settings = Settings::default()
            .with_env(|key| env.get(key).map(|v| v.to_string()))
            .with_overrides(Overrides {
                data_dir: Some(PathBuf::from("cli-data")),
                ..Overrides::default()
            });

        assert_eq!(settings.url, "http://mirror.test/CDR_Data.zip");
        assert_eq!(settings.data_dir, PathBuf::from("cli-data"));
        assert_eq!(settings.staging_dir, PathBuf::from("downloads"));
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let temp = tempfile::tempdir().unwrap();
        let err = Settings::load(Some(&temp.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, FetchError::ConfigError { .. }));
    }

    #[test]
    fn test_validate() {
        let mut settings = Settings::default();
        assert!(settings.validate().is_ok());

        settings.url = "  ".to_string();
        assert!(settings.validate().is_err());

        settings.url = "http://mirror.test/".to_string();
        assert!(matches!(
            settings.validate(),
            Err(FetchError::ConfigError { .. })
        ));

        settings.url = "mirror.test/CDR_Data.zip".to_string();
        assert!(settings.validate().is_err());

        let settings = Settings {
            staging_dir: PathBuf::from("data"),
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }
}
