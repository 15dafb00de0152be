//! Load — config loading from file and environment variables.

use std::path::Path;

use thiserror::Error;

use super::model::ParserConfig;

pub const CONFIG_FILE_ENV: &str = "ANALYZER_CONFIG_FILE";
pub const DEFAULT_CONFIG_FILE: &str = "/etc/tablog/analyzer.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for {key}: {value:?}")]
    InvalidEnv { key: String, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ParserConfig {
    /// Load configuration from file and environment variables.
    /// Priority: Environment Variables > Config File > Defaults
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_FILE_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_with(Path::new(&path), |key| std::env::var(key).ok())
    }

    /// Same as [`load`](Self::load) with an explicit file and variable lookup.
    pub fn load_with<F>(path: &Path, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = if path.exists() {
            tracing::info!("Loading parser configuration from: {}", path.display());
            Self::from_file(path)?
        } else {
            tracing::debug!("Config file not found at {}, using defaults", path.display());
            Self::default()
        };

        config.apply_env(env)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    fn apply_env<F>(&mut self, env: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = env_usize(&env, "ANALYZER_MAX_LINE_BYTES")? {
            self.max_line_bytes = v;
        }
        if let Some(v) = env_usize(&env, "ANALYZER_DEFAULT_PAGE_SIZE")? {
            self.default_page_size = v;
        }
        if let Some(v) = env_usize(&env, "ANALYZER_MAX_PAGE_SIZE")? {
            self.max_page_size = v;
        }
        Ok(())
    }
}

fn env_usize<F>(env: &F, key: &str) -> Result<Option<usize>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match env(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv {
                key: key.to_string(),
                value,
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let cfg = ParserConfig::load_with(Path::new("/nonexistent/analyzer.toml"), env_of(&[])).unwrap();
        assert_eq!(cfg, ParserConfig::default());
    }

    #[test]
    fn test_file_values_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_line_bytes = 2048\ndefault_page_size = 25").unwrap();

        let cfg = ParserConfig::load_with(file.path(), env_of(&[])).unwrap();
        assert_eq!(cfg.max_line_bytes, 2048);
        assert_eq!(cfg.default_page_size, 25);
        assert_eq!(cfg.max_page_size, 1000);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_line_bytes = 2048").unwrap();

        let cfg = ParserConfig::load_with(
            file.path(),
            env_of(&[("ANALYZER_MAX_LINE_BYTES", "4096"), ("ANALYZER_MAX_PAGE_SIZE", " 300 ")]),
        )
        .unwrap();
        assert_eq!(cfg.max_line_bytes, 4096);
        assert_eq!(cfg.max_page_size, 300);
    }

    #[test]
    fn test_bad_env_value() {
        let err = ParserConfig::load_with(
            Path::new("/nonexistent/analyzer.toml"),
            env_of(&[("ANALYZER_DEFAULT_PAGE_SIZE", "lots")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { .. }));
    }

    #[test]
    fn test_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_line_bytes = \"big\"").unwrap();

        let err = ParserConfig::load_with(file.path(), env_of(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_loaded_config_is_validated() {
        let err = ParserConfig::load_with(
            Path::new("/nonexistent/analyzer.toml"),
            env_of(&[("ANALYZER_MAX_PAGE_SIZE", "10")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
