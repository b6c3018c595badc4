use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use thiserror::Error;
use validator::Validate;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("parse error for {field}: {value} - {source}")]
    Parse {
        field: String,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Which introspection dialect to run against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Postgres,
    Mysql,
}

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Postgres => "postgres",
            Dialect::Mysql => "mysql",
        }
    }
}

impl std::str::FromStr for Dialect {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            "mysql" => Ok(Dialect::Mysql),
            other => Err(ConfigError::Parse {
                field: "dialect".to_string(),
                value: other.to_string(),
                source: Box::new(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "expected one of: postgres, mysql",
                )),
            }),
        }
    }
}

/// Ingestion configuration with validation: dialect, blocklist patterns,
/// and the alias map consumed by `new_schema`.
#[derive(Clone, Debug, Validate, Serialize, Deserialize)]
pub struct IngestConfig {
    pub dialect: Dialect,

    /// Anchored regex patterns matched against unqualified table names and
    /// `table.column` strings (see spec §4.2).
    #[serde(default)]
    pub blocklist: Vec<String>,

    /// Alias name -> canonical table names it should resolve to.
    #[serde(default)]
    pub aliases: HashMap<String, Vec<String>>,

    /// Hard cap on `all_paths` heap pops, never configurable by design;
    /// kept here only so callers can observe the fixed value.
    #[validate(range(min = 1, message = "pop cap must be positive"))]
    #[serde(default = "default_pop_cap")]
    pub pop_cap: usize,
}

fn default_pop_cap() -> usize {
    crate::digraph::ALL_PATHS_POP_CAP
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::Postgres,
            blocklist: Vec::new(),
            aliases: HashMap::new(),
            pop_cap: default_pop_cap(),
        }
    }
}

impl IngestConfig {
    /// Build configuration from environment variables with validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        let dialect_str = env::var("RELGRAPH_DIALECT").unwrap_or_else(|_| "postgres".to_string());
        let dialect = dialect_str.parse()?;
        let config = Self {
            dialect,
            blocklist: Vec::new(),
            aliases: HashMap::new(),
            pop_cap: default_pop_cap(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Build configuration from a YAML file.
    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            field: "yaml_file".to_string(),
            value: "file read failed".to_string(),
            source: Box::new(e),
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            field: "yaml_content".to_string(),
            value: content,
            source: Box::new(e),
        })?;

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = IngestConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.dialect, Dialect::Postgres);
        assert_eq!(config.pop_cap, crate::digraph::ALL_PATHS_POP_CAP);
    }

    #[test]
    fn test_dialect_parse_aliases() {
        assert_eq!("postgresql".parse::<Dialect>().unwrap(), Dialect::Postgres);
        assert_eq!("MySQL".parse::<Dialect>().unwrap(), Dialect::Mysql);
        assert!("oracle".parse::<Dialect>().is_err());
    }

    #[test]
    fn test_invalid_pop_cap() {
        let config = IngestConfig {
            pop_cap: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
