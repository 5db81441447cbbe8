use crate::adapters::ticket_store::CorruptStorePolicy;
use crate::utils::error::{MonitorError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

const ENV_REFERENCE: &str = r"\$\{([^}]+)\}";

/// Optional TOML configuration file. Every value can also come from the
/// environment, which takes precedence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub smtp: SmtpSection,
    pub monitor: MonitorSection,
    pub source: SourceSection,
    pub store: StoreSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpSection {
    pub server: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from_email: Option<String>,
    pub to_email: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSection {
    /// Entries in `<house> <street>` form.
    pub addresses: Option<Vec<String>>,
    pub house: Option<String>,
    pub street: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSection {
    pub dataset_url: Option<String>,
    pub app_token: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    pub path: Option<String>,
    pub on_corrupt: Option<CorruptStorePolicy>,
}

impl FileConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| MonitorError::ConfigError {
            message: format!("cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| MonitorError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the variable's value; unset variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(ENV_REFERENCE).map_err(|e| MonitorError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

/// True when `value` still holds a `${VAR}` reference whose variable was unset.
pub fn has_unresolved_reference(value: &str) -> bool {
    Regex::new(ENV_REFERENCE)
        .map(|re| re.is_match(value))
        .unwrap_or(false)
}
