//! Run configuration, resolved once at startup.
//!
//! Precedence for every setting: command-line flag, then environment
//! variable, then config file, then built-in default.

pub mod addresses;
#[cfg(feature = "cli")]
pub mod cli;
pub mod file;

use crate::adapters::socrata::DEFAULT_DATASET_URL;
use crate::adapters::ticket_store::CorruptStorePolicy;
use crate::domain::model::Address;
use crate::utils::error::{MonitorError, Result};
use crate::utils::validation::{
    validate_mailbox, validate_non_empty_string, validate_path, validate_range, validate_url,
    Validate,
};
pub use file::FileConfig;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_STORE_PATH: &str = "known_tickets.json";

/// Environment lookup; empty values count as unset.
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub state_file: Option<PathBuf>,
    pub on_corrupt: Option<CorruptStorePolicy>,
}

#[derive(Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
    pub to_email: String,
}

impl std::fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("from_email", &self.from_email)
            .field("to_email", &self.to_email)
            .finish()
    }
}

impl SmtpSettings {
    /// Fails with every missing variable named at once.
    pub fn resolve<E>(file: &FileConfig, env: E) -> Result<Self>
    where
        E: Fn(&str) -> Option<String>,
    {
        let smtp = &file.smtp;
        // a `${VAR}` left behind by an unset variable counts as missing
        let pick = |key: &str, fallback: &Option<String>| {
            env(key).or_else(|| {
                fallback
                    .clone()
                    .filter(|value| !file::has_unresolved_reference(value))
            })
        };

        let server = pick("SMTP_SERVER", &smtp.server);
        let username = pick("SMTP_USERNAME", &smtp.username);
        let password = pick("SMTP_PASSWORD", &smtp.password);
        let from_email = pick("FROM_EMAIL", &smtp.from_email);
        let to_email = pick("TO_EMAIL", &smtp.to_email);

        let missing: Vec<&str> = [
            ("SMTP_SERVER", &server),
            ("SMTP_USERNAME", &username),
            ("SMTP_PASSWORD", &password),
            ("FROM_EMAIL", &from_email),
            ("TO_EMAIL", &to_email),
        ]
        .iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| *name)
        .collect();

        let (Some(server), Some(username), Some(password), Some(from_email), Some(to_email)) =
            (server, username, password, from_email, to_email)
        else {
            return Err(MonitorError::MissingConfigError {
                field: missing.join(", "),
            });
        };

        let port = match env("SMTP_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| MonitorError::InvalidConfigValueError {
                    field: "SMTP_PORT".to_string(),
                    value: raw.clone(),
                    reason: e.to_string(),
                })?,
            None => smtp.port.unwrap_or(DEFAULT_SMTP_PORT),
        };

        Ok(Self {
            server,
            port,
            username,
            password,
            from_email,
            to_email,
        })
    }

    pub fn from_env(file: &FileConfig) -> Result<Self> {
        Self::resolve(file, process_env)
    }
}

impl Validate for SmtpSettings {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("SMTP_SERVER", &self.server)?;
        validate_range("SMTP_PORT", self.port, 1, u16::MAX)?;
        validate_non_empty_string("SMTP_USERNAME", &self.username)?;
        validate_non_empty_string("SMTP_PASSWORD", &self.password)?;
        validate_mailbox("FROM_EMAIL", &self.from_email)?;
        validate_mailbox("TO_EMAIL", &self.to_email)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    pub addresses: Vec<Address>,
    pub dataset_url: String,
    pub app_token: Option<String>,
    pub timeout_seconds: u64,
    pub store_path: PathBuf,
    pub on_corrupt: CorruptStorePolicy,
}

impl MonitorConfig {
    pub fn resolve<E>(file: &FileConfig, overrides: &Overrides, env: E) -> Result<Self>
    where
        E: Fn(&str) -> Option<String>,
    {
        let file_addresses = file.monitor.addresses.as_ref().map(|list| list.join(";"));
        let address_list = env("TICKET_ADDRESSES").or(file_addresses);
        let house = env("OATH_ADDRESS_HOUSE").or_else(|| file.monitor.house.clone());
        let street = env("OATH_ADDRESS_STREET").or_else(|| file.monitor.street.clone());
        let addresses = addresses::resolve_addresses(
            address_list.as_deref(),
            house.as_deref(),
            street.as_deref(),
        );

        let dataset_url = env("OATH_DATASET_URL")
            .or_else(|| file.source.dataset_url.clone())
            .unwrap_or_else(|| DEFAULT_DATASET_URL.to_string());
        let app_token = env("SOCRATA_APP_TOKEN").or_else(|| file.source.app_token.clone());

        let timeout_seconds = match env("OATH_REQUEST_TIMEOUT") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|e| MonitorError::InvalidConfigValueError {
                    field: "OATH_REQUEST_TIMEOUT".to_string(),
                    value: raw.clone(),
                    reason: e.to_string(),
                })?,
            None => file.source.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS),
        };

        let store_path = match &overrides.state_file {
            Some(path) => path.clone(),
            None => PathBuf::from(
                env("KNOWN_TICKETS_PATH")
                    .or_else(|| file.store.path.clone())
                    .unwrap_or_else(|| DEFAULT_STORE_PATH.to_string()),
            ),
        };

        let on_corrupt = match overrides.on_corrupt {
            Some(policy) => policy,
            None => match env("KNOWN_TICKETS_ON_CORRUPT") {
                Some(raw) => raw.parse()?,
                None => file.store.on_corrupt.unwrap_or_default(),
            },
        };

        Ok(Self {
            addresses,
            dataset_url,
            app_token,
            timeout_seconds,
            store_path,
            on_corrupt,
        })
    }

    pub fn from_env(file: &FileConfig, overrides: &Overrides) -> Result<Self> {
        Self::resolve(file, overrides, process_env)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Validate for MonitorConfig {
    fn validate(&self) -> Result<()> {
        validate_url("source.dataset_url", &self.dataset_url)?;
        validate_range("source.timeout_seconds", self.timeout_seconds, 1, 300)?;
        validate_path("store.path", &self.store_path.to_string_lossy())?;
        if self.addresses.is_empty() {
            return Err(MonitorError::ConfigValidationError {
                field: "monitor.addresses".to_string(),
                message: "at least one address must be monitored".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn smtp_env() -> Vec<(&'static str, &'static str)> {
        vec![
            ("SMTP_SERVER", "smtp.gmail.com"),
            ("SMTP_USERNAME", "monitor"),
            ("SMTP_PASSWORD", "secret"),
            ("FROM_EMAIL", "monitor@example.com"),
            ("TO_EMAIL", "owner@example.com"),
        ]
    }

    #[test]
    fn test_defaults_without_any_input() {
        let config =
            MonitorConfig::resolve(&FileConfig::default(), &Overrides::default(), env_from(&[]))
                .unwrap();

        assert_eq!(config.addresses, vec![Address::new("1407", "OVERING STREET")]);
        assert_eq!(config.dataset_url, DEFAULT_DATASET_URL);
        assert_eq!(config.timeout_seconds, 30);
        assert_eq!(config.store_path, PathBuf::from("known_tickets.json"));
        assert_eq!(config.on_corrupt, CorruptStorePolicy::Abort);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides_file_and_flag_overrides_env() {
        let file = FileConfig::from_toml_str(
            r#"
[monitor]
addresses = ["5 Elm Street"]

[store]
path = "from-file.json"
on_corrupt = "reset"
"#,
        )
        .unwrap();
        let env = env_from(&[
            ("TICKET_ADDRESSES", "1407 Overing Street;1409 Overing Street"),
            ("KNOWN_TICKETS_PATH", "from-env.json"),
        ]);
        let overrides = Overrides {
            state_file: Some(PathBuf::from("from-flag.json")),
            on_corrupt: None,
        };

        let config = MonitorConfig::resolve(&file, &overrides, env).unwrap();

        assert_eq!(config.addresses.len(), 2);
        assert_eq!(config.addresses[1], Address::new("1409", "OVERING STREET"));
        assert_eq!(config.store_path, PathBuf::from("from-flag.json"));
        assert_eq!(config.on_corrupt, CorruptStorePolicy::Reset);
    }

    #[test]
    fn test_file_addresses_used_without_env() {
        let file =
            FileConfig::from_toml_str("[monitor]\naddresses = [\"5 Elm Street\"]\n").unwrap();

        let config = MonitorConfig::resolve(&file, &Overrides::default(), env_from(&[])).unwrap();

        assert_eq!(config.addresses, vec![Address::new("5", "ELM STREET")]);
    }

    #[test]
    fn test_bad_timeout_is_rejected() {
        let err = MonitorConfig::resolve(
            &FileConfig::default(),
            &Overrides::default(),
            env_from(&[("OATH_REQUEST_TIMEOUT", "soon")]),
        )
        .unwrap_err();
        assert!(matches!(err, MonitorError::InvalidConfigValueError { .. }));

        let config = MonitorConfig::resolve(
            &FileConfig::default(),
            &Overrides::default(),
            env_from(&[("OATH_REQUEST_TIMEOUT", "0")]),
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_smtp_resolves_with_default_port() {
        let settings = SmtpSettings::resolve(&FileConfig::default(), env_from(&smtp_env())).unwrap();

        assert_eq!(settings.server, "smtp.gmail.com");
        assert_eq!(settings.port, 587);
        assert!(settings.validate().is_ok());
        assert!(!format!("{:?}", settings).contains("secret"));
    }

    #[test]
    fn test_smtp_lists_every_missing_variable() {
        let err = SmtpSettings::resolve(
            &FileConfig::default(),
            env_from(&[("SMTP_SERVER", "smtp.gmail.com")]),
        )
        .unwrap_err();

        match err {
            MonitorError::MissingConfigError { field } => {
                assert_eq!(field, "SMTP_USERNAME, SMTP_PASSWORD, FROM_EMAIL, TO_EMAIL");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_smtp_unset_file_references_count_as_missing() {
        let file = FileConfig::from_toml_str(
            r#"
[smtp]
server = "smtp.gmail.com"
username = "${OATH_TEST_UNSET_SMTP_USER}"
password = "${OATH_TEST_UNSET_SMTP_PASS}"
from_email = "monitor@example.com"
to_email = "owner@example.com"
"#,
        )
        .unwrap();

        let err = SmtpSettings::resolve(&file, env_from(&[])).unwrap_err();

        assert_eq!(err.severity().exit_code(), 1);
        match err {
            MonitorError::MissingConfigError { field } => {
                assert_eq!(field, "SMTP_USERNAME, SMTP_PASSWORD");
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let settings = SmtpSettings::resolve(
            &file,
            env_from(&[
                ("SMTP_USERNAME", "monitor"),
                ("SMTP_PASSWORD", "secret"),
            ]),
        )
        .unwrap();
        assert_eq!(settings.username, "monitor");
    }

    #[test]
    fn test_smtp_empty_password_fails_validation() {
        let file = FileConfig::from_toml_str("[smtp]\npassword = \"\"\n").unwrap();
        let mut env = smtp_env();
        env.retain(|(k, _)| *k != "SMTP_PASSWORD");

        let settings = SmtpSettings::resolve(&file, env_from(&env)).unwrap();

        match settings.validate() {
            Err(MonitorError::InvalidConfigValueError { field, .. }) => {
                assert_eq!(field, "SMTP_PASSWORD");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_corrupt_policy_from_env_beats_file() {
        let file = FileConfig::from_toml_str("[store]\non_corrupt = \"reset\"\n").unwrap();

        let config = MonitorConfig::resolve(
            &file,
            &Overrides::default(),
            env_from(&[("KNOWN_TICKETS_ON_CORRUPT", "abort")]),
        )
        .unwrap();
        assert_eq!(config.on_corrupt, CorruptStorePolicy::Abort);

        let err = MonitorConfig::resolve(
            &file,
            &Overrides::default(),
            env_from(&[("KNOWN_TICKETS_ON_CORRUPT", "treat_as_empty")]),
        )
        .unwrap_err();
        assert!(matches!(err, MonitorError::InvalidConfigValueError { .. }));
    }

    #[test]
    fn test_smtp_port_from_env_and_file() {
        let file = FileConfig::from_toml_str("[smtp]\nport = 2525\npassword = \"p\"\n").unwrap();
        let mut env = smtp_env();
        env.retain(|(k, _)| *k != "SMTP_PASSWORD");

        let settings = SmtpSettings::resolve(&file, env_from(&env)).unwrap();
        assert_eq!(settings.port, 2525);
        assert_eq!(settings.password, "p");

        env.push(("SMTP_PORT", "465"));
        let settings = SmtpSettings::resolve(&file, env_from(&env)).unwrap();
        assert_eq!(settings.port, 465);

        env.pop();
        env.push(("SMTP_PORT", "smtp"));
        assert!(SmtpSettings::resolve(&file, env_from(&env)).is_err());
    }
}
