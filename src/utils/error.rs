use thiserror::Error;

/// A fetched record that cannot take part in reconciliation.
///
/// These are data-quality failures: the record is skipped and the run
/// carries on with the rest of the batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("record #{position} from {address} has no ticket id")]
pub struct MalformedRecord {
    /// Zero-based position of the record in fetch order.
    pub position: usize,
    pub address: String,
}

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Failed to fetch tickets for {address}: {message}")]
    FetchFailure { address: String, message: String },

    #[error("Known-ticket store {path} is corrupt: {message}")]
    StoreCorrupt { path: String, message: String },

    #[error("Failed to send notification: {message}")]
    NotifyFailure { message: String },

    #[error("Malformed record: {0}")]
    MalformedRecord(#[from] MalformedRecord),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Fetch,
    Store,
    Notify,
    DataQuality,
    Configuration,
    System,
}

/// Drives the process exit code; see `ErrorSeverity::exit_code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl MonitorError {
    pub fn fetch(address: impl Into<String>, message: impl std::fmt::Display) -> Self {
        MonitorError::FetchFailure {
            address: address.into(),
            message: message.to_string(),
        }
    }

    pub fn notify(message: impl std::fmt::Display) -> Self {
        MonitorError::NotifyFailure {
            message: message.to_string(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            MonitorError::FetchFailure { .. } | MonitorError::ApiError(_) => ErrorCategory::Fetch,
            MonitorError::StoreCorrupt { .. } => ErrorCategory::Store,
            MonitorError::NotifyFailure { .. } => ErrorCategory::Notify,
            MonitorError::MalformedRecord(_) => ErrorCategory::DataQuality,
            MonitorError::ConfigError { .. }
            | MonitorError::MissingConfigError { .. }
            | MonitorError::InvalidConfigValueError { .. }
            | MonitorError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            MonitorError::IoError(_) | MonitorError::SerializationError(_) => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::DataQuality => ErrorSeverity::Low,
            ErrorCategory::Fetch | ErrorCategory::Notify => ErrorSeverity::Medium,
            ErrorCategory::Store | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            MonitorError::FetchFailure { .. } | MonitorError::ApiError(_) => {
                "Check network access to the ticket portal; the next scheduled run will retry"
            }
            MonitorError::StoreCorrupt { .. } => {
                "Fix or remove the known-tickets file, or rerun with --on-corrupt-store reset"
            }
            MonitorError::NotifyFailure { .. } => {
                "Verify SMTP_SERVER, SMTP_PORT and credentials; unsent tickets are retried next run"
            }
            MonitorError::MalformedRecord(_) => "No action needed; the record was skipped",
            MonitorError::MissingConfigError { .. } => {
                "Set the missing environment variable or add it to the config file"
            }
            MonitorError::ConfigError { .. }
            | MonitorError::InvalidConfigValueError { .. }
            | MonitorError::ConfigValidationError { .. } => {
                "Review the configuration file and environment variables"
            }
            MonitorError::IoError(_) => "Check file permissions for the known-tickets file",
            MonitorError::SerializationError(_) => "Inspect the data being written to disk",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            MonitorError::FetchFailure { address, .. } => {
                format!("Could not retrieve tickets for {}", address)
            }
            MonitorError::ApiError(_) => "Could not reach the ticket portal".to_string(),
            MonitorError::StoreCorrupt { path, .. } => {
                format!("The known-tickets file {} could not be read", path)
            }
            MonitorError::NotifyFailure { .. } => {
                "The notification email could not be sent".to_string()
            }
            MonitorError::MissingConfigError { field } => {
                format!("Missing configuration value: {}", field)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MonitorError>;
