use crate::domain::model::KnownTicketSet;
use crate::domain::ports::Storage;
use crate::utils::error::{MonitorError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What to do when the known-tickets file exists but cannot be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorruptStorePolicy {
    /// Fail the run and leave the file for inspection.
    #[default]
    Abort,
    /// Start from an empty set and overwrite the file at the end of the run.
    Reset,
}

impl FromStr for CorruptStorePolicy {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(CorruptStorePolicy::Abort),
            "reset" => Ok(CorruptStorePolicy::Reset),
            other => Err(MonitorError::InvalidConfigValueError {
                field: "store.on_corrupt".to_string(),
                value: other.to_string(),
                reason: "Expected 'abort' or 'reset'".to_string(),
            }),
        }
    }
}

impl fmt::Display for CorruptStorePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorruptStorePolicy::Abort => f.write_str("abort"),
            CorruptStorePolicy::Reset => f.write_str("reset"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedStore {
    pub tickets: KnownTicketSet,
    /// The file was corrupt and has been replaced by an empty set.
    pub reset: bool,
}

/// Persisted set of already-reported ticket ids.
pub struct KnownTicketStore<S: Storage> {
    storage: S,
    file_name: String,
}

impl<S: Storage> KnownTicketStore<S> {
    pub fn new(storage: S, file_name: impl Into<String>) -> Self {
        Self {
            storage,
            file_name: file_name.into(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Missing file loads as an empty set; unparseable content is `StoreCorrupt`.
    pub async fn load(&self) -> Result<KnownTicketSet> {
        let data = match self.storage.read_file(&self.file_name).await {
            Ok(data) => data,
            Err(MonitorError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No known-tickets file at {}, starting empty", self.file_name);
                return Ok(KnownTicketSet::new());
            }
            Err(e) => return Err(e),
        };

        let tickets =
            KnownTicketSet::from_json_slice(&data).map_err(|e| MonitorError::StoreCorrupt {
                path: self.file_name.clone(),
                message: e.to_string(),
            })?;
        tracing::debug!("Loaded {} known tickets from {}", tickets.len(), self.file_name);
        Ok(tickets)
    }

    pub async fn load_with_policy(&self, policy: CorruptStorePolicy) -> Result<LoadedStore> {
        match self.load().await {
            Ok(tickets) => Ok(LoadedStore {
                tickets,
                reset: false,
            }),
            Err(e @ MonitorError::StoreCorrupt { .. }) if policy == CorruptStorePolicy::Reset => {
                tracing::warn!("{}; resetting to an empty set as configured", e);
                Ok(LoadedStore {
                    tickets: KnownTicketSet::new(),
                    reset: true,
                })
            }
            Err(e) => Err(e),
        }
    }

    pub async fn save(&self, tickets: &KnownTicketSet) -> Result<()> {
        let data = tickets.to_json_vec()?;
        self.storage.write_file(&self.file_name, &data).await?;
        tracing::debug!("Saved {} known tickets to {}", tickets.len(), self.file_name);
        Ok(())
    }
}
