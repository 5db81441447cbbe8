pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::adapters::{
    ConsoleNotifier, CorruptStorePolicy, KnownTicketStore, LocalStorage, SmtpNotifier,
    SocrataTicketSource,
};
pub use crate::core::{
    monitor::{RunSummary, TicketMonitor},
    notification::format_notification,
    reconcile::{reconcile, Reconciliation},
};
pub use config::{FileConfig, MonitorConfig, Overrides, SmtpSettings};
pub use domain::model::{Address, KnownTicketSet, NotificationPayload, TicketRecord};
pub use domain::ports::{Notifier, Storage, TicketSource};
pub use utils::error::{MalformedRecord, MonitorError, Result};
