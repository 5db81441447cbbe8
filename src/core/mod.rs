pub mod monitor;
pub mod notification;
pub mod reconcile;

pub use crate::domain::model::{KnownTicketSet, NotificationPayload, TicketRecord};
pub use crate::domain::ports::{Notifier, Storage, TicketSource};
pub use crate::utils::error::Result;
