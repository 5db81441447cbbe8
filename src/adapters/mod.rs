// Adapters layer: concrete implementations of the domain ports.

pub mod console;
pub mod smtp;
pub mod socrata;
pub mod storage;
pub mod ticket_store;

pub use console::ConsoleNotifier;
pub use smtp::SmtpNotifier;
pub use socrata::SocrataTicketSource;
pub use storage::LocalStorage;
pub use ticket_store::{CorruptStorePolicy, KnownTicketStore};
