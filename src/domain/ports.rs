use crate::domain::model::{Address, NotificationPayload, TicketRecord};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Remote source of tickets for a monitored address.
#[async_trait]
pub trait TicketSource: Send + Sync {
    async fn fetch(&self, address: &Address) -> Result<Vec<TicketRecord>>;
}

/// Delivers exactly one message per call.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, payload: &NotificationPayload) -> Result<()>;
}
