use crate::adapters::ticket_store::{CorruptStorePolicy, KnownTicketStore};
use crate::core::notification::format_notification;
use crate::core::reconcile::reconcile;
use crate::domain::model::Address;
use crate::domain::ports::{Notifier, Storage, TicketSource};
use crate::utils::error::{MalformedRecord, MonitorError, Result};
use chrono::Utc;

/// Outcome of one check run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub fetched: usize,
    pub new_tickets: Vec<String>,
    pub rejected: Vec<MalformedRecord>,
    pub notified: bool,
    pub persisted: bool,
    pub store_reset: bool,
}

/// One scheduled check: load store, fetch, reconcile, notify, persist.
///
/// Steps run strictly in sequence and a failure stops everything after it.
/// The store is only written after the notification went out, so tickets
/// from a failed send are reported again on the next run.
pub struct TicketMonitor<T: TicketSource, N: Notifier, S: Storage> {
    source: T,
    notifier: N,
    store: KnownTicketStore<S>,
    addresses: Vec<Address>,
    on_corrupt: CorruptStorePolicy,
    dry_run: bool,
}

impl<T: TicketSource, N: Notifier, S: Storage> TicketMonitor<T, N, S> {
    pub fn new(
        source: T,
        notifier: N,
        store: KnownTicketStore<S>,
        addresses: Vec<Address>,
    ) -> Self {
        Self {
            source,
            notifier,
            store,
            addresses,
            on_corrupt: CorruptStorePolicy::default(),
            dry_run: false,
        }
    }

    pub fn with_corrupt_store_policy(mut self, policy: CorruptStorePolicy) -> Self {
        self.on_corrupt = policy;
        self
    }

    /// Notify as usual but never write the store.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub async fn run(&self) -> Result<RunSummary> {
        tracing::info!("Starting ticket check for {} address(es)", self.addresses.len());

        let loaded = self.store.load_with_policy(self.on_corrupt).await?;
        tracing::info!("{} ticket(s) already known", loaded.tickets.len());

        let mut fetched = Vec::new();
        for address in &self.addresses {
            let records = self.source.fetch(address).await?;
            tracing::info!("Fetched {} ticket(s) for {}", records.len(), address);
            fetched.extend(records);
        }
        let fetched_count = fetched.len();

        let result = reconcile(fetched, &loaded.tickets, Utc::now());
        if !result.rejected.is_empty() {
            tracing::warn!("{} record(s) skipped for missing ticket ids", result.rejected.len());
        }

        let mut summary = RunSummary {
            fetched: fetched_count,
            new_tickets: result.batch.iter().map(|t| t.ticket_id.clone()).collect(),
            rejected: result.rejected.clone(),
            store_reset: loaded.reset,
            ..RunSummary::default()
        };

        match format_notification(&result.batch) {
            Some(payload) => {
                tracing::info!("{} new ticket(s) found", result.batch.len());
                self.notifier.send(&payload).await.map_err(|e| match e {
                    MonitorError::NotifyFailure { .. } => e,
                    other => MonitorError::notify(other),
                })?;
                summary.notified = true;
            }
            None => tracing::info!("No new tickets found."),
        }

        if self.dry_run {
            tracing::info!("Dry run: known-tickets file left untouched");
        } else if result.has_new_tickets() || loaded.reset {
            self.store.save(&result.updated).await?;
            summary.persisted = true;
            tracing::info!(
                "Saved {} known ticket(s) to {}",
                result.updated.len(),
                self.store.file_name()
            );
        }

        Ok(summary)
    }
}
