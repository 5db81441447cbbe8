//! Diff engine: splits a fetch into tickets never reported before and tickets
//! already in the known set.

use crate::domain::model::{KnownTicketSet, TicketRecord};
use crate::utils::error::MalformedRecord;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    /// New tickets in fetch order.
    pub batch: Vec<TicketRecord>,
    /// `known` plus every id in `batch`.
    pub updated: KnownTicketSet,
    /// Records dropped for lacking an id.
    pub rejected: Vec<MalformedRecord>,
}

impl Reconciliation {
    pub fn has_new_tickets(&self) -> bool {
        !self.batch.is_empty()
    }
}

/// Compares `fetched` against `known`, stamping new ids with `observed_at`.
///
/// Pure: `known` is not touched and nothing is persisted. An id repeated
/// within the same fetch is only reported for its first occurrence.
pub fn reconcile(
    fetched: Vec<TicketRecord>,
    known: &KnownTicketSet,
    observed_at: DateTime<Utc>,
) -> Reconciliation {
    let mut updated = known.clone();
    let mut batch = Vec::new();
    let mut rejected = Vec::new();

    for (position, mut record) in fetched.into_iter().enumerate() {
        let ticket_id = record.ticket_id.trim().to_string();
        if ticket_id.is_empty() {
            let malformed = MalformedRecord {
                position,
                address: record
                    .address
                    .clone()
                    .unwrap_or_else(|| "unknown address".to_string()),
            };
            tracing::warn!("Skipping record: {}", malformed);
            rejected.push(malformed);
            continue;
        }

        if updated.contains(&ticket_id) {
            continue;
        }

        updated.insert(ticket_id.clone(), observed_at);
        record.ticket_id = ticket_id;
        batch.push(record);
    }

    tracing::debug!(
        "Reconciled: {} new, {} rejected, {} known",
        batch.len(),
        rejected.len(),
        updated.len()
    );

    Reconciliation {
        batch,
        updated,
        rejected,
    }
}
