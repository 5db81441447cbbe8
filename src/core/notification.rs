use crate::domain::model::{NotificationPayload, TicketRecord};
use std::collections::BTreeSet;

const UNKNOWN_ADDRESS: &str = "Unknown address";

/// Builds the single summary email for a batch of new tickets.
///
/// Returns `None` for an empty batch so that quiet runs send nothing.
pub fn format_notification(batch: &[TicketRecord]) -> Option<NotificationPayload> {
    if batch.is_empty() {
        return None;
    }

    let addresses: BTreeSet<&str> = batch
        .iter()
        .filter_map(|ticket| ticket.address.as_deref())
        .collect();

    let (subject, intro) = match single(&addresses) {
        Some(address) => (
            format!("New DSNY OATH tickets for {}", address),
            format!(
                "The following new DSNY OATH tickets have been issued for {}:",
                address
            ),
        ),
        None => (
            "New DSNY OATH tickets detected".to_string(),
            "The following new DSNY OATH tickets have been issued:".to_string(),
        ),
    };

    let mut lines = vec![intro, String::new()];
    lines.extend(batch.iter().map(ticket_line));

    Some(NotificationPayload {
        subject,
        body: lines.join("\n"),
    })
}

fn single<'a>(addresses: &BTreeSet<&'a str>) -> Option<&'a str> {
    if addresses.len() == 1 {
        addresses.iter().next().copied()
    } else {
        None
    }
}

fn ticket_line(ticket: &TicketRecord) -> String {
    let address = ticket.address.as_deref().unwrap_or(UNKNOWN_ADDRESS);
    let date = ticket
        .field_str("violation_date")
        .map(|d| d.chars().take(10).collect::<String>())
        .unwrap_or_else(|| "Unknown Date".to_string());
    let description = ticket
        .field_str("charge_1_code_description")
        .unwrap_or_default();
    let status = ticket.field_str("hearing_status").unwrap_or_default();

    format!(
        "• {}: Ticket {} on {} - {} (Status: {})",
        address, ticket.ticket_id, date, description, status
    )
}
