use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A monitored property: house number plus street name as the portal spells it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub house: String,
    pub street: String,
}

impl Address {
    pub fn new(house: impl Into<String>, street: impl Into<String>) -> Self {
        Self {
            house: house.into(),
            street: street.into(),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.house, self.street)
    }
}

/// A ticket as returned by the portal. Everything except the id is opaque
/// payload carried through to the notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketRecord {
    pub ticket_id: String,
    /// Monitored address the record was fetched for.
    pub address: Option<String>,
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl TicketRecord {
    pub fn new(ticket_id: impl Into<String>) -> Self {
        Self {
            ticket_id: ticket_id.into(),
            address: None,
            fields: serde_json::Map::new(),
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_field(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    /// String view of a payload field; numbers are rendered, other types ignored.
    pub fn field_str(&self, key: &str) -> Option<String> {
        match self.fields.get(key)? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketSighting {
    /// `None` for ids migrated from the legacy list format.
    pub first_seen: Option<DateTime<Utc>>,
}

/// Ids already reported, with when each was first observed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KnownTicketSet {
    tickets: BTreeMap<String, TicketSighting>,
}

/// On-disk shapes accepted when loading a store.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredTickets {
    Current(BTreeMap<String, TicketSighting>),
    Legacy(Vec<String>),
}

impl KnownTicketSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, ticket_id: &str) -> bool {
        self.tickets.contains_key(ticket_id)
    }

    pub fn insert(&mut self, ticket_id: impl Into<String>, first_seen: DateTime<Utc>) -> bool {
        let ticket_id = ticket_id.into();
        if self.tickets.contains_key(&ticket_id) {
            return false;
        }
        self.tickets.insert(
            ticket_id,
            TicketSighting {
                first_seen: Some(first_seen),
            },
        );
        true
    }

    pub fn get(&self, ticket_id: &str) -> Option<&TicketSighting> {
        self.tickets.get(ticket_id)
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.tickets.keys().map(String::as_str)
    }

    pub fn from_json_slice(data: &[u8]) -> serde_json::Result<Self> {
        let tickets = match serde_json::from_slice::<StoredTickets>(data)? {
            StoredTickets::Current(tickets) => tickets,
            StoredTickets::Legacy(ids) => ids
                .into_iter()
                .map(|id| (id, TicketSighting { first_seen: None }))
                .collect(),
        };
        Ok(Self { tickets })
    }

    pub fn to_json_vec(&self) -> serde_json::Result<Vec<u8>> {
        let mut data = serde_json::to_vec_pretty(self)?;
        data.push(b'\n');
        Ok(data)
    }
}

impl<S: Into<String>> FromIterator<(S, DateTime<Utc>)> for KnownTicketSet {
    fn from_iter<I: IntoIterator<Item = (S, DateTime<Utc>)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (id, seen) in iter {
            set.insert(id, seen);
        }
        set
    }
}

/// Subject and body of the single email sent for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationPayload {
    pub subject: String,
    pub body: String,
}
