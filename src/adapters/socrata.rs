use crate::domain::model::{Address, TicketRecord};
use crate::domain::ports::TicketSource;
use crate::utils::error::{MonitorError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_DATASET_URL: &str = "https://data.cityofnewyork.us/resource/r78k-82m3.json";

const TICKET_ID_FIELD: &str = "ticket_number";

/// Fetches DSNY OATH tickets from the NYC Open Data (Socrata) API.
pub struct SocrataTicketSource {
    client: Client,
    dataset_url: String,
    app_token: Option<String>,
}

impl SocrataTicketSource {
    pub fn new(dataset_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            dataset_url: dataset_url.into(),
            app_token: None,
        })
    }

    pub fn with_app_token(mut self, token: Option<String>) -> Self {
        self.app_token = token;
        self
    }

    /// SoQL filter selecting every ticket issued at `address`.
    pub fn where_clause(address: &Address) -> String {
        format!(
            "violation_location_house='{}' AND violation_location_street_name='{}'",
            soql_escape(&address.house),
            soql_escape(&address.street)
        )
    }
}

fn soql_escape(value: &str) -> String {
    value.replace('\'', "''")
}

fn ticket_id(record: &serde_json::Map<String, serde_json::Value>) -> String {
    match record.get(TICKET_ID_FIELD) {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

#[async_trait]
impl TicketSource for SocrataTicketSource {
    async fn fetch(&self, address: &Address) -> Result<Vec<TicketRecord>> {
        let label = address.to_string();
        let where_clause = Self::where_clause(address);

        tracing::debug!("Querying {} where {}", self.dataset_url, where_clause);
        let mut request = self.client.get(&self.dataset_url).query(&[
            ("$where", where_clause.as_str()),
            ("$order", "violation_date DESC"),
        ]);
        if let Some(token) = &self.app_token {
            request = request.header("X-App-Token", token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| MonitorError::fetch(&label, e))?;

        let status = response.status();
        tracing::debug!("Portal response status: {}", status);
        if !status.is_success() {
            return Err(MonitorError::fetch(
                &label,
                format!("portal returned HTTP {}", status),
            ));
        }

        let json_data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| MonitorError::fetch(&label, format!("unparseable response: {}", e)))?;

        let serde_json::Value::Array(items) = json_data else {
            return Err(MonitorError::fetch(&label, "expected a JSON array of tickets"));
        };

        items
            .into_iter()
            .map(|item| match item {
                serde_json::Value::Object(fields) => Ok(TicketRecord {
                    ticket_id: ticket_id(&fields),
                    address: Some(label.clone()),
                    fields,
                }),
                other => Err(MonitorError::fetch(
                    &label,
                    format!("expected a ticket object, got {}", other),
                )),
            })
            .collect()
    }
}
