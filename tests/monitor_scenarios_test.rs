use async_trait::async_trait;
use oath_ticket_monitor::{
    Address, CorruptStorePolicy, KnownTicketStore, LocalStorage, MonitorError,
    NotificationPayload, Notifier, Result, Storage, TicketMonitor, TicketRecord, TicketSource,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

const STORE_FILE: &str = "known_tickets.json";

/// Returns canned records per address label.
struct StaticSource {
    records: HashMap<String, Vec<TicketRecord>>,
}

impl StaticSource {
    fn single(address: &Address, ids: &[&str]) -> Self {
        let label = address.to_string();
        let records = ids
            .iter()
            .map(|id| {
                TicketRecord::new(*id)
                    .with_address(label.clone())
                    .with_field("violation_date", "2025-05-02T00:00:00.000")
                    .with_field("charge_1_code_description", "FAILURE TO CLEAN 18 INCHES")
                    .with_field("hearing_status", "NEW ISSUANCE")
            })
            .collect();
        Self {
            records: HashMap::from([(label, records)]),
        }
    }
}

#[async_trait]
impl TicketSource for StaticSource {
    async fn fetch(&self, address: &Address) -> Result<Vec<TicketRecord>> {
        Ok(self
            .records
            .get(&address.to_string())
            .cloned()
            .unwrap_or_default())
    }
}

struct UnreachableSource;

#[async_trait]
impl TicketSource for UnreachableSource {
    async fn fetch(&self, address: &Address) -> Result<Vec<TicketRecord>> {
        Err(MonitorError::fetch(address.to_string(), "connection refused"))
    }
}

#[derive(Clone, Default)]
struct RecordingNotifier {
    sent: Arc<Mutex<Vec<NotificationPayload>>>,
}

impl RecordingNotifier {
    fn sent(&self) -> Vec<NotificationPayload> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, payload: &NotificationPayload) -> Result<()> {
        self.sent.lock().unwrap().push(payload.clone());
        Ok(())
    }
}

struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, _payload: &NotificationPayload) -> Result<()> {
        Err(MonitorError::notify("535 authentication failed"))
    }
}

/// Reads as an empty directory and refuses every write.
struct ReadOnlyStorage;

impl Storage for ReadOnlyStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        Err(MonitorError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("File not found: {}", path),
        )))
    }

    async fn write_file(&self, _path: &str, _data: &[u8]) -> Result<()> {
        Err(MonitorError::IoError(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only file system",
        )))
    }
}

fn address() -> Address {
    Address::new("1407", "OVERING STREET")
}

fn store(dir: &TempDir) -> KnownTicketStore<LocalStorage> {
    KnownTicketStore::new(LocalStorage::new(dir.path()), STORE_FILE)
}

fn stored_ids(dir: &TempDir) -> Vec<String> {
    let data = std::fs::read(dir.path().join(STORE_FILE)).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&data).unwrap();
    value.as_object().unwrap().keys().cloned().collect()
}

#[tokio::test]
async fn test_first_run_reports_all_tickets_once() {
    let dir = TempDir::new().unwrap();
    let notifier = RecordingNotifier::default();

    let monitor = TicketMonitor::new(
        StaticSource::single(&address(), &["T1", "T2"]),
        notifier.clone(),
        store(&dir),
        vec![address()],
    );
    let summary = monitor.run().await.unwrap();

    assert_eq!(summary.new_tickets, vec!["T1", "T2"]);
    assert!(summary.notified);
    assert!(summary.persisted);

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "New DSNY OATH tickets for 1407 OVERING STREET");
    let body = &sent[0].body;
    assert!(body.find("T1").unwrap() < body.find("T2").unwrap());

    assert_eq!(stored_ids(&dir), vec!["T1", "T2"]);
}

#[tokio::test]
async fn test_known_tickets_are_not_reported_again() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(STORE_FILE),
        r#"{"T1": {"first_seen": "2025-01-01T00:00:00Z"}}"#,
    )
    .unwrap();
    let notifier = RecordingNotifier::default();

    let summary = TicketMonitor::new(
        StaticSource::single(&address(), &["T1", "T2"]),
        notifier.clone(),
        store(&dir),
        vec![address()],
    )
    .run()
    .await
    .unwrap();

    assert_eq!(summary.new_tickets, vec!["T2"]);
    let body = &notifier.sent()[0].body;
    assert!(body.contains("Ticket T2"));
    assert!(!body.contains("Ticket T1"));
    assert_eq!(stored_ids(&dir), vec!["T1", "T2"]);

    let data = std::fs::read_to_string(dir.path().join(STORE_FILE)).unwrap();
    assert!(data.contains("2025-01-01T00:00:00Z"));
}

#[tokio::test]
async fn test_record_without_id_is_skipped() {
    let dir = TempDir::new().unwrap();
    let notifier = RecordingNotifier::default();

    let summary = TicketMonitor::new(
        StaticSource::single(&address(), &["T1", "", "T3"]),
        notifier.clone(),
        store(&dir),
        vec![address()],
    )
    .run()
    .await
    .unwrap();

    assert_eq!(summary.new_tickets, vec!["T1", "T3"]);
    assert_eq!(summary.rejected.len(), 1);
    assert_eq!(summary.rejected[0].position, 1);
    assert_eq!(stored_ids(&dir), vec!["T1", "T3"]);
}

#[tokio::test]
async fn test_empty_fetch_sends_and_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let notifier = RecordingNotifier::default();

    let summary = TicketMonitor::new(
        StaticSource::single(&address(), &[]),
        notifier.clone(),
        store(&dir),
        vec![address()],
    )
    .run()
    .await
    .unwrap();

    assert!(summary.new_tickets.is_empty());
    assert!(!summary.notified);
    assert!(!summary.persisted);
    assert!(notifier.sent().is_empty());
    assert!(!dir.path().join(STORE_FILE).exists());
}

#[tokio::test]
async fn test_second_run_is_quiet() {
    let dir = TempDir::new().unwrap();
    let notifier = RecordingNotifier::default();

    for _ in 0..2 {
        TicketMonitor::new(
            StaticSource::single(&address(), &["T1", "T2"]),
            notifier.clone(),
            store(&dir),
            vec![address()],
        )
        .run()
        .await
        .unwrap();
    }

    assert_eq!(notifier.sent().len(), 1);
}

#[tokio::test]
async fn test_notify_failure_keeps_tickets_for_next_run() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(STORE_FILE), r#"["T1"]"#).unwrap();

    let err = TicketMonitor::new(
        StaticSource::single(&address(), &["T1", "T2", "T3"]),
        FailingNotifier,
        store(&dir),
        vec![address()],
    )
    .run()
    .await
    .unwrap_err();

    assert!(matches!(err, MonitorError::NotifyFailure { .. }));
    assert_ne!(err.severity().exit_code(), 0);
    assert_eq!(
        std::fs::read_to_string(dir.path().join(STORE_FILE)).unwrap(),
        r#"["T1"]"#
    );

    let notifier = RecordingNotifier::default();
    let summary = TicketMonitor::new(
        StaticSource::single(&address(), &["T1", "T2", "T3"]),
        notifier.clone(),
        store(&dir),
        vec![address()],
    )
    .run()
    .await
    .unwrap();

    assert_eq!(summary.new_tickets, vec!["T2", "T3"]);
    assert_eq!(notifier.sent().len(), 1);
}

#[tokio::test]
async fn test_fetch_failure_aborts_before_notifying() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(STORE_FILE), r#"["T1"]"#).unwrap();
    let notifier = RecordingNotifier::default();

    let err = TicketMonitor::new(UnreachableSource, notifier.clone(), store(&dir), vec![address()])
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, MonitorError::FetchFailure { .. }));
    assert!(notifier.sent().is_empty());
    assert_eq!(
        std::fs::read_to_string(dir.path().join(STORE_FILE)).unwrap(),
        r#"["T1"]"#
    );
}

#[tokio::test]
async fn test_corrupt_store_aborts_unless_reset_requested() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(STORE_FILE), "{\"T1\": ").unwrap();
    let notifier = RecordingNotifier::default();

    let err = TicketMonitor::new(
        StaticSource::single(&address(), &["T1"]),
        notifier.clone(),
        store(&dir),
        vec![address()],
    )
    .run()
    .await
    .unwrap_err();
    assert!(matches!(err, MonitorError::StoreCorrupt { .. }));
    assert!(notifier.sent().is_empty());

    let summary = TicketMonitor::new(
        StaticSource::single(&address(), &["T1"]),
        notifier.clone(),
        store(&dir),
        vec![address()],
    )
    .with_corrupt_store_policy(CorruptStorePolicy::Reset)
    .run()
    .await
    .unwrap();

    assert!(summary.store_reset);
    assert_eq!(summary.new_tickets, vec!["T1"]);
    assert_eq!(stored_ids(&dir), vec!["T1"]);
}

#[tokio::test]
async fn test_dry_run_notifies_without_persisting() {
    let dir = TempDir::new().unwrap();
    let notifier = RecordingNotifier::default();

    let summary = TicketMonitor::new(
        StaticSource::single(&address(), &["T1"]),
        notifier.clone(),
        store(&dir),
        vec![address()],
    )
    .with_dry_run(true)
    .run()
    .await
    .unwrap();

    assert!(summary.notified);
    assert!(!summary.persisted);
    assert_eq!(notifier.sent().len(), 1);
    assert!(!dir.path().join(STORE_FILE).exists());
}

#[tokio::test]
async fn test_unwritable_store_fails_after_notifying() {
    let notifier = RecordingNotifier::default();

    let err = TicketMonitor::new(
        StaticSource::single(&address(), &["T1"]),
        notifier.clone(),
        KnownTicketStore::new(ReadOnlyStorage, STORE_FILE),
        vec![address()],
    )
    .run()
    .await
    .unwrap_err();

    assert!(matches!(err, MonitorError::IoError(_)));
    assert_eq!(err.severity().exit_code(), 3);
    assert_eq!(notifier.sent().len(), 1);
}
