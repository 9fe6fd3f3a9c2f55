// --- File: crates/quincho_booking/src/service_test.rs ---
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use tokio::sync::broadcast;

use quincho_common::error::{store_error, QuinchoError};
use quincho_common::models::{
    BlockRequest, BlockedPeriod, EmailKind, NewBlockedPeriod, NewReservation, NotificationResult,
    Reservation, ReservationEmail, ReservationPatch, SlotTime, StoreChange,
};
use quincho_common::services::{BoxFuture, NotificationService, ReservationStore};
use quincho_config::{AppConfig, EmailConfig, QuinchoConfig, ServerConfig, StoreConfig};
use quincho_store::InMemoryStore;

use crate::service::BookingService;

fn t(raw: &str) -> SlotTime {
    raw.parse().expect("valid slot time")
}

fn d(raw: &str) -> NaiveDate {
    raw.parse().expect("valid date")
}

fn draft(date: &str, start: &str, end: &str) -> NewReservation {
    NewReservation {
        responsible: "Ana Benítez".to_string(),
        email: "ana@example.edu".to_string(),
        reason: "Almuerzo de departamento".to_string(),
        date: d(date),
        start_time: t(start),
        end_time: t(end),
        party_size: 12,
    }
}

fn test_config(admin_recipient: Option<&str>) -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        quincho: QuinchoConfig::default(),
        use_email: admin_recipient.is_some(),
        email: admin_recipient.map(|recipient| EmailConfig {
            function_url: "http://localhost/send-email".to_string(),
            api_key: None,
            admin_recipient: Some(recipient.to_string()),
        }),
        auth: None,
        store: Some(StoreConfig { load_retries: 3 }),
    }
}

/// Wraps the in-memory store and counts reservation inserts, so tests can
/// assert that validation failures never reach the store.
struct CountingStore {
    inner: InMemoryStore,
    inserts: AtomicUsize,
}

impl CountingStore {
    fn new() -> Self {
        CountingStore {
            inner: InMemoryStore::new(),
            inserts: AtomicUsize::new(0),
        }
    }
}

impl ReservationStore for CountingStore {
    fn list_reservations(&self) -> BoxFuture<'_, Vec<Reservation>, QuinchoError> {
        self.inner.list_reservations()
    }

    fn insert_reservation(
        &self,
        draft: NewReservation,
    ) -> BoxFuture<'_, Reservation, QuinchoError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        self.inner.insert_reservation(draft)
    }

    fn update_reservation(
        &self,
        id: &str,
        patch: ReservationPatch,
    ) -> BoxFuture<'_, Reservation, QuinchoError> {
        self.inner.update_reservation(id, patch)
    }

    fn delete_reservation(&self, id: &str) -> BoxFuture<'_, (), QuinchoError> {
        self.inner.delete_reservation(id)
    }

    fn list_blocked_periods(&self) -> BoxFuture<'_, Vec<BlockedPeriod>, QuinchoError> {
        self.inner.list_blocked_periods()
    }

    fn insert_blocked_period(
        &self,
        draft: NewBlockedPeriod,
    ) -> BoxFuture<'_, BlockedPeriod, QuinchoError> {
        self.inner.insert_blocked_period(draft)
    }

    fn delete_blocked_period(&self, id: &str) -> BoxFuture<'_, (), QuinchoError> {
        self.inner.delete_blocked_period(id)
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.inner.subscribe()
    }
}

/// A store whose reads always fail, for the initial-load retry tests.
struct FailingStore {
    list_calls: AtomicUsize,
    changes: broadcast::Sender<StoreChange>,
}

impl FailingStore {
    fn new() -> Self {
        let (changes, _) = broadcast::channel(8);
        FailingStore {
            list_calls: AtomicUsize::new(0),
            changes,
        }
    }
}

impl ReservationStore for FailingStore {
    fn list_reservations(&self) -> BoxFuture<'_, Vec<Reservation>, QuinchoError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async { Err(store_error("store unreachable")) })
    }

    fn insert_reservation(&self, _: NewReservation) -> BoxFuture<'_, Reservation, QuinchoError> {
        Box::pin(async { Err(store_error("store unreachable")) })
    }

    fn update_reservation(
        &self,
        _: &str,
        _: ReservationPatch,
    ) -> BoxFuture<'_, Reservation, QuinchoError> {
        Box::pin(async { Err(store_error("store unreachable")) })
    }

    fn delete_reservation(&self, _: &str) -> BoxFuture<'_, (), QuinchoError> {
        Box::pin(async { Err(store_error("store unreachable")) })
    }

    fn list_blocked_periods(&self) -> BoxFuture<'_, Vec<BlockedPeriod>, QuinchoError> {
        Box::pin(async { Err(store_error("store unreachable")) })
    }

    fn insert_blocked_period(
        &self,
        _: NewBlockedPeriod,
    ) -> BoxFuture<'_, BlockedPeriod, QuinchoError> {
        Box::pin(async { Err(store_error("store unreachable")) })
    }

    fn delete_blocked_period(&self, _: &str) -> BoxFuture<'_, (), QuinchoError> {
        Box::pin(async { Err(store_error("store unreachable")) })
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }
}

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<ReservationEmail>>,
}

impl RecordingNotifier {
    fn sent(&self) -> Vec<ReservationEmail> {
        self.sent.lock().unwrap().clone()
    }
}

impl NotificationService for RecordingNotifier {
    fn send_reservation_email(
        &self,
        email: ReservationEmail,
    ) -> BoxFuture<'_, NotificationResult, QuinchoError> {
        Box::pin(async move {
            self.sent.lock().unwrap().push(email);
            Ok(NotificationResult {
                status: "sent".to_string(),
            })
        })
    }
}

/// Let spawned fire-and-forget notification tasks run to completion.
async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

async fn booking_service(
    store: Arc<CountingStore>,
    notifier: Arc<RecordingNotifier>,
) -> BookingService {
    let service = BookingService::new(
        store,
        Some(notifier as Arc<dyn NotificationService>),
        &test_config(Some("admin@fiuna.edu.py")),
    );
    service.load_initial().await.expect("initial load");
    service
}

#[tokio::test]
async fn create_reservation_persists_and_notifies() {
    let store = Arc::new(CountingStore::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let service = booking_service(store.clone(), notifier.clone()).await;

    let created = service
        .create_reservation(draft("2099-06-10", "14:00", "15:00"))
        .await
        .expect("reservation created");
    assert!(!created.id.is_empty());
    assert_eq!(service.list_reservations(Some(d("2099-06-10"))).await.len(), 1);

    settle().await;
    let sent = notifier.sent();
    assert_eq!(sent.len(), 2);
    assert!(sent
        .iter()
        .any(|e| e.kind == EmailKind::Confirmation && e.recipient == "ana@example.edu"));
    assert!(sent
        .iter()
        .any(|e| e.kind == EmailKind::NewReservation && e.recipient == "admin@fiuna.edu.py"));
}

#[tokio::test]
async fn invalid_party_size_never_reaches_the_store() {
    let store = Arc::new(CountingStore::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let service = booking_service(store.clone(), notifier.clone()).await;

    let mut bad = draft("2099-06-10", "14:00", "15:00");
    bad.party_size = 0;
    let result = service.create_reservation(bad).await;

    assert!(matches!(
        result,
        Err(QuinchoError::Validation { ref field, .. }) if field == "party_size"
    ));
    assert_eq!(store.inserts.load(Ordering::SeqCst), 0);
    settle().await;
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn malformed_email_is_rejected() {
    let store = Arc::new(CountingStore::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let service = booking_service(store.clone(), notifier.clone()).await;

    for bad_email in ["not-an-email", "a@b", "a @b.com", "@b.com", "a@"] {
        let mut bad = draft("2099-06-10", "14:00", "15:00");
        bad.email = bad_email.to_string();
        assert!(
            matches!(
                service.create_reservation(bad).await,
                Err(QuinchoError::Validation { ref field, .. }) if field == "email"
            ),
            "expected {bad_email:?} to be rejected"
        );
    }
    assert_eq!(store.inserts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn past_date_is_rejected_before_the_store() {
    let store = Arc::new(CountingStore::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let service = booking_service(store.clone(), notifier.clone()).await;

    let result = service
        .create_reservation(draft("2000-01-01", "14:00", "15:00"))
        .await;
    assert!(matches!(result, Err(QuinchoError::PastDate)));
    assert_eq!(store.inserts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn update_excludes_its_own_slot_from_conflict() {
    let store = Arc::new(CountingStore::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let service = booking_service(store.clone(), notifier.clone()).await;

    let created = service
        .create_reservation(draft("2099-06-10", "14:00", "15:00"))
        .await
        .unwrap();

    // Extending over its own range is fine.
    let updated = service
        .update_reservation(
            &created.id,
            ReservationPatch {
                end_time: Some(t("15:30")),
                ..ReservationPatch::default()
            },
        )
        .await
        .expect("extension allowed");
    assert_eq!(updated.end_time, t("15:30"));

    settle().await;
    assert!(notifier
        .sent()
        .iter()
        .any(|e| e.kind == EmailKind::Modification
            && e.changes.as_deref() == Some("fin: 15:00 -> 15:30")));
}

#[tokio::test]
async fn update_cannot_land_on_another_reservation() {
    let store = Arc::new(CountingStore::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let service = booking_service(store.clone(), notifier.clone()).await;

    service
        .create_reservation(draft("2099-06-10", "14:00", "15:00"))
        .await
        .unwrap();
    let other = service
        .create_reservation(draft("2099-06-10", "16:00", "17:00"))
        .await
        .unwrap();

    let result = service
        .update_reservation(
            &other.id,
            ReservationPatch {
                start_time: Some(t("14:30")),
                end_time: Some(t("15:30")),
                ..ReservationPatch::default()
            },
        )
        .await;
    assert!(matches!(result, Err(QuinchoError::SlotUnavailable { .. })));
}

#[tokio::test]
async fn empty_patch_is_rejected() {
    let store = Arc::new(CountingStore::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let service = booking_service(store.clone(), notifier.clone()).await;

    let result = service
        .update_reservation("some-id", ReservationPatch::default())
        .await;
    assert!(matches!(result, Err(QuinchoError::Validation { .. })));
}

#[tokio::test]
async fn delete_sends_a_cancellation_with_the_reason() {
    let store = Arc::new(CountingStore::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let service = booking_service(store.clone(), notifier.clone()).await;

    let created = service
        .create_reservation(draft("2099-06-10", "14:00", "15:00"))
        .await
        .unwrap();
    service
        .delete_reservation(&created.id, Some("Evento institucional".to_string()))
        .await
        .expect("deleted");

    assert!(service.list_reservations(Some(d("2099-06-10"))).await.is_empty());
    settle().await;
    assert!(notifier.sent().iter().any(|e| {
        e.kind == EmailKind::Cancellation
            && e.cancellation_reason.as_deref() == Some("Evento institucional")
    }));
}

#[tokio::test]
async fn deleting_a_missing_reservation_is_not_found() {
    let store = Arc::new(CountingStore::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let service = booking_service(store.clone(), notifier.clone()).await;

    let result = service.delete_reservation("missing", None).await;
    assert!(matches!(result, Err(QuinchoError::NotFound(_))));
}

#[tokio::test]
async fn block_range_expands_to_one_period_per_day() {
    let store = Arc::new(CountingStore::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let service = booking_service(store.clone(), notifier.clone()).await;

    let blocks = service
        .create_block(BlockRequest {
            start_date: d("2099-06-10"),
            end_date: Some(d("2099-06-12")),
            start_time: None,
            end_time: None,
            reason: Some("Mantenimiento".to_string()),
        })
        .await
        .expect("block created");

    assert_eq!(blocks.len(), 3);
    let dates: Vec<NaiveDate> = blocks.iter().map(|b| b.date).collect();
    assert_eq!(dates, vec![d("2099-06-10"), d("2099-06-11"), d("2099-06-12")]);
    assert!(blocks.iter().all(|b| b.is_full_day()));
    assert_eq!(service.list_blocked_periods().await.len(), 3);
}

#[tokio::test]
async fn block_cascade_cancels_overlapping_reservations() {
    let store = Arc::new(CountingStore::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let service = booking_service(store.clone(), notifier.clone()).await;

    let caught = service
        .create_reservation(draft("2099-06-11", "14:00", "15:00"))
        .await
        .unwrap();
    let untouched = service
        .create_reservation(draft("2099-06-13", "14:00", "15:00"))
        .await
        .unwrap();

    service
        .create_block(BlockRequest {
            start_date: d("2099-06-10"),
            end_date: Some(d("2099-06-12")),
            start_time: None,
            end_time: None,
            reason: Some("Mantenimiento".to_string()),
        })
        .await
        .unwrap();

    let remaining = service.list_reservations(None).await;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, untouched.id);

    settle().await;
    assert!(notifier.sent().iter().any(|e| {
        e.kind == EmailKind::Cancellation
            && e.reservation.id == caught.id
            && e.cancellation_reason.as_deref()
                == Some("Cancelada por bloqueo administrativo: Mantenimiento")
    }));
}

#[tokio::test]
async fn timed_block_spares_disjoint_reservations() {
    let store = Arc::new(CountingStore::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let service = booking_service(store.clone(), notifier.clone()).await;

    let morning = service
        .create_reservation(draft("2099-06-10", "09:00", "10:00"))
        .await
        .unwrap();
    service
        .create_reservation(draft("2099-06-10", "18:00", "19:00"))
        .await
        .unwrap();

    service
        .create_block(BlockRequest {
            start_date: d("2099-06-10"),
            end_date: None,
            start_time: Some(t("17:00")),
            end_time: Some(t("20:00")),
            reason: None,
        })
        .await
        .unwrap();

    let remaining = service.list_reservations(None).await;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, morning.id);

    // Omitted reason falls back to the administrative default.
    let blocks = service.list_blocked_periods().await;
    assert_eq!(blocks[0].reason.as_deref(), Some("Bloqueo administrativo"));
}

#[tokio::test]
async fn inverted_block_range_is_rejected() {
    let store = Arc::new(CountingStore::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let service = booking_service(store.clone(), notifier.clone()).await;

    let result = service
        .create_block(BlockRequest {
            start_date: d("2099-06-12"),
            end_date: Some(d("2099-06-10")),
            start_time: None,
            end_time: None,
            reason: None,
        })
        .await;
    assert!(matches!(result, Err(QuinchoError::Validation { .. })));
}

#[tokio::test]
async fn removing_a_block_does_not_resurrect_reservations() {
    let store = Arc::new(CountingStore::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let service = booking_service(store.clone(), notifier.clone()).await;

    service
        .create_reservation(draft("2099-06-10", "14:00", "15:00"))
        .await
        .unwrap();
    let blocks = service
        .create_block(BlockRequest {
            start_date: d("2099-06-10"),
            end_date: None,
            start_time: None,
            end_time: None,
            reason: None,
        })
        .await
        .unwrap();

    service.remove_block(&blocks[0].id).await.expect("removed");
    assert!(service.list_blocked_periods().await.is_empty());
    assert!(service.list_reservations(None).await.is_empty());
}

#[tokio::test]
async fn initial_load_retries_then_surfaces_the_store_error() {
    let store = Arc::new(FailingStore::new());
    let service = BookingService::new(store.clone(), None, &test_config(None));

    let result = service.load_initial().await;
    assert!(matches!(result, Err(QuinchoError::Store(_))));
    assert_eq!(store.list_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn change_feed_triggers_a_snapshot_refresh() {
    let store = Arc::new(CountingStore::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let service = Arc::new(booking_service(store.clone(), notifier.clone()).await);
    service.spawn_refresh_task();

    // Write behind the service's back; the feed should reconcile it.
    store
        .inner
        .insert_reservation(draft("2099-06-20", "10:00", "11:00"))
        .await
        .unwrap();
    settle().await;

    assert_eq!(service.list_reservations(Some(d("2099-06-20"))).await.len(), 1);
}
