// --- File: crates/quincho_common/src/services.rs ---
//! Service abstractions for the external collaborators.
//!
//! The reservation core delegates persistence, change notification, email
//! dispatch, and authentication to a backend-as-a-service. These traits are
//! the only contract the core consumes, which keeps the booking logic
//! testable against in-memory implementations.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::broadcast;

use crate::error::QuinchoError;
use crate::models::{
    BlockedPeriod, NewBlockedPeriod, NewReservation, NotificationResult, Reservation,
    ReservationEmail, ReservationPatch, Session, StoreChange,
};

/// Type alias for a boxed future that returns a Result.
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// The persisted-state collaborator.
///
/// Reads return full snapshots (the collections are small; no pagination
/// contract). Writes are fire-and-confirm. The store is the single source
/// of truth: it resolves concurrent-write races and enforces the
/// no-overlap invariant authoritatively, while emitting change signals so
/// clients can reconcile.
pub trait ReservationStore: Send + Sync {
    fn list_reservations(&self) -> BoxFuture<'_, Vec<Reservation>, QuinchoError>;

    fn insert_reservation(
        &self,
        draft: NewReservation,
    ) -> BoxFuture<'_, Reservation, QuinchoError>;

    fn update_reservation(
        &self,
        id: &str,
        patch: ReservationPatch,
    ) -> BoxFuture<'_, Reservation, QuinchoError>;

    fn delete_reservation(&self, id: &str) -> BoxFuture<'_, (), QuinchoError>;

    fn list_blocked_periods(&self) -> BoxFuture<'_, Vec<BlockedPeriod>, QuinchoError>;

    fn insert_blocked_period(
        &self,
        draft: NewBlockedPeriod,
    ) -> BoxFuture<'_, BlockedPeriod, QuinchoError>;

    fn delete_blocked_period(&self, id: &str) -> BoxFuture<'_, (), QuinchoError>;

    /// Subscribe to the change feed. Each received [`StoreChange`] is an
    /// opaque "something changed" signal; the listener re-fetches via the
    /// read methods.
    fn subscribe(&self) -> broadcast::Receiver<StoreChange>;
}

/// The email-dispatch collaborator. Best-effort by contract: callers must
/// never roll back or block a reservation mutation on a failure here.
pub trait NotificationService: Send + Sync {
    fn send_reservation_email(
        &self,
        email: ReservationEmail,
    ) -> BoxFuture<'_, NotificationResult, QuinchoError>;
}

/// The authentication collaborator. Admin-only mutations are gated on
/// `Session::is_admin`; the gate's enforcement lives with this service,
/// not in the booking core.
pub trait AuthService: Send + Sync {
    fn login(&self, email: &str, password: &str) -> BoxFuture<'_, Session, QuinchoError>;

    fn logout(&self, token: &str) -> BoxFuture<'_, (), QuinchoError>;

    fn current_session(&self, token: &str) -> BoxFuture<'_, Option<Session>, QuinchoError>;
}

/// A factory for creating service instances, used by the application to
/// wire its dependencies once at startup.
pub trait ServiceFactory: Send + Sync {
    fn reservation_store(&self) -> Arc<dyn ReservationStore>;

    /// `None` when no email endpoint is configured; mutations then proceed
    /// without notifications.
    fn notification_service(&self) -> Option<Arc<dyn NotificationService>>;

    fn auth_service(&self) -> Arc<dyn AuthService>;
}
