// --- File: crates/quincho_store/src/memory.rs ---
//! In-memory reservation store.
//!
//! The reference implementation of the [`ReservationStore`] contract. It
//! assigns ids and timestamps the way the remote store would, serializes
//! conflicting writes under one lock, and enforces the no-overlap
//! invariant for reservations at the storage layer, so a client-side
//! availability check that raced another submission cannot land a
//! double-booking. Every mutation emits a change signal on the broadcast
//! feed.

use std::sync::Mutex;

use chrono::Utc;
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

use quincho_common::error::{conflict, not_found, validation_error, QuinchoError};
use quincho_common::models::{
    ranges_overlap, BlockedPeriod, Collection, NewBlockedPeriod, NewReservation, Reservation,
    ReservationPatch, StoreChange,
};
use quincho_common::services::{BoxFuture, ReservationStore};

const CHANGE_CHANNEL_CAPACITY: usize = 32;

#[derive(Default)]
struct Inner {
    reservations: Vec<Reservation>,
    blocked_periods: Vec<BlockedPeriod>,
}

pub struct InMemoryStore {
    inner: Mutex<Inner>,
    changes: broadcast::Sender<StoreChange>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        InMemoryStore {
            inner: Mutex::new(Inner::default()),
            changes,
        }
    }

    fn notify(&self, collection: Collection) {
        // nobody listening is fine
        let _ = self.changes.send(StoreChange { collection });
    }

    /// The storage-level exclusion constraint: no two reservations on the
    /// same date may overlap. Returns the conflicting record, if any.
    fn find_conflict<'a>(
        reservations: &'a [Reservation],
        candidate: &Reservation,
        exclude_id: Option<&str>,
    ) -> Option<&'a Reservation> {
        reservations.iter().find(|existing| {
            if Some(existing.id.as_str()) == exclude_id {
                return false;
            }
            existing.date == candidate.date
                && ranges_overlap(
                    &candidate.start_time,
                    &candidate.end_time,
                    &existing.start_time,
                    &existing.end_time,
                )
        })
    }
}

impl ReservationStore for InMemoryStore {
    fn list_reservations(&self) -> BoxFuture<'_, Vec<Reservation>, QuinchoError> {
        Box::pin(async move {
            let inner = self.inner.lock().expect("store lock poisoned");
            Ok(inner.reservations.clone())
        })
    }

    fn insert_reservation(
        &self,
        draft: NewReservation,
    ) -> BoxFuture<'_, Reservation, QuinchoError> {
        Box::pin(async move {
            if draft.end_time <= draft.start_time {
                return Err(validation_error(
                    "end_time",
                    "end time must be after start time",
                ));
            }

            let record = Reservation {
                id: Uuid::new_v4().to_string(),
                responsible: draft.responsible,
                email: draft.email,
                reason: draft.reason,
                date: draft.date,
                start_time: draft.start_time,
                end_time: draft.end_time,
                party_size: draft.party_size,
                created_at: Utc::now(),
            };

            let mut inner = self.inner.lock().expect("store lock poisoned");
            if let Some(existing) = Self::find_conflict(&inner.reservations, &record, None) {
                // A write that got past the availability check lost a race.
                return Err(conflict(format!(
                    "slot {}-{} on {} is already taken",
                    existing.start_time, existing.end_time, existing.date
                )));
            }
            inner.reservations.push(record.clone());
            drop(inner);

            debug!(id = %record.id, date = %record.date, "reservation inserted");
            self.notify(Collection::Reservations);
            Ok(record)
        })
    }

    fn update_reservation(
        &self,
        id: &str,
        patch: ReservationPatch,
    ) -> BoxFuture<'_, Reservation, QuinchoError> {
        let id = id.to_string();
        Box::pin(async move {
            let mut inner = self.inner.lock().expect("store lock poisoned");
            let position = inner
                .reservations
                .iter()
                .position(|r| r.id == id)
                .ok_or_else(|| not_found(format!("reservation {id}")))?;

            let mut updated = inner.reservations[position].clone();
            if let Some(responsible) = patch.responsible {
                updated.responsible = responsible;
            }
            if let Some(email) = patch.email {
                updated.email = email;
            }
            if let Some(reason) = patch.reason {
                updated.reason = reason;
            }
            if let Some(date) = patch.date {
                updated.date = date;
            }
            if let Some(start_time) = patch.start_time {
                updated.start_time = start_time;
            }
            if let Some(end_time) = patch.end_time {
                updated.end_time = end_time;
            }
            if let Some(party_size) = patch.party_size {
                updated.party_size = party_size;
            }

            if updated.end_time <= updated.start_time {
                return Err(validation_error(
                    "end_time",
                    "end time must be after start time",
                ));
            }
            if let Some(existing) = Self::find_conflict(&inner.reservations, &updated, Some(&id)) {
                return Err(conflict(format!(
                    "slot {}-{} on {} is already taken",
                    existing.start_time, existing.end_time, existing.date
                )));
            }

            inner.reservations[position] = updated.clone();
            drop(inner);

            debug!(id = %updated.id, "reservation updated");
            self.notify(Collection::Reservations);
            Ok(updated)
        })
    }

    fn delete_reservation(&self, id: &str) -> BoxFuture<'_, (), QuinchoError> {
        let id = id.to_string();
        Box::pin(async move {
            let mut inner = self.inner.lock().expect("store lock poisoned");
            let before = inner.reservations.len();
            inner.reservations.retain(|r| r.id != id);
            if inner.reservations.len() == before {
                return Err(not_found(format!("reservation {id}")));
            }
            drop(inner);

            debug!(id = %id, "reservation deleted");
            self.notify(Collection::Reservations);
            Ok(())
        })
    }

    fn list_blocked_periods(&self) -> BoxFuture<'_, Vec<BlockedPeriod>, QuinchoError> {
        Box::pin(async move {
            let inner = self.inner.lock().expect("store lock poisoned");
            Ok(inner.blocked_periods.clone())
        })
    }

    fn insert_blocked_period(
        &self,
        draft: NewBlockedPeriod,
    ) -> BoxFuture<'_, BlockedPeriod, QuinchoError> {
        Box::pin(async move {
            match (&draft.start_time, &draft.end_time) {
                (Some(start), Some(end)) if end <= start => {
                    return Err(validation_error(
                        "end_time",
                        "block end time must be after its start time",
                    ));
                }
                (Some(_), None) | (None, Some(_)) => {
                    return Err(validation_error(
                        "start_time",
                        "blocked periods carry either both times or neither",
                    ));
                }
                _ => {}
            }

            let record = BlockedPeriod {
                id: Uuid::new_v4().to_string(),
                date: draft.date,
                reason: draft.reason,
                start_time: draft.start_time,
                end_time: draft.end_time,
                created_at: Utc::now(),
            };

            let mut inner = self.inner.lock().expect("store lock poisoned");
            inner.blocked_periods.push(record.clone());
            drop(inner);

            debug!(id = %record.id, date = %record.date, "blocked period inserted");
            self.notify(Collection::BlockedPeriods);
            Ok(record)
        })
    }

    fn delete_blocked_period(&self, id: &str) -> BoxFuture<'_, (), QuinchoError> {
        let id = id.to_string();
        Box::pin(async move {
            let mut inner = self.inner.lock().expect("store lock poisoned");
            let before = inner.blocked_periods.len();
            inner.blocked_periods.retain(|b| b.id != id);
            if inner.blocked_periods.len() == before {
                return Err(not_found(format!("blocked period {id}")));
            }
            drop(inner);

            debug!(id = %id, "blocked period deleted");
            self.notify(Collection::BlockedPeriods);
            Ok(())
        })
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }
}
