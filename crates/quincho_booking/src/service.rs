// --- File: crates/quincho_booking/src/service.rs ---
//! The reservation lifecycle manager.
//!
//! `BookingService` owns the in-session snapshot of both collections and
//! orchestrates every mutation against the store. The snapshot is refreshed
//! in full whenever the store's change feed signals; there is no delta
//! protocol. Email dispatch is fire-and-forget: a failed notification is
//! logged and never fails the mutation that triggered it.

use std::fmt::Write as _;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use tokio::sync::{broadcast, RwLock};
use tracing::{error, info, warn};

use quincho_common::error::{not_found, store_error, validation_error, QuinchoError};
use quincho_common::models::{
    ranges_overlap, BlockRequest, BlockedPeriod, EmailKind, NewBlockedPeriod, NewReservation,
    Reservation, ReservationEmail, ReservationPatch, SlotTime,
};
use quincho_common::services::{NotificationService, ReservationStore};
use quincho_config::{AppConfig, StoreConfig};

use crate::logic::{default_window, slot_table, suggested_end_time, AvailabilityEngine};

/// Reason recorded on reservations cancelled by an admin block.
const CASCADE_REASON_PREFIX: &str = "Cancelada por bloqueo administrativo";

/// Reason recorded on a block created without one.
const DEFAULT_BLOCK_REASON: &str = "Bloqueo administrativo";

/// Longest admin block range accepted, in days (inclusive).
const MAX_BLOCK_RANGE_DAYS: i64 = 366;

#[derive(Debug, Default, Clone)]
struct Snapshot {
    reservations: Vec<Reservation>,
    blocked_periods: Vec<BlockedPeriod>,
}

/// What the availability endpoint reports for a date.
#[derive(Debug, Clone)]
pub struct DayAvailability {
    pub disabled: bool,
    pub start_times: Vec<SlotTime>,
    pub occupied_slots: Vec<SlotTime>,
}

/// What the end-times endpoint reports for a date and start.
#[derive(Debug, Clone)]
pub struct EndTimeOptions {
    pub end_times: Vec<SlotTime>,
    pub suggested: Option<SlotTime>,
}

pub struct BookingService {
    store: Arc<dyn ReservationStore>,
    notifier: Option<Arc<dyn NotificationService>>,
    time_zone: Tz,
    table: Vec<SlotTime>,
    load_retries: u32,
    admin_recipient: Option<String>,
    snapshot: RwLock<Snapshot>,
}

impl BookingService {
    pub fn new(
        store: Arc<dyn ReservationStore>,
        notifier: Option<Arc<dyn NotificationService>>,
        config: &AppConfig,
    ) -> Self {
        let time_zone = quincho_config::facility_time_zone(config);
        let (default_open, default_close) = default_window();
        let open = config
            .quincho
            .open_time
            .parse()
            .unwrap_or_else(|_| default_open.clone());
        let close = config
            .quincho
            .close_time
            .parse()
            .unwrap_or_else(|_| default_close.clone());
        let load_retries = config
            .store
            .clone()
            .unwrap_or_else(StoreConfig::default)
            .load_retries;
        let admin_recipient = config
            .email
            .as_ref()
            .and_then(|e| e.admin_recipient.clone());

        BookingService {
            store,
            notifier,
            time_zone,
            table: slot_table(&open, &close),
            load_retries,
            admin_recipient,
            snapshot: RwLock::new(Snapshot::default()),
        }
    }

    /// The facility's current wall-clock time.
    fn now_local(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.time_zone).naive_local()
    }

    /// Re-fetch both collections and replace the snapshot.
    pub async fn refresh(&self) -> Result<(), QuinchoError> {
        let reservations = self.store.list_reservations().await?;
        let blocked_periods = self.store.list_blocked_periods().await?;
        let mut snapshot = self.snapshot.write().await;
        snapshot.reservations = reservations;
        snapshot.blocked_periods = blocked_periods;
        Ok(())
    }

    /// Initial data load, retried a bounded number of times before the
    /// store error is surfaced as fatal.
    pub async fn load_initial(&self) -> Result<(), QuinchoError> {
        let attempts = self.load_retries.max(1);
        let mut last_error = None;
        for attempt in 1..=attempts {
            match self.refresh().await {
                Ok(()) => {
                    info!(attempt, "initial data load complete");
                    return Ok(());
                }
                Err(e) => {
                    warn!(attempt, error = %e, "initial data load failed");
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| store_error("initial load failed")))
    }

    /// Listen on the store's change feed and re-fetch on every signal.
    /// A lagged receiver just triggers the same full refresh.
    pub fn spawn_refresh_task(self: &Arc<Self>) {
        let service = Arc::clone(self);
        let mut receiver = service.store.subscribe();
        tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(change) => {
                        if let Err(e) = service.refresh().await {
                            error!(collection = ?change.collection, error = %e, "snapshot refresh failed");
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "change feed lagged; refreshing");
                        if let Err(e) = service.refresh().await {
                            error!(error = %e, "snapshot refresh failed");
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }

    // --- Reads ---

    pub async fn availability(&self, date: NaiveDate) -> DayAvailability {
        let now = self.now_local();
        let snapshot = self.snapshot.read().await;
        let engine =
            AvailabilityEngine::new(&self.table, &snapshot.reservations, &snapshot.blocked_periods);
        DayAvailability {
            disabled: engine.is_calendar_date_disabled(date, now),
            start_times: engine.bookable_start_times(date, now),
            occupied_slots: engine.occupied_display_slots(date),
        }
    }

    pub async fn end_time_options(&self, date: NaiveDate, start: &SlotTime) -> EndTimeOptions {
        let now = self.now_local();
        let snapshot = self.snapshot.read().await;
        let engine =
            AvailabilityEngine::new(&self.table, &snapshot.reservations, &snapshot.blocked_periods);
        let end_times = engine.bookable_end_times(date, start, None, now);
        let suggested = suggested_end_time(start, &end_times);
        EndTimeOptions {
            end_times,
            suggested,
        }
    }

    pub async fn list_reservations(&self, date: Option<NaiveDate>) -> Vec<Reservation> {
        let snapshot = self.snapshot.read().await;
        match date {
            Some(date) => snapshot
                .reservations
                .iter()
                .filter(|r| r.date == date)
                .cloned()
                .collect(),
            None => snapshot.reservations.clone(),
        }
    }

    pub async fn list_blocked_periods(&self) -> Vec<BlockedPeriod> {
        self.snapshot.read().await.blocked_periods.clone()
    }

    // --- Reservation lifecycle ---

    pub async fn create_reservation(
        &self,
        draft: NewReservation,
    ) -> Result<Reservation, QuinchoError> {
        validate_responsible(&draft.responsible)?;
        validate_email(&draft.email)?;
        validate_reason(&draft.reason)?;
        validate_party_size(draft.party_size)?;

        let now = self.now_local();
        {
            let snapshot = self.snapshot.read().await;
            let engine = AvailabilityEngine::new(
                &self.table,
                &snapshot.reservations,
                &snapshot.blocked_periods,
            );
            engine.check_slot(draft.date, &draft.start_time, &draft.end_time, None, now)?;
        }

        let reservation = self.store.insert_reservation(draft).await?;
        self.refresh().await?;
        info!(id = %reservation.id, date = %reservation.date, "reservation created");

        self.dispatch_email(ReservationEmail {
            kind: EmailKind::Confirmation,
            recipient: reservation.email.clone(),
            reservation: reservation.clone(),
            changes: None,
            cancellation_reason: None,
        });
        if let Some(admin) = &self.admin_recipient {
            self.dispatch_email(ReservationEmail {
                kind: EmailKind::NewReservation,
                recipient: admin.clone(),
                reservation: reservation.clone(),
                changes: None,
                cancellation_reason: None,
            });
        }
        Ok(reservation)
    }

    pub async fn update_reservation(
        &self,
        id: &str,
        patch: ReservationPatch,
    ) -> Result<Reservation, QuinchoError> {
        if patch.is_empty() {
            return Err(validation_error("patch", "no fields to update"));
        }
        if let Some(responsible) = &patch.responsible {
            validate_responsible(responsible)?;
        }
        if let Some(email) = &patch.email {
            validate_email(email)?;
        }
        if let Some(reason) = &patch.reason {
            validate_reason(reason)?;
        }
        if let Some(party_size) = patch.party_size {
            validate_party_size(party_size)?;
        }

        let existing = self
            .find_reservation(id)
            .await
            .ok_or_else(|| not_found(format!("reservation {id}")))?;

        if patch.changes_slot() {
            let date = patch.date.unwrap_or(existing.date);
            let start = patch.start_time.clone().unwrap_or(existing.start_time.clone());
            let end = patch.end_time.clone().unwrap_or(existing.end_time.clone());
            let now = self.now_local();
            let snapshot = self.snapshot.read().await;
            let engine = AvailabilityEngine::new(
                &self.table,
                &snapshot.reservations,
                &snapshot.blocked_periods,
            );
            engine.check_slot(date, &start, &end, Some(id), now)?;
        }

        let updated = self.store.update_reservation(id, patch).await?;
        self.refresh().await?;
        info!(id = %updated.id, "reservation updated");

        let changes = describe_changes(&existing, &updated);
        self.dispatch_email(ReservationEmail {
            kind: EmailKind::Modification,
            recipient: updated.email.clone(),
            reservation: updated.clone(),
            changes,
            cancellation_reason: None,
        });
        Ok(updated)
    }

    pub async fn delete_reservation(
        &self,
        id: &str,
        reason: Option<String>,
    ) -> Result<(), QuinchoError> {
        let existing = self
            .find_reservation(id)
            .await
            .ok_or_else(|| not_found(format!("reservation {id}")))?;

        self.store.delete_reservation(id).await?;
        self.refresh().await?;
        info!(id, "reservation cancelled");

        self.dispatch_email(ReservationEmail {
            kind: EmailKind::Cancellation,
            recipient: existing.email.clone(),
            reservation: existing,
            changes: None,
            cancellation_reason: reason,
        });
        Ok(())
    }

    // --- Admin blocks ---

    /// Expand the inclusive date range into one blocked period per day.
    /// Reservations caught inside a blocked window are cascade-cancelled
    /// and their holders notified.
    pub async fn create_block(
        &self,
        request: BlockRequest,
    ) -> Result<Vec<BlockedPeriod>, QuinchoError> {
        let end_date = request.end_date.unwrap_or(request.start_date);
        if end_date < request.start_date {
            return Err(validation_error("end_date", "must not precede start_date"));
        }
        if (end_date - request.start_date).num_days() >= MAX_BLOCK_RANGE_DAYS {
            return Err(validation_error("end_date", "range too large"));
        }
        match (&request.start_time, &request.end_time) {
            (Some(start), Some(end)) if end <= start => {
                return Err(validation_error("end_time", "must be after start_time"));
            }
            (Some(_), None) | (None, Some(_)) => {
                return Err(validation_error(
                    "start_time",
                    "start_time and end_time must be given together",
                ));
            }
            _ => {}
        }
        let reason = request
            .reason
            .clone()
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BLOCK_REASON.to_string());

        let mut created = Vec::new();
        let mut date = request.start_date;
        while date <= end_date {
            self.cancel_overlapping(date, &request.start_time, &request.end_time, &reason)
                .await?;

            let block = self
                .store
                .insert_blocked_period(NewBlockedPeriod {
                    date,
                    reason: Some(reason.clone()),
                    start_time: request.start_time.clone(),
                    end_time: request.end_time.clone(),
                })
                .await?;
            created.push(block);

            date = match date.succ_opt() {
                Some(next) => next,
                None => break,
            };
        }

        self.refresh().await?;
        info!(
            start = %request.start_date,
            end = %end_date,
            days = created.len(),
            "blocked period created"
        );
        Ok(created)
    }

    /// Remove a block. Reservations cancelled by its creation stay
    /// cancelled.
    pub async fn remove_block(&self, id: &str) -> Result<(), QuinchoError> {
        self.store.delete_blocked_period(id).await?;
        self.refresh().await?;
        info!(id, "blocked period removed");
        Ok(())
    }

    async fn cancel_overlapping(
        &self,
        date: NaiveDate,
        start: &Option<SlotTime>,
        end: &Option<SlotTime>,
        reason: &str,
    ) -> Result<(), QuinchoError> {
        let caught: Vec<Reservation> = {
            let snapshot = self.snapshot.read().await;
            snapshot
                .reservations
                .iter()
                .filter(|r| {
                    r.date == date
                        && match (start, end) {
                            (Some(b_start), Some(b_end)) => {
                                ranges_overlap(&r.start_time, &r.end_time, b_start, b_end)
                            }
                            _ => true,
                        }
                })
                .cloned()
                .collect()
        };

        for reservation in caught {
            warn!(
                id = %reservation.id,
                date = %reservation.date,
                "cancelling reservation overlapped by admin block"
            );
            self.store.delete_reservation(&reservation.id).await?;
            self.dispatch_email(ReservationEmail {
                kind: EmailKind::Cancellation,
                recipient: reservation.email.clone(),
                reservation,
                changes: None,
                cancellation_reason: Some(format!("{CASCADE_REASON_PREFIX}: {reason}")),
            });
        }
        Ok(())
    }

    async fn find_reservation(&self, id: &str) -> Option<Reservation> {
        self.snapshot
            .read()
            .await
            .reservations
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    /// Spawn the dispatch and forget it. Failures are logged only.
    fn dispatch_email(&self, email: ReservationEmail) {
        let Some(notifier) = self.notifier.clone() else {
            return;
        };
        tokio::spawn(async move {
            let kind = email.kind;
            let recipient = email.recipient.clone();
            if let Err(e) = notifier.send_reservation_email(email).await {
                error!(kind = kind.as_str(), %recipient, error = %e, "email dispatch failed");
            }
        });
    }
}

// --- Field validation ---

fn validate_responsible(responsible: &str) -> Result<(), QuinchoError> {
    if responsible.trim().is_empty() {
        return Err(validation_error("responsible", "must not be empty"));
    }
    Ok(())
}

fn validate_reason(reason: &str) -> Result<(), QuinchoError> {
    if reason.trim().is_empty() {
        return Err(validation_error("reason", "must not be empty"));
    }
    Ok(())
}

fn validate_party_size(party_size: u32) -> Result<(), QuinchoError> {
    if party_size == 0 {
        return Err(validation_error("party_size", "must be at least 1"));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), QuinchoError> {
    let well_formed = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
                && !domain.contains('@')
        }
        None => false,
    };
    if !well_formed {
        return Err(validation_error("email", "not a valid email address"));
    }
    Ok(())
}

/// Human-readable summary of what an update changed, for the modification
/// email. `None` when only contact fields moved.
fn describe_changes(before: &Reservation, after: &Reservation) -> Option<String> {
    let mut parts = String::new();
    if before.date != after.date {
        let _ = write!(parts, "fecha: {} -> {}", before.date, after.date);
    }
    if before.start_time != after.start_time {
        if !parts.is_empty() {
            parts.push_str("; ");
        }
        let _ = write!(parts, "inicio: {} -> {}", before.start_time, after.start_time);
    }
    if before.end_time != after.end_time {
        if !parts.is_empty() {
            parts.push_str("; ");
        }
        let _ = write!(parts, "fin: {} -> {}", before.end_time, after.end_time);
    }
    if before.party_size != after.party_size {
        if !parts.is_empty() {
            parts.push_str("; ");
        }
        let _ = write!(parts, "personas: {} -> {}", before.party_size, after.party_size);
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts)
    }
}
