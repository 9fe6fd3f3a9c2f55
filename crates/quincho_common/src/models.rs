// --- File: crates/quincho_common/src/models.rs ---
//! Shared domain models for the Quincho reservation system.
//!
//! Everything that crosses a crate boundary lives here: the validated
//! `HH:MM` slot time with its range arithmetic, the reservation and
//! blocked-period records, the drafts used for writes, and the payloads
//! exchanged with the notification and auth collaborators.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a string is not a valid wall-clock slot time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid time {0:?}: expected HH:MM in 24-hour form")]
pub struct SlotTimeParseError(pub String);

/// A wall-clock time in fixed-width `HH:MM` 24-hour form.
///
/// The backing string is zero-padded, so the derived ordering (ordering of
/// the inner string) is also chronological ordering. The store returns
/// `HH:MM:SS` for time columns; parsing tolerates that and drops the
/// seconds.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotTime(String);

impl SlotTime {
    /// Build a slot time from numeric components.
    pub fn from_hm(hour: u8, minute: u8) -> Result<Self, SlotTimeParseError> {
        if hour > 23 || minute > 59 {
            return Err(SlotTimeParseError(format!("{hour:02}:{minute:02}")));
        }
        Ok(SlotTime(format!("{hour:02}:{minute:02}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn hour(&self) -> u8 {
        let b = self.0.as_bytes();
        (b[0] - b'0') * 10 + (b[1] - b'0')
    }

    pub fn minute(&self) -> u8 {
        let b = self.0.as_bytes();
        (b[3] - b'0') * 10 + (b[4] - b'0')
    }

    /// The next half-hour boundary: `:00 -> :30`, `:30 -> next hour :00`.
    ///
    /// No upper bound is enforced here; callers clamp to the operating
    /// window.
    pub fn successor(&self) -> SlotTime {
        if self.minute() >= 30 {
            SlotTime(format!("{:02}:00", self.hour() + 1))
        } else {
            SlotTime(format!("{:02}:30", self.hour()))
        }
    }

    /// Convert to a `NaiveTime`. `None` only for the unclamped `24:00`
    /// successor of `23:30`.
    pub fn to_naive_time(&self) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(u32::from(self.hour()), u32::from(self.minute()), 0)
    }
}

impl fmt::Display for SlotTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SlotTime {
    type Err = SlotTimeParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let b = raw.as_bytes();
        let head_ok = b.len() >= 5
            && b[0].is_ascii_digit()
            && b[1].is_ascii_digit()
            && b[2] == b':'
            && b[3].is_ascii_digit()
            && b[4].is_ascii_digit();
        let tail_ok = match b.len() {
            5 => true,
            // store time columns carry seconds
            8 => b[5] == b':' && b[6].is_ascii_digit() && b[7].is_ascii_digit(),
            _ => false,
        };
        if !head_ok || !tail_ok {
            return Err(SlotTimeParseError(raw.to_string()));
        }
        let hour = (b[0] - b'0') * 10 + (b[1] - b'0');
        let minute = (b[3] - b'0') * 10 + (b[4] - b'0');
        if hour > 23 || minute > 59 {
            return Err(SlotTimeParseError(raw.to_string()));
        }
        Ok(SlotTime(raw[..5].to_string()))
    }
}

impl Serialize for SlotTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SlotTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Half-open interval overlap test used for CONFLICT detection.
///
/// Touching endpoints (`a_end == b_start`) do not overlap, so back-to-back
/// reservations are allowed.
pub fn ranges_overlap(
    a_start: &SlotTime,
    a_end: &SlotTime,
    b_start: &SlotTime,
    b_end: &SlotTime,
) -> bool {
    a_start < b_end && a_end > b_start
}

/// Inclusive-both-ends containment used only for DISPLAY spans.
///
/// Deliberately more permissive than [`ranges_overlap`]; the two predicates
/// must not be conflated (a reservation's end boundary belongs to its
/// visual span but does not conflict with a slot starting there).
pub fn within_display_span(slot: &SlotTime, start: &SlotTime, end: &SlotTime) -> bool {
    slot == start || slot == end || (slot > start && slot < end)
}

/// A confirmed reservation, as persisted by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    /// Store-assigned opaque identifier.
    pub id: String,
    pub responsible: String,
    pub email: String,
    pub reason: String,
    /// Calendar date; serialized as `YYYY-MM-DD` (calendar components,
    /// never an epoch conversion).
    pub date: NaiveDate,
    pub start_time: SlotTime,
    pub end_time: SlotTime,
    pub party_size: u32,
    pub created_at: DateTime<Utc>,
}

/// An admin-defined blocked period. Missing times mean the whole day is
/// blocked; if present, both times are present and `start_time < end_time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockedPeriod {
    pub id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub start_time: Option<SlotTime>,
    #[serde(default)]
    pub end_time: Option<SlotTime>,
    pub created_at: DateTime<Utc>,
}

impl BlockedPeriod {
    /// Whether the block covers the entire day rather than a time window.
    pub fn is_full_day(&self) -> bool {
        self.start_time.is_none() || self.end_time.is_none()
    }
}

/// Single tagged view over both record kinds, replacing the legacy dual
/// representation (admin sentinel reservations vs. blocked-date rows).
/// A `Block` is always-conflicting and carries no party-size or contact
/// fields.
#[derive(Debug, Clone, Copy)]
pub enum Booking<'a> {
    Reservation(&'a Reservation),
    Block(&'a BlockedPeriod),
}

impl<'a> Booking<'a> {
    pub fn date(&self) -> NaiveDate {
        match self {
            Booking::Reservation(r) => r.date,
            Booking::Block(b) => b.date,
        }
    }

    /// The occupied time window; `None` means the whole day.
    pub fn time_range(&self) -> Option<(&'a SlotTime, &'a SlotTime)> {
        match self {
            Booking::Reservation(r) => Some((&r.start_time, &r.end_time)),
            Booking::Block(b) => match (&b.start_time, &b.end_time) {
                (Some(start), Some(end)) => Some((start, end)),
                _ => None,
            },
        }
    }
}

/// Fields supplied by a user proposing a reservation; the store assigns
/// `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReservation {
    pub responsible: String,
    pub email: String,
    pub reason: String,
    pub date: NaiveDate,
    pub start_time: SlotTime,
    pub end_time: SlotTime,
    pub party_size: u32,
}

/// Partial update for an existing reservation; absent fields are left
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReservationPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsible: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<SlotTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<SlotTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party_size: Option<u32>,
}

impl ReservationPatch {
    pub fn is_empty(&self) -> bool {
        self.responsible.is_none()
            && self.email.is_none()
            && self.reason.is_none()
            && self.date.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none()
            && self.party_size.is_none()
    }

    /// Whether the patch touches the slot (date or either time).
    pub fn changes_slot(&self) -> bool {
        self.date.is_some() || self.start_time.is_some() || self.end_time.is_some()
    }
}

/// Store-facing shape for a single blocked day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBlockedPeriod {
    pub date: NaiveDate,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub start_time: Option<SlotTime>,
    #[serde(default)]
    pub end_time: Option<SlotTime>,
}

/// Admin request to block an inclusive date range. A missing `end_date`
/// degenerates to the single `start_date`; missing times block whole days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockRequest {
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub start_time: Option<SlotTime>,
    #[serde(default)]
    pub end_time: Option<SlotTime>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Which collection a store change notification refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Reservations,
    BlockedPeriods,
}

/// Opaque "something changed" signal from the store; carries no delta, the
/// listener re-fetches the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreChange {
    pub collection: Collection,
}

/// The kind of reservation email to dispatch. Wire names match the
/// external send-email function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmailKind {
    NewReservation,
    Confirmation,
    Modification,
    Cancellation,
}

impl EmailKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailKind::NewReservation => "new-reservation",
            EmailKind::Confirmation => "confirmation",
            EmailKind::Modification => "modification",
            EmailKind::Cancellation => "cancellation",
        }
    }
}

/// Payload handed to the notification collaborator. Dispatch is
/// best-effort: failures are logged and never fail the mutation that
/// triggered the email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationEmail {
    #[serde(rename = "type")]
    pub kind: EmailKind,
    pub recipient: String,
    pub reservation: Reservation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
}

/// Result of a notification dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationResult {
    pub status: String,
}

/// An authenticated admin session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub email: String,
    pub is_admin: bool,
    pub expires_at: DateTime<Utc>,
}
