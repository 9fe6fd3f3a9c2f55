// --- File: crates/quincho_booking/src/logic.rs ---
//! The blocking evaluator and availability engine.
//!
//! Everything here is pure and synchronous: the engine borrows a snapshot
//! of both collections plus the slot table and recomputes answers per
//! call. "Now" is an explicit parameter (the caller injects the facility's
//! wall clock), which keeps past-exclusion testable.

use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;

use quincho_common::error::{validation_error, QuinchoError};
use quincho_common::models::{
    ranges_overlap, within_display_span, BlockedPeriod, Booking, Reservation, SlotTime,
};

/// Default operating window of the facility.
static DEFAULT_WINDOW: Lazy<(SlotTime, SlotTime)> = Lazy::new(|| {
    let open = "08:00".parse().expect("default open time");
    let close = "22:00".parse().expect("default close time");
    (open, close)
});

pub fn default_window() -> &'static (SlotTime, SlotTime) {
    &DEFAULT_WINDOW
}

/// All selectable half-hour boundaries from `open` to `close` inclusive.
///
/// The last entry is only ever an end time; start-time enumeration stops
/// one slot earlier.
pub fn slot_table(open: &SlotTime, close: &SlotTime) -> Vec<SlotTime> {
    let mut table = Vec::new();
    let mut cursor = open.clone();
    while &cursor <= close {
        // 23:30's successor is the unclamped 24:00 sentinel; stop there.
        if cursor.to_naive_time().is_none() {
            break;
        }
        table.push(cursor.clone());
        cursor = cursor.successor();
    }
    table
}

/// The auto-selected end time: one hour after `start`, clamped to the
/// latest reachable boundary.
pub fn suggested_end_time(start: &SlotTime, ends: &[SlotTime]) -> Option<SlotTime> {
    let target = start.successor().successor();
    ends.iter()
        .filter(|e| **e <= target)
        .max()
        .or_else(|| ends.first())
        .cloned()
}

/// Pure availability engine over borrowed snapshots of both collections.
pub struct AvailabilityEngine<'a> {
    table: &'a [SlotTime],
    reservations: &'a [Reservation],
    blocked_periods: &'a [BlockedPeriod],
}

impl<'a> AvailabilityEngine<'a> {
    pub fn new(
        table: &'a [SlotTime],
        reservations: &'a [Reservation],
        blocked_periods: &'a [BlockedPeriod],
    ) -> Self {
        AvailabilityEngine {
            table,
            reservations,
            blocked_periods,
        }
    }

    /// Every booking (reservation or block) occupying the given date.
    fn bookings_on(&self, date: NaiveDate) -> impl Iterator<Item = Booking<'a>> {
        let reservations = self
            .reservations
            .iter()
            .filter(move |r| r.date == date)
            .map(Booking::Reservation);
        let blocks = self
            .blocked_periods
            .iter()
            .filter(move |b| b.date == date)
            .map(Booking::Block);
        reservations.chain(blocks)
    }

    pub fn reservations_on(&self, date: NaiveDate) -> impl Iterator<Item = &'a Reservation> {
        self.reservations.iter().filter(move |r| r.date == date)
    }

    /// Whether an admin block covers the entire date.
    pub fn is_date_blocked(&self, date: NaiveDate) -> bool {
        self.blocked_periods
            .iter()
            .any(|b| b.date == date && b.is_full_day())
    }

    /// Whether the requested range collides with any block on the date
    /// (whole-day blocks collide with everything).
    pub fn is_slot_blocked(&self, date: NaiveDate, start: &SlotTime, end: &SlotTime) -> bool {
        self.blocked_periods.iter().any(|b| {
            b.date == date
                && match (&b.start_time, &b.end_time) {
                    (Some(b_start), Some(b_end)) => ranges_overlap(start, end, b_start, b_end),
                    _ => true,
                }
        })
    }

    /// The booking colliding with the requested range, if any. Reservations
    /// matching `exclude_id` are skipped (self-exclusion on updates).
    fn conflicting_booking(
        &self,
        date: NaiveDate,
        start: &SlotTime,
        end: &SlotTime,
        exclude_id: Option<&str>,
    ) -> Option<Booking<'a>> {
        self.bookings_on(date).find(|booking| {
            if let (Booking::Reservation(r), Some(exclude)) = (booking, exclude_id) {
                if r.id == exclude {
                    return false;
                }
            }
            match booking.time_range() {
                Some((b_start, b_end)) => ranges_overlap(start, end, b_start, b_end),
                None => true,
            }
        })
    }

    /// Full slot check used before every write, in order: not a past date,
    /// strictly-future start, well-formed range, no block, no overlap.
    pub fn check_slot(
        &self,
        date: NaiveDate,
        start: &SlotTime,
        end: &SlotTime,
        exclude_id: Option<&str>,
        now: NaiveDateTime,
    ) -> Result<(), QuinchoError> {
        if date < now.date() {
            return Err(QuinchoError::PastDate);
        }
        if !self.starts_in_future(date, start, now) {
            return Err(QuinchoError::PastTime);
        }
        if end <= start {
            return Err(validation_error("end_time", "must be after start_time"));
        }
        match self.conflicting_booking(date, start, end, exclude_id) {
            None => Ok(()),
            Some(booking) => {
                let (c_start, c_end) = match booking.time_range() {
                    Some((s, e)) => (s.clone(), e.clone()),
                    // Whole-day block: surface the requested range.
                    None => (start.clone(), end.clone()),
                };
                Err(QuinchoError::SlotUnavailable {
                    start: c_start,
                    end: c_end,
                })
            }
        }
    }

    pub fn is_slot_available(
        &self,
        date: NaiveDate,
        start: &SlotTime,
        end: &SlotTime,
        exclude_id: Option<&str>,
        now: NaiveDateTime,
    ) -> bool {
        self.check_slot(date, start, end, exclude_id, now).is_ok()
    }

    fn starts_in_future(&self, date: NaiveDate, start: &SlotTime, now: NaiveDateTime) -> bool {
        match start.to_naive_time() {
            Some(time) => date.and_time(time) > now,
            None => false,
        }
    }

    /// Start times a user can pick on the date: every table entry but the
    /// closing one whose first half hour is free and strictly in the future.
    pub fn bookable_start_times(&self, date: NaiveDate, now: NaiveDateTime) -> Vec<SlotTime> {
        if self.is_date_blocked(date) {
            return Vec::new();
        }
        let Some((_, starts)) = self.table.split_last() else {
            return Vec::new();
        };
        starts
            .iter()
            .filter(|slot| {
                self.starts_in_future(date, slot, now)
                    && self
                        .conflicting_booking(date, slot, &slot.successor(), None)
                        .is_none()
            })
            .cloned()
            .collect()
    }

    /// End times valid for a reservation starting at `start`: the
    /// contiguous run of boundaries after `start` up to the first
    /// obstruction (or the closing time). A start that is not strictly
    /// in the future has no valid ends, same as the slot check.
    pub fn bookable_end_times(
        &self,
        date: NaiveDate,
        start: &SlotTime,
        exclude_id: Option<&str>,
        now: NaiveDateTime,
    ) -> Vec<SlotTime> {
        if !self.starts_in_future(date, start, now) || self.is_date_blocked(date) {
            return Vec::new();
        }
        let mut ends = Vec::new();
        let mut cursor = start.clone();
        for candidate in self.table.iter().filter(|t| *t > start) {
            // Each half-hour step must itself be free; the first occupied
            // step ends the run.
            if self
                .conflicting_booking(date, &cursor, candidate, exclude_id)
                .is_some()
            {
                break;
            }
            ends.push(candidate.clone());
            cursor = candidate.clone();
        }
        ends
    }

    /// Whether the calendar should grey the date out entirely: past dates,
    /// whole-day blocks, and dates with nothing left to book.
    pub fn is_calendar_date_disabled(&self, date: NaiveDate, now: NaiveDateTime) -> bool {
        date < now.date()
            || self.is_date_blocked(date)
            || self.bookable_start_times(date, now).is_empty()
    }

    /// Table entries inside some booking's visual span on the date, using
    /// the inclusive display predicate (distinct from conflict overlap).
    pub fn occupied_display_slots(&self, date: NaiveDate) -> Vec<SlotTime> {
        self.table
            .iter()
            .filter(|slot| {
                self.bookings_on(date).any(|booking| match booking.time_range() {
                    Some((start, end)) => within_display_span(slot, start, end),
                    None => true,
                })
            })
            .cloned()
            .collect()
    }
}
