// --- File: crates/quincho_booking/src/handlers.rs ---
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use quincho_common::handlers::{error_response, require_admin};
use quincho_common::models::{
    BlockRequest, BlockedPeriod, NewReservation, Reservation, ReservationPatch, SlotTime,
};
use quincho_common::services::AuthService;

use crate::service::BookingService;

// Shared state for the booking routes.
#[derive(Clone)]
pub struct BookingState {
    pub booking: Arc<BookingService>,
    pub auth: Arc<dyn AuthService>,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub date: String,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub date: NaiveDate,
    pub disabled: bool,
    pub start_times: Vec<SlotTime>,
    pub occupied_slots: Vec<SlotTime>,
}

#[derive(Debug, Deserialize)]
pub struct EndTimesQuery {
    pub date: String,
    pub start: String,
}

#[derive(Debug, Serialize)]
pub struct EndTimesResponse {
    pub end_times: Vec<SlotTime>,
    /// Auto-selected default: one hour after the start, clamped to the
    /// closing time.
    pub suggested: Option<SlotTime>,
}

#[derive(Debug, Deserialize)]
pub struct ReservationsQuery {
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CancelQuery {
    pub reason: Option<String>,
}

fn parse_date(raw: &str) -> Result<NaiveDate, (StatusCode, String)> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            "invalid date format (YYYY-MM-DD)".to_string(),
        )
    })
}

fn parse_slot_time(raw: &str) -> Result<SlotTime, (StatusCode, String)> {
    raw.parse()
        .map_err(|_| (StatusCode::BAD_REQUEST, "invalid time format (HH:MM)".to_string()))
}

pub async fn get_availability_handler(
    State(state): State<BookingState>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, (StatusCode, String)> {
    let date = parse_date(&query.date)?;
    let day = state.booking.availability(date).await;
    debug!(%date, starts = day.start_times.len(), "availability computed");
    Ok(Json(AvailabilityResponse {
        date,
        disabled: day.disabled,
        start_times: day.start_times,
        occupied_slots: day.occupied_slots,
    }))
}

pub async fn get_end_times_handler(
    State(state): State<BookingState>,
    Query(query): Query<EndTimesQuery>,
) -> Result<Json<EndTimesResponse>, (StatusCode, String)> {
    let date = parse_date(&query.date)?;
    let start = parse_slot_time(&query.start)?;
    let options = state.booking.end_time_options(date, &start).await;
    Ok(Json(EndTimesResponse {
        end_times: options.end_times,
        suggested: options.suggested,
    }))
}

pub async fn list_reservations_handler(
    State(state): State<BookingState>,
    Query(query): Query<ReservationsQuery>,
) -> Result<Json<Vec<Reservation>>, (StatusCode, String)> {
    let date = match &query.date {
        Some(raw) => Some(parse_date(raw)?),
        None => None,
    };
    Ok(Json(state.booking.list_reservations(date).await))
}

pub async fn create_reservation_handler(
    State(state): State<BookingState>,
    Json(draft): Json<NewReservation>,
) -> Result<(StatusCode, Json<Reservation>), (StatusCode, String)> {
    state
        .booking
        .create_reservation(draft)
        .await
        .map(|r| (StatusCode::CREATED, Json(r)))
        .map_err(|e| error_response(&e))
}

pub async fn update_reservation_handler(
    State(state): State<BookingState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(patch): Json<ReservationPatch>,
) -> Result<Json<Reservation>, (StatusCode, String)> {
    require_admin(state.auth.as_ref(), &headers)
        .await
        .map_err(|e| error_response(&e))?;
    state
        .booking
        .update_reservation(&id, patch)
        .await
        .map(Json)
        .map_err(|e| error_response(&e))
}

pub async fn delete_reservation_handler(
    State(state): State<BookingState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Query(query): Query<CancelQuery>,
) -> Result<StatusCode, (StatusCode, String)> {
    require_admin(state.auth.as_ref(), &headers)
        .await
        .map_err(|e| error_response(&e))?;
    state
        .booking
        .delete_reservation(&id, query.reason)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(|e| error_response(&e))
}

pub async fn list_blocked_periods_handler(
    State(state): State<BookingState>,
) -> Json<Vec<BlockedPeriod>> {
    Json(state.booking.list_blocked_periods().await)
}

pub async fn create_block_handler(
    State(state): State<BookingState>,
    headers: HeaderMap,
    Json(request): Json<BlockRequest>,
) -> Result<(StatusCode, Json<Vec<BlockedPeriod>>), (StatusCode, String)> {
    require_admin(state.auth.as_ref(), &headers)
        .await
        .map_err(|e| error_response(&e))?;
    state
        .booking
        .create_block(request)
        .await
        .map(|blocks| (StatusCode::CREATED, Json(blocks)))
        .map_err(|e| error_response(&e))
}

pub async fn delete_block_handler(
    State(state): State<BookingState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, (StatusCode, String)> {
    require_admin(state.auth.as_ref(), &headers)
        .await
        .map_err(|e| error_response(&e))?;
    state
        .booking
        .remove_block(&id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(|e| error_response(&e))
}
