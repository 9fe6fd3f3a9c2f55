// --- File: crates/quincho_booking/src/doc.rs ---

#![allow(dead_code)]
#![cfg(feature = "openapi")]
use utoipa::OpenApi;

#[utoipa::path(
    get,
    path = "/availability",
    params(
        ("date" = String, Query, description = "Date in YYYY-MM-DD format", example = "2025-06-15", format = "date")
    ),
    responses(
        (status = 200, description = "Bookable start times, disabled flag and occupied display slots for the date"),
        (status = 400, description = "Invalid date format", body = String)
    )
)]
fn doc_get_availability_handler() {}

#[utoipa::path(
    get,
    path = "/availability/end-times",
    params(
        ("date" = String, Query, description = "Date in YYYY-MM-DD format", example = "2025-06-15", format = "date"),
        ("start" = String, Query, description = "Chosen start time in HH:MM", example = "14:00")
    ),
    responses(
        (status = 200, description = "Valid end times plus the auto-selected suggestion"),
        (status = 400, description = "Invalid date or time format", body = String)
    )
)]
fn doc_get_end_times_handler() {}

#[utoipa::path(
    get,
    path = "/reservations",
    params(
        ("date" = Option<String>, Query, description = "Optional date filter in YYYY-MM-DD format")
    ),
    responses(
        (status = 200, description = "Reservations, optionally filtered to one date")
    )
)]
fn doc_list_reservations_handler() {}

#[utoipa::path(
    post,
    path = "/reservations",
    responses(
        (status = 201, description = "Reservation created"),
        (status = 400, description = "Validation failure or past date/time", body = String),
        (status = 409, description = "Slot not available", body = String)
    )
)]
fn doc_create_reservation_handler() {}

#[utoipa::path(
    patch,
    path = "/reservations/{id}",
    params(
        ("id" = String, Path, description = "Reservation id")
    ),
    responses(
        (status = 200, description = "Reservation updated"),
        (status = 401, description = "Admin session required", body = String),
        (status = 404, description = "Reservation not found", body = String),
        (status = 409, description = "Slot not available", body = String)
    )
)]
fn doc_update_reservation_handler() {}

#[utoipa::path(
    delete,
    path = "/reservations/{id}",
    params(
        ("id" = String, Path, description = "Reservation id"),
        ("reason" = Option<String>, Query, description = "Optional cancellation reason passed to the holder's email")
    ),
    responses(
        (status = 204, description = "Reservation cancelled"),
        (status = 401, description = "Admin session required", body = String),
        (status = 404, description = "Reservation not found", body = String)
    )
)]
fn doc_delete_reservation_handler() {}

#[utoipa::path(
    get,
    path = "/blocked-periods",
    responses(
        (status = 200, description = "All blocked periods")
    )
)]
fn doc_list_blocked_periods_handler() {}

#[utoipa::path(
    post,
    path = "/admin/blocks",
    responses(
        (status = 201, description = "One blocked period per day of the requested range"),
        (status = 400, description = "Invalid range or times", body = String),
        (status = 401, description = "Admin session required", body = String)
    )
)]
fn doc_create_block_handler() {}

#[utoipa::path(
    delete,
    path = "/admin/blocks/{id}",
    params(
        ("id" = String, Path, description = "Blocked period id")
    ),
    responses(
        (status = 204, description = "Blocked period removed"),
        (status = 401, description = "Admin session required", body = String),
        (status = 404, description = "Blocked period not found", body = String)
    )
)]
fn doc_delete_block_handler() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        doc_get_availability_handler,
        doc_get_end_times_handler,
        doc_list_reservations_handler,
        doc_create_reservation_handler,
        doc_update_reservation_handler,
        doc_delete_reservation_handler,
        doc_list_blocked_periods_handler,
        doc_create_block_handler,
        doc_delete_block_handler
    ),
    tags(
        (name = "quincho", description = "Quincho reservation API")
    ),
    servers(
        (url = "/api", description = "Quincho backend")
    )
)]
pub struct BookingApiDoc;
