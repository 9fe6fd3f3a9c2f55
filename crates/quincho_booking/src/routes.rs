// --- File: crates/quincho_booking/src/routes.rs ---
use std::sync::Arc;

use axum::routing::{delete, get, patch, post};
use axum::Router;

use quincho_common::services::AuthService;

use crate::handlers::{
    create_block_handler, create_reservation_handler, delete_block_handler,
    delete_reservation_handler, get_availability_handler, get_end_times_handler,
    list_blocked_periods_handler, list_reservations_handler, update_reservation_handler,
    BookingState,
};
use crate::service::BookingService;

/// All routes of the booking feature; admin gating happens per handler.
pub fn routes(booking: Arc<BookingService>, auth: Arc<dyn AuthService>) -> Router {
    let state = BookingState { booking, auth };
    Router::new()
        .route("/availability", get(get_availability_handler))
        .route("/availability/end-times", get(get_end_times_handler))
        .route(
            "/reservations",
            get(list_reservations_handler).post(create_reservation_handler),
        )
        .route(
            "/reservations/{id}",
            patch(update_reservation_handler).delete(delete_reservation_handler),
        )
        .route("/blocked-periods", get(list_blocked_periods_handler))
        .route("/admin/blocks", post(create_block_handler))
        .route("/admin/blocks/{id}", delete(delete_block_handler))
        .with_state(state)
}
