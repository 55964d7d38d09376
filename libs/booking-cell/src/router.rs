// libs/booking-cell/src/router.rs
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::handlers;
use crate::services::booking::BookingService;

pub fn booking_routes(service: Arc<BookingService>) -> Router {
    Router::new()
        .route("/", post(handlers::add_booking))
        .route("/{booking_id}/cancel", post(handlers::cancel_booking))
        .route("/patient/{patient_id}/next", get(handlers::get_next_appointment))
        .with_state(service)
}
