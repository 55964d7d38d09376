// libs/booking-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;

use crate::models::{
    AddBookingRequest, BookingError, CancelBookingRequest, GetNextAppointmentRequest, PatientId,
};
use crate::services::booking::BookingService;

#[derive(Debug, Deserialize)]
pub struct CancelBookingBody {
    pub patient_id: PatientId,
}

fn to_app_error(e: BookingError) -> AppError {
    match e {
        BookingError::Validation { message, .. } => AppError::BadRequest(message),
        BookingError::NotFound(message) => AppError::NotFound(message),
        BookingError::Store(e) => AppError::Database(e.to_string()),
    }
}

#[axum::debug_handler]
pub async fn add_booking(
    State(service): State<Arc<BookingService>>,
    Json(request): Json<AddBookingRequest>,
) -> Result<Json<Value>, AppError> {
    let booking_id = service.add_booking(request).await.map_err(to_app_error)?;

    Ok(Json(json!({
        "success": true,
        "booking_id": booking_id,
    })))
}

#[axum::debug_handler]
pub async fn cancel_booking(
    State(service): State<Arc<BookingService>>,
    Path(booking_id): Path<Uuid>,
    Json(body): Json<CancelBookingBody>,
) -> Result<Json<Value>, AppError> {
    let request = CancelBookingRequest {
        booking_id,
        patient_id: body.patient_id,
    };

    service.cancel_booking(request).await.map_err(to_app_error)?;

    Ok(Json(json!({
        "success": true,
    })))
}

#[axum::debug_handler]
pub async fn get_next_appointment(
    State(service): State<Arc<BookingService>>,
    Path(patient_id): Path<PatientId>,
) -> Result<Json<Value>, AppError> {
    let next = service
        .get_next_appointment(GetNextAppointmentRequest { patient_id })
        .await
        .map_err(to_app_error)?;

    let body = match next {
        Some(appointment) => serde_json::to_value(appointment)
            .map_err(|e| AppError::Internal(e.to_string()))?,
        None => json!({}),
    };

    Ok(Json(body))
}
