// libs/booking-cell/src/services/validation.rs
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::models::{
    AddBookingRequest, CancelBookingRequest, GetNextAppointmentRequest,
    ValidationFailure, ValidationResult,
};
use crate::store::{BookingStore, StoreError};

// ==============================================================================
// ADD BOOKING
// ==============================================================================

/// Checks run in order and the first failing check ends the chain.
pub struct AddBookingValidator {
    store: Arc<dyn BookingStore>,
}

impl AddBookingValidator {
    pub fn new(store: Arc<dyn BookingStore>) -> Self {
        Self { store }
    }

    pub async fn validate(
        &self,
        request: &AddBookingRequest,
        now: DateTime<Utc>,
    ) -> Result<ValidationResult, StoreError> {
        debug!("Validating new booking for patient {} with doctor {} from {} to {}",
               request.patient_id, request.doctor_id, request.start_time, request.end_time);

        if let Some(failure) = Self::check_shift(request) {
            return Ok(ValidationResult::failed(failure));
        }

        if let Some(failure) = Self::check_not_in_past(request, now) {
            return Ok(ValidationResult::failed(failure));
        }

        if let Some(failure) = self.check_doctor_double_booking(request, now).await? {
            return Ok(ValidationResult::failed(failure));
        }

        Ok(ValidationResult::passed())
    }

    fn check_shift(request: &AddBookingRequest) -> Option<ValidationFailure> {
        (request.start_time >= request.end_time).then_some(ValidationFailure::EndNotAfterStart)
    }

    fn check_not_in_past(request: &AddBookingRequest, now: DateTime<Utc>) -> Option<ValidationFailure> {
        (request.start_time < now).then_some(ValidationFailure::StartInPast)
    }

    async fn check_doctor_double_booking(
        &self,
        request: &AddBookingRequest,
        now: DateTime<Utc>,
    ) -> Result<Option<ValidationFailure>, StoreError> {
        let bookings = self.store.find_by_doctor(request.doctor_id).await?;

        let conflict = bookings.iter()
            .filter(|booking| booking.is_upcoming(now))
            .find(|booking| booking.overlaps(request.start_time, request.end_time));

        let Some(conflict) = conflict else {
            return Ok(None);
        };

        warn!("Doctor {} double booking: requested {} - {} overlaps booking {}",
              request.doctor_id, request.start_time, request.end_time, conflict.id);

        let doctor = match self.store.find_doctor(request.doctor_id).await? {
            Some(doctor) => doctor.full_name(),
            None => format!("with id {}", request.doctor_id),
        };

        Ok(Some(ValidationFailure::DoctorDoubleBooked { doctor }))
    }
}

// ==============================================================================
// CANCEL BOOKING
// ==============================================================================

/// Existence gates everything else; ownership and already-cancelled are both
/// reported when both apply.
pub struct CancelBookingValidator {
    store: Arc<dyn BookingStore>,
}

impl CancelBookingValidator {
    pub fn new(store: Arc<dyn BookingStore>) -> Self {
        Self { store }
    }

    pub async fn validate(&self, request: &CancelBookingRequest) -> Result<ValidationResult, StoreError> {
        debug!("Validating cancellation of booking {} by patient {}",
               request.booking_id, request.patient_id);

        let Some(booking) = self.store.find_by_id(request.booking_id).await? else {
            return Ok(ValidationResult::failed(ValidationFailure::BookingNotFound {
                booking_id: request.booking_id,
            }));
        };

        let mut result = ValidationResult::passed();

        if booking.patient_id != request.patient_id {
            result.push(ValidationFailure::NotPatientsBooking {
                booking_id: request.booking_id,
                patient_id: request.patient_id,
            });
        }

        if booking.cancelled {
            result.push(ValidationFailure::AlreadyCancelled {
                booking_id: request.booking_id,
            });
        }

        Ok(result)
    }
}

// ==============================================================================
// NEXT APPOINTMENT
// ==============================================================================

/// Passes only when the patient has an active booking starting after `now`,
/// which is exactly the set the service picks the next appointment from.
pub struct NextAppointmentValidator {
    store: Arc<dyn BookingStore>,
}

impl NextAppointmentValidator {
    pub fn new(store: Arc<dyn BookingStore>) -> Self {
        Self { store }
    }

    pub async fn validate(
        &self,
        request: &GetNextAppointmentRequest,
        now: DateTime<Utc>,
    ) -> Result<ValidationResult, StoreError> {
        debug!("Validating next appointment lookup for patient {}", request.patient_id);

        let bookings = self.store.find_by_patient(request.patient_id).await?;

        if !bookings.iter().any(|booking| booking.is_active()) {
            return Ok(ValidationResult::failed(ValidationFailure::NoActiveBookings {
                patient_id: request.patient_id,
            }));
        }

        if !bookings.iter().any(|booking| booking.is_upcoming(now)) {
            return Ok(ValidationResult::failed(ValidationFailure::NoUpcomingBookings {
                patient_id: request.patient_id,
            }));
        }

        Ok(ValidationResult::passed())
    }
}
