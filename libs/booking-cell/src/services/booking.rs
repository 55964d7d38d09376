// libs/booking-cell/src/services/booking.rs
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{
    AddBookingRequest, Booking, BookingError, CancelBookingRequest,
    GetNextAppointmentRequest, NextAppointmentResponse, Patient, SurgeryType,
};
use crate::services::validation::{
    AddBookingValidator, CancelBookingValidator, NextAppointmentValidator,
};
use crate::store::BookingStore;

pub struct BookingService {
    store: Arc<dyn BookingStore>,
    add_validator: AddBookingValidator,
    cancel_validator: CancelBookingValidator,
    next_appointment_validator: NextAppointmentValidator,
    // Held across validate-then-write so in-process writers can't interleave.
    write_guard: Mutex<()>,
}

impl BookingService {
    pub fn new(store: Arc<dyn BookingStore>) -> Self {
        Self {
            add_validator: AddBookingValidator::new(Arc::clone(&store)),
            cancel_validator: CancelBookingValidator::new(Arc::clone(&store)),
            next_appointment_validator: NextAppointmentValidator::new(Arc::clone(&store)),
            store,
            write_guard: Mutex::new(()),
        }
    }

    pub async fn add_booking(&self, request: AddBookingRequest) -> Result<Uuid, BookingError> {
        self.add_booking_at(request, Utc::now()).await
    }

    /// Validates and creates a booking, returning its id.
    pub async fn add_booking_at(
        &self,
        request: AddBookingRequest,
        now: DateTime<Utc>,
    ) -> Result<Uuid, BookingError> {
        info!("Adding booking for patient {} with doctor {}", request.patient_id, request.doctor_id);

        let _guard = self.write_guard.lock().await;

        let validation = self.add_validator.validate(&request, now).await?;
        if !validation.is_passed() {
            warn!("Booking request rejected: {:?}", validation.messages());
            return Err(BookingError::validation(&validation));
        }

        // Both lookups are best-effort: a missing patient or doctor doesn't block the booking.
        let patient = self.store.find_patient(request.patient_id).await?;
        if patient.is_none() {
            debug!("Patient {} not found, booking without clinic snapshot", request.patient_id);
        }
        if self.store.find_doctor(request.doctor_id).await?.is_none() {
            debug!("Doctor {} not found, booking anyway", request.doctor_id);
        }

        let booking = Booking {
            id: Uuid::new_v4(),
            patient_id: request.patient_id,
            doctor_id: request.doctor_id,
            start_time: request.start_time,
            end_time: request.end_time,
            cancelled: false,
            surgery_type: Self::surgery_type_for(patient.as_ref()),
        };
        let booking_id = booking.id;

        self.store.insert(booking).await?;

        info!("Booking {} created for patient {}", booking_id, request.patient_id);
        Ok(booking_id)
    }

    pub async fn cancel_booking(&self, request: CancelBookingRequest) -> Result<(), BookingError> {
        info!("Cancelling booking {} for patient {}", request.booking_id, request.patient_id);

        let _guard = self.write_guard.lock().await;

        let validation = self.cancel_validator.validate(&request).await?;
        if !validation.is_passed() {
            warn!("Cancellation rejected: {:?}", validation.messages());
            if validation.has_not_found() {
                return Err(BookingError::not_found(&validation));
            }
            return Err(BookingError::validation(&validation));
        }

        // Validation passed, but the row may have changed since; that is not an error.
        let booking = match self.store.find_by_id(request.booking_id).await? {
            Some(booking) if !booking.cancelled => booking,
            _ => {
                debug!("Booking {} vanished or was cancelled after validation, skipping",
                       request.booking_id);
                return Ok(());
            }
        };

        self.store.update(Booking { cancelled: true, ..booking }).await?;

        info!("Booking {} cancelled", request.booking_id);
        Ok(())
    }

    pub async fn get_next_appointment(
        &self,
        request: GetNextAppointmentRequest,
    ) -> Result<Option<NextAppointmentResponse>, BookingError> {
        self.get_next_appointment_at(request, Utc::now()).await
    }

    /// Earliest active booking starting after `now`; ties go to the lower booking id.
    ///
    /// `Ok(None)` only happens if the store changed between validation and the query.
    pub async fn get_next_appointment_at(
        &self,
        request: GetNextAppointmentRequest,
        now: DateTime<Utc>,
    ) -> Result<Option<NextAppointmentResponse>, BookingError> {
        debug!("Fetching next appointment for patient {}", request.patient_id);

        let validation = self.next_appointment_validator.validate(&request, now).await?;
        if !validation.is_passed() {
            warn!("Next appointment lookup failed: {:?}", validation.messages());
            return Err(BookingError::not_found(&validation));
        }

        let bookings = self.store.find_by_patient(request.patient_id).await?;

        let next = bookings.iter()
            .filter(|booking| booking.is_upcoming(now))
            .min_by_key(|booking| (booking.start_time, booking.id));

        match next {
            Some(booking) => Ok(Some(NextAppointmentResponse::from(booking))),
            None => {
                warn!("No upcoming booking for patient {} after validation passed", request.patient_id);
                Ok(None)
            }
        }
    }

    /// Copies the clinic's surgery type only when it is a known value.
    fn surgery_type_for(patient: Option<&Patient>) -> SurgeryType {
        let Some(clinic) = patient.and_then(|p| p.clinic.as_ref()) else {
            return SurgeryType::default();
        };

        SurgeryType::try_from(clinic.surgery_type).unwrap_or_else(|raw| {
            warn!("Clinic {} has unrecognized surgery type {}, using default", clinic.id, raw);
            SurgeryType::default()
        })
    }
}
