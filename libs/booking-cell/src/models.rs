// libs/booking-cell/src/models.rs
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;
use uuid::Uuid;
use chrono::{DateTime, Utc};
use std::fmt;

use crate::store::StoreError;

pub type PatientId = i64;
pub type DoctorId = i64;

// ==============================================================================
// CORE BOOKING MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub patient_id: PatientId,
    pub doctor_id: DoctorId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub cancelled: bool,
    #[serde(default)]
    pub surgery_type: SurgeryType,
}

impl Booking {
    /// Active means not cancelled, regardless of when it takes place.
    pub fn is_active(&self) -> bool {
        !self.cancelled
    }

    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.is_active() && self.start_time > now
    }

    /// Inclusive overlap: bookings that merely touch at an endpoint still conflict.
    pub fn overlaps(&self, start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> bool {
        start_time <= self.end_time && end_time >= self.start_time
    }
}

/// Clinic classification snapshotted onto a booking when it is created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "i32")]
pub enum SurgeryType {
    #[default]
    SystemOne = 0,
    SystemTwo = 1,
}

impl TryFrom<i32> for SurgeryType {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SurgeryType::SystemOne),
            1 => Ok(SurgeryType::SystemTwo),
            other => Err(other),
        }
    }
}

// Unknown stored values decode to the default instead of failing the row.
impl<'de> Deserialize<'de> for SurgeryType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = i32::deserialize(deserializer)?;
        Ok(SurgeryType::try_from(raw).unwrap_or_else(|raw| {
            warn!("Unrecognized stored surgery type {}, using default", raw);
            SurgeryType::default()
        }))
    }
}

impl From<SurgeryType> for i32 {
    fn from(value: SurgeryType) -> Self {
        value as i32
    }
}

impl fmt::Display for SurgeryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurgeryType::SystemOne => write!(f, "SystemOne"),
            SurgeryType::SystemTwo => write!(f, "SystemTwo"),
        }
    }
}

// ==============================================================================
// LOOKUP MODELS (read-only for this cell)
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clinic {
    pub id: i64,
    pub name: String,
    /// Raw upstream value; may be outside the `SurgeryType` range.
    pub surgery_type: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    pub first_name: String,
    pub last_name: String,
    pub clinic: Option<Clinic>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: DoctorId,
    pub first_name: String,
    pub last_name: String,
}

impl Doctor {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddBookingRequest {
    pub patient_id: PatientId,
    pub doctor_id: DoctorId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelBookingRequest {
    pub booking_id: Uuid,
    pub patient_id: PatientId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetNextAppointmentRequest {
    pub patient_id: PatientId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextAppointmentResponse {
    pub id: Uuid,
    pub doctor_id: DoctorId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl From<&Booking> for NextAppointmentResponse {
    fn from(booking: &Booking) -> Self {
        Self {
            id: booking.id,
            doctor_id: booking.doctor_id,
            start_time: booking.start_time,
            end_time: booking.end_time,
        }
    }
}

// ==============================================================================
// VALIDATION MODELS
// ==============================================================================

/// A single failed check. `Display` is the human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationFailure {
    #[error("Booking end time can't be less than or equal to booking start time.")]
    EndNotAfterStart,

    #[error("Patients can't book appointments in the past.")]
    StartInPast,

    #[error("Doctor {doctor} can't have two bookings at the same time.")]
    DoctorDoubleBooked { doctor: String },

    #[error("Booking with id {booking_id} does not exist.")]
    BookingNotFound { booking_id: Uuid },

    #[error("Booking with id {booking_id} is not attached to patient with id {patient_id}.")]
    NotPatientsBooking { booking_id: Uuid, patient_id: PatientId },

    #[error("Booking with id {booking_id} is already cancelled.")]
    AlreadyCancelled { booking_id: Uuid },

    #[error("Active bookings for patient with id {patient_id} not found.")]
    NoActiveBookings { patient_id: PatientId },

    #[error("Upcoming bookings for patient with id {patient_id} not found.")]
    NoUpcomingBookings { patient_id: PatientId },
}

impl ValidationFailure {
    /// Failures that mean "the thing asked about is not there" rather than "bad input".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ValidationFailure::BookingNotFound { .. }
                | ValidationFailure::NoActiveBookings { .. }
                | ValidationFailure::NoUpcomingBookings { .. }
        )
    }
}

/// Outcome of one validation call. `passed` is false exactly when `errors` is non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    errors: Vec<ValidationFailure>,
}

impl ValidationResult {
    pub fn passed() -> Self {
        Self::default()
    }

    pub fn failed(failure: ValidationFailure) -> Self {
        Self { errors: vec![failure] }
    }

    pub fn push(&mut self, failure: ValidationFailure) {
        self.errors.push(failure);
    }

    pub fn is_passed(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ValidationFailure] {
        &self.errors
    }

    /// Messages in check order.
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    pub fn first_message(&self) -> Option<String> {
        self.errors.first().map(ToString::to_string)
    }

    pub fn has_not_found(&self) -> bool {
        self.errors.iter().any(ValidationFailure::is_not_found)
    }
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("{message}")]
    Validation { message: String, errors: Vec<String> },

    #[error("{0}")]
    NotFound(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl BookingError {
    /// Bad-request error carrying the first message and the full list for diagnostics.
    pub fn validation(result: &ValidationResult) -> Self {
        let errors = result.messages();
        BookingError::Validation {
            message: errors.first().cloned().unwrap_or_default(),
            errors,
        }
    }

    pub fn not_found(result: &ValidationResult) -> Self {
        let message = result
            .errors()
            .iter()
            .find(|failure| failure.is_not_found())
            .map(ToString::to_string)
            .or_else(|| result.first_message())
            .unwrap_or_default();
        BookingError::NotFound(message)
    }
}
