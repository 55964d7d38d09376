// libs/booking-cell/src/store/mod.rs
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Booking, Doctor, DoctorId, Patient, PatientId};

pub mod memory;
pub mod supabase;

pub use memory::InMemoryBookingStore;
pub use supabase::SupabaseBookingStore;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Booking store backend failed: {0}")]
    Backend(String),

    #[error("Failed to decode stored record: {0}")]
    Serialization(String),

    #[error("Booking {0} not found in store")]
    NotFound(Uuid),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// Persistence for bookings plus read-only patient/doctor lookups.
///
/// Every call is individually atomic; nothing spans calls. Queries return fully
/// materialized results.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn find_by_id(&self, booking_id: Uuid) -> Result<Option<Booking>, StoreError>;

    async fn find_by_patient(&self, patient_id: PatientId) -> Result<Vec<Booking>, StoreError>;

    async fn find_by_doctor(&self, doctor_id: DoctorId) -> Result<Vec<Booking>, StoreError>;

    async fn insert(&self, booking: Booking) -> Result<(), StoreError>;

    /// Replaces the stored booking with the same id.
    async fn update(&self, booking: Booking) -> Result<(), StoreError>;

    async fn find_patient(&self, patient_id: PatientId) -> Result<Option<Patient>, StoreError>;

    async fn find_doctor(&self, doctor_id: DoctorId) -> Result<Option<Doctor>, StoreError>;
}
