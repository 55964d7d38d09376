use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::models::{Booking, Doctor, DoctorId, Patient, PatientId};
use super::{BookingStore, StoreError};

/// Process-local store. Bookings keep insertion order, which is the order
/// `find_by_patient` and `find_by_doctor` report them in.
#[derive(Default)]
pub struct InMemoryBookingStore {
    bookings: RwLock<Vec<Booking>>,
    patients: RwLock<HashMap<PatientId, Patient>>,
    doctors: RwLock<HashMap<DoctorId, Doctor>>,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_patient(&self, patient: Patient) {
        self.patients.write().await.insert(patient.id, patient);
    }

    pub async fn add_doctor(&self, doctor: Doctor) {
        self.doctors.write().await.insert(doctor.id, doctor);
    }

    /// Snapshot of every stored booking.
    pub async fn bookings(&self) -> Vec<Booking> {
        self.bookings.read().await.clone()
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn find_by_id(&self, booking_id: Uuid) -> Result<Option<Booking>, StoreError> {
        let bookings = self.bookings.read().await;
        Ok(bookings.iter().find(|b| b.id == booking_id).cloned())
    }

    async fn find_by_patient(&self, patient_id: PatientId) -> Result<Vec<Booking>, StoreError> {
        let bookings = self.bookings.read().await;
        Ok(bookings.iter().filter(|b| b.patient_id == patient_id).cloned().collect())
    }

    async fn find_by_doctor(&self, doctor_id: DoctorId) -> Result<Vec<Booking>, StoreError> {
        let bookings = self.bookings.read().await;
        Ok(bookings.iter().filter(|b| b.doctor_id == doctor_id).cloned().collect())
    }

    async fn insert(&self, booking: Booking) -> Result<(), StoreError> {
        debug!("Inserting booking {} into memory store", booking.id);
        self.bookings.write().await.push(booking);
        Ok(())
    }

    async fn update(&self, booking: Booking) -> Result<(), StoreError> {
        let mut bookings = self.bookings.write().await;
        let slot = bookings
            .iter_mut()
            .find(|b| b.id == booking.id)
            .ok_or(StoreError::NotFound(booking.id))?;
        *slot = booking;
        Ok(())
    }

    async fn find_patient(&self, patient_id: PatientId) -> Result<Option<Patient>, StoreError> {
        Ok(self.patients.read().await.get(&patient_id).cloned())
    }

    async fn find_doctor(&self, doctor_id: DoctorId) -> Result<Option<Doctor>, StoreError> {
        Ok(self.doctors.read().await.get(&doctor_id).cloned())
    }
}
