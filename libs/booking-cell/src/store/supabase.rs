use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{header::{HeaderMap, HeaderValue}, Method};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{Booking, Doctor, DoctorId, Patient, PatientId};
use super::{BookingStore, StoreError};

const BOOKINGS_PATH: &str = "/rest/v1/bookings";
const PATIENTS_PATH: &str = "/rest/v1/patients";
const DOCTORS_PATH: &str = "/rest/v1/doctors";

/// `BookingStore` backed by PostgREST tables `bookings`, `patients` and `doctors`.
pub struct SupabaseBookingStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseBookingStore {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_client(Arc::new(SupabaseClient::new(config)))
    }

    pub fn with_client(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    async fn fetch_rows<T>(&self, path: &str) -> Result<Vec<T>, StoreError>
    where
        T: DeserializeOwned,
    {
        let result: Vec<Value> = self.supabase
            .request(Method::GET, path, None)
            .await
            .map_err(|e| {
                error!("Booking store query failed for {}: {}", path, e);
                StoreError::Backend(e.to_string())
            })?;

        let rows = result.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<T>, _>>()?;

        Ok(rows)
    }

    async fn fetch_one<T>(&self, path: &str) -> Result<Option<T>, StoreError>
    where
        T: DeserializeOwned,
    {
        Ok(self.fetch_rows(path).await?.into_iter().next())
    }

    fn prefer_headers(prefer: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static(prefer));
        headers
    }
}

#[async_trait]
impl BookingStore for SupabaseBookingStore {
    async fn find_by_id(&self, booking_id: Uuid) -> Result<Option<Booking>, StoreError> {
        let path = format!("{}?id=eq.{}", BOOKINGS_PATH, booking_id);
        self.fetch_one(&path).await
    }

    async fn find_by_patient(&self, patient_id: PatientId) -> Result<Vec<Booking>, StoreError> {
        let path = format!("{}?patient_id=eq.{}&order=start_time.asc", BOOKINGS_PATH, patient_id);
        self.fetch_rows(&path).await
    }

    async fn find_by_doctor(&self, doctor_id: DoctorId) -> Result<Vec<Booking>, StoreError> {
        let path = format!("{}?doctor_id=eq.{}&order=start_time.asc", BOOKINGS_PATH, doctor_id);
        self.fetch_rows(&path).await
    }

    async fn insert(&self, booking: Booking) -> Result<(), StoreError> {
        debug!("Inserting booking {} via PostgREST", booking.id);
        let body = serde_json::to_value(&booking)?;

        self.supabase
            .execute(Method::POST, BOOKINGS_PATH, Some(body), Some(Self::prefer_headers("return=minimal")))
            .await
            .map_err(|e| {
                error!("Failed to insert booking {}: {}", booking.id, e);
                StoreError::Backend(e.to_string())
            })
    }

    async fn update(&self, booking: Booking) -> Result<(), StoreError> {
        debug!("Updating booking {} via PostgREST", booking.id);
        let path = format!("{}?id=eq.{}", BOOKINGS_PATH, booking.id);
        let body = serde_json::to_value(&booking)?;

        // A PATCH matching no rows still succeeds, so ask for the rows back.
        let updated: Vec<Value> = self.supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(body),
                Some(Self::prefer_headers("return=representation")),
            )
            .await
            .map_err(|e| {
                error!("Failed to update booking {}: {}", booking.id, e);
                StoreError::Backend(e.to_string())
            })?;

        if updated.is_empty() {
            return Err(StoreError::NotFound(booking.id));
        }

        Ok(())
    }

    async fn find_patient(&self, patient_id: PatientId) -> Result<Option<Patient>, StoreError> {
        let path = format!(
            "{}?id=eq.{}&select=id,first_name,last_name,clinic:clinics(id,name,surgery_type)",
            PATIENTS_PATH, patient_id
        );
        self.fetch_one(&path).await
    }

    async fn find_doctor(&self, doctor_id: DoctorId) -> Result<Option<Doctor>, StoreError> {
        let path = format!("{}?id=eq.{}&select=id,first_name,last_name", DOCTORS_PATH, doctor_id);
        self.fetch_one(&path).await
    }
}
