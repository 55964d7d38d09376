#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use booking_cell::{
    AddBookingRequest, Booking, BookingService, BookingStore, Clinic, Doctor,
    InMemoryBookingStore, Patient, SurgeryType,
};

pub const PATIENT_ID: i64 = 100;
pub const OTHER_PATIENT_ID: i64 = 200;
pub const DOCTOR_ID: i64 = 10;
pub const OTHER_DOCTOR_ID: i64 = 20;

/// Fixed reference time so boundary tests don't depend on the wall clock.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 3, 4, 9, 0, 0).unwrap()
}

pub fn days(n: f64) -> Duration {
    Duration::minutes((n * 24.0 * 60.0) as i64)
}

pub fn booking(patient_id: i64, doctor_id: i64, start: DateTime<Utc>, end: DateTime<Utc>) -> Booking {
    Booking {
        id: Uuid::new_v4(),
        patient_id,
        doctor_id,
        start_time: start,
        end_time: end,
        cancelled: false,
        surgery_type: SurgeryType::default(),
    }
}

pub fn add_request(patient_id: i64, doctor_id: i64, start: DateTime<Utc>, end: DateTime<Utc>) -> AddBookingRequest {
    AddBookingRequest {
        patient_id,
        doctor_id,
        start_time: start,
        end_time: end,
    }
}

pub fn patient_with_clinic(id: i64, surgery_type: i32) -> Patient {
    Patient {
        id,
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        clinic: Some(Clinic {
            id: 1,
            name: "Riverside Practice".to_string(),
            surgery_type,
        }),
    }
}

pub fn doctor(id: i64) -> Doctor {
    Doctor {
        id,
        first_name: "Gregory".to_string(),
        last_name: "House".to_string(),
    }
}

pub struct TestContext {
    pub store: Arc<InMemoryBookingStore>,
    pub service: BookingService,
}

impl TestContext {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryBookingStore::new());
        let service = BookingService::new(store.clone() as Arc<dyn BookingStore>);
        Self { store, service }
    }

    pub fn dyn_store(&self) -> Arc<dyn BookingStore> {
        self.store.clone()
    }

    pub async fn seed(&self, booking: Booking) -> Booking {
        self.store.insert(booking.clone()).await.expect("Failed to seed booking");
        booking
    }

    pub async fn stored(&self, id: Uuid) -> Booking {
        self.store
            .find_by_id(id)
            .await
            .expect("Store lookup failed")
            .expect("Booking should exist")
    }
}
