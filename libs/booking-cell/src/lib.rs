pub mod models;
pub mod store;
pub mod services;
pub mod handlers;
pub mod router;

pub use models::*;
pub use store::{BookingStore, InMemoryBookingStore, StoreError, SupabaseBookingStore};
pub use services::booking::BookingService;
pub use router::booking_routes;
