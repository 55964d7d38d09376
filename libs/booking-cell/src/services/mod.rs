pub mod booking;
pub mod validation;
