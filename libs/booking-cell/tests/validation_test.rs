use assert_matches::assert_matches;
use uuid::Uuid;

use booking_cell::services::validation::{
    AddBookingValidator, CancelBookingValidator, NextAppointmentValidator,
};
use booking_cell::{CancelBookingRequest, GetNextAppointmentRequest, ValidationFailure};

mod common;
use common::*;

// ==============================================================================
// ADD BOOKING
// ==============================================================================

#[tokio::test]
async fn test_add_booking_all_checks_pass() {
    let ctx = TestContext::new();
    let validator = AddBookingValidator::new(ctx.dyn_store());

    let request = add_request(PATIENT_ID, DOCTOR_ID, now() + days(1.0), now() + days(2.0));
    let result = validator.validate(&request, now()).await.unwrap();

    assert!(result.is_passed());
    assert!(result.errors().is_empty());
}

#[tokio::test]
async fn test_add_booking_end_before_start_fails_shift_check() {
    let ctx = TestContext::new();
    let validator = AddBookingValidator::new(ctx.dyn_store());

    let request = add_request(PATIENT_ID, DOCTOR_ID, now() + days(2.0), now() + days(1.0));
    let result = validator.validate(&request, now()).await.unwrap();

    assert!(!result.is_passed());
    assert_eq!(result.errors(), &[ValidationFailure::EndNotAfterStart]);
}

#[tokio::test]
async fn test_add_booking_zero_length_fails_shift_check() {
    let ctx = TestContext::new();
    let validator = AddBookingValidator::new(ctx.dyn_store());

    let start = now() + days(1.0);
    let result = validator.validate(&add_request(PATIENT_ID, DOCTOR_ID, start, start), now()).await.unwrap();

    assert_eq!(result.errors(), &[ValidationFailure::EndNotAfterStart]);
}

#[tokio::test]
async fn test_add_booking_shift_check_short_circuits_past_check() {
    let ctx = TestContext::new();
    let validator = AddBookingValidator::new(ctx.dyn_store());

    // Both in the past and inverted: only the first check reports.
    let request = add_request(PATIENT_ID, DOCTOR_ID, now() - days(1.0), now() - days(2.0));
    let result = validator.validate(&request, now()).await.unwrap();

    assert_eq!(result.errors().len(), 1);
    assert_eq!(result.errors()[0], ValidationFailure::EndNotAfterStart);
}

#[tokio::test]
async fn test_add_booking_in_the_past_fails() {
    let ctx = TestContext::new();
    let validator = AddBookingValidator::new(ctx.dyn_store());

    let request = add_request(PATIENT_ID, DOCTOR_ID, now() - days(1.0), now() + days(1.0));
    let result = validator.validate(&request, now()).await.unwrap();

    assert!(!result.is_passed());
    assert_eq!(result.messages(), vec!["Patients can't book appointments in the past.".to_string()]);
}

#[tokio::test]
async fn test_add_booking_starting_exactly_now_is_allowed() {
    let ctx = TestContext::new();
    let validator = AddBookingValidator::new(ctx.dyn_store());

    let request = add_request(PATIENT_ID, DOCTOR_ID, now(), now() + days(0.5));
    let result = validator.validate(&request, now()).await.unwrap();

    assert!(result.is_passed());
}

#[tokio::test]
async fn test_add_booking_past_check_short_circuits_double_booking() {
    let ctx = TestContext::new();
    ctx.seed(booking(OTHER_PATIENT_ID, DOCTOR_ID, now() + days(0.1), now() + days(1.0))).await;
    let validator = AddBookingValidator::new(ctx.dyn_store());

    let request = add_request(PATIENT_ID, DOCTOR_ID, now() - days(0.1), now() + days(0.5));
    let result = validator.validate(&request, now()).await.unwrap();

    assert_eq!(result.errors(), &[ValidationFailure::StartInPast]);
}

#[tokio::test]
async fn test_add_booking_overlapping_same_doctor_fails() {
    let ctx = TestContext::new();
    ctx.seed(booking(OTHER_PATIENT_ID, DOCTOR_ID, now() + days(1.0), now() + days(2.0))).await;
    let validator = AddBookingValidator::new(ctx.dyn_store());

    let request = add_request(PATIENT_ID, DOCTOR_ID, now() + days(1.5), now() + days(2.5));
    let result = validator.validate(&request, now()).await.unwrap();

    assert!(!result.is_passed());
    assert_matches!(&result.errors()[0], ValidationFailure::DoctorDoubleBooked { .. });
}

#[tokio::test]
async fn test_add_booking_double_booking_names_known_doctor() {
    let ctx = TestContext::new();
    ctx.store.add_doctor(doctor(DOCTOR_ID)).await;
    ctx.seed(booking(OTHER_PATIENT_ID, DOCTOR_ID, now() + days(1.0), now() + days(2.0))).await;
    let validator = AddBookingValidator::new(ctx.dyn_store());

    let request = add_request(PATIENT_ID, DOCTOR_ID, now() + days(1.2), now() + days(1.4));
    let result = validator.validate(&request, now()).await.unwrap();

    assert_eq!(
        result.first_message().unwrap(),
        "Doctor Gregory House can't have two bookings at the same time."
    );
}

#[tokio::test]
async fn test_add_booking_overlap_variants_all_conflict() {
    let ctx = TestContext::new();
    let existing_start = now() + days(2.0);
    let existing_end = now() + days(3.0);
    ctx.seed(booking(OTHER_PATIENT_ID, DOCTOR_ID, existing_start, existing_end)).await;
    let validator = AddBookingValidator::new(ctx.dyn_store());

    let cases = vec![
        ("contained", existing_start + days(0.25), existing_end - days(0.25)),
        ("containing", existing_start - days(0.5), existing_end + days(0.5)),
        ("overlaps start", existing_start - days(0.5), existing_start + days(0.5)),
        ("overlaps end", existing_end - days(0.5), existing_end + days(0.5)),
        ("identical", existing_start, existing_end),
        ("touches start", existing_start - days(0.5), existing_start),
        ("touches end", existing_end, existing_end + days(0.5)),
    ];

    for (name, start, end) in cases {
        let result = validator.validate(&add_request(PATIENT_ID, DOCTOR_ID, start, end), now()).await.unwrap();
        assert!(!result.is_passed(), "Case '{}' should conflict", name);
        assert_matches!(&result.errors()[0], ValidationFailure::DoctorDoubleBooked { .. });
    }
}

#[tokio::test]
async fn test_add_booking_non_overlapping_same_doctor_passes() {
    let ctx = TestContext::new();
    let existing_start = now() + days(2.0);
    let existing_end = now() + days(3.0);
    ctx.seed(booking(OTHER_PATIENT_ID, DOCTOR_ID, existing_start, existing_end)).await;
    let validator = AddBookingValidator::new(ctx.dyn_store());

    let before = add_request(PATIENT_ID, DOCTOR_ID, existing_start - days(1.0), existing_start - days(0.01));
    let after = add_request(PATIENT_ID, DOCTOR_ID, existing_end + days(0.01), existing_end + days(1.0));

    assert!(validator.validate(&before, now()).await.unwrap().is_passed());
    assert!(validator.validate(&after, now()).await.unwrap().is_passed());
}

#[tokio::test]
async fn test_add_booking_overlap_on_other_doctor_passes() {
    let ctx = TestContext::new();
    ctx.seed(booking(OTHER_PATIENT_ID, OTHER_DOCTOR_ID, now() + days(1.0), now() + days(2.0))).await;
    let validator = AddBookingValidator::new(ctx.dyn_store());

    let request = add_request(PATIENT_ID, DOCTOR_ID, now() + days(1.5), now() + days(2.5));
    assert!(validator.validate(&request, now()).await.unwrap().is_passed());
}

#[tokio::test]
async fn test_add_booking_ignores_cancelled_bookings() {
    let ctx = TestContext::new();
    let mut cancelled = booking(OTHER_PATIENT_ID, DOCTOR_ID, now() + days(1.0), now() + days(2.0));
    cancelled.cancelled = true;
    ctx.seed(cancelled).await;
    let validator = AddBookingValidator::new(ctx.dyn_store());

    let request = add_request(PATIENT_ID, DOCTOR_ID, now() + days(1.5), now() + days(2.5));
    assert!(validator.validate(&request, now()).await.unwrap().is_passed());
}

#[tokio::test]
async fn test_add_booking_ignores_bookings_already_started() {
    let ctx = TestContext::new();
    // Started an hour ago, still running for another day.
    ctx.seed(booking(OTHER_PATIENT_ID, DOCTOR_ID, now() - days(0.04), now() + days(1.0))).await;
    let validator = AddBookingValidator::new(ctx.dyn_store());

    let request = add_request(PATIENT_ID, DOCTOR_ID, now() + days(0.5), now() + days(0.6));
    assert!(validator.validate(&request, now()).await.unwrap().is_passed());
}

// ==============================================================================
// CANCEL BOOKING
// ==============================================================================

#[tokio::test]
async fn test_cancel_booking_all_checks_pass() {
    let ctx = TestContext::new();
    let existing = ctx.seed(booking(PATIENT_ID, DOCTOR_ID, now() + days(1.0), now() + days(2.0))).await;
    let validator = CancelBookingValidator::new(ctx.dyn_store());

    let request = CancelBookingRequest { booking_id: existing.id, patient_id: PATIENT_ID };
    assert!(validator.validate(&request).await.unwrap().is_passed());
}

#[tokio::test]
async fn test_cancel_booking_missing_booking_fails_with_not_found() {
    let ctx = TestContext::new();
    let validator = CancelBookingValidator::new(ctx.dyn_store());

    let booking_id = Uuid::new_v4();
    let result = validator
        .validate(&CancelBookingRequest { booking_id, patient_id: PATIENT_ID })
        .await
        .unwrap();

    assert_eq!(result.errors(), &[ValidationFailure::BookingNotFound { booking_id }]);
    assert!(result.has_not_found());
    assert_eq!(
        result.first_message().unwrap(),
        format!("Booking with id {} does not exist.", booking_id)
    );
}

#[tokio::test]
async fn test_cancel_booking_wrong_patient_fails() {
    let ctx = TestContext::new();
    let existing = ctx.seed(booking(PATIENT_ID, DOCTOR_ID, now() + days(1.0), now() + days(2.0))).await;
    let validator = CancelBookingValidator::new(ctx.dyn_store());

    let request = CancelBookingRequest { booking_id: existing.id, patient_id: OTHER_PATIENT_ID };
    let result = validator.validate(&request).await.unwrap();

    assert!(!result.has_not_found());
    assert_eq!(
        result.messages(),
        vec![format!(
            "Booking with id {} is not attached to patient with id {}.",
            existing.id, OTHER_PATIENT_ID
        )]
    );
}

#[tokio::test]
async fn test_cancel_booking_already_cancelled_fails() {
    let ctx = TestContext::new();
    let mut existing = booking(PATIENT_ID, DOCTOR_ID, now() + days(1.0), now() + days(2.0));
    existing.cancelled = true;
    let existing = ctx.seed(existing).await;
    let validator = CancelBookingValidator::new(ctx.dyn_store());

    let request = CancelBookingRequest { booking_id: existing.id, patient_id: PATIENT_ID };
    let result = validator.validate(&request).await.unwrap();

    assert_eq!(result.errors(), &[ValidationFailure::AlreadyCancelled { booking_id: existing.id }]);
}

#[tokio::test]
async fn test_cancel_booking_accumulates_ownership_and_cancelled_errors() {
    let ctx = TestContext::new();
    let mut existing = booking(PATIENT_ID, DOCTOR_ID, now() + days(1.0), now() + days(2.0));
    existing.cancelled = true;
    let existing = ctx.seed(existing).await;
    let validator = CancelBookingValidator::new(ctx.dyn_store());

    let request = CancelBookingRequest { booking_id: existing.id, patient_id: OTHER_PATIENT_ID };
    let result = validator.validate(&request).await.unwrap();

    assert_eq!(
        result.errors(),
        &[
            ValidationFailure::NotPatientsBooking { booking_id: existing.id, patient_id: OTHER_PATIENT_ID },
            ValidationFailure::AlreadyCancelled { booking_id: existing.id },
        ]
    );
}

// ==============================================================================
// NEXT APPOINTMENT
// ==============================================================================

#[tokio::test]
async fn test_next_appointment_passes_with_future_active_booking() {
    let ctx = TestContext::new();
    ctx.seed(booking(PATIENT_ID, DOCTOR_ID, now() + days(1.0), now() + days(1.1))).await;
    let validator = NextAppointmentValidator::new(ctx.dyn_store());

    let result = validator
        .validate(&GetNextAppointmentRequest { patient_id: PATIENT_ID }, now())
        .await
        .unwrap();

    assert!(result.is_passed());
}

#[tokio::test]
async fn test_next_appointment_no_bookings_fails() {
    let ctx = TestContext::new();
    let validator = NextAppointmentValidator::new(ctx.dyn_store());

    let result = validator
        .validate(&GetNextAppointmentRequest { patient_id: PATIENT_ID }, now())
        .await
        .unwrap();

    assert_eq!(result.errors(), &[ValidationFailure::NoActiveBookings { patient_id: PATIENT_ID }]);
    assert_eq!(
        result.first_message().unwrap(),
        format!("Active bookings for patient with id {} not found.", PATIENT_ID)
    );
}

#[tokio::test]
async fn test_next_appointment_only_cancelled_bookings_fails() {
    let ctx = TestContext::new();
    let mut cancelled = booking(PATIENT_ID, DOCTOR_ID, now() + days(1.0), now() + days(1.1));
    cancelled.cancelled = true;
    ctx.seed(cancelled).await;
    let validator = NextAppointmentValidator::new(ctx.dyn_store());

    let result = validator
        .validate(&GetNextAppointmentRequest { patient_id: PATIENT_ID }, now())
        .await
        .unwrap();

    assert_eq!(result.errors(), &[ValidationFailure::NoActiveBookings { patient_id: PATIENT_ID }]);
}

#[tokio::test]
async fn test_next_appointment_only_past_bookings_fails_with_distinct_error() {
    let ctx = TestContext::new();
    ctx.seed(booking(PATIENT_ID, DOCTOR_ID, now() - days(2.0), now() - days(1.9))).await;
    let validator = NextAppointmentValidator::new(ctx.dyn_store());

    let result = validator
        .validate(&GetNextAppointmentRequest { patient_id: PATIENT_ID }, now())
        .await
        .unwrap();

    assert_eq!(result.errors(), &[ValidationFailure::NoUpcomingBookings { patient_id: PATIENT_ID }]);
    assert!(result.has_not_found());
}

#[tokio::test]
async fn test_next_appointment_ignores_other_patients() {
    let ctx = TestContext::new();
    ctx.seed(booking(OTHER_PATIENT_ID, DOCTOR_ID, now() + days(1.0), now() + days(1.1))).await;
    let validator = NextAppointmentValidator::new(ctx.dyn_store());

    let result = validator
        .validate(&GetNextAppointmentRequest { patient_id: PATIENT_ID }, now())
        .await
        .unwrap();

    assert!(!result.is_passed());
}
