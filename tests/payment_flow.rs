mod common;

use common::{booking_request, seeded};
use costume_rental_api::{
    dto::{
        bookings::UpdateBookingStatusRequest,
        payments::{SubmitPaymentRequest, UpdatePaymentStatusRequest},
    },
    error::AppError,
    middleware::auth::AuthUser,
    models::{Booking, BookingStatus, PaymentStatus},
    services::{booking_service, payment_service},
    store::MemoryStore,
};
use rust_decimal::Decimal;
use uuid::Uuid;

fn proof(amount: i64, url: &str) -> SubmitPaymentRequest {
    SubmitPaymentRequest {
        amount: Some(Decimal::from(amount)),
        proof_image_url: Some(url.into()),
        bank_name: Some("BCA".into()),
        account_number: Some("1234567890".into()),
    }
}

fn verdict(s: &str) -> UpdatePaymentStatusRequest {
    UpdatePaymentStatusRequest { status: s.into() }
}

async fn booked(store: &MemoryStore, customer: &AuthUser, product_id: Uuid) -> Booking {
    booking_service::create_booking(store, customer, booking_request(product_id))
        .await
        .expect("create booking")
        .into_data()
        .expect("booking")
}

#[tokio::test]
async fn resubmission_resets_verification() {
    let (store, product) = seeded("Batik Dress", 2).await;
    let customer = AuthUser::customer(Uuid::new_v4());
    let admin = AuthUser::admin(Uuid::new_v4());
    let booking = booked(&store, &customer, product.id).await;

    let first = payment_service::submit_payment(&store, &customer, booking.id, proof(300, "proof/1.jpg"))
        .await
        .expect("submit");
    assert_eq!(first.message, "Payment proof submitted");
    let first = first.into_data().expect("payment");
    assert_eq!(first.status, PaymentStatus::Pending);

    payment_service::set_payment_status(&store, &admin, first.id, verdict("REJECTED"))
        .await
        .expect("reject");

    let second = payment_service::submit_payment(&store, &customer, booking.id, proof(350, "proof/2.jpg"))
        .await
        .expect("resubmit");
    assert_eq!(second.message, "Payment proof replaced");
    let second = second.into_data().expect("payment");

    assert_eq!(second.id, first.id);
    assert_eq!(second.status, PaymentStatus::Pending);
    assert_eq!(second.verified_at, None);
    assert_eq!(second.proof_image_url, "proof/2.jpg");
    assert_eq!(second.amount, Decimal::from(350));
    assert_eq!(second.bank_name.as_deref(), Some("BCA"));
}

#[tokio::test]
async fn approval_confirms_booking_once() {
    let (store, product) = seeded("Wayang Costume", 2).await;
    let customer = AuthUser::customer(Uuid::new_v4());
    let admin = AuthUser::admin(Uuid::new_v4());
    let booking = booked(&store, &customer, product.id).await;

    let payment = payment_service::submit_payment(&store, &customer, booking.id, proof(300, "proof.jpg"))
        .await
        .expect("submit")
        .into_data()
        .expect("payment");

    let verification = payment_service::set_payment_status(&store, &admin, payment.id, verdict("APPROVED"))
        .await
        .expect("approve")
        .into_data()
        .expect("verification");
    assert_eq!(verification.payment.status, PaymentStatus::Approved);
    assert!(verification.payment.verified_at.is_some());
    let confirmed = verification.confirmed_booking.expect("booking confirmed");
    assert_eq!(confirmed.status, BookingStatus::Confirmed);

    let again = payment_service::set_payment_status(&store, &admin, payment.id, verdict("APPROVED"))
        .await
        .expect("re-approve")
        .into_data()
        .expect("verification");
    assert!(again.confirmed_booking.is_none());
    assert_eq!(
        store.booking(booking.id).await.expect("booking").status,
        BookingStatus::Confirmed
    );
    assert_eq!(store.product(product.id).await.expect("product").stock, 1);
}

#[tokio::test]
async fn approval_leaves_later_bookings_alone() {
    let (store, product) = seeded("Lion Dance", 2).await;
    let customer = AuthUser::customer(Uuid::new_v4());
    let admin = AuthUser::admin(Uuid::new_v4());
    let booking = booked(&store, &customer, product.id).await;

    let payment = payment_service::submit_payment(&store, &customer, booking.id, proof(300, "proof.jpg"))
        .await
        .expect("submit")
        .into_data()
        .expect("payment");
    booking_service::set_booking_status(
        &store,
        &admin,
        booking.id,
        UpdateBookingStatusRequest {
            status: "CANCELLED".into(),
        },
    )
    .await
    .expect("cancel");

    let verification = payment_service::set_payment_status(&store, &admin, payment.id, verdict("APPROVED"))
        .await
        .expect("approve")
        .into_data()
        .expect("verification");
    assert!(verification.confirmed_booking.is_none());
    assert_eq!(
        store.booking(booking.id).await.expect("booking").status,
        BookingStatus::Cancelled
    );
}

#[tokio::test]
async fn payments_respect_ownership_and_roles() {
    let (store, product) = seeded("Superhero Cape", 2).await;
    let customer = AuthUser::customer(Uuid::new_v4());
    let stranger = AuthUser::customer(Uuid::new_v4());
    let booking = booked(&store, &customer, product.id).await;

    let err = payment_service::submit_payment(&store, &stranger, booking.id, proof(300, "proof.jpg"))
        .await
        .expect_err("not the owner");
    assert!(matches!(err, AppError::Forbidden));

    let payment = payment_service::submit_payment(&store, &customer, booking.id, proof(300, "proof.jpg"))
        .await
        .expect("submit")
        .into_data()
        .expect("payment");

    let err = payment_service::set_payment_status(&store, &customer, payment.id, verdict("APPROVED"))
        .await
        .expect_err("customers cannot verify");
    assert!(matches!(err, AppError::Forbidden));
    assert_eq!(
        store.booking(booking.id).await.expect("booking").status,
        BookingStatus::Pending
    );

    let err = payment_service::get_payment_for_booking(&store, &stranger, booking.id)
        .await
        .expect_err("not the owner");
    assert!(matches!(err, AppError::Forbidden));
    payment_service::get_payment_for_booking(&store, &customer, booking.id)
        .await
        .expect("owner reads payment");
}

#[tokio::test]
async fn submission_requires_amount_and_proof() {
    let (store, product) = seeded("Robot Suit", 2).await;
    let customer = AuthUser::customer(Uuid::new_v4());
    let booking = booked(&store, &customer, product.id).await;

    let mut no_proof = proof(300, "  ");
    let err = payment_service::submit_payment(&store, &customer, booking.id, no_proof)
        .await
        .expect_err("blank proof");
    assert!(matches!(err, AppError::Validation(_)));

    no_proof = SubmitPaymentRequest::default();
    let err = payment_service::submit_payment(&store, &customer, booking.id, no_proof)
        .await
        .expect_err("no amount");
    assert!(matches!(err, AppError::Validation(_)));

    let err = payment_service::submit_payment(&store, &customer, Uuid::new_v4(), proof(300, "p.jpg"))
        .await
        .expect_err("unknown booking");
    assert!(matches!(err, AppError::NotFound));

    let admin = AuthUser::admin(Uuid::new_v4());
    let err = payment_service::set_payment_status(&store, &admin, Uuid::new_v4(), verdict("APPROVED"))
        .await
        .expect_err("unknown payment");
    assert!(matches!(err, AppError::NotFound));
}

#[tokio::test]
async fn amounts_must_be_whole_cents() {
    let (store, product) = seeded("Samurai Armor", 2).await;
    let customer = AuthUser::customer(Uuid::new_v4());
    let booking = booked(&store, &customer, product.id).await;

    let mut fractional = proof(0, "proof.jpg");
    fractional.amount = Some(Decimal::new(125, 3));
    let err = payment_service::submit_payment(&store, &customer, booking.id, fractional)
        .await
        .expect_err("sub-cent amount");
    assert!(matches!(err, AppError::Validation(_)));

    let err = payment_service::submit_payment(&store, &customer, booking.id, proof(-5, "proof.jpg"))
        .await
        .expect_err("negative amount");
    assert!(matches!(err, AppError::Validation(_)));

    let err = payment_service::get_payment_for_booking(&store, &customer, booking.id)
        .await
        .expect_err("nothing stored");
    assert!(matches!(err, AppError::NotFound));
}

#[tokio::test]
async fn verdicts_stamp_and_clear_verification_time() {
    let (store, product) = seeded("Ninja Suit", 2).await;
    let customer = AuthUser::customer(Uuid::new_v4());
    let admin = AuthUser::admin(Uuid::new_v4());
    let booking = booked(&store, &customer, product.id).await;

    let payment = payment_service::submit_payment(&store, &customer, booking.id, proof(300, "proof.jpg"))
        .await
        .expect("submit")
        .into_data()
        .expect("payment");

    let err = payment_service::set_payment_status(&store, &admin, payment.id, verdict("PAID"))
        .await
        .expect_err("unknown status");
    assert!(matches!(err, AppError::Validation(_)));

    let rejected = payment_service::set_payment_status(&store, &admin, payment.id, verdict("REJECTED"))
        .await
        .expect("reject")
        .into_data()
        .expect("verification");
    assert_eq!(rejected.payment.status, PaymentStatus::Rejected);
    assert!(rejected.payment.verified_at.is_some());
    assert!(rejected.confirmed_booking.is_none());

    let reopened = payment_service::set_payment_status(&store, &admin, payment.id, verdict("PENDING"))
        .await
        .expect("reopen")
        .into_data()
        .expect("verification");
    assert_eq!(reopened.payment.status, PaymentStatus::Pending);
    assert_eq!(reopened.payment.verified_at, None);
    assert_eq!(
        store.booking(booking.id).await.expect("booking").status,
        BookingStatus::Pending
    );
}
