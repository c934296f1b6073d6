mod common;

use common::{booking_request, day, seeded};
use costume_rental_api::{
    dto::bookings::{CreateBookingRequest, UpdateBookingStatusRequest},
    error::AppError,
    middleware::auth::AuthUser,
    models::BookingStatus,
    routes::params::BookingListQuery,
    services::booking_service,
};
use rust_decimal::Decimal;
use uuid::Uuid;

fn status(s: &str) -> UpdateBookingStatusRequest {
    UpdateBookingStatusRequest { status: s.into() }
}

#[tokio::test]
async fn booking_takes_one_unit_of_stock() {
    let (store, product) = seeded("Witch Robe", 2).await;
    let customer = AuthUser::customer(Uuid::new_v4());

    let resp = booking_service::create_booking(&store, &customer, booking_request(product.id))
        .await
        .expect("create booking");
    let booking = resp.into_data().expect("booking");

    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.customer_id, customer.user_id);
    assert_eq!(booking.total_days, 3);
    assert_eq!(store.product(product.id).await.expect("product").stock, 1);
    assert!(
        store
            .audit_entries()
            .iter()
            .any(|e| e.action == "booking_create")
    );
}

#[tokio::test]
async fn booking_is_rejected_when_out_of_stock() {
    let (store, product) = seeded("Pirate Coat", 1).await;
    let customer = AuthUser::customer(Uuid::new_v4());

    booking_service::create_booking(&store, &customer, booking_request(product.id))
        .await
        .expect("first booking");
    let err = booking_service::create_booking(&store, &customer, booking_request(product.id))
        .await
        .expect_err("second booking must fail");

    assert!(matches!(err, AppError::Unavailable(_)));
    assert_eq!(store.product(product.id).await.expect("product").stock, 0);
    assert_eq!(store.booking_count().await, 1);
}

#[tokio::test]
async fn missing_fields_are_validation_errors() {
    let (store, product) = seeded("Fairy Wings", 3).await;
    let customer = AuthUser::customer(Uuid::new_v4());

    let mut payload = booking_request(product.id);
    payload.total_price = None;
    let err = booking_service::create_booking(&store, &customer, payload)
        .await
        .expect_err("missing price");
    assert!(matches!(err, AppError::Validation(_)));

    let err = booking_service::create_booking(&store, &customer, CreateBookingRequest::default())
        .await
        .expect_err("empty payload");
    assert!(matches!(err, AppError::Validation(_)));

    let mut reversed = booking_request(product.id);
    reversed.start_date = Some(day(2025, 6, 10));
    reversed.end_date = Some(day(2025, 6, 1));
    let err = booking_service::create_booking(&store, &customer, reversed)
        .await
        .expect_err("end before start");
    assert!(matches!(err, AppError::Validation(_)));

    assert_eq!(store.product(product.id).await.expect("product").stock, 3);
}

#[tokio::test]
async fn totals_must_fit_the_money_column() {
    let (store, product) = seeded("Pirate Hat", 3).await;
    let customer = AuthUser::customer(Uuid::new_v4());

    let mut fractional = booking_request(product.id);
    fractional.total_price = Some(Decimal::new(10_005, 3));
    let err = booking_service::create_booking(&store, &customer, fractional)
        .await
        .expect_err("sub-cent total");
    assert!(matches!(err, AppError::Validation(_)));

    let mut oversized = booking_request(product.id);
    oversized.total_price = Some(Decimal::from(10_000_000_000_i64));
    let err = booking_service::create_booking(&store, &customer, oversized)
        .await
        .expect_err("total over capacity");
    assert!(matches!(err, AppError::Validation(_)));

    assert_eq!(store.booking_count().await, 0);
    assert_eq!(store.product(product.id).await.expect("product").stock, 3);
}

#[tokio::test]
async fn unknown_product_is_not_found() {
    let (store, _) = seeded("Vampire Cape", 3).await;
    let customer = AuthUser::customer(Uuid::new_v4());

    let err = booking_service::create_booking(&store, &customer, booking_request(Uuid::new_v4()))
        .await
        .expect_err("unknown product");
    assert!(matches!(err, AppError::NotFound));
}

#[tokio::test]
async fn failed_insert_leaves_stock_untouched() {
    let (store, product) = seeded("Knight Armor", 2).await;
    let customer = AuthUser::customer(Uuid::new_v4());
    store.fail_booking_inserts(true);

    let err = booking_service::create_booking(&store, &customer, booking_request(product.id))
        .await
        .expect_err("injected failure");

    assert!(matches!(err, AppError::Internal(_)));
    assert_eq!(store.product(product.id).await.expect("product").stock, 2);
    assert_eq!(store.booking_count().await, 0);
}

#[tokio::test]
async fn cancelling_returns_stock_exactly_once() {
    let (store, product) = seeded("Ninja Suit", 1).await;
    let customer = AuthUser::customer(Uuid::new_v4());
    let admin = AuthUser::admin(Uuid::new_v4());

    let booking = booking_service::create_booking(&store, &customer, booking_request(product.id))
        .await
        .expect("create")
        .into_data()
        .expect("booking");
    assert_eq!(store.product(product.id).await.expect("product").stock, 0);

    for _ in 0..2 {
        let updated = booking_service::set_booking_status(&store, &admin, booking.id, status("CANCELLED"))
            .await
            .expect("cancel")
            .into_data()
            .expect("booking");
        assert_eq!(updated.status, BookingStatus::Cancelled);
    }

    assert_eq!(store.product(product.id).await.expect("product").stock, 1);
    let updates = store
        .audit_entries()
        .into_iter()
        .filter(|e| e.action == "booking_status_update")
        .count();
    assert_eq!(updates, 1);
}

#[tokio::test]
async fn full_lifecycle_returns_stock_on_completion() {
    let (store, product) = seeded("Clown Outfit", 1).await;
    let customer = AuthUser::customer(Uuid::new_v4());
    let admin = AuthUser::admin(Uuid::new_v4());

    let booking = booking_service::create_booking(&store, &customer, booking_request(product.id))
        .await
        .expect("create")
        .into_data()
        .expect("booking");

    for next in ["CONFIRMED", "ACTIVE", "COMPLETED"] {
        booking_service::set_booking_status(&store, &admin, booking.id, status(next))
            .await
            .expect("transition");
        let stock = store.product(product.id).await.expect("product").stock;
        assert_eq!(stock, if next == "COMPLETED" { 1 } else { 0 });
    }

    let err = booking_service::set_booking_status(&store, &admin, booking.id, status("CANCELLED"))
        .await
        .expect_err("terminal booking");
    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(store.product(product.id).await.expect("product").stock, 1);
    assert_eq!(
        store.booking(booking.id).await.expect("booking").status,
        BookingStatus::Completed
    );
}

#[tokio::test]
async fn only_admins_change_booking_status() {
    let (store, product) = seeded("Angel Halo", 2).await;
    let customer = AuthUser::customer(Uuid::new_v4());

    let booking = booking_service::create_booking(&store, &customer, booking_request(product.id))
        .await
        .expect("create")
        .into_data()
        .expect("booking");

    let err = booking_service::set_booking_status(&store, &customer, booking.id, status("CANCELLED"))
        .await
        .expect_err("customer cannot cancel via admin path");
    assert!(matches!(err, AppError::Forbidden));
    assert_eq!(store.product(product.id).await.expect("product").stock, 1);

    let admin = AuthUser::admin(Uuid::new_v4());
    let err = booking_service::set_booking_status(&store, &admin, booking.id, status("LOST"))
        .await
        .expect_err("unknown status");
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn customers_only_see_their_own_bookings() {
    let (store, product) = seeded("Zombie Rags", 5).await;
    let alice = AuthUser::customer(Uuid::new_v4());
    let bob = AuthUser::customer(Uuid::new_v4());
    let admin = AuthUser::admin(Uuid::new_v4());

    let booking = booking_service::create_booking(&store, &alice, booking_request(product.id))
        .await
        .expect("create")
        .into_data()
        .expect("booking");
    booking_service::create_booking(&store, &bob, booking_request(product.id))
        .await
        .expect("create");

    let mine = booking_service::list_my_bookings(&store, &alice, BookingListQuery::default())
        .await
        .expect("list");
    assert_eq!(mine.meta.as_ref().and_then(|m| m.total), Some(1));

    let err = booking_service::get_booking(&store, &bob, booking.id)
        .await
        .expect_err("not the owner");
    assert!(matches!(err, AppError::Forbidden));
    booking_service::get_booking(&store, &admin, booking.id)
        .await
        .expect("admin sees any booking");

    let err = booking_service::list_all_bookings(&store, &alice, BookingListQuery::default())
        .await
        .expect_err("customer cannot list all");
    assert!(matches!(err, AppError::Forbidden));

    let query = BookingListQuery {
        status: Some("pending".into()),
        ..Default::default()
    };
    let all = booking_service::list_all_bookings(&store, &admin, query)
        .await
        .expect("list all");
    assert_eq!(all.into_data().expect("list").items.len(), 2);
}

#[tokio::test]
async fn receipt_and_quotes_use_booking_data() {
    let (store, product) = seeded("Mermaid Tail", 2).await;
    let customer = AuthUser::customer(Uuid::new_v4());
    let admin = AuthUser::admin(Uuid::new_v4());

    let booking = booking_service::create_booking(&store, &customer, booking_request(product.id))
        .await
        .expect("create")
        .into_data()
        .expect("booking");

    let receipt = booking_service::receipt(&store, &customer, booking.id)
        .await
        .expect("receipt")
        .into_data()
        .expect("receipt");
    assert!(receipt.receipt_number.starts_with("RCP-"));
    assert_eq!(receipt.product_name_en, "Mermaid Tail");
    assert!(receipt.payment.is_none());

    // Starts 2025-06-01 and costs 300.
    let refund = booking_service::refund_quote(&store, &customer, booking.id, Some(day(2025, 5, 28)))
        .await
        .expect("refund quote")
        .into_data()
        .expect("quote");
    assert_eq!(refund.days_until_start, 4);
    assert_eq!(refund.refund.percent, 50);
    assert_eq!(refund.refund.amount, Decimal::from(150));

    // Ends 2025-06-03, product rents at 100 per day.
    let late = booking_service::late_fee_quote(&store, &admin, booking.id, Some(day(2025, 6, 5)))
        .await
        .expect("late fee quote")
        .into_data()
        .expect("quote");
    assert_eq!(late.days_late, 2);
    assert_eq!(late.late_fee.fee, Decimal::from(100));

    let err = booking_service::late_fee_quote(&store, &customer, booking.id, None)
        .await
        .expect_err("customers cannot quote late fees");
    assert!(matches!(err, AppError::Forbidden));
}
