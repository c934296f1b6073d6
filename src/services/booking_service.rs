use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    audit::{AuditEntry, log_audit},
    dto::bookings::{
        BookingList, CreateBookingRequest, LateFeeQuote, Receipt, RefundQuote,
        UpdateBookingStatusRequest,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, Capability, ensure_capability, ensure_owner_or_admin},
    models::{Booking, BookingStatus},
    pricing,
    response::{ApiResponse, Meta},
    routes::params::BookingListQuery,
    store::{BookingStore, InventoryStore, NewBooking, PaymentStore, Store, StoreTx},
};

/// Reserves one unit of the product for the calling customer.
///
/// The stock decrement and the booking insert share one transaction: if either
/// fails, neither is applied.
pub async fn create_booking<S: Store>(
    store: &S,
    user: &AuthUser,
    payload: CreateBookingRequest,
) -> AppResult<ApiResponse<Booking>> {
    let new_booking = validate_booking_request(user.user_id, payload)?;

    let tx = store.begin().await?;
    let product = tx
        .find_product(new_booking.product_id)
        .await?
        .ok_or(AppError::NotFound)?;

    if !product.is_available || product.stock < 1 {
        return Err(AppError::Unavailable(format!(
            "'{}' is out of stock",
            product.name_en
        )));
    }

    tx.adjust_stock(product.id, -1).await?;
    let booking = tx.create(new_booking).await?;
    tx.commit().await?;

    tracing::info!(
        booking_id = %booking.id,
        product_id = %booking.product_id,
        customer_id = %booking.customer_id,
        "booking created"
    );
    log_audit(
        store,
        AuditEntry::new(
            user.user_id,
            "booking_create",
            "bookings",
            serde_json::json!({ "booking_id": booking.id, "product_id": booking.product_id }),
        ),
    )
    .await;

    Ok(ApiResponse::success(
        "Booking created",
        booking,
        Some(Meta::empty()),
    ))
}

fn validate_booking_request(
    customer_id: Uuid,
    payload: CreateBookingRequest,
) -> AppResult<NewBooking> {
    let (Some(product_id), Some(start_date), Some(end_date), Some(total_days), Some(total_price)) = (
        payload.product_id,
        payload.start_date,
        payload.end_date,
        payload.total_days,
        payload.total_price,
    ) else {
        return Err(AppError::validation(
            "product_id, start_date, end_date, total_days and total_price are required",
        ));
    };

    if end_date < start_date {
        return Err(AppError::validation("end_date must not be before start_date"));
    }
    if total_days < 1 {
        return Err(AppError::validation("total_days must be at least 1"));
    }
    pricing::ensure_money(total_price, "total_price")?;

    Ok(NewBooking {
        customer_id,
        product_id,
        start_date,
        end_date,
        total_days,
        total_price,
        rules_accepted: payload.rules_accepted,
    })
}

/// Moves a booking to `next` inside an open transaction.
///
/// Returns the booking and whether anything changed. Re-applying the current
/// status is a no-op; leaving a terminal status is a conflict. Entering
/// CANCELLED or COMPLETED puts the unit back into stock.
pub(crate) async fn transition<T>(tx: &T, id: Uuid, next: BookingStatus) -> AppResult<(Booking, bool)>
where
    T: BookingStore + InventoryStore,
{
    let current = tx.find_by_id(id).await?.ok_or(AppError::NotFound)?;
    if current.status == next {
        return Ok((current, false));
    }
    if current.status.is_terminal() {
        return Err(AppError::Conflict(format!(
            "booking is already {}",
            current.status
        )));
    }

    let updated = tx.update_status(id, next).await?;
    if next.returns_stock() {
        tx.adjust_stock(updated.product_id, 1).await?;
    }
    tracing::debug!(booking_id = %id, from = %current.status, to = %next, "booking transitioned");
    Ok((updated, true))
}

pub async fn set_booking_status<S: Store>(
    store: &S,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateBookingStatusRequest,
) -> AppResult<ApiResponse<Booking>> {
    ensure_capability(user, Capability::ManageBookings)?;
    let status: BookingStatus = payload.status.parse()?;

    let tx = store.begin().await?;
    let (booking, changed) = transition(&tx, id, status).await?;
    tx.commit().await?;

    if changed {
        tracing::info!(booking_id = %booking.id, status = %booking.status, "booking status updated");
        log_audit(
            store,
            AuditEntry::new(
                user.user_id,
                "booking_status_update",
                "bookings",
                serde_json::json!({ "booking_id": booking.id, "status": booking.status }),
            ),
        )
        .await;
    }

    Ok(ApiResponse::success(
        "Booking updated",
        booking,
        Some(Meta::empty()),
    ))
}

fn status_filter(raw: Option<&String>) -> AppResult<Option<BookingStatus>> {
    raw.filter(|s| !s.trim().is_empty())
        .map(|s| s.parse::<BookingStatus>())
        .transpose()
}

pub async fn list_my_bookings<S: Store>(
    store: &S,
    user: &AuthUser,
    query: BookingListQuery,
) -> AppResult<ApiResponse<BookingList>> {
    let status = status_filter(query.status.as_ref())?;
    let page = query.page();

    let tx = store.begin().await?;
    let result = tx.list_by_customer(user.user_id, status, page).await?;

    Ok(ApiResponse::success(
        "Bookings",
        BookingList {
            items: result.items,
        },
        Some(Meta::for_page(&page, result.total)),
    ))
}

pub async fn list_all_bookings<S: Store>(
    store: &S,
    user: &AuthUser,
    query: BookingListQuery,
) -> AppResult<ApiResponse<BookingList>> {
    ensure_capability(user, Capability::ViewAllBookings)?;
    let status = status_filter(query.status.as_ref())?;
    let page = query.page();

    let tx = store.begin().await?;
    let result = tx.list_all(status, page).await?;

    Ok(ApiResponse::success(
        "Bookings",
        BookingList {
            items: result.items,
        },
        Some(Meta::for_page(&page, result.total)),
    ))
}

async fn visible_booking<T: BookingStore>(tx: &T, user: &AuthUser, id: Uuid) -> AppResult<Booking> {
    let booking = tx.find_by_id(id).await?.ok_or(AppError::NotFound)?;
    ensure_owner_or_admin(user, booking.customer_id)?;
    Ok(booking)
}

pub async fn get_booking<S: Store>(
    store: &S,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Booking>> {
    let tx = store.begin().await?;
    let booking = visible_booking(&tx, user, id).await?;
    Ok(ApiResponse::success("Booking", booking, Some(Meta::empty())))
}

pub async fn receipt<S: Store>(
    store: &S,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Receipt>> {
    let tx = store.begin().await?;
    let booking = visible_booking(&tx, user, id).await?;
    let product = tx
        .find_product(booking.product_id)
        .await?
        .ok_or(AppError::NotFound)?;
    let payment = tx.find_by_booking(booking.id).await?;

    let receipt = Receipt {
        receipt_number: receipt_number(&booking),
        product_name_en: product.name_en,
        product_name_id: product.name_id,
        price_per_day: product.price_per_day,
        payment: payment.map(Into::into),
        booking,
    };
    Ok(ApiResponse::success("Receipt", receipt, Some(Meta::empty())))
}

fn receipt_number(booking: &Booking) -> String {
    let date = booking.created_at.format("%Y%m%d");
    let suffix = booking.id.simple().to_string();
    format!("RCP-{}-{}", date, &suffix[..8].to_uppercase())
}

/// What the customer would get back if the booking were cancelled on `as_of`.
pub async fn refund_quote<S: Store>(
    store: &S,
    user: &AuthUser,
    id: Uuid,
    as_of: Option<NaiveDate>,
) -> AppResult<ApiResponse<RefundQuote>> {
    let tx = store.begin().await?;
    let booking = visible_booking(&tx, user, id).await?;

    let as_of = as_of.unwrap_or_else(|| Utc::now().date_naive());
    let days_until_start = pricing::days_between(as_of, booking.start_date);
    let quote = RefundQuote {
        booking_id: booking.id,
        as_of,
        days_until_start,
        refund: pricing::refund(days_until_start, booking.total_price)?,
    };
    Ok(ApiResponse::success("Refund quote", quote, Some(Meta::empty())))
}

/// Late-return charge for a booking returned on `returned_on`.
pub async fn late_fee_quote<S: Store>(
    store: &S,
    user: &AuthUser,
    id: Uuid,
    returned_on: Option<NaiveDate>,
) -> AppResult<ApiResponse<LateFeeQuote>> {
    ensure_capability(user, Capability::ManageBookings)?;

    let tx = store.begin().await?;
    let booking = tx.find_by_id(id).await?.ok_or(AppError::NotFound)?;
    let product = tx
        .find_product(booking.product_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let returned_on = returned_on.unwrap_or_else(|| Utc::now().date_naive());
    let days_late = pricing::days_between(booking.end_date, returned_on);
    let quote = LateFeeQuote {
        booking_id: booking.id,
        returned_on,
        days_late,
        late_fee: pricing::late_fee(days_late, product.price_per_day)?,
    };
    Ok(ApiResponse::success("Late fee quote", quote, Some(Meta::empty())))
}
