use chrono::Utc;
use uuid::Uuid;

use crate::{
    audit::{AuditEntry, log_audit},
    dto::payments::{PaymentVerification, SubmitPaymentRequest, UpdatePaymentStatusRequest},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, Capability, ensure_capability, ensure_owner_or_admin},
    models::{Payment, PaymentStatus},
    pricing,
    response::{ApiResponse, Meta},
    services::events::{DomainEvent, dispatch},
    store::{BookingStore, PaymentStore, PaymentSubmission, Store, StoreTx},
};

/// Records (or replaces) the proof of payment for a booking.
///
/// A resubmission overwrites the previous proof and sends the payment back to
/// PENDING for another verification round.
pub async fn submit_payment<S: Store>(
    store: &S,
    user: &AuthUser,
    booking_id: Uuid,
    payload: SubmitPaymentRequest,
) -> AppResult<ApiResponse<Payment>> {
    let amount = payload
        .amount
        .ok_or_else(|| AppError::validation("amount is required"))?;
    pricing::ensure_money(amount, "amount")?;
    let proof_image_url = payload
        .proof_image_url
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .ok_or_else(|| AppError::validation("proof_image_url is required"))?;

    let tx = store.begin().await?;
    let booking = tx.find_by_id(booking_id).await?.ok_or(AppError::NotFound)?;
    ensure_owner_or_admin(user, booking.customer_id)?;

    let resubmitted = tx.find_by_booking(booking_id).await?.is_some();
    let payment = tx
        .upsert(PaymentSubmission {
            booking_id,
            customer_id: booking.customer_id,
            amount,
            proof_image_url,
            bank_name: payload.bank_name,
            account_number: payload.account_number,
        })
        .await?;
    tx.commit().await?;

    tracing::info!(payment_id = %payment.id, %booking_id, resubmitted, "payment proof submitted");
    log_audit(
        store,
        AuditEntry::new(
            user.user_id,
            if resubmitted { "payment_resubmit" } else { "payment_submit" },
            "payments",
            serde_json::json!({ "payment_id": payment.id, "booking_id": booking_id }),
        ),
    )
    .await;

    let message = if resubmitted {
        "Payment proof replaced"
    } else {
        "Payment proof submitted"
    };
    Ok(ApiResponse::success(message, payment, Some(Meta::empty())))
}

pub async fn set_payment_status<S: Store>(
    store: &S,
    user: &AuthUser,
    payment_id: Uuid,
    payload: UpdatePaymentStatusRequest,
) -> AppResult<ApiResponse<PaymentVerification>> {
    ensure_capability(user, Capability::VerifyPayments)?;
    let status: PaymentStatus = payload.status.parse()?;

    let tx = store.begin().await?;
    let current = tx.find_payment(payment_id).await?.ok_or(AppError::NotFound)?;

    let verified_at = status.is_verified().then(Utc::now);
    let payment = tx
        .update_payment_status(payment_id, status, verified_at)
        .await?;

    let confirmed_booking = if status == PaymentStatus::Approved
        && current.status != PaymentStatus::Approved
    {
        let event = DomainEvent::PaymentApproved {
            payment_id,
            booking_id: payment.booking_id,
        };
        dispatch(&tx, event).await?
    } else {
        None
    };
    tx.commit().await?;

    tracing::info!(%payment_id, status = %payment.status, "payment status updated");
    log_audit(
        store,
        AuditEntry::new(
            user.user_id,
            "payment_status_update",
            "payments",
            serde_json::json!({ "payment_id": payment_id, "status": payment.status }),
        ),
    )
    .await;

    Ok(ApiResponse::success(
        "Payment updated",
        PaymentVerification {
            payment,
            confirmed_booking,
        },
        Some(Meta::empty()),
    ))
}

pub async fn get_payment_for_booking<S: Store>(
    store: &S,
    user: &AuthUser,
    booking_id: Uuid,
) -> AppResult<ApiResponse<Payment>> {
    let tx = store.begin().await?;
    let booking = tx.find_by_id(booking_id).await?.ok_or(AppError::NotFound)?;
    ensure_owner_or_admin(user, booking.customer_id)?;

    let payment = tx
        .find_by_booking(booking_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Payment", payment, Some(Meta::empty())))
}
