//! Cross-store reactions to domain events.
//!
//! Services raise events inside their own transaction and hand them to
//! [`dispatch`], so the reaction commits or rolls back together with the
//! write that caused it.

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Booking, BookingStatus},
    services::booking_service::transition,
    store::{BookingStore, InventoryStore},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainEvent {
    /// A payment entered APPROVED from another status.
    PaymentApproved { payment_id: Uuid, booking_id: Uuid },
}

/// Applies the event's side effects; returns the booking it changed, if any.
pub async fn dispatch<T>(tx: &T, event: DomainEvent) -> AppResult<Option<Booking>>
where
    T: BookingStore + InventoryStore,
{
    match event {
        DomainEvent::PaymentApproved {
            payment_id,
            booking_id,
        } => confirm_booking(tx, payment_id, booking_id).await,
    }
}

async fn confirm_booking<T>(tx: &T, payment_id: Uuid, booking_id: Uuid) -> AppResult<Option<Booking>>
where
    T: BookingStore + InventoryStore,
{
    let booking = tx.find_by_id(booking_id).await?.ok_or(AppError::NotFound)?;
    if booking.status != BookingStatus::Pending {
        tracing::info!(
            %payment_id,
            %booking_id,
            status = %booking.status,
            "payment approved for a booking past PENDING; status kept"
        );
        return Ok(None);
    }

    let (booking, _) = transition(tx, booking_id, BookingStatus::Confirmed).await?;
    tracing::info!(%payment_id, %booking_id, "booking confirmed by payment approval");
    Ok(Some(booking))
}
