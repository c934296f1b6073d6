use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    models::{Booking, Payment, PaymentStatus},
    pricing::{LateFee, Refund},
};

/// Every field is optional on the wire so that a missing one is reported as a
/// validation error rather than a deserialization failure.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateBookingRequest {
    pub product_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub total_days: Option<i32>,
    pub total_price: Option<Decimal>,
    #[serde(default)]
    pub rules_accepted: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBookingStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookingList {
    pub items: Vec<Booking>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentSummary {
    pub id: Uuid,
    pub amount: Decimal,
    pub status: PaymentStatus,
    pub bank_name: Option<String>,
}

impl From<Payment> for PaymentSummary {
    fn from(payment: Payment) -> Self {
        Self {
            id: payment.id,
            amount: payment.amount,
            status: payment.status,
            bank_name: payment.bank_name,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Receipt {
    pub receipt_number: String,
    pub booking: Booking,
    pub product_name_en: String,
    pub product_name_id: String,
    pub price_per_day: Decimal,
    pub payment: Option<PaymentSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RefundQuote {
    pub booking_id: Uuid,
    pub as_of: NaiveDate,
    pub days_until_start: i64,
    pub refund: Refund,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LateFeeQuote {
    pub booking_id: Uuid,
    pub returned_on: NaiveDate,
    pub days_late: i64,
    pub late_fee: LateFee,
}
