use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Booking, Payment};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SubmitPaymentRequest {
    pub amount: Option<Decimal>,
    /// Reference returned by the media store for the uploaded transfer proof.
    pub proof_image_url: Option<String>,
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePaymentStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentVerification {
    pub payment: Payment,
    /// The booking, when approval moved it to CONFIRMED.
    pub confirmed_booking: Option<Booking>,
}
