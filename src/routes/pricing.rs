use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::pricing::{LateFeeQuery, RefundQuery, RentalQuote, RentalQuoteQuery},
    error::AppResult,
    pricing::{self, LateFee, Refund},
    response::{ApiResponse, Meta},
    services::catalog_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/late-fee", get(late_fee))
        .route("/refund", get(refund))
        .route("/quote", get(rental_quote))
}

#[utoipa::path(
    get,
    path = "/api/pricing/late-fee",
    params(LateFeeQuery),
    responses(
        (status = 200, description = "Late-return fee and rate (-1 means full replacement)", body = ApiResponse<LateFee>),
        (status = 400, description = "Invalid amount"),
    ),
    tag = "Pricing"
)]
pub async fn late_fee(Query(query): Query<LateFeeQuery>) -> AppResult<Json<ApiResponse<LateFee>>> {
    pricing::ensure_money(query.price_per_day, "price_per_day")?;
    let fee = pricing::late_fee(query.days_late, query.price_per_day)?;
    Ok(Json(ApiResponse::success(
        "Late fee",
        fee,
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    get,
    path = "/api/pricing/refund",
    params(RefundQuery),
    responses(
        (status = 200, description = "Cancellation refund", body = ApiResponse<Refund>),
        (status = 400, description = "Invalid amount"),
    ),
    tag = "Pricing"
)]
pub async fn refund(Query(query): Query<RefundQuery>) -> AppResult<Json<ApiResponse<Refund>>> {
    pricing::ensure_money(query.total_price, "total_price")?;
    let refund = pricing::refund(query.days_until_start, query.total_price)?;
    Ok(Json(ApiResponse::success(
        "Refund",
        refund,
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    get,
    path = "/api/pricing/quote",
    params(RentalQuoteQuery),
    responses(
        (status = 200, description = "Rental length and price for a product", body = ApiResponse<RentalQuote>),
        (status = 400, description = "End date before start date"),
        (status = 404, description = "Product not found"),
    ),
    tag = "Pricing"
)]
pub async fn rental_quote(
    State(state): State<AppState>,
    Query(query): Query<RentalQuoteQuery>,
) -> AppResult<Json<ApiResponse<RentalQuote>>> {
    let resp = catalog_service::quote_rental(&state.store, query).await?;
    Ok(Json(resp))
}
