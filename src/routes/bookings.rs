use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::{
        bookings::{BookingList, CreateBookingRequest, Receipt, RefundQuote},
        payments::SubmitPaymentRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Booking, Payment},
    response::ApiResponse,
    routes::params::{AsOfQuery, BookingListQuery},
    services::{booking_service, payment_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_my_bookings).post(create_booking))
        .route("/{id}", get(get_booking))
        .route("/{id}/receipt", get(get_receipt))
        .route("/{id}/refund-quote", get(refund_quote))
        .route("/{id}/payment", get(get_payment).post(submit_payment))
}

#[utoipa::path(
    post,
    path = "/api/bookings",
    request_body = CreateBookingRequest,
    responses(
        (status = 200, description = "Booking created", body = ApiResponse<Booking>),
        (status = 400, description = "Missing or invalid field"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Product not found"),
        (status = 422, description = "Product out of stock"),
    ),
    security(("bearer_auth" = [])),
    tag = "Bookings"
)]
pub async fn create_booking(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateBookingRequest>,
) -> AppResult<Json<ApiResponse<Booking>>> {
    let resp = booking_service::create_booking(&state.store, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/bookings",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "Filter by status")
    ),
    responses(
        (status = 200, description = "Bookings of the caller, newest first", body = ApiResponse<BookingList>),
        (status = 400, description = "Unknown status"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Bookings"
)]
pub async fn list_my_bookings(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<BookingListQuery>,
) -> AppResult<Json<ApiResponse<BookingList>>> {
    let resp = booking_service::list_my_bookings(&state.store, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/bookings/{id}",
    params(
        ("id" = Uuid, Path, description = "Booking ID")
    ),
    responses(
        (status = 200, description = "Get booking", body = ApiResponse<Booking>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Bookings"
)]
pub async fn get_booking(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Booking>>> {
    let resp = booking_service::get_booking(&state.store, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/bookings/{id}/receipt",
    params(
        ("id" = Uuid, Path, description = "Booking ID")
    ),
    responses(
        (status = 200, description = "Printable receipt", body = ApiResponse<Receipt>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Bookings"
)]
pub async fn get_receipt(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Receipt>>> {
    let resp = booking_service::receipt(&state.store, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/bookings/{id}/refund-quote",
    params(
        ("id" = Uuid, Path, description = "Booking ID"),
        AsOfQuery
    ),
    responses(
        (status = 200, description = "Refund if cancelled on the given day", body = ApiResponse<RefundQuote>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Bookings"
)]
pub async fn refund_quote(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Query(query): Query<AsOfQuery>,
) -> AppResult<Json<ApiResponse<RefundQuote>>> {
    let resp = booking_service::refund_quote(&state.store, &user, id, query.as_of).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/bookings/{id}/payment",
    params(
        ("id" = Uuid, Path, description = "Booking ID")
    ),
    request_body = SubmitPaymentRequest,
    responses(
        (status = 200, description = "Payment proof stored, awaiting verification", body = ApiResponse<Payment>),
        (status = 400, description = "Missing amount or proof"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Booking not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn submit_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SubmitPaymentRequest>,
) -> AppResult<Json<ApiResponse<Payment>>> {
    let resp = payment_service::submit_payment(&state.store, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/bookings/{id}/payment",
    params(
        ("id" = Uuid, Path, description = "Booking ID")
    ),
    responses(
        (status = 200, description = "Payment for the booking", body = ApiResponse<Payment>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "No payment submitted"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn get_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Payment>>> {
    let resp = payment_service::get_payment_for_booking(&state.store, &user, id).await?;
    Ok(Json(resp))
}
