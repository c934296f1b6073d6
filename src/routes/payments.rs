use axum::{
    Json, Router,
    extract::{Path, State},
    routing::patch,
};
use uuid::Uuid;

use crate::{
    dto::payments::{PaymentVerification, UpdatePaymentStatusRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::payment_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/{id}/status", patch(update_payment_status))
}

#[utoipa::path(
    patch,
    path = "/api/payments/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Payment ID")
    ),
    request_body = UpdatePaymentStatusRequest,
    responses(
        (status = 200, description = "Payment verified; approving confirms a pending booking", body = ApiResponse<PaymentVerification>),
        (status = 400, description = "Invalid status"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn update_payment_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePaymentStatusRequest>,
) -> AppResult<Json<ApiResponse<PaymentVerification>>> {
    let resp = payment_service::set_payment_status(&state.store, &user, id, payload).await?;
    Ok(Json(resp))
}
