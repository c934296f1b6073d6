use axum::Router;

use crate::state::AppState;

pub mod admin;
pub mod bookings;
pub mod categories;
pub mod doc;
pub mod health;
pub mod params;
pub mod payments;
pub mod pricing;
pub mod products;

// State is bound once at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/products", products::router())
        .nest("/categories", categories::router())
        .nest("/bookings", bookings::router())
        .nest("/payments", payments::router())
        .nest("/pricing", pricing::router())
        .nest("/admin", admin::router())
}
