use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Product;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name_en: String,
    /// Falls back to `name_en` when absent.
    pub name_id: Option<String>,
    pub description_en: Option<String>,
    pub description_id: Option<String>,
    pub category_id: Option<Uuid>,
    pub price_per_day: Decimal,
    pub stock: i32,
    pub is_available: Option<bool>,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name_en: Option<String>,
    pub name_id: Option<String>,
    pub description_en: Option<String>,
    pub description_id: Option<String>,
    pub category_id: Option<Uuid>,
    pub price_per_day: Option<Decimal>,
    pub stock: Option<i32>,
    pub is_available: Option<bool>,
    pub images: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct InventoryAdjustRequest {
    pub delta: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}
