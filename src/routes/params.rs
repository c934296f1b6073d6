use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::store::{Page, ProductFilter};

/// Page number defaults to 1, page size to 20 (capped at 100).
pub fn normalize_page(page: Option<i64>, per_page: Option<i64>) -> Page {
    Page::new(page.unwrap_or(1), per_page.unwrap_or(20))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProductSortBy {
    CreatedAt,
    Price,
    Name,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ProductQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub q: Option<String>,
    pub category_id: Option<Uuid>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub available: Option<bool>,
    pub sort_by: Option<ProductSortBy>,
    pub sort_order: Option<SortOrder>,
}

impl ProductQuery {
    pub fn into_filter(self) -> (ProductFilter, Page) {
        let page = normalize_page(self.page, self.per_page);
        let filter = ProductFilter {
            q: self.q,
            category_id: self.category_id,
            min_price: self.min_price,
            max_price: self.max_price,
            available_only: self.available.unwrap_or(false),
            sort_by: self.sort_by,
            sort_order: self.sort_order,
        };
        (filter, page)
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct BookingListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    /// One of PENDING, CONFIRMED, ACTIVE, COMPLETED, CANCELLED.
    pub status: Option<String>,
}

impl BookingListQuery {
    pub fn page(&self) -> Page {
        normalize_page(self.page, self.per_page)
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LowStockQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub threshold: Option<i32>,
}

impl LowStockQuery {
    pub fn page(&self) -> Page {
        normalize_page(self.page, self.per_page)
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AsOfQuery {
    /// Reference day, defaults to today (UTC).
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReturnedOnQuery {
    /// Day the costume came back, defaults to today (UTC).
    pub returned_on: Option<NaiveDate>,
}
