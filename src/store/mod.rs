//! Persistence seams of the rental engine.
//!
//! Services never talk to a database directly: they open a transaction from a
//! [`Store`], read and write through the entity traits, and commit. Dropping a
//! transaction without committing discards every write made through it, so a
//! multi-step operation either lands completely or not at all.
//!
//! Single-row reads inside a transaction (`find_product`, `find_by_id`,
//! `find_payment`, `find_by_booking`) hold the row until commit, which is what
//! makes read-check-write sequences such as status transitions race-free.

use std::future::Future;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    audit::AuditEntry,
    error::AppResult,
    models::{Booking, BookingStatus, Category, Payment, PaymentStatus, Product},
    routes::params::{ProductSortBy, SortOrder},
};

pub mod memory;
pub mod sea;

pub use memory::MemoryStore;
pub use sea::SeaStore;

/// A normalized page request; `number` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: i64,
    pub per_page: i64,
}

pub const MAX_PER_PAGE: i64 = 100;

impl Page {
    pub fn new(number: i64, per_page: i64) -> Self {
        Self {
            number: number.clamp(1, i64::MAX / MAX_PER_PAGE),
            per_page: per_page.clamp(1, MAX_PER_PAGE),
        }
    }

    pub fn offset(&self) -> u64 {
        (self.number - 1).saturating_mul(self.per_page) as u64
    }

    pub fn limit(&self) -> u64 {
        self.per_page as u64
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(1, 20)
    }
}

#[derive(Debug, Clone)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total: u64,
}

#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub q: Option<String>,
    pub category_id: Option<Uuid>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub available_only: bool,
    pub sort_by: Option<ProductSortBy>,
    pub sort_order: Option<SortOrder>,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name_en: String,
    pub name_id: String,
    pub description_en: Option<String>,
    pub description_id: Option<String>,
    pub category_id: Option<Uuid>,
    pub price_per_day: Decimal,
    pub stock: i32,
    pub is_available: bool,
    pub images: Vec<String>,
}

/// Partial product update; `None` leaves a field untouched, `Some(images)`
/// replaces the whole image list.
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
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

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name_en: String,
    pub name_id: String,
    pub slug: String,
}

#[derive(Debug, Clone)]
pub struct NewBooking {
    pub customer_id: Uuid,
    pub product_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_days: i32,
    pub total_price: Decimal,
    pub rules_accepted: bool,
}

/// Proof-of-payment fields written by a (re)submission.
#[derive(Debug, Clone)]
pub struct PaymentSubmission {
    pub booking_id: Uuid,
    pub customer_id: Uuid,
    pub amount: Decimal,
    pub proof_image_url: String,
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
}

pub trait InventoryStore: Send + Sync {
    fn find_product(&self, id: Uuid) -> impl Future<Output = AppResult<Option<Product>>> + Send;

    /// Adds `delta` to the product's stock as one atomic update.
    ///
    /// Fails with `NotFound` if the product is absent and with `Unavailable`
    /// if the stock would drop below zero; the stock is unchanged in both cases.
    fn adjust_stock(&self, id: Uuid, delta: i32)
    -> impl Future<Output = AppResult<Product>> + Send;

    fn list_products(
        &self,
        filter: &ProductFilter,
        page: Page,
    ) -> impl Future<Output = AppResult<Paged<Product>>> + Send;

    /// Products with `stock <= threshold`, lowest stock first.
    fn list_low_stock(
        &self,
        threshold: i32,
        page: Page,
    ) -> impl Future<Output = AppResult<Paged<Product>>> + Send;

    fn insert_product(&self, product: NewProduct)
    -> impl Future<Output = AppResult<Product>> + Send;

    fn update_product(
        &self,
        id: Uuid,
        changes: ProductChanges,
    ) -> impl Future<Output = AppResult<Product>> + Send;

    /// Removes the product and its images.
    fn delete_product(&self, id: Uuid) -> impl Future<Output = AppResult<()>> + Send;
}

pub trait CategoryStore: Send + Sync {
    /// Fails with `Conflict` when the slug is taken.
    fn insert_category(
        &self,
        category: NewCategory,
    ) -> impl Future<Output = AppResult<Category>> + Send;

    fn find_category(&self, id: Uuid) -> impl Future<Output = AppResult<Option<Category>>> + Send;

    fn list_categories(&self) -> impl Future<Output = AppResult<Vec<Category>>> + Send;

    fn delete_category(&self, id: Uuid) -> impl Future<Output = AppResult<()>> + Send;
}

pub trait BookingStore: Send + Sync {
    fn create(&self, booking: NewBooking) -> impl Future<Output = AppResult<Booking>> + Send;

    fn find_by_id(&self, id: Uuid) -> impl Future<Output = AppResult<Option<Booking>>> + Send;

    fn update_status(
        &self,
        id: Uuid,
        status: BookingStatus,
    ) -> impl Future<Output = AppResult<Booking>> + Send;

    fn list_by_customer(
        &self,
        customer_id: Uuid,
        status: Option<BookingStatus>,
        page: Page,
    ) -> impl Future<Output = AppResult<Paged<Booking>>> + Send;

    fn list_all(
        &self,
        status: Option<BookingStatus>,
        page: Page,
    ) -> impl Future<Output = AppResult<Paged<Booking>>> + Send;
}

pub trait PaymentStore: Send + Sync {
    fn find_by_booking(
        &self,
        booking_id: Uuid,
    ) -> impl Future<Output = AppResult<Option<Payment>>> + Send;

    fn find_payment(&self, id: Uuid) -> impl Future<Output = AppResult<Option<Payment>>> + Send;

    /// Creates the booking's payment, or overwrites the existing one and puts
    /// it back to `PENDING` with no verification time.
    ///
    /// A concurrent first submission for the same booking fails with `Conflict`.
    fn upsert(&self, submission: PaymentSubmission)
    -> impl Future<Output = AppResult<Payment>> + Send;

    fn update_payment_status(
        &self,
        id: Uuid,
        status: PaymentStatus,
        verified_at: Option<DateTime<Utc>>,
    ) -> impl Future<Output = AppResult<Payment>> + Send;
}

/// One unit of work over every entity store.
pub trait StoreTx: InventoryStore + CategoryStore + BookingStore + PaymentStore + Sized {
    fn commit(self) -> impl Future<Output = AppResult<()>> + Send;
}

pub trait Store: Send + Sync {
    type Tx: StoreTx;

    fn begin(&self) -> impl Future<Output = AppResult<Self::Tx>> + Send;

    fn record_audit(&self, entry: AuditEntry) -> impl Future<Output = AppResult<()>> + Send;
}
