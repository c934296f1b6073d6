//! In-process store used by tests and local experiments.
//!
//! A transaction takes the table lock for its whole lifetime and works on a
//! private copy, which replaces the shared tables only on commit. Transactions
//! are therefore fully serialized.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::{
    audit::AuditEntry,
    error::{AppError, AppResult},
    models::{Booking, BookingStatus, Category, Payment, PaymentStatus, Product},
    routes::params::{ProductSortBy, SortOrder},
};

use super::{
    BookingStore, CategoryStore, InventoryStore, NewBooking, NewCategory, NewProduct, Page, Paged,
    PaymentStore, PaymentSubmission, ProductChanges, ProductFilter, Store, StoreTx,
};

#[derive(Debug, Clone, Default)]
struct Tables {
    categories: HashMap<Uuid, Category>,
    products: HashMap<Uuid, Product>,
    bookings: HashMap<Uuid, Booking>,
    payments: HashMap<Uuid, Payment>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<AsyncMutex<Tables>>,
    audit: Arc<Mutex<Vec<AuditEntry>>>,
    fail_booking_inserts: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent booking insert fail, to exercise rollback paths.
    pub fn fail_booking_inserts(&self, fail: bool) {
        self.fail_booking_inserts.store(fail, Ordering::SeqCst);
    }

    pub async fn seed_product(&self, product: NewProduct) -> AppResult<Product> {
        let tx = self.begin().await?;
        let product = tx.insert_product(product).await?;
        tx.commit().await?;
        Ok(product)
    }

    pub async fn product(&self, id: Uuid) -> Option<Product> {
        self.tables.lock().await.products.get(&id).cloned()
    }

    pub async fn booking(&self, id: Uuid) -> Option<Booking> {
        self.tables.lock().await.bookings.get(&id).cloned()
    }

    pub async fn booking_count(&self) -> usize {
        self.tables.lock().await.bookings.len()
    }

    pub fn audit_entries(&self) -> Vec<AuditEntry> {
        match self.audit.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Store for MemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> AppResult<MemoryTx> {
        let guard = Arc::clone(&self.tables).lock_owned().await;
        let work = Mutex::new((*guard).clone());
        Ok(MemoryTx {
            guard,
            work,
            fail_booking_inserts: self.fail_booking_inserts.load(Ordering::SeqCst),
        })
    }

    async fn record_audit(&self, entry: AuditEntry) -> AppResult<()> {
        self.audit
            .lock()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("audit log lock poisoned")))?
            .push(entry);
        Ok(())
    }
}

pub struct MemoryTx {
    guard: OwnedMutexGuard<Tables>,
    work: Mutex<Tables>,
    fail_booking_inserts: bool,
}

impl MemoryTx {
    fn with<R>(&self, f: impl FnOnce(&mut Tables) -> AppResult<R>) -> AppResult<R> {
        let mut tables = self
            .work
            .lock()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("memory store lock poisoned")))?;
        f(&mut tables)
    }
}

impl StoreTx for MemoryTx {
    async fn commit(self) -> AppResult<()> {
        let MemoryTx {
            mut guard, work, ..
        } = self;
        *guard = work
            .into_inner()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("memory store lock poisoned")))?;
        Ok(())
    }
}

fn paginate<T>(items: Vec<T>, page: Page) -> Paged<T> {
    let total = items.len() as u64;
    let items = items
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .collect();
    Paged { items, total }
}

fn newest_first(
    a_created: DateTime<Utc>,
    a_id: Uuid,
    b_created: DateTime<Utc>,
    b_id: Uuid,
) -> std::cmp::Ordering {
    b_created.cmp(&a_created).then(a_id.cmp(&b_id))
}

fn matches_filter(product: &Product, filter: &ProductFilter) -> bool {
    if let Some(q) = filter.q.as_ref().filter(|s| !s.is_empty()) {
        let needle = q.to_lowercase();
        let hit = [
            Some(&product.name_en),
            Some(&product.name_id),
            product.description_en.as_ref(),
            product.description_id.as_ref(),
        ]
        .into_iter()
        .flatten()
        .any(|text| text.to_lowercase().contains(&needle));
        if !hit {
            return false;
        }
    }
    if filter.category_id.is_some() && product.category_id != filter.category_id {
        return false;
    }
    if filter.min_price.is_some_and(|min| product.price_per_day < min) {
        return false;
    }
    if filter.max_price.is_some_and(|max| product.price_per_day > max) {
        return false;
    }
    !filter.available_only || (product.is_available && product.stock > 0)
}

impl InventoryStore for MemoryTx {
    async fn find_product(&self, id: Uuid) -> AppResult<Option<Product>> {
        self.with(|t| Ok(t.products.get(&id).cloned()))
    }

    async fn adjust_stock(&self, id: Uuid, delta: i32) -> AppResult<Product> {
        self.with(|t| {
            let product = t.products.get_mut(&id).ok_or(AppError::NotFound)?;
            let stock = product.stock + delta;
            if stock < 0 {
                return Err(AppError::Unavailable("insufficient stock".into()));
            }
            product.stock = stock;
            Ok(product.clone())
        })
    }

    async fn list_products(&self, filter: &ProductFilter, page: Page) -> AppResult<Paged<Product>> {
        self.with(|t| {
            let mut items: Vec<Product> = t
                .products
                .values()
                .filter(|p| matches_filter(p, filter))
                .cloned()
                .collect();
            let sort_by = filter.sort_by.unwrap_or(ProductSortBy::CreatedAt);
            items.sort_by(|a, b| {
                let ascending = match sort_by {
                    ProductSortBy::CreatedAt => a.created_at.cmp(&b.created_at),
                    ProductSortBy::Price => a.price_per_day.cmp(&b.price_per_day),
                    ProductSortBy::Name => a.name_en.cmp(&b.name_en),
                };
                let ordered = match filter.sort_order.unwrap_or(SortOrder::Desc) {
                    SortOrder::Asc => ascending,
                    SortOrder::Desc => ascending.reverse(),
                };
                ordered.then(a.id.cmp(&b.id))
            });
            Ok(paginate(items, page))
        })
    }

    async fn list_low_stock(&self, threshold: i32, page: Page) -> AppResult<Paged<Product>> {
        self.with(|t| {
            let mut items: Vec<Product> = t
                .products
                .values()
                .filter(|p| p.stock <= threshold)
                .cloned()
                .collect();
            items.sort_by(|a, b| {
                a.stock
                    .cmp(&b.stock)
                    .then_with(|| newest_first(a.created_at, a.id, b.created_at, b.id))
            });
            Ok(paginate(items, page))
        })
    }

    async fn insert_product(&self, product: NewProduct) -> AppResult<Product> {
        self.with(|t| {
            if t.products.values().any(|p| p.name_en == product.name_en) {
                return Err(AppError::Conflict(format!(
                    "product '{}' already exists",
                    product.name_en
                )));
            }
            let created = Product {
                id: Uuid::new_v4(),
                name_en: product.name_en,
                name_id: product.name_id,
                description_en: product.description_en,
                description_id: product.description_id,
                category_id: product.category_id,
                price_per_day: product.price_per_day,
                stock: product.stock,
                is_available: product.is_available,
                images: product.images,
                created_at: Utc::now(),
            };
            t.products.insert(created.id, created.clone());
            Ok(created)
        })
    }

    async fn update_product(&self, id: Uuid, changes: ProductChanges) -> AppResult<Product> {
        self.with(|t| {
            let product = t.products.get_mut(&id).ok_or(AppError::NotFound)?;
            if let Some(name_en) = changes.name_en {
                product.name_en = name_en;
            }
            if let Some(name_id) = changes.name_id {
                product.name_id = name_id;
            }
            if let Some(description) = changes.description_en {
                product.description_en = Some(description);
            }
            if let Some(description) = changes.description_id {
                product.description_id = Some(description);
            }
            if let Some(category_id) = changes.category_id {
                product.category_id = Some(category_id);
            }
            if let Some(price) = changes.price_per_day {
                product.price_per_day = price;
            }
            if let Some(stock) = changes.stock {
                product.stock = stock;
            }
            if let Some(is_available) = changes.is_available {
                product.is_available = is_available;
            }
            if let Some(images) = changes.images {
                product.images = images;
            }
            Ok(product.clone())
        })
    }

    async fn delete_product(&self, id: Uuid) -> AppResult<()> {
        self.with(|t| {
            if !t.products.contains_key(&id) {
                return Err(AppError::NotFound);
            }
            if t.bookings.values().any(|b| b.product_id == id) {
                return Err(AppError::Conflict("product has bookings".into()));
            }
            t.products.remove(&id);
            Ok(())
        })
    }
}

impl CategoryStore for MemoryTx {
    async fn insert_category(&self, category: NewCategory) -> AppResult<Category> {
        self.with(|t| {
            if t.categories.values().any(|c| c.slug == category.slug) {
                return Err(AppError::Conflict(format!(
                    "category slug '{}' already exists",
                    category.slug
                )));
            }
            let created = Category {
                id: Uuid::new_v4(),
                name_en: category.name_en,
                name_id: category.name_id,
                slug: category.slug,
                created_at: Utc::now(),
            };
            t.categories.insert(created.id, created.clone());
            Ok(created)
        })
    }

    async fn find_category(&self, id: Uuid) -> AppResult<Option<Category>> {
        self.with(|t| Ok(t.categories.get(&id).cloned()))
    }

    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        self.with(|t| {
            let mut items: Vec<Category> = t.categories.values().cloned().collect();
            items.sort_by(|a, b| a.name_en.cmp(&b.name_en));
            Ok(items)
        })
    }

    async fn delete_category(&self, id: Uuid) -> AppResult<()> {
        self.with(|t| {
            t.categories.remove(&id).ok_or(AppError::NotFound)?;
            for product in t.products.values_mut() {
                if product.category_id == Some(id) {
                    product.category_id = None;
                }
            }
            Ok(())
        })
    }
}

impl BookingStore for MemoryTx {
    async fn create(&self, booking: NewBooking) -> AppResult<Booking> {
        if self.fail_booking_inserts {
            return Err(AppError::Internal(anyhow::anyhow!(
                "booking insert failed (injected)"
            )));
        }
        self.with(|t| {
            if !t.products.contains_key(&booking.product_id) {
                return Err(AppError::NotFound);
            }
            let now = Utc::now();
            let created = Booking {
                id: Uuid::new_v4(),
                customer_id: booking.customer_id,
                product_id: booking.product_id,
                start_date: booking.start_date,
                end_date: booking.end_date,
                total_days: booking.total_days,
                total_price: booking.total_price,
                rules_accepted: booking.rules_accepted,
                status: BookingStatus::Pending,
                created_at: now,
                updated_at: now,
            };
            t.bookings.insert(created.id, created.clone());
            Ok(created)
        })
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Booking>> {
        self.with(|t| Ok(t.bookings.get(&id).cloned()))
    }

    async fn update_status(&self, id: Uuid, status: BookingStatus) -> AppResult<Booking> {
        self.with(|t| {
            let booking = t.bookings.get_mut(&id).ok_or(AppError::NotFound)?;
            booking.status = status;
            booking.updated_at = Utc::now();
            Ok(booking.clone())
        })
    }

    async fn list_by_customer(
        &self,
        customer_id: Uuid,
        status: Option<BookingStatus>,
        page: Page,
    ) -> AppResult<Paged<Booking>> {
        self.with(|t| {
            let mut items: Vec<Booking> = t
                .bookings
                .values()
                .filter(|b| b.customer_id == customer_id)
                .filter(|b| status.is_none_or(|s| b.status == s))
                .cloned()
                .collect();
            items.sort_by(|a, b| newest_first(a.created_at, a.id, b.created_at, b.id));
            Ok(paginate(items, page))
        })
    }

    async fn list_all(&self, status: Option<BookingStatus>, page: Page) -> AppResult<Paged<Booking>> {
        self.with(|t| {
            let mut items: Vec<Booking> = t
                .bookings
                .values()
                .filter(|b| status.is_none_or(|s| b.status == s))
                .cloned()
                .collect();
            items.sort_by(|a, b| newest_first(a.created_at, a.id, b.created_at, b.id));
            Ok(paginate(items, page))
        })
    }
}

impl PaymentStore for MemoryTx {
    async fn find_by_booking(&self, booking_id: Uuid) -> AppResult<Option<Payment>> {
        self.with(|t| {
            Ok(t.payments
                .values()
                .find(|p| p.booking_id == booking_id)
                .cloned())
        })
    }

    async fn find_payment(&self, id: Uuid) -> AppResult<Option<Payment>> {
        self.with(|t| Ok(t.payments.get(&id).cloned()))
    }

    async fn upsert(&self, submission: PaymentSubmission) -> AppResult<Payment> {
        self.with(|t| {
            let now = Utc::now();
            if let Some(existing) = t
                .payments
                .values_mut()
                .find(|p| p.booking_id == submission.booking_id)
            {
                existing.amount = submission.amount;
                existing.proof_image_url = submission.proof_image_url;
                existing.bank_name = submission.bank_name;
                existing.account_number = submission.account_number;
                existing.status = PaymentStatus::Pending;
                existing.verified_at = None;
                existing.updated_at = now;
                return Ok(existing.clone());
            }

            let created = Payment {
                id: Uuid::new_v4(),
                booking_id: submission.booking_id,
                customer_id: submission.customer_id,
                amount: submission.amount,
                proof_image_url: submission.proof_image_url,
                bank_name: submission.bank_name,
                account_number: submission.account_number,
                status: PaymentStatus::Pending,
                verified_at: None,
                created_at: now,
                updated_at: now,
            };
            t.payments.insert(created.id, created.clone());
            Ok(created)
        })
    }

    async fn update_payment_status(
        &self,
        id: Uuid,
        status: PaymentStatus,
        verified_at: Option<DateTime<Utc>>,
    ) -> AppResult<Payment> {
        self.with(|t| {
            let payment = t.payments.get_mut(&id).ok_or(AppError::NotFound)?;
            payment.status = status;
            payment.verified_at = verified_at;
            payment.updated_at = Utc::now();
            Ok(payment.clone())
        })
    }
}
