use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseTransaction, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::{AuditEntry, insert_audit},
    db::{DbPool, OrmConn},
    entity::{
        bookings::{ActiveModel as BookingActive, Column as BookingCol, Entity as Bookings, Model as BookingModel},
        categories::{ActiveModel as CategoryActive, Column as CategoryCol, Entity as Categories, Model as CategoryModel},
        payments::{ActiveModel as PaymentActive, Column as PaymentCol, Entity as Payments, Model as PaymentModel},
        product_images::{ActiveModel as ImageActive, Column as ImageCol, Entity as ProductImages},
        products::{ActiveModel as ProductActive, Column as ProdCol, Entity as Products, Model as ProductModel},
    },
    error::{AppError, AppResult},
    models::{Booking, BookingStatus, Category, Payment, PaymentStatus, Product},
    routes::params::{ProductSortBy, SortOrder},
};

use super::{
    BookingStore, CategoryStore, InventoryStore, NewBooking, NewCategory, NewProduct, Page, Paged,
    PaymentStore, PaymentSubmission, ProductChanges, ProductFilter, Store, StoreTx,
};

/// PostgreSQL-backed store: sea-orm for entities, the sqlx pool for audit rows.
#[derive(Clone)]
pub struct SeaStore {
    pub orm: OrmConn,
    pub pool: DbPool,
}

impl SeaStore {
    pub fn new(orm: OrmConn, pool: DbPool) -> Self {
        Self { orm, pool }
    }
}

impl Store for SeaStore {
    type Tx = SeaTx;

    async fn begin(&self) -> AppResult<SeaTx> {
        let txn = self.orm.begin().await?;
        Ok(SeaTx { txn })
    }

    async fn record_audit(&self, entry: AuditEntry) -> AppResult<()> {
        insert_audit(&self.pool, entry).await
    }
}

/// Open database transaction; rolled back on drop unless committed.
pub struct SeaTx {
    txn: DatabaseTransaction,
}

impl StoreTx for SeaTx {
    async fn commit(self) -> AppResult<()> {
        self.txn.commit().await?;
        Ok(())
    }
}

/// Constraint violations become `Conflict`; anything else stays a database error.
fn map_write_err(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => AppError::Conflict(detail),
        Some(SqlErr::ForeignKeyConstraintViolation(detail)) => AppError::Conflict(detail),
        _ => AppError::OrmError(err),
    }
}

/// Escapes `LIKE` wildcards so search text matches literally (Postgres escapes with `\`).
fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

impl SeaTx {
    async fn load_images(&self, product_ids: &[Uuid]) -> AppResult<HashMap<Uuid, Vec<String>>> {
        let mut images: HashMap<Uuid, Vec<String>> = HashMap::new();
        if product_ids.is_empty() {
            return Ok(images);
        }
        let rows = ProductImages::find()
            .filter(ImageCol::ProductId.is_in(product_ids.to_vec()))
            .order_by_asc(ImageCol::ProductId)
            .order_by_asc(ImageCol::Position)
            .all(&self.txn)
            .await?;
        for row in rows {
            images.entry(row.product_id).or_default().push(row.url);
        }
        Ok(images)
    }

    async fn replace_images(&self, product_id: Uuid, urls: Vec<String>) -> AppResult<()> {
        ProductImages::delete_many()
            .filter(ImageCol::ProductId.eq(product_id))
            .exec(&self.txn)
            .await?;
        if urls.is_empty() {
            return Ok(());
        }
        let rows = urls.into_iter().enumerate().map(|(position, url)| ImageActive {
            id: Set(Uuid::new_v4()),
            product_id: Set(product_id),
            url: Set(url),
            position: Set(position as i32),
        });
        ProductImages::insert_many(rows).exec(&self.txn).await?;
        Ok(())
    }

    async fn with_images(&self, models: Vec<ProductModel>) -> AppResult<Vec<Product>> {
        let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let mut images = self.load_images(&ids).await?;
        Ok(models
            .into_iter()
            .map(|model| {
                let urls = images.remove(&model.id).unwrap_or_default();
                product_from_entity(model, urls)
            })
            .collect())
    }

    async fn product_with_images(&self, model: ProductModel) -> AppResult<Product> {
        let mut products = self.with_images(vec![model]).await?;
        products.pop().ok_or(AppError::NotFound)
    }

    async fn locked_booking(&self, id: Uuid) -> AppResult<Option<BookingModel>> {
        Ok(Bookings::find_by_id(id)
            .lock(LockType::Update)
            .one(&self.txn)
            .await?)
    }

    async fn page_bookings(&self, condition: Condition, page: Page) -> AppResult<Paged<Booking>> {
        let finder = Bookings::find()
            .filter(condition)
            .order_by_desc(BookingCol::CreatedAt)
            .order_by_asc(BookingCol::Id);

        let total = finder.clone().count(&self.txn).await?;
        let items = finder
            .limit(page.limit())
            .offset(page.offset())
            .all(&self.txn)
            .await?
            .into_iter()
            .map(booking_from_entity)
            .collect::<AppResult<Vec<_>>>()?;
        Ok(Paged { items, total })
    }
}

impl InventoryStore for SeaTx {
    async fn find_product(&self, id: Uuid) -> AppResult<Option<Product>> {
        let model = Products::find_by_id(id)
            .lock(LockType::Update)
            .one(&self.txn)
            .await?;
        match model {
            Some(model) => Ok(Some(self.product_with_images(model).await?)),
            None => Ok(None),
        }
    }

    async fn adjust_stock(&self, id: Uuid, delta: i32) -> AppResult<Product> {
        // The guard keeps the CHECK (stock >= 0) from ever being the one to fail.
        let result = Products::update_many()
            .col_expr(ProdCol::Stock, Expr::col(ProdCol::Stock).add(delta))
            .filter(ProdCol::Id.eq(id))
            .filter(Expr::col(ProdCol::Stock).gte(-delta))
            .exec(&self.txn)
            .await?;

        if result.rows_affected == 0 {
            let exists = Products::find_by_id(id).one(&self.txn).await?.is_some();
            return Err(if exists {
                AppError::Unavailable("insufficient stock".into())
            } else {
                AppError::NotFound
            });
        }

        self.find_product(id).await?.ok_or(AppError::NotFound)
    }

    async fn list_products(&self, filter: &ProductFilter, page: Page) -> AppResult<Paged<Product>> {
        let mut condition = Condition::all();

        if let Some(search) = filter.q.as_ref().filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", escape_like(search));
            condition = condition.add(
                Condition::any()
                    .add(Expr::col(ProdCol::NameEn).ilike(pattern.clone()))
                    .add(Expr::col(ProdCol::NameId).ilike(pattern.clone()))
                    .add(Expr::col(ProdCol::DescriptionEn).ilike(pattern.clone()))
                    .add(Expr::col(ProdCol::DescriptionId).ilike(pattern)),
            );
        }
        if let Some(category_id) = filter.category_id {
            condition = condition.add(ProdCol::CategoryId.eq(category_id));
        }
        if let Some(min_price) = filter.min_price {
            condition = condition.add(ProdCol::PricePerDay.gte(min_price));
        }
        if let Some(max_price) = filter.max_price {
            condition = condition.add(ProdCol::PricePerDay.lte(max_price));
        }
        if filter.available_only {
            condition = condition
                .add(ProdCol::IsAvailable.eq(true))
                .add(ProdCol::Stock.gt(0));
        }

        let sort_col = match filter.sort_by.unwrap_or(ProductSortBy::CreatedAt) {
            ProductSortBy::CreatedAt => ProdCol::CreatedAt,
            ProductSortBy::Price => ProdCol::PricePerDay,
            ProductSortBy::Name => ProdCol::NameEn,
        };
        let mut finder = Products::find().filter(condition);
        finder = match filter.sort_order.unwrap_or(SortOrder::Desc) {
            SortOrder::Asc => finder.order_by_asc(sort_col),
            SortOrder::Desc => finder.order_by_desc(sort_col),
        };

        let total = finder.clone().count(&self.txn).await?;
        let models = finder
            .order_by_asc(ProdCol::Id)
            .limit(page.limit())
            .offset(page.offset())
            .all(&self.txn)
            .await?;

        Ok(Paged {
            items: self.with_images(models).await?,
            total,
        })
    }

    async fn list_low_stock(&self, threshold: i32, page: Page) -> AppResult<Paged<Product>> {
        let finder = Products::find()
            .filter(ProdCol::Stock.lte(threshold))
            .order_by_asc(ProdCol::Stock)
            .order_by_desc(ProdCol::CreatedAt);

        let total = finder.clone().count(&self.txn).await?;
        let models = finder
            .limit(page.limit())
            .offset(page.offset())
            .all(&self.txn)
            .await?;

        Ok(Paged {
            items: self.with_images(models).await?,
            total,
        })
    }

    async fn insert_product(&self, product: NewProduct) -> AppResult<Product> {
        let model = ProductActive {
            id: Set(Uuid::new_v4()),
            name_en: Set(product.name_en),
            name_id: Set(product.name_id),
            description_en: Set(product.description_en),
            description_id: Set(product.description_id),
            category_id: Set(product.category_id),
            price_per_day: Set(product.price_per_day),
            stock: Set(product.stock),
            is_available: Set(product.is_available),
            created_at: NotSet,
        }
        .insert(&self.txn)
        .await
        .map_err(map_write_err)?;

        let images = product.images.clone();
        self.replace_images(model.id, product.images).await?;
        Ok(product_from_entity(model, images))
    }

    async fn update_product(&self, id: Uuid, changes: ProductChanges) -> AppResult<Product> {
        let existing = Products::find_by_id(id)
            .lock(LockType::Update)
            .one(&self.txn)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ProductActive = existing.into();
        if let Some(name_en) = changes.name_en {
            active.name_en = Set(name_en);
        }
        if let Some(name_id) = changes.name_id {
            active.name_id = Set(name_id);
        }
        if let Some(description) = changes.description_en {
            active.description_en = Set(Some(description));
        }
        if let Some(description) = changes.description_id {
            active.description_id = Set(Some(description));
        }
        if let Some(category_id) = changes.category_id {
            active.category_id = Set(Some(category_id));
        }
        if let Some(price) = changes.price_per_day {
            active.price_per_day = Set(price);
        }
        if let Some(stock) = changes.stock {
            active.stock = Set(stock);
        }
        if let Some(is_available) = changes.is_available {
            active.is_available = Set(is_available);
        }
        let model = active.update(&self.txn).await.map_err(map_write_err)?;

        if let Some(images) = changes.images {
            self.replace_images(model.id, images).await?;
        }
        self.product_with_images(model).await
    }

    async fn delete_product(&self, id: Uuid) -> AppResult<()> {
        let result = Products::delete_by_id(id)
            .exec(&self.txn)
            .await
            .map_err(map_write_err)?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}

impl CategoryStore for SeaTx {
    async fn insert_category(&self, category: NewCategory) -> AppResult<Category> {
        let model = CategoryActive {
            id: Set(Uuid::new_v4()),
            name_en: Set(category.name_en),
            name_id: Set(category.name_id),
            slug: Set(category.slug),
            created_at: NotSet,
        }
        .insert(&self.txn)
        .await
        .map_err(map_write_err)?;
        Ok(category_from_entity(model))
    }

    async fn find_category(&self, id: Uuid) -> AppResult<Option<Category>> {
        Ok(Categories::find_by_id(id)
            .one(&self.txn)
            .await?
            .map(category_from_entity))
    }

    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        Ok(Categories::find()
            .order_by_asc(CategoryCol::NameEn)
            .all(&self.txn)
            .await?
            .into_iter()
            .map(category_from_entity)
            .collect())
    }

    async fn delete_category(&self, id: Uuid) -> AppResult<()> {
        let result = Categories::delete_by_id(id).exec(&self.txn).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}

impl BookingStore for SeaTx {
    async fn create(&self, booking: NewBooking) -> AppResult<Booking> {
        let model = BookingActive {
            id: Set(Uuid::new_v4()),
            customer_id: Set(booking.customer_id),
            product_id: Set(booking.product_id),
            start_date: Set(booking.start_date),
            end_date: Set(booking.end_date),
            total_days: Set(booking.total_days),
            total_price: Set(booking.total_price),
            rules_accepted: Set(booking.rules_accepted),
            status: Set(BookingStatus::Pending.as_str().to_string()),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(&self.txn)
        .await
        .map_err(map_write_err)?;
        booking_from_entity(model)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Booking>> {
        self.locked_booking(id)
            .await?
            .map(booking_from_entity)
            .transpose()
    }

    async fn update_status(&self, id: Uuid, status: BookingStatus) -> AppResult<Booking> {
        let existing = self.locked_booking(id).await?.ok_or(AppError::NotFound)?;
        let mut active: BookingActive = existing.into();
        active.status = Set(status.as_str().to_string());
        active.updated_at = Set(Utc::now().into());
        booking_from_entity(active.update(&self.txn).await?)
    }

    async fn list_by_customer(
        &self,
        customer_id: Uuid,
        status: Option<BookingStatus>,
        page: Page,
    ) -> AppResult<Paged<Booking>> {
        let mut condition = Condition::all().add(BookingCol::CustomerId.eq(customer_id));
        if let Some(status) = status {
            condition = condition.add(BookingCol::Status.eq(status.as_str()));
        }
        self.page_bookings(condition, page).await
    }

    async fn list_all(&self, status: Option<BookingStatus>, page: Page) -> AppResult<Paged<Booking>> {
        let mut condition = Condition::all();
        if let Some(status) = status {
            condition = condition.add(BookingCol::Status.eq(status.as_str()));
        }
        self.page_bookings(condition, page).await
    }
}

impl PaymentStore for SeaTx {
    async fn find_by_booking(&self, booking_id: Uuid) -> AppResult<Option<Payment>> {
        Payments::find()
            .filter(PaymentCol::BookingId.eq(booking_id))
            .lock(LockType::Update)
            .one(&self.txn)
            .await?
            .map(payment_from_entity)
            .transpose()
    }

    async fn find_payment(&self, id: Uuid) -> AppResult<Option<Payment>> {
        Payments::find_by_id(id)
            .lock(LockType::Update)
            .one(&self.txn)
            .await?
            .map(payment_from_entity)
            .transpose()
    }

    async fn upsert(&self, submission: PaymentSubmission) -> AppResult<Payment> {
        let existing = Payments::find()
            .filter(PaymentCol::BookingId.eq(submission.booking_id))
            .lock(LockType::Update)
            .one(&self.txn)
            .await?;

        let model = match existing {
            Some(existing) => {
                let mut active: PaymentActive = existing.into();
                active.amount = Set(submission.amount);
                active.proof_image_url = Set(submission.proof_image_url);
                active.bank_name = Set(submission.bank_name);
                active.account_number = Set(submission.account_number);
                active.status = Set(PaymentStatus::Pending.as_str().to_string());
                active.verified_at = Set(None);
                active.updated_at = Set(Utc::now().into());
                active.update(&self.txn).await?
            }
            None => PaymentActive {
                id: Set(Uuid::new_v4()),
                booking_id: Set(submission.booking_id),
                customer_id: Set(submission.customer_id),
                amount: Set(submission.amount),
                proof_image_url: Set(submission.proof_image_url),
                bank_name: Set(submission.bank_name),
                account_number: Set(submission.account_number),
                status: Set(PaymentStatus::Pending.as_str().to_string()),
                verified_at: Set(None),
                created_at: NotSet,
                updated_at: NotSet,
            }
            .insert(&self.txn)
            .await
            .map_err(map_write_err)?,
        };
        payment_from_entity(model)
    }

    async fn update_payment_status(
        &self,
        id: Uuid,
        status: PaymentStatus,
        verified_at: Option<DateTime<Utc>>,
    ) -> AppResult<Payment> {
        let existing = Payments::find_by_id(id)
            .lock(LockType::Update)
            .one(&self.txn)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: PaymentActive = existing.into();
        active.status = Set(status.as_str().to_string());
        active.verified_at = Set(verified_at.map(Into::into));
        active.updated_at = Set(Utc::now().into());
        payment_from_entity(active.update(&self.txn).await?)
    }
}

fn product_from_entity(model: ProductModel, images: Vec<String>) -> Product {
    Product {
        id: model.id,
        name_en: model.name_en,
        name_id: model.name_id,
        description_en: model.description_en,
        description_id: model.description_id,
        category_id: model.category_id,
        price_per_day: model.price_per_day,
        stock: model.stock,
        is_available: model.is_available,
        images,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn category_from_entity(model: CategoryModel) -> Category {
    Category {
        id: model.id,
        name_en: model.name_en,
        name_id: model.name_id,
        slug: model.slug,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn booking_from_entity(model: BookingModel) -> AppResult<Booking> {
    let status = model.status.parse::<BookingStatus>().map_err(|_| {
        AppError::Internal(anyhow::anyhow!("unknown booking status '{}' in store", model.status))
    })?;
    Ok(Booking {
        id: model.id,
        customer_id: model.customer_id,
        product_id: model.product_id,
        start_date: model.start_date,
        end_date: model.end_date,
        total_days: model.total_days,
        total_price: model.total_price,
        rules_accepted: model.rules_accepted,
        status,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

fn payment_from_entity(model: PaymentModel) -> AppResult<Payment> {
    let status = model.status.parse::<PaymentStatus>().map_err(|_| {
        AppError::Internal(anyhow::anyhow!("unknown payment status '{}' in store", model.status))
    })?;
    Ok(Payment {
        id: model.id,
        booking_id: model.booking_id,
        customer_id: model.customer_id,
        amount: model.amount,
        proof_image_url: model.proof_image_url,
        bank_name: model.bank_name,
        account_number: model.account_number,
        status,
        verified_at: model.verified_at.map(|dt| dt.with_timezone(&Utc)),
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("Kimono"), "Kimono");
    }
}
