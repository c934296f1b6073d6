use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    audit::{AuditEntry, log_audit},
    dto::{
        categories::{CategoryList, CreateCategoryRequest},
        pricing::{RentalQuote, RentalQuoteQuery},
        products::{CreateProductRequest, InventoryAdjustRequest, ProductList, UpdateProductRequest},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, Capability, ensure_capability},
    models::{Category, Product},
    pricing,
    response::{ApiResponse, Meta},
    routes::params::{LowStockQuery, ProductQuery},
    slug::slugify,
    store::{CategoryStore, InventoryStore, NewCategory, NewProduct, ProductChanges, Store, StoreTx},
};

pub async fn list_products<S: Store>(
    store: &S,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (filter, page) = query.into_filter();
    if let (Some(min), Some(max)) = (filter.min_price, filter.max_price) {
        if min > max {
            return Err(AppError::validation("min_price must not exceed max_price"));
        }
    }

    let tx = store.begin().await?;
    let result = tx.list_products(&filter, page).await?;

    Ok(ApiResponse::success(
        "Products",
        ProductList {
            items: result.items,
        },
        Some(Meta::for_page(&page, result.total)),
    ))
}

pub async fn get_product<S: Store>(store: &S, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let tx = store.begin().await?;
    let product = tx.find_product(id).await?.ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Product", product, None))
}

fn validate_amounts(price_per_day: Option<Decimal>, stock: Option<i32>) -> AppResult<()> {
    if let Some(price) = price_per_day {
        pricing::ensure_money(price, "price_per_day")?;
    }
    if stock.is_some_and(|s| s < 0) {
        return Err(AppError::validation("stock must not be negative"));
    }
    Ok(())
}

async fn ensure_category<T: CategoryStore>(tx: &T, category_id: Option<Uuid>) -> AppResult<()> {
    if let Some(id) = category_id {
        if tx.find_category(id).await?.is_none() {
            return Err(AppError::validation(format!("unknown category {id}")));
        }
    }
    Ok(())
}

pub async fn create_product<S: Store>(
    store: &S,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_capability(user, Capability::ManageCatalog)?;
    let name_en = payload.name_en.trim().to_string();
    if name_en.is_empty() {
        return Err(AppError::validation("name_en must not be empty"));
    }
    validate_amounts(Some(payload.price_per_day), Some(payload.stock))?;

    let tx = store.begin().await?;
    ensure_category(&tx, payload.category_id).await?;
    let product = tx
        .insert_product(NewProduct {
            name_id: payload
                .name_id
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| name_en.clone()),
            name_en,
            description_en: payload.description_en,
            description_id: payload.description_id,
            category_id: payload.category_id,
            price_per_day: payload.price_per_day,
            stock: payload.stock,
            is_available: payload.is_available.unwrap_or(true),
            images: payload.images,
        })
        .await?;
    tx.commit().await?;

    log_audit(
        store,
        AuditEntry::new(
            user.user_id,
            "product_create",
            "products",
            serde_json::json!({ "product_id": product.id }),
        ),
    )
    .await;

    Ok(ApiResponse::success(
        "Product created",
        product,
        Some(Meta::empty()),
    ))
}

pub async fn update_product<S: Store>(
    store: &S,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_capability(user, Capability::ManageCatalog)?;
    validate_amounts(payload.price_per_day, payload.stock)?;
    if payload.name_en.as_ref().is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::validation("name_en must not be empty"));
    }

    let tx = store.begin().await?;
    ensure_category(&tx, payload.category_id).await?;
    let product = tx
        .update_product(
            id,
            ProductChanges {
                name_en: payload.name_en,
                name_id: payload.name_id,
                description_en: payload.description_en,
                description_id: payload.description_id,
                category_id: payload.category_id,
                price_per_day: payload.price_per_day,
                stock: payload.stock,
                is_available: payload.is_available,
                images: payload.images,
            },
        )
        .await?;
    tx.commit().await?;

    log_audit(
        store,
        AuditEntry::new(
            user.user_id,
            "product_update",
            "products",
            serde_json::json!({ "product_id": product.id }),
        ),
    )
    .await;

    Ok(ApiResponse::success("Updated", product, Some(Meta::empty())))
}

pub async fn delete_product<S: Store>(
    store: &S,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_capability(user, Capability::ManageCatalog)?;

    let tx = store.begin().await?;
    tx.delete_product(id).await?;
    tx.commit().await?;

    log_audit(
        store,
        AuditEntry::new(
            user.user_id,
            "product_delete",
            "products",
            serde_json::json!({ "product_id": id }),
        ),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn adjust_inventory<S: Store>(
    store: &S,
    user: &AuthUser,
    id: Uuid,
    payload: InventoryAdjustRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_capability(user, Capability::ManageCatalog)?;
    if payload.delta == 0 {
        return Err(AppError::validation("delta must not be 0"));
    }

    let tx = store.begin().await?;
    let product = tx.adjust_stock(id, payload.delta).await?;
    tx.commit().await?;

    tracing::info!(product_id = %id, delta = payload.delta, stock = product.stock, "inventory adjusted");
    log_audit(
        store,
        AuditEntry::new(
            user.user_id,
            "inventory_adjust",
            "products",
            serde_json::json!({ "product_id": id, "delta": payload.delta }),
        ),
    )
    .await;

    Ok(ApiResponse::success(
        "Inventory updated",
        product,
        Some(Meta::empty()),
    ))
}

pub async fn list_low_stock<S: Store>(
    store: &S,
    user: &AuthUser,
    query: LowStockQuery,
    default_threshold: i32,
) -> AppResult<ApiResponse<ProductList>> {
    ensure_capability(user, Capability::ManageCatalog)?;
    let threshold = query.threshold.unwrap_or(default_threshold);
    let page = query.page();

    let tx = store.begin().await?;
    let result = tx.list_low_stock(threshold, page).await?;

    Ok(ApiResponse::success(
        "Low stock",
        ProductList {
            items: result.items,
        },
        Some(Meta::for_page(&page, result.total)),
    ))
}

pub async fn create_category<S: Store>(
    store: &S,
    user: &AuthUser,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_capability(user, Capability::ManageCatalog)?;
    let slug = slugify(&payload.name_en);
    if slug.is_empty() {
        return Err(AppError::validation(
            "name_en must contain at least one letter or digit",
        ));
    }

    let tx = store.begin().await?;
    let category = tx
        .insert_category(NewCategory {
            name_en: payload.name_en.trim().to_string(),
            name_id: payload.name_id.trim().to_string(),
            slug,
        })
        .await?;
    tx.commit().await?;

    log_audit(
        store,
        AuditEntry::new(
            user.user_id,
            "category_create",
            "categories",
            serde_json::json!({ "category_id": category.id, "slug": category.slug }),
        ),
    )
    .await;

    Ok(ApiResponse::success(
        "Category created",
        category,
        Some(Meta::empty()),
    ))
}

pub async fn list_categories<S: Store>(store: &S) -> AppResult<ApiResponse<CategoryList>> {
    let tx = store.begin().await?;
    let items = tx.list_categories().await?;
    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Categories",
        CategoryList { items },
        Some(Meta::new(1, total, total)),
    ))
}

pub async fn delete_category<S: Store>(
    store: &S,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_capability(user, Capability::ManageCatalog)?;

    let tx = store.begin().await?;
    tx.delete_category(id).await?;
    tx.commit().await?;

    log_audit(
        store,
        AuditEntry::new(
            user.user_id,
            "category_delete",
            "categories",
            serde_json::json!({ "category_id": id }),
        ),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Price of renting a product over an inclusive date range.
pub async fn quote_rental<S: Store>(
    store: &S,
    query: RentalQuoteQuery,
) -> AppResult<ApiResponse<RentalQuote>> {
    if query.end_date < query.start_date {
        return Err(AppError::validation("end_date must not be before start_date"));
    }

    let tx = store.begin().await?;
    let product = tx
        .find_product(query.product_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let (total_days, total_price) =
        pricing::quote(product.price_per_day, query.start_date, query.end_date)?;
    Ok(ApiResponse::success(
        "Rental quote",
        RentalQuote {
            product_id: product.id,
            start_date: query.start_date,
            end_date: query.end_date,
            total_days,
            price_per_day: product.price_per_day,
            total_price,
        },
        Some(Meta::empty()),
    ))
}
