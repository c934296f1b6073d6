mod common;

use common::costume;
use costume_rental_api::{
    dto::{
        categories::CreateCategoryRequest,
        products::{CreateProductRequest, InventoryAdjustRequest, UpdateProductRequest},
    },
    error::AppError,
    middleware::auth::AuthUser,
    routes::params::{LowStockQuery, ProductQuery, ProductSortBy, SortOrder},
    services::catalog_service,
    slug::slugify,
    store::MemoryStore,
};
use rust_decimal::Decimal;
use uuid::Uuid;

fn category(name_en: &str) -> CreateCategoryRequest {
    CreateCategoryRequest {
        name_en: name_en.into(),
        name_id: name_en.into(),
    }
}

fn product_request(name_en: &str, price: i64, stock: i32) -> CreateProductRequest {
    CreateProductRequest {
        name_en: name_en.into(),
        name_id: None,
        description_en: None,
        description_id: None,
        category_id: None,
        price_per_day: Decimal::from(price),
        stock,
        is_available: None,
        images: vec!["front.jpg".into(), "back.jpg".into()],
    }
}

#[test]
fn slugs_from_category_names() {
    assert_eq!(slugify("Magical Girl!"), "magical-girl");
    assert_eq!(slugify("  Fantasy_Costumes  "), "fantasy-costumes");
}

#[tokio::test]
async fn category_slugs_are_unique() {
    let store = MemoryStore::new();
    let admin = AuthUser::admin(Uuid::new_v4());

    let created = catalog_service::create_category(&store, &admin, category("Magical Girl!"))
        .await
        .expect("create")
        .into_data()
        .expect("category");
    assert_eq!(created.slug, "magical-girl");

    let err = catalog_service::create_category(&store, &admin, category("magical   girl"))
        .await
        .expect_err("same slug");
    assert!(matches!(err, AppError::Conflict(_)));

    let err = catalog_service::create_category(&store, &admin, category("!!!"))
        .await
        .expect_err("empty slug");
    assert!(matches!(err, AppError::Validation(_)));

    let list = catalog_service::list_categories(&store)
        .await
        .expect("list")
        .into_data()
        .expect("list");
    assert_eq!(list.items.len(), 1);
}

#[tokio::test]
async fn catalog_mutations_are_admin_only() {
    let store = MemoryStore::new();
    let customer = AuthUser::customer(Uuid::new_v4());
    let product = store
        .seed_product(costume("Jester Hat", 3, 50))
        .await
        .expect("seed");

    let err = catalog_service::create_product(&store, &customer, product_request("Toga", 10, 1))
        .await
        .expect_err("create");
    assert!(matches!(err, AppError::Forbidden));

    let err = catalog_service::update_product(&store, &customer, product.id, UpdateProductRequest::default())
        .await
        .expect_err("update");
    assert!(matches!(err, AppError::Forbidden));

    let err = catalog_service::delete_product(&store, &customer, product.id)
        .await
        .expect_err("delete");
    assert!(matches!(err, AppError::Forbidden));

    let err = catalog_service::adjust_inventory(&store, &customer, product.id, InventoryAdjustRequest { delta: 5 })
        .await
        .expect_err("adjust");
    assert!(matches!(err, AppError::Forbidden));

    let err = catalog_service::create_category(&store, &customer, category("Horror"))
        .await
        .expect_err("category");
    assert!(matches!(err, AppError::Forbidden));

    assert_eq!(store.product(product.id).await.expect("product").stock, 3);
}

#[tokio::test]
async fn products_are_created_updated_and_filtered() {
    let store = MemoryStore::new();
    let admin = AuthUser::admin(Uuid::new_v4());

    let toga = catalog_service::create_product(&store, &admin, product_request("Roman Toga", 80, 2))
        .await
        .expect("create")
        .into_data()
        .expect("product");
    assert_eq!(toga.name_id, "Roman Toga");
    assert!(toga.is_available);
    assert_eq!(toga.images.len(), 2);

    catalog_service::create_product(&store, &admin, product_request("Viking Helmet", 40, 0))
        .await
        .expect("create");

    let err = catalog_service::create_product(&store, &admin, product_request("Roman Toga", 80, 2))
        .await
        .expect_err("duplicate name");
    assert!(matches!(err, AppError::Conflict(_)));

    let err = catalog_service::create_product(&store, &admin, product_request("Broken", -1, 2))
        .await
        .expect_err("negative price");
    assert!(matches!(err, AppError::Validation(_)));

    let mut fractional = product_request("Tiara", 10, 1);
    fractional.price_per_day = Decimal::new(1_999, 3);
    let err = catalog_service::create_product(&store, &admin, fractional)
        .await
        .expect_err("sub-cent price");
    assert!(matches!(err, AppError::Validation(_)));

    let err = catalog_service::create_product(&store, &admin, product_request("Crown", 10_000_000_000, 1))
        .await
        .expect_err("price over capacity");
    assert!(matches!(err, AppError::Validation(_)));

    let updated = catalog_service::update_product(
        &store,
        &admin,
        toga.id,
        UpdateProductRequest {
            price_per_day: Some(Decimal::from(90)),
            images: Some(vec!["new.jpg".into()]),
            ..Default::default()
        },
    )
    .await
    .expect("update")
    .into_data()
    .expect("product");
    assert_eq!(updated.price_per_day, Decimal::from(90));
    assert_eq!(updated.images, vec!["new.jpg".to_string()]);
    assert_eq!(updated.stock, 2);

    let available = catalog_service::list_products(
        &store,
        ProductQuery {
            available: Some(true),
            ..Default::default()
        },
    )
    .await
    .expect("list")
    .into_data()
    .expect("list");
    assert_eq!(available.items.len(), 1);
    assert_eq!(available.items[0].id, toga.id);

    let by_price = catalog_service::list_products(
        &store,
        ProductQuery {
            sort_by: Some(ProductSortBy::Price),
            sort_order: Some(SortOrder::Asc),
            ..Default::default()
        },
    )
    .await
    .expect("list")
    .into_data()
    .expect("list");
    let names: Vec<_> = by_price.items.iter().map(|p| p.name_en.as_str()).collect();
    assert_eq!(names, ["Viking Helmet", "Roman Toga"]);

    let far_page = catalog_service::list_products(
        &store,
        ProductQuery {
            page: Some(i64::MAX),
            per_page: Some(i64::MAX),
            ..Default::default()
        },
    )
    .await
    .expect("far page")
    .into_data()
    .expect("list");
    assert!(far_page.items.is_empty());

    let err = catalog_service::list_products(
        &store,
        ProductQuery {
            min_price: Some(Decimal::from(100)),
            max_price: Some(Decimal::from(10)),
            ..Default::default()
        },
    )
    .await
    .expect_err("inverted range");
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn inventory_adjustments_never_go_negative() {
    let store = MemoryStore::new();
    let admin = AuthUser::admin(Uuid::new_v4());
    let product = store
        .seed_product(costume("Cowboy Hat", 2, 30))
        .await
        .expect("seed");

    let err = catalog_service::adjust_inventory(&store, &admin, product.id, InventoryAdjustRequest { delta: 0 })
        .await
        .expect_err("zero delta");
    assert!(matches!(err, AppError::Validation(_)));

    let err = catalog_service::adjust_inventory(&store, &admin, product.id, InventoryAdjustRequest { delta: -3 })
        .await
        .expect_err("would go negative");
    assert!(matches!(err, AppError::Unavailable(_)));
    assert_eq!(store.product(product.id).await.expect("product").stock, 2);

    let adjusted = catalog_service::adjust_inventory(&store, &admin, product.id, InventoryAdjustRequest { delta: -2 })
        .await
        .expect("adjust")
        .into_data()
        .expect("product");
    assert_eq!(adjusted.stock, 0);
}

#[tokio::test]
async fn low_stock_report_uses_threshold() {
    let store = MemoryStore::new();
    let admin = AuthUser::admin(Uuid::new_v4());
    for (name, stock) in [("Owl Mask", 0), ("Fox Mask", 2), ("Bear Suit", 9)] {
        store.seed_product(costume(name, stock, 20)).await.expect("seed");
    }

    let report = catalog_service::list_low_stock(&store, &admin, LowStockQuery::default(), 2)
        .await
        .expect("report")
        .into_data()
        .expect("list");
    let names: Vec<_> = report.items.iter().map(|p| p.name_en.as_str()).collect();
    assert_eq!(names, ["Owl Mask", "Fox Mask"]);

    let query = LowStockQuery {
        threshold: Some(0),
        ..Default::default()
    };
    let report = catalog_service::list_low_stock(&store, &admin, query, 2)
        .await
        .expect("report")
        .into_data()
        .expect("list");
    assert_eq!(report.items.len(), 1);

    let customer = AuthUser::customer(Uuid::new_v4());
    let err = catalog_service::list_low_stock(&store, &customer, LowStockQuery::default(), 2)
        .await
        .expect_err("customers cannot see the report");
    assert!(matches!(err, AppError::Forbidden));
}

#[tokio::test]
async fn deleting_a_category_keeps_its_products() {
    let store = MemoryStore::new();
    let admin = AuthUser::admin(Uuid::new_v4());
    let horror = catalog_service::create_category(&store, &admin, category("Horror"))
        .await
        .expect("category")
        .into_data()
        .expect("category");

    let mut request = product_request("Mummy Wraps", 25, 1);
    request.category_id = Some(horror.id);
    let mummy = catalog_service::create_product(&store, &admin, request)
        .await
        .expect("product")
        .into_data()
        .expect("product");

    catalog_service::delete_category(&store, &admin, horror.id)
        .await
        .expect("delete");
    let mummy = store.product(mummy.id).await.expect("product survives");
    assert_eq!(mummy.category_id, None);

    let mut orphan = product_request("Ghost Sheet", 10, 1);
    orphan.category_id = Some(horror.id);
    let err = catalog_service::create_product(&store, &admin, orphan)
        .await
        .expect_err("unknown category");
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn search_text_is_matched_literally() {
    let store = MemoryStore::new();
    let admin = AuthUser::admin(Uuid::new_v4());
    for name in ["Wig 50% Off", "Wig 500", "Cape_Red", "Cape Red"] {
        catalog_service::create_product(&store, &admin, product_request(name, 10, 1))
            .await
            .expect("create");
    }

    let search = |q: &str| ProductQuery {
        q: Some(q.into()),
        ..Default::default()
    };
    let percent = catalog_service::list_products(&store, search("50%"))
        .await
        .expect("list")
        .into_data()
        .expect("list");
    let names: Vec<_> = percent.items.iter().map(|p| p.name_en.as_str()).collect();
    assert_eq!(names, ["Wig 50% Off"]);

    let underscore = catalog_service::list_products(&store, search("cape_"))
        .await
        .expect("list")
        .into_data()
        .expect("list");
    let names: Vec<_> = underscore.items.iter().map(|p| p.name_en.as_str()).collect();
    assert_eq!(names, ["Cape_Red"]);
}
