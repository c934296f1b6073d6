use costume_rental_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    dto::{categories::CreateCategoryRequest, products::CreateProductRequest},
    error::AppError,
    middleware::auth::AuthUser,
    services::catalog_service,
    store::SeaStore,
};
use rust_decimal::Decimal;
use uuid::Uuid;

const CATEGORIES: &[(&str, &str)] = &[
    ("Traditional", "Tradisional"),
    ("Cosplay", "Cosplay"),
    ("Kids", "Anak-anak"),
];

// (name_en, name_id, category index, price per day, stock)
const COSTUMES: &[(&str, &str, usize, i64, i32)] = &[
    ("Javanese Kebaya", "Kebaya Jawa", 0, 75_000, 4),
    ("Balinese Dancer", "Penari Bali", 0, 120_000, 2),
    ("Samurai Armor", "Baju Zirah Samurai", 1, 150_000, 1),
    ("Space Ranger", "Penjelajah Angkasa", 1, 90_000, 3),
    ("Little Pirate", "Bajak Laut Cilik", 2, 45_000, 5),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;
    let store = SeaStore::new(orm, pool);

    let admin = AuthUser::admin(seed_admin_id()?);
    let mut category_ids = Vec::with_capacity(CATEGORIES.len());
    for (name_en, name_id) in CATEGORIES {
        category_ids.push(ensure_category(&store, &admin, name_en, name_id).await?);
    }

    let mut created = 0;
    for (name_en, name_id, category, price, stock) in COSTUMES {
        let payload = CreateProductRequest {
            name_en: (*name_en).into(),
            name_id: Some((*name_id).into()),
            description_en: None,
            description_id: None,
            category_id: category_ids.get(*category).copied().flatten(),
            price_per_day: Decimal::from(*price),
            stock: *stock,
            is_available: Some(true),
            images: Vec::new(),
        };
        match catalog_service::create_product(&store, &admin, payload).await {
            Ok(_) => created += 1,
            Err(AppError::Conflict(_)) => tracing::info!(name_en, "product already seeded"),
            Err(e) => return Err(e.into()),
        }
    }

    tracing::info!(created, "seed completed");
    Ok(())
}

fn seed_admin_id() -> anyhow::Result<Uuid> {
    match std::env::var("SEED_ADMIN_ID") {
        Ok(raw) => Ok(Uuid::parse_str(&raw)?),
        Err(_) => Ok(Uuid::nil()),
    }
}

async fn ensure_category(
    store: &SeaStore,
    admin: &AuthUser,
    name_en: &str,
    name_id: &str,
) -> anyhow::Result<Option<Uuid>> {
    let payload = CreateCategoryRequest {
        name_en: name_en.into(),
        name_id: name_id.into(),
    };
    match catalog_service::create_category(store, admin, payload).await {
        Ok(resp) => Ok(resp.into_data().map(|c| c.id)),
        Err(AppError::Conflict(_)) => {
            let existing = catalog_service::list_categories(store)
                .await?
                .into_data()
                .map(|list| list.items)
                .unwrap_or_default();
            Ok(existing.into_iter().find(|c| c.name_en == name_en).map(|c| c.id))
        }
        Err(e) => Err(e.into()),
    }
}
