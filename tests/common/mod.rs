#![allow(dead_code)]

use chrono::NaiveDate;
use costume_rental_api::{
    dto::bookings::CreateBookingRequest,
    models::Product,
    store::{MemoryStore, NewProduct},
};
use rust_decimal::Decimal;
use uuid::Uuid;

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn costume(name_en: &str, stock: i32, price_per_day: i64) -> NewProduct {
    NewProduct {
        name_en: name_en.to_string(),
        name_id: format!("{name_en} (ID)"),
        description_en: None,
        description_id: None,
        category_id: None,
        price_per_day: Decimal::from(price_per_day),
        stock,
        is_available: true,
        images: vec!["https://media.example/costume.jpg".to_string()],
    }
}

pub async fn seeded(name_en: &str, stock: i32) -> (MemoryStore, Product) {
    let store = MemoryStore::new();
    let product = store
        .seed_product(costume(name_en, stock, 100))
        .await
        .expect("seed product");
    (store, product)
}

pub fn booking_request(product_id: Uuid) -> CreateBookingRequest {
    CreateBookingRequest {
        product_id: Some(product_id),
        start_date: Some(day(2025, 6, 1)),
        end_date: Some(day(2025, 6, 3)),
        total_days: Some(3),
        total_price: Some(Decimal::from(300)),
        rules_accepted: true,
    }
}
