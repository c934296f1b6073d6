use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        bookings::{
            BookingList, CreateBookingRequest, LateFeeQuote, PaymentSummary, Receipt,
            RefundQuote, UpdateBookingStatusRequest,
        },
        categories::{CategoryList, CreateCategoryRequest},
        payments::{PaymentVerification, SubmitPaymentRequest, UpdatePaymentStatusRequest},
        pricing::RentalQuote,
        products::{CreateProductRequest, InventoryAdjustRequest, ProductList, UpdateProductRequest},
    },
    models::{Booking, BookingStatus, Category, Payment, PaymentStatus, Product},
    pricing::{LateFee, Refund},
    response::{ApiResponse, Meta},
    routes::{admin, bookings, categories, health, params, payments, pricing, products},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        categories::list_categories,
        categories::create_category,
        categories::delete_category,
        bookings::create_booking,
        bookings::list_my_bookings,
        bookings::get_booking,
        bookings::get_receipt,
        bookings::refund_quote,
        bookings::submit_payment,
        bookings::get_payment,
        payments::update_payment_status,
        pricing::late_fee,
        pricing::refund,
        pricing::rental_quote,
        admin::list_all_bookings,
        admin::update_booking_status,
        admin::late_fee_quote,
        admin::list_low_stock,
        admin::adjust_inventory
    ),
    components(
        schemas(
            Product,
            Category,
            Booking,
            BookingStatus,
            Payment,
            PaymentStatus,
            LateFee,
            Refund,
            CreateProductRequest,
            UpdateProductRequest,
            InventoryAdjustRequest,
            ProductList,
            CreateCategoryRequest,
            CategoryList,
            CreateBookingRequest,
            UpdateBookingStatusRequest,
            BookingList,
            PaymentSummary,
            Receipt,
            RefundQuote,
            LateFeeQuote,
            SubmitPaymentRequest,
            UpdatePaymentStatusRequest,
            PaymentVerification,
            RentalQuote,
            params::ProductQuery,
            params::BookingListQuery,
            params::LowStockQuery,
            params::ProductSortBy,
            params::SortOrder,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<Booking>,
            ApiResponse<BookingList>,
            ApiResponse<Payment>,
            ApiResponse<PaymentVerification>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Products", description = "Costume catalog"),
        (name = "Categories", description = "Costume categories"),
        (name = "Bookings", description = "Customer bookings"),
        (name = "Payments", description = "Payment proofs and verification"),
        (name = "Pricing", description = "Late fee, refund and rental calculators"),
        (name = "Admin", description = "Admin endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
