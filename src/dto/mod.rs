pub mod auth;
pub mod bookings;
pub mod categories;
pub mod payments;
pub mod pricing;
pub mod products;
