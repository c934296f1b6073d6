pub mod booking_service;
pub mod catalog_service;
pub mod events;
pub mod payment_service;
