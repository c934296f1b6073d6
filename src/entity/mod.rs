pub mod bookings;
pub mod categories;
pub mod payments;
pub mod product_images;
pub mod products;

pub use bookings::Entity as Bookings;
pub use categories::Entity as Categories;
pub use payments::Entity as Payments;
pub use product_images::Entity as ProductImages;
pub use products::Entity as Products;
