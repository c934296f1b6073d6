use crate::store::SeaStore;

#[derive(Clone)]
pub struct AppState {
    pub store: SeaStore,
    /// Stock level at or below which a product shows up in the low-stock report.
    pub low_stock_threshold: i32,
}
