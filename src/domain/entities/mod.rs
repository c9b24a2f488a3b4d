pub mod observation;
pub mod stock;
pub mod stock_registry;
