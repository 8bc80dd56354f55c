//! Domain models for normalized broker data.

mod code;
mod models;

pub use code::StockCode;
pub use models::{PriceSeries, StockRow};
