// Re-export from core module so callers can use `orders_eda::error::Result`
pub use crate::core::error::{Error, Result};
