// Core error types shared by every analysis component
pub mod error;

pub use error::{Error, Result};
