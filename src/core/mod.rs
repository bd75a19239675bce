//! Core domain types and ambient concerns

pub mod config;
pub mod conversion;
pub mod error;
pub mod log;

// Re-export main types for cleaner imports
pub use conversion::{ConversionRequest, PriceQuote, normalize_symbol};
pub use error::ConversionError;
