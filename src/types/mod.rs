//! Type definitions for pricecmp

mod error;
mod listing;

pub use error::*;
pub use listing::*;
