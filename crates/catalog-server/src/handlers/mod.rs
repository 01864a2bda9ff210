//! HTTP handlers

pub mod error;
pub mod extract;
pub mod health;
pub mod items;

pub use error::ApiError;
pub use health::health;
