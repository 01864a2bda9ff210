//! Business logic services

pub mod item_service;

pub use item_service::ItemService;
