//! Catalog domain module.
//!
//! A static, read-only collection of products loaded once at startup. The core only
//! needs lookup by id and filtering by category over it.

pub mod catalog;
pub mod product;

pub use catalog::{Catalog, CatalogError};
pub use product::{Category, CategoryFilter, Product};
