//! Session layer: owns the shopper's cart, checkout flow and identity, persists them
//! through a [`KeyValueStore`], and records analytics once each change is durable.

pub mod config;
pub mod error;
pub mod storage;
pub mod storefront;
pub mod user;

pub use config::StorefrontConfig;
pub use error::SessionError;
pub use storage::{InMemoryKeyValueStore, JsonFileStore, KeyValueStore, StorageError};
pub use storefront::{Confirmation, Storefront};
pub use user::User;
