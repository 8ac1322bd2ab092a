//! Cart domain module.
//!
//! This crate contains the cart's business rules, implemented purely as
//! deterministic domain logic (no IO, no persistence, no analytics).

pub mod cart;

pub use cart::{
    AddItem, Cart, CartCommand, CartEvent, CartItem, ItemAdded, ItemRemoved, QuantityChanged,
    RemoveItem, SHIPPING_FEE, UpdateQuantity,
};
