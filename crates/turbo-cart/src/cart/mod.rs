//! Shopping cart module.
//!
//! Contains the cart and line item types and their in-memory operations.

mod cart;

pub use cart::{Cart, CartItem, NewCartItem};
