//! Cart and line item types.

use std::collections::HashSet;

use crate::error::CartError;
use crate::ids::ProductId;
use serde::{Deserialize, Serialize};

/// A product as offered to the cart, before it has a quantity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewCartItem {
    /// Product identifier.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Image reference.
    pub image_url: String,
    /// Unit price.
    pub price: f64,
}

impl NewCartItem {
    /// Create a new item.
    pub fn new(
        id: impl Into<ProductId>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            image_url: image_url.into(),
            price,
        }
    }
}

/// A line item in the cart.
///
/// Field order is the persisted field order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    /// Product identifier, unique within a cart.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Image reference.
    pub image_url: String,
    /// Unit price.
    pub price: f64,
    /// Quantity, always at least 1.
    pub quantity: u32,
}

impl CartItem {
    fn from_new(item: NewCartItem) -> Self {
        Self {
            id: item.id,
            title: item.title,
            image_url: item.image_url,
            price: item.price,
            quantity: 1,
        }
    }
}

/// A shopping cart: line items unique by product id, in insertion order.
///
/// Serializes as a bare JSON array of line items.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Line items in display order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Get number of unique items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get total item count (sum of quantities).
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Get an item by product id.
    pub fn get(&self, id: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.id == *id)
    }

    /// Check whether a product is in the cart.
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Add one unit of a product.
    ///
    /// A product already in the cart keeps its position and its original
    /// title, image and price; only its quantity grows. A new product is
    /// appended with quantity 1. Returns the resulting quantity.
    pub fn add_item(&mut self, item: NewCartItem) -> Result<u32, CartError> {
        if !item.price.is_finite() {
            return Err(CartError::InvalidPrice {
                id: item.id.into_inner(),
                price: item.price,
            });
        }

        if let Some(existing) = self.items.iter_mut().find(|i| i.id == item.id) {
            return bump(existing);
        }

        self.items.push(CartItem::from_new(item));
        Ok(1)
    }

    /// Increase the quantity of a product already in the cart by one.
    ///
    /// Returns the new quantity.
    pub fn increment(&mut self, id: &str) -> Result<u32, CartError> {
        let item = self
            .items
            .iter_mut()
            .find(|i| i.id == *id)
            .ok_or_else(|| CartError::ItemNotFound(id.to_string()))?;
        bump(item)
    }

    /// Decrease the quantity of a product by one.
    ///
    /// A line that would reach zero is removed. Returns the remaining
    /// quantity, or `None` if the line was removed.
    pub fn decrement(&mut self, id: &str) -> Result<Option<u32>, CartError> {
        let index = self
            .items
            .iter()
            .position(|i| i.id == *id)
            .ok_or_else(|| CartError::ItemNotFound(id.to_string()))?;

        let item = &mut self.items[index];
        if item.quantity <= 1 {
            self.items.remove(index);
            return Ok(None);
        }

        item.quantity -= 1;
        Ok(Some(item.quantity))
    }

    /// Encode the cart in its persisted form.
    pub fn to_json(&self) -> Result<String, CartError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a persisted cart, rejecting values that break cart invariants.
    pub fn from_json(raw: &str) -> Result<Self, CartError> {
        let cart: Cart = serde_json::from_str(raw)?;
        cart.validate()?;
        Ok(cart)
    }

    fn validate(&self) -> Result<(), CartError> {
        let mut seen = HashSet::with_capacity(self.items.len());
        for item in &self.items {
            if !seen.insert(item.id.as_str()) {
                return Err(CartError::InvalidCart(format!("duplicate item {}", item.id)));
            }
            if item.quantity == 0 {
                return Err(CartError::InvalidCart(format!("zero quantity for {}", item.id)));
            }
            if !item.price.is_finite() {
                return Err(CartError::InvalidCart(format!("invalid price for {}", item.id)));
            }
        }
        Ok(())
    }
}

fn bump(item: &mut CartItem) -> Result<u32, CartError> {
    item.quantity = item
        .quantity
        .checked_add(1)
        .ok_or_else(|| CartError::QuantityOverflow(item.id.to_string()))?;
    Ok(item.quantity)
}
