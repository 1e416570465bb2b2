//! Guest cart kept on the device until the shopper signs in.
//!
//! Only line identity and quantity live here; prices and stock are
//! resolved by the backend when the cart is merged or checked out.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// One product line in the guest cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Backend product identifier.
    pub product_id: String,
    /// Selected variant (size, colour), if the product has variants.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<String>,
    /// Number of units.
    pub quantity: u32,
}

impl CartLine {
    fn matches(&self, product_id: &str, variant_id: Option<&str>) -> bool {
        self.product_id == product_id && self.variant_id.as_deref() == variant_id
    }
}

/// The anonymous shopper's cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestCart {
    /// Lines in insertion order.
    #[serde(default)]
    pub items: Vec<CartLine>,
}

impl GuestCart {
    /// Creates an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Adds `quantity` units, merging with an existing line for the same variant.
    ///
    /// # Errors
    ///
    /// Returns an error if `product_id` is blank or `quantity` is zero.
    pub fn add(
        &mut self,
        product_id: &str,
        variant_id: Option<&str>,
        quantity: u32,
    ) -> DomainResult<()> {
        if product_id.trim().is_empty() {
            return Err(DomainError::InvalidCartLine("product id is empty".to_string()));
        }
        if quantity == 0 {
            return Err(DomainError::InvalidCartLine("quantity must be positive".to_string()));
        }

        match self
            .items
            .iter_mut()
            .find(|line| line.matches(product_id, variant_id))
        {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => self.items.push(CartLine {
                product_id: product_id.to_string(),
                variant_id: variant_id.map(String::from),
                quantity,
            }),
        }
        Ok(())
    }

    /// Sets the quantity of a line; zero removes it. Returns false if no line matched.
    pub fn set_quantity(&mut self, product_id: &str, variant_id: Option<&str>, quantity: u32) -> bool {
        if quantity == 0 {
            return self.remove(product_id, variant_id);
        }
        self.items
            .iter_mut()
            .find(|line| line.matches(product_id, variant_id))
            .map(|line| line.quantity = quantity)
            .is_some()
    }

    /// Removes a line. Returns false if no line matched.
    pub fn remove(&mut self, product_id: &str, variant_id: Option<&str>) -> bool {
        let before = self.items.len();
        self.items.retain(|line| !line.matches(product_id, variant_id));
        before != self.items.len()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Returns true if the cart has no lines.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
