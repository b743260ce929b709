use std::fmt;

use serde::{Deserialize, Serialize};

/// A product as offered to the cart: everything a line needs except its
/// quantity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductDescriptor {
    /// Stable product identifier.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Product image location.
    pub image_url: String,
    /// Unit price. Expected to be non-negative.
    pub price: f64,
}

impl ProductDescriptor {
    /// Create a new product descriptor.
    pub fn new(
        id: impl Into<String>,
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

/// One product line in the cart.
///
/// `quantity` is always at least 1 while the line is part of a snapshot;
/// a line whose quantity would drop to zero is removed instead.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: String,
    pub title: String,
    pub image_url: String,
    pub price: f64,
    pub quantity: u32,
}

impl CartItem {
    /// Start a new line for `product` with a quantity of one.
    pub fn from_product(product: ProductDescriptor) -> Self {
        Self::with_quantity(product, 1)
    }

    /// Build a line for `product` with an explicit quantity.
    pub fn with_quantity(product: ProductDescriptor, quantity: u32) -> Self {
        Self {
            id: product.id,
            title: product.title,
            image_url: product.image_url,
            price: product.price,
            quantity,
        }
    }

    /// Price of the whole line (`price * quantity`).
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

impl fmt::Display for CartItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} x{} ({}) @ {:.2}",
            self.title, self.quantity, self.id, self.price
        )
    }
}
