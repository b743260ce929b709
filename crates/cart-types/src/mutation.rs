use std::fmt;

use crate::item::ProductDescriptor;

/// A change requested against a cart snapshot.
#[derive(Clone, Debug, PartialEq)]
pub enum CartMutation {
    /// Add one unit of a product, merging with an existing line.
    Add(ProductDescriptor),
    /// Raise the quantity of a line by one.
    Increment { id: String },
    /// Lower the quantity of a line by one, removing it at zero.
    Decrement { id: String },
}

impl CartMutation {
    /// The product id this mutation targets.
    pub fn target(&self) -> &str {
        match self {
            Self::Add(product) => &product.id,
            Self::Increment { id } | Self::Decrement { id } => id,
        }
    }

    /// Short operation name, used as a log field.
    pub fn op(&self) -> &'static str {
        match self {
            Self::Add(_) => "add",
            Self::Increment { .. } => "increment",
            Self::Decrement { .. } => "decrement",
        }
    }
}

impl fmt::Display for CartMutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.op(), self.target())
    }
}
