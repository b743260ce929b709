//! Foundation types for Cart Keeper.
//!
//! Every other crate in the workspace depends on `cart-types`.
//!
//! # Key Types
//!
//! - [`ProductDescriptor`] — a product offered to the cart, without quantity
//! - [`CartItem`] — one line in the cart (product + quantity ≥ 1)
//! - [`CartSnapshot`] — the ordered list of lines, with the merge rules
//! - [`CartMutation`] — add / increment / decrement requests

pub mod error;
pub mod item;
pub mod mutation;
pub mod snapshot;

pub use error::TypeError;
pub use item::{CartItem, ProductDescriptor};
pub use mutation::CartMutation;
pub use snapshot::CartSnapshot;
