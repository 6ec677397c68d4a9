//! Shared value types for the guest cart system.

mod money;
mod types;

pub use money::Money;
pub use types::{GuestId, ProductId};
