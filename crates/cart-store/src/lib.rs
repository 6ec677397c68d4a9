pub mod cache;
pub mod cart;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use cache::KeyValueCache;
pub use cart::Cart;
pub use common::{GuestId, ProductId};
pub use error::{CacheError, Result};
pub use memory::InMemoryCache;
pub use postgres::PostgresCache;
pub use store::{CART_TTL, CartStore};
