pub mod error;
pub mod gateway;
pub mod memory;
pub mod postgres;
pub mod product;

pub use common::{Money, ProductId};
pub use error::{CatalogError, Result};
pub use gateway::{CatalogGateway, CatalogGatewayExt};
pub use memory::InMemoryCatalog;
pub use postgres::PostgresCatalog;
pub use product::{Product, ProductSnapshot};
