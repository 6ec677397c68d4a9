use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::{CatalogError, CatalogGateway, Money, Product, ProductId, ProductSnapshot, Result};

/// PostgreSQL-backed catalog gateway.
#[derive(Clone)]
pub struct PostgresCatalog {
    pool: PgPool,
}

impl PostgresCatalog {
    /// Creates a new PostgreSQL catalog gateway.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Inserts a product, replacing any existing row with the same id.
    pub async fn insert_product(&self, product: &Product) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, price_cents, available_qty, active)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                price_cents = EXCLUDED.price_cents,
                available_qty = EXCLUDED.available_qty,
                active = EXCLUDED.active
            "#,
        )
        .bind(product.id.as_i32())
        .bind(&product.name)
        .bind(product.price.cents())
        .bind(i64::from(product.available_qty))
        .bind(product.active)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn row_to_snapshot(row: PgRow) -> Result<(ProductId, ProductSnapshot)> {
        let product_id = ProductId::new(row.try_get("id")?);
        let price_cents: i64 = row.try_get("price_cents")?;
        let available_qty: i64 = row.try_get("available_qty")?;

        if price_cents < 0 {
            return Err(CatalogError::InvalidRecord {
                product_id,
                reason: format!("negative price {price_cents}"),
            });
        }

        let available_qty =
            u32::try_from(available_qty).map_err(|_| CatalogError::InvalidRecord {
                product_id,
                reason: format!("available quantity {available_qty} out of range"),
            })?;

        Ok((
            product_id,
            ProductSnapshot {
                name: row.try_get("name")?,
                price: Money::from_cents(price_cents),
                available_qty,
            },
        ))
    }
}

#[async_trait]
impl CatalogGateway for PostgresCatalog {
    #[tracing::instrument(skip(self, ids), fields(requested = ids.len()))]
    async fn fetch_by_ids(
        &self,
        ids: &HashSet<ProductId>,
    ) -> Result<HashMap<ProductId, ProductSnapshot>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let ids: Vec<i32> = ids.iter().map(ProductId::as_i32).collect();

        let rows = sqlx::query(
            r#"
            SELECT id, name, price_cents, available_qty
            FROM products
            WHERE id = ANY($1) AND active
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_snapshot).collect()
    }
}
