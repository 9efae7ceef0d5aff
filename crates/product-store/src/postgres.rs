use async_trait::async_trait;
use common::{BatchReference, Sku, Version};
use domain::Product;
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::{
    Result, StoreError,
    store::{ExpectedVersion, ProductStore, ProductWrite, StoredProduct, validate_writes},
};

/// PostgreSQL-backed product store implementation.
///
/// Each product is one row holding its serialized state, its version number
/// and a write revision; the revision column is the optimistic-concurrency
/// token.
#[derive(Clone)]
pub struct PostgresProductStore {
    pool: PgPool,
}

impl PostgresProductStore {
    /// Creates a new PostgreSQL product store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to the database at `url` and creates a store on that pool.
    pub async fn connect(url: &str) -> Result<Self> {
        Ok(Self::new(PgPool::connect(url).await?))
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

    fn row_to_stored(row: PgRow) -> Result<StoredProduct> {
        let state: serde_json::Value = row.try_get("state")?;
        let revision: i64 = row.try_get("revision")?;
        let product: Product = serde_json::from_value(state)?;
        Ok(StoredProduct::new(product, Version::new(revision)))
    }
}

#[async_trait]
impl ProductStore for PostgresProductStore {
    #[tracing::instrument(skip(self))]
    async fn load(&self, sku: &Sku) -> Result<Option<StoredProduct>> {
        let row = sqlx::query("SELECT state, revision FROM products WHERE sku = $1")
            .bind(sku.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_stored).transpose()
    }

    #[tracing::instrument(skip(self))]
    async fn load_by_batch_reference(
        &self,
        reference: &BatchReference,
    ) -> Result<Option<StoredProduct>> {
        let row = sqlx::query(
            r#"
            SELECT state, revision
            FROM products
            WHERE state -> 'batches' @> jsonb_build_array(jsonb_build_object('reference', $1::text))
            ORDER BY sku
            LIMIT 1
            "#,
        )
        .bind(reference.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_stored).transpose()
    }

    #[tracing::instrument(skip(self, writes), fields(writes = writes.len()))]
    async fn save(&self, writes: Vec<ProductWrite>) -> Result<()> {
        validate_writes(&writes)?;
        if writes.is_empty() {
            return Ok(());
        }

        // Start a transaction; dropping it without commit rolls back
        let mut tx = self.pool.begin().await?;

        for write in &writes {
            let sku = write.product.sku();
            let state = serde_json::to_value(&write.product)?;
            let version = write.product.version_number().as_i64();

            let result = match write.expected {
                ExpectedVersion::New => {
                    sqlx::query(
                        r#"
                        INSERT INTO products (sku, version_number, revision, state)
                        VALUES ($1, $2, $3, $4)
                        ON CONFLICT (sku) DO NOTHING
                        "#,
                    )
                    .bind(sku.as_str())
                    .bind(version)
                    .bind(write.expected.next_revision().as_i64())
                    .bind(&state)
                    .execute(&mut *tx)
                    .await?
                }
                ExpectedVersion::Exact(expected) => {
                    sqlx::query(
                        r#"
                        UPDATE products
                        SET version_number = $2, revision = revision + 1, state = $3,
                            updated_at = NOW()
                        WHERE sku = $1 AND revision = $4
                        "#,
                    )
                    .bind(sku.as_str())
                    .bind(version)
                    .bind(&state)
                    .bind(expected.as_i64())
                    .execute(&mut *tx)
                    .await?
                }
            };

            if result.rows_affected() == 0 {
                let actual: Option<i64> =
                    sqlx::query_scalar("SELECT revision FROM products WHERE sku = $1")
                        .bind(sku.as_str())
                        .fetch_optional(&mut *tx)
                        .await?;

                metrics::counter!("product_store_conflicts_total").increment(1);
                return Err(StoreError::ConcurrencyConflict {
                    sku: sku.clone(),
                    expected: write.expected,
                    actual: actual.map(Version::new),
                });
            }
        }

        tx.commit().await?;
        metrics::counter!("product_store_commits_total").increment(1);
        Ok(())
    }
}
