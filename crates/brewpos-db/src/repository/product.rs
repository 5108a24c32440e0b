//! # Product Repository
//!
//! Database operations for menu products.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use brewpos_core::Product;

/// A product joined with its stock level, for the menu/inventory view.
/// Products with no movements yet have `NULL` stock columns.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProductStockRow {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price_cents: i64,
    pub is_active: bool,
    pub current_stock: Option<i64>,
    pub threshold_level: Option<i64>,
}

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, category, price_cents, is_active, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists active products, optionally filtered by category.
    pub async fn list_active(&self, category: Option<&str>) -> DbResult<Vec<Product>> {
        debug!(category = ?category, "Listing active products");

        let products = match category {
            Some(category) => {
                sqlx::query_as::<_, Product>(
                    r#"
                    SELECT id, name, category, price_cents, is_active, created_at, updated_at
                    FROM products
                    WHERE is_active = 1 AND category = ?1
                    ORDER BY name
                    "#,
                )
                .bind(category)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Product>(
                    r#"
                    SELECT id, name, category, price_cents, is_active, created_at, updated_at
                    FROM products
                    WHERE is_active = 1
                    ORDER BY name
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(products)
    }

    /// Lists active products joined with their stock levels.
    pub async fn list_with_stock(&self) -> DbResult<Vec<ProductStockRow>> {
        let rows = sqlx::query_as::<_, ProductStockRow>(
            r#"
            SELECT p.id, p.name, p.category, p.price_cents, p.is_active,
                   s.current_stock, s.threshold_level
            FROM products p
            LEFT JOIN stock_levels s ON s.product_id = p.id
            WHERE p.is_active = 1
            ORDER BY p.category, p.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Inserts a new product.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (id, name, category, price_cents, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.price_cents)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates an existing product.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Updating product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                category = ?3,
                price_cents = ?4,
                is_active = ?5,
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.price_cents)
        .bind(product.is_active)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Soft-deletes a product by setting is_active = false.
    ///
    /// ## Why Soft Delete?
    /// Historical order items still reference this product, and the stock
    /// ledger keeps its movement history.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET is_active = 0, updated_at = ?2
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts active products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}
