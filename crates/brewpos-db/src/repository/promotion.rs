//! # Promotion Repository
//!
//! Database operations for discount campaigns.
//!
//! ## Archive vs Delete
//! Promotions referenced by past transactions are archived, never deleted;
//! `delete` exists for campaigns created by mistake that were never used.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use brewpos_core::Promotion;

/// Repository for promotion database operations.
#[derive(Debug, Clone)]
pub struct PromotionRepository {
    pool: SqlitePool,
}

impl PromotionRepository {
    /// Creates a new PromotionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PromotionRepository { pool }
    }

    /// Gets a promotion by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Promotion>> {
        let promotion = sqlx::query_as::<_, Promotion>(
            r#"
            SELECT id, name, description, discount_type, discount_value,
                   is_active, is_archived, start_date, end_date,
                   created_by, created_at, updated_at
            FROM promotions
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(promotion)
    }

    /// Lists promotions selectable at the register right now: active,
    /// not archived, and not past their end date.
    pub async fn list_selectable(&self, now: DateTime<Utc>) -> DbResult<Vec<Promotion>> {
        let promotions = sqlx::query_as::<_, Promotion>(
            r#"
            SELECT id, name, description, discount_type, discount_value,
                   is_active, is_archived, start_date, end_date,
                   created_by, created_at, updated_at
            FROM promotions
            WHERE is_active = 1 AND is_archived = 0 AND end_date >= ?1
            ORDER BY end_date
            "#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(promotions)
    }

    /// Lists all promotions including archived ones (management view).
    pub async fn list_all(&self) -> DbResult<Vec<Promotion>> {
        let promotions = sqlx::query_as::<_, Promotion>(
            r#"
            SELECT id, name, description, discount_type, discount_value,
                   is_active, is_archived, start_date, end_date,
                   created_by, created_at, updated_at
            FROM promotions
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(promotions)
    }

    /// Inserts a new promotion.
    pub async fn insert(&self, promotion: &Promotion) -> DbResult<()> {
        debug!(id = %promotion.id, name = %promotion.name, "Inserting promotion");

        sqlx::query(
            r#"
            INSERT INTO promotions (
                id, name, description, discount_type, discount_value,
                is_active, is_archived, start_date, end_date,
                created_by, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&promotion.id)
        .bind(&promotion.name)
        .bind(&promotion.description)
        .bind(promotion.discount_type)
        .bind(promotion.discount_value)
        .bind(promotion.is_active)
        .bind(promotion.is_archived)
        .bind(promotion.start_date)
        .bind(promotion.end_date)
        .bind(&promotion.created_by)
        .bind(promotion.created_at)
        .bind(promotion.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates an existing promotion's editable fields.
    ///
    /// `updated_at` is taken from the struct so the caller's in-memory
    /// promotion matches the stored row after the call.
    pub async fn update(&self, promotion: &Promotion) -> DbResult<()> {
        debug!(id = %promotion.id, "Updating promotion");

        let result = sqlx::query(
            r#"
            UPDATE promotions SET
                name = ?2,
                description = ?3,
                discount_type = ?4,
                discount_value = ?5,
                is_active = ?6,
                start_date = ?7,
                end_date = ?8,
                updated_at = ?9
            WHERE id = ?1 AND is_archived = 0
            "#,
        )
        .bind(&promotion.id)
        .bind(&promotion.name)
        .bind(&promotion.description)
        .bind(promotion.discount_type)
        .bind(promotion.discount_value)
        .bind(promotion.is_active)
        .bind(promotion.start_date)
        .bind(promotion.end_date)
        .bind(promotion.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Promotion", &promotion.id));
        }

        Ok(())
    }

    /// Archives a promotion: clears `is_active` and sets `is_archived`.
    /// Archiving an already-archived promotion returns NotFound.
    pub async fn archive(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Archiving promotion");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE promotions SET is_active = 0, is_archived = 1, updated_at = ?2
            WHERE id = ?1 AND is_archived = 0
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Promotion", id));
        }

        Ok(())
    }

    /// Hard-deletes a promotion that was never applied to a transaction.
    ///
    /// The `NOT EXISTS` guard keeps the ledger's promotion references valid.
    pub async fn delete_unused(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting unused promotion");

        let result = sqlx::query(
            r#"
            DELETE FROM promotions
            WHERE id = ?1
              AND NOT EXISTS (SELECT 1 FROM transactions WHERE promotion_id = ?1)
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Promotion (unused)", id));
        }

        Ok(())
    }
}

/// Helper to generate a new promotion ID.
pub fn generate_promotion_id() -> String {
    Uuid::new_v4().to_string()
}
