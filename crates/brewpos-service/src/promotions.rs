//! # Promotion Service
//!
//! Management of discount campaigns: create, edit, archive, list.
//!
//! Application of a promotion to a payment lives in
//! [`crate::payment::PaymentProcessor`]; this service only manages the
//! campaigns themselves.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info};

use brewpos_core::{validation, CoreError, DiscountType, Promotion};
use brewpos_db::repository::promotion::generate_promotion_id;
use brewpos_db::Database;

use crate::context::ActorContext;
use crate::error::ServiceResult;

// =============================================================================
// Input Types
// =============================================================================

/// A new discount campaign.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPromotion {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub discount_type: DiscountType,
    /// Basis points for percentage promotions, cents for fixed-amount.
    pub discount_value: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// Edits to an existing campaign. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub discount_type: Option<DiscountType>,
    #[serde(default)]
    pub discount_value: Option<i64>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
}

// =============================================================================
// Promotion Service
// =============================================================================

/// Orchestrates promotion campaign management.
#[derive(Debug, Clone)]
pub struct PromotionService {
    db: Database,
}

impl PromotionService {
    /// Creates a new promotion service.
    pub fn new(db: Database) -> Self {
        PromotionService { db }
    }

    /// Creates a new campaign, active immediately within its date window.
    pub async fn create(&self, ctx: &ActorContext, input: NewPromotion) -> ServiceResult<Promotion> {
        debug!(name = %input.name, "create promotion");

        validation::validate_name(&input.name).map_err(CoreError::Validation)?;
        validation::validate_discount_value(input.discount_value).map_err(CoreError::Validation)?;
        validation::validate_date_window(input.start_date, input.end_date)
            .map_err(CoreError::Validation)?;

        let now = Utc::now();
        let promotion = Promotion {
            id: generate_promotion_id(),
            name: input.name.trim().to_string(),
            description: input.description,
            discount_type: input.discount_type,
            discount_value: input.discount_value,
            is_active: true,
            is_archived: false,
            start_date: input.start_date,
            end_date: input.end_date,
            created_by: ctx.actor_id.clone(),
            created_at: now,
            updated_at: now,
        };

        self.db.promotions().insert(&promotion).await?;

        info!(id = %promotion.id, name = %promotion.name, "Promotion created");
        Ok(promotion)
    }

    /// Applies edits to an unarchived campaign.
    pub async fn update(&self, id: &str, changes: PromotionUpdate) -> ServiceResult<Promotion> {
        debug!(id = %id, "update promotion");

        let mut promotion = self
            .db
            .promotions()
            .get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::PromotionNotFound(id.to_string()))?;

        if let Some(name) = changes.name {
            validation::validate_name(&name).map_err(CoreError::Validation)?;
            promotion.name = name.trim().to_string();
        }
        if let Some(description) = changes.description {
            promotion.description = description;
        }
        if let Some(discount_type) = changes.discount_type {
            promotion.discount_type = discount_type;
        }
        if let Some(discount_value) = changes.discount_value {
            validation::validate_discount_value(discount_value).map_err(CoreError::Validation)?;
            promotion.discount_value = discount_value;
        }
        if let Some(is_active) = changes.is_active {
            promotion.is_active = is_active;
        }
        if let Some(start_date) = changes.start_date {
            promotion.start_date = start_date;
        }
        if let Some(end_date) = changes.end_date {
            promotion.end_date = end_date;
        }

        validation::validate_date_window(promotion.start_date, promotion.end_date)
            .map_err(CoreError::Validation)?;

        promotion.updated_at = Utc::now();
        self.db.promotions().update(&promotion).await?;

        Ok(promotion)
    }

    /// Archives a campaign: it disappears from the register immediately and
    /// can never be selected again. Ledger references remain intact.
    pub async fn archive(&self, id: &str) -> ServiceResult<()> {
        self.db.promotions().archive(id).await?;
        info!(id = %id, "Promotion archived");
        Ok(())
    }

    /// Hard-deletes a campaign that was created by mistake and never
    /// applied to a payment. Campaigns referenced by the ledger must be
    /// archived instead.
    pub async fn delete(&self, id: &str) -> ServiceResult<()> {
        self.db.promotions().delete_unused(id).await?;
        info!(id = %id, "Promotion deleted");
        Ok(())
    }

    /// Campaigns offered for selection at the register right now.
    pub async fn list_selectable(&self) -> ServiceResult<Vec<Promotion>> {
        Ok(self.db.promotions().list_selectable(Utc::now()).await?)
    }

    /// All campaigns including archived (management view).
    pub async fn list_all(&self) -> ServiceResult<Vec<Promotion>> {
        Ok(self.db.promotions().list_all().await?)
    }

    /// Loads one campaign.
    pub async fn get(&self, id: &str) -> ServiceResult<Promotion> {
        Ok(self
            .db
            .promotions()
            .get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::PromotionNotFound(id.to_string()))?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use brewpos_db::DbConfig;
    use chrono::Duration;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn new_percentage(name: &str, bps: i64) -> NewPromotion {
        let now = Utc::now();
        NewPromotion {
            name: name.to_string(),
            description: None,
            discount_type: DiscountType::Percentage,
            discount_value: bps,
            start_date: now - Duration::hours(1),
            end_date: now + Duration::days(7),
        }
    }

    #[tokio::test]
    async fn create_and_list_selectable() {
        let db = test_db().await;
        let service = PromotionService::new(db);

        let created = service
            .create(&ActorContext::staff("maria"), new_percentage("Happy Hour", 1500))
            .await
            .unwrap();

        assert!(created.is_active);
        assert!(!created.is_archived);
        assert_eq!(created.created_by.as_deref(), Some("maria"));

        let selectable = service.list_selectable().await.unwrap();
        assert_eq!(selectable.len(), 1);
        assert_eq!(selectable[0].id, created.id);
    }

    #[tokio::test]
    async fn expired_campaign_not_selectable() {
        let db = test_db().await;
        let service = PromotionService::new(db);

        let now = Utc::now();
        service
            .create(
                &ActorContext::anonymous(),
                NewPromotion {
                    name: "Last Week".to_string(),
                    description: None,
                    discount_type: DiscountType::FixedAmount,
                    discount_value: 200,
                    start_date: now - Duration::days(14),
                    end_date: now - Duration::days(7),
                },
            )
            .await
            .unwrap();

        assert!(service.list_selectable().await.unwrap().is_empty());
        assert_eq!(service.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn archive_removes_from_register() {
        let db = test_db().await;
        let service = PromotionService::new(db);

        let promo = service
            .create(&ActorContext::anonymous(), new_percentage("Flash Sale", 1000))
            .await
            .unwrap();

        service.archive(&promo.id).await.unwrap();

        assert!(service.list_selectable().await.unwrap().is_empty());

        let archived = service.get(&promo.id).await.unwrap();
        assert!(archived.is_archived);
        assert!(!archived.is_active);
    }

    #[tokio::test]
    async fn archived_campaign_cannot_be_edited() {
        let db = test_db().await;
        let service = PromotionService::new(db);

        let promo = service
            .create(&ActorContext::anonymous(), new_percentage("One Day", 500))
            .await
            .unwrap();
        service.archive(&promo.id).await.unwrap();

        let err = service
            .update(
                &promo.id,
                PromotionUpdate {
                    discount_value: Some(2000),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn update_edits_fields() {
        let db = test_db().await;
        let service = PromotionService::new(db);

        let promo = service
            .create(&ActorContext::anonymous(), new_percentage("Morning", 1000))
            .await
            .unwrap();

        let updated = service
            .update(
                &promo.id,
                PromotionUpdate {
                    name: Some("Morning Rush".to_string()),
                    discount_value: Some(1250),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Morning Rush");
        assert_eq!(updated.discount_value, 1250);
        assert_eq!(updated.discount_type, DiscountType::Percentage);
    }

    #[tokio::test]
    async fn update_returns_stored_timestamp() {
        let db = test_db().await;
        let service = PromotionService::new(db);

        let promo = service
            .create(&ActorContext::anonymous(), new_percentage("Evening", 1000))
            .await
            .unwrap();

        let updated = service
            .update(
                &promo.id,
                PromotionUpdate {
                    discount_value: Some(1500),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        // The struct handed back must match the row as stored
        let stored = service.get(&promo.id).await.unwrap();
        assert_eq!(updated.updated_at, stored.updated_at);
        assert!(updated.updated_at > promo.updated_at);
    }

    #[tokio::test]
    async fn invalid_inputs_rejected() {
        let db = test_db().await;
        let service = PromotionService::new(db);

        // Empty name
        let err = service
            .create(&ActorContext::anonymous(), new_percentage("   ", 1000))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        // Zero discount
        let err = service
            .create(&ActorContext::anonymous(), new_percentage("Free?", 0))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        // End before start
        let now = Utc::now();
        let err = service
            .create(
                &ActorContext::anonymous(),
                NewPromotion {
                    name: "Backwards".to_string(),
                    description: None,
                    discount_type: DiscountType::Percentage,
                    discount_value: 1000,
                    start_date: now,
                    end_date: now - Duration::days(1),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn unused_campaign_can_be_deleted() {
        let db = test_db().await;
        let service = PromotionService::new(db);

        let promo = service
            .create(&ActorContext::anonymous(), new_percentage("Typo", 100))
            .await
            .unwrap();

        service.delete(&promo.id).await.unwrap();

        let err = service.get(&promo.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn over_hundred_percent_accepted() {
        // The pricing engine clamps at payment time; management accepts it.
        let db = test_db().await;
        let service = PromotionService::new(db);

        let promo = service
            .create(&ActorContext::anonymous(), new_percentage("Everything Free", 15_000))
            .await
            .unwrap();
        assert_eq!(promo.discount_value, 15_000);
    }
}
