//! Consumer repository for database operations.

use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, sea_query::Expr,
};
use uuid::Uuid;

use aquabill_core::supply::SupplyStatus;

use crate::entities::consumers;

/// Optional fields for a consumer-profile update. `None` keeps the stored
/// value.
#[derive(Debug, Clone, Default)]
pub struct UpdateConsumerInput {
    /// Consumer display name.
    pub name: Option<String>,
    /// Service address.
    pub address: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Contact email.
    pub email: Option<String>,
}

/// Consumer counts for the admin metrics view.
#[derive(Debug, Clone, Copy)]
pub struct ConsumerMetrics {
    /// All consumer profiles.
    pub total: u64,
    /// Profiles whose cached status is active.
    pub active: u64,
}

/// Consumer repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct ConsumerRepository {
    db: Arc<DatabaseConnection>,
}

impl ConsumerRepository {
    /// Creates a new consumer repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Finds a consumer profile by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<consumers::Model>, DbErr> {
        consumers::Entity::find_by_id(id).one(&*self.db).await
    }

    /// Finds the consumer profile linked to a portal user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<consumers::Model>, DbErr> {
        consumers::Entity::find()
            .filter(consumers::Column::UserId.eq(user_id))
            .one(&*self.db)
            .await
    }

    /// Returns the profile for a user, creating a placeholder one if the
    /// user has none yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query or insert fails.
    pub async fn ensure_profile(
        &self,
        user_id: Uuid,
        username: &str,
        email: &str,
    ) -> Result<consumers::Model, DbErr> {
        if let Some(existing) = self.find_by_user_id(user_id).await? {
            return Ok(existing);
        }

        let profile = consumers::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(Some(user_id)),
            name: Set(username.to_string()),
            address: Set("Pending address update".to_string()),
            phone: Set(String::new()),
            email: Set(email.to_string()),
            rate_per_cubic_meter: Set(rust_decimal::Decimal::new(2800, 2)),
            status: Set(SupplyStatus::Active.as_str().to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };

        profile.insert(&*self.db).await
    }

    /// Overwrites the cached supply status.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn set_status(&self, id: Uuid, status: SupplyStatus) -> Result<(), DbErr> {
        consumers::Entity::update_many()
            .col_expr(consumers::Column::Status, Expr::value(status.as_str()))
            .filter(consumers::Column::Id.eq(id))
            .exec(&*self.db)
            .await?;
        Ok(())
    }

    /// Applies a profile update; absent fields keep their stored values.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query or update fails.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateConsumerInput,
    ) -> Result<Option<consumers::Model>, DbErr> {
        let Some(consumer) = consumers::Entity::find_by_id(id).one(&*self.db).await? else {
            return Ok(None);
        };

        let mut active: consumers::ActiveModel = consumer.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(address) = input.address {
            active.address = Set(address);
        }
        if let Some(phone) = input.phone {
            active.phone = Set(phone);
        }
        if let Some(email) = input.email {
            active.email = Set(email);
        }

        active.update(&*self.db).await.map(Some)
    }

    /// Lists all consumer profiles ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_all(&self) -> Result<Vec<consumers::Model>, DbErr> {
        consumers::Entity::find()
            .order_by_asc(consumers::Column::Name)
            .all(&*self.db)
            .await
    }

    /// Consumer counts for the admin metrics view.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn metrics(&self) -> Result<ConsumerMetrics, DbErr> {
        let total = consumers::Entity::find().count(&*self.db).await?;
        let active = consumers::Entity::find()
            .filter(consumers::Column::Status.eq(SupplyStatus::Active.as_str()))
            .count(&*self.db)
            .await?;
        Ok(ConsumerMetrics { total, active })
    }
}
