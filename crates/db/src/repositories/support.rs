//! Support-info repository for the singleton contact row.

use std::sync::Arc;

use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, Set};

use crate::entities::support_info;

const SINGLETON_ID: i16 = 1;

/// Replacement values for the support singleton.
#[derive(Debug, Clone, Default)]
pub struct UpdateSupportInput {
    /// Organization name.
    pub organization: String,
    /// Contact phone.
    pub phone: String,
    /// Contact email.
    pub email: String,
    /// Office address.
    pub address: String,
    /// Facebook page URL.
    pub facebook_url: String,
    /// Office hours text.
    pub hours: String,
}

/// Support-info repository.
#[derive(Debug, Clone)]
pub struct SupportRepository {
    db: Arc<DatabaseConnection>,
}

impl SupportRepository {
    /// Creates a new support repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Returns the singleton row, creating it with defaults if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query or insert fails.
    pub async fn get(&self) -> Result<support_info::Model, DbErr> {
        if let Some(info) = support_info::Entity::find_by_id(SINGLETON_ID)
            .one(&*self.db)
            .await?
        {
            return Ok(info);
        }

        let defaults = support_info::ActiveModel {
            id: Set(SINGLETON_ID),
            organization: Set("Aquabill Support Desk".to_string()),
            phone: Set(String::new()),
            email: Set(String::new()),
            address: Set(String::new()),
            facebook_url: Set(String::new()),
            hours: Set(String::new()),
            updated_at: Set(chrono::Utc::now().into()),
        };
        defaults.insert(&*self.db).await
    }

    /// Replaces the singleton's contact fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query or update fails.
    pub async fn update(&self, input: UpdateSupportInput) -> Result<support_info::Model, DbErr> {
        let current = self.get().await?;

        let mut active: support_info::ActiveModel = current.into();
        active.organization = Set(input.organization);
        active.phone = Set(input.phone);
        active.email = Set(input.email);
        active.address = Set(input.address);
        active.facebook_url = Set(input.facebook_url);
        active.hours = Set(input.hours);
        active.updated_at = Set(chrono::Utc::now().into());

        active.update(&*self.db).await
    }
}
