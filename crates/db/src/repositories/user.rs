//! User repository for database operations.

use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use aquabill_core::auth::UserRole;

use crate::entities::{consumers, users};

/// Optional fields for an account update. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct UpdateUserInput {
    /// New username.
    pub username: Option<String>,
    /// New email.
    pub email: Option<String>,
    /// New password hash.
    pub password_hash: Option<String>,
}

/// User repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find_by_id(id).one(&*self.db).await
    }

    /// Finds a user by username or email, for login.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_login(&self, login: &str) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(
                Condition::any()
                    .add(users::Column::Username.eq(login))
                    .add(users::Column::Email.eq(login)),
            )
            .one(&*self.db)
            .await
    }

    /// Checks whether a username or email is already taken by another user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn login_taken(
        &self,
        username: &str,
        email: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, DbErr> {
        let mut query = users::Entity::find().filter(
            Condition::any()
                .add(users::Column::Username.eq(username))
                .add(users::Column::Email.eq(email)),
        );
        if let Some(id) = exclude {
            query = query.filter(users::Column::Id.ne(id));
        }
        let count = query.count(&*self.db).await?;
        Ok(count > 0)
    }

    /// Creates a new user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        role: &str,
    ) -> Result<users::Model, DbErr> {
        let user = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(username.to_string()),
            email: Set(email.to_string()),
            password_hash: Set(password_hash.to_string()),
            role: Set(role.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };

        user.insert(&*self.db).await
    }

    /// Applies an account update; absent fields keep their stored values.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query or update fails.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateUserInput,
    ) -> Result<Option<users::Model>, DbErr> {
        let Some(user) = users::Entity::find_by_id(id).one(&*self.db).await? else {
            return Ok(None);
        };

        let mut active: users::ActiveModel = user.into();
        if let Some(username) = input.username {
            active.username = Set(username);
        }
        if let Some(email) = input.email {
            active.email = Set(email);
        }
        if let Some(hash) = input.password_hash {
            active.password_hash = Set(hash);
        }

        active.update(&*self.db).await.map(Some)
    }

    /// Deletes a user. Returns true if a row was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn delete(&self, id: Uuid) -> Result<bool, DbErr> {
        let result = users::Entity::delete_by_id(id).exec(&*self.db).await?;
        Ok(result.rows_affected > 0)
    }

    /// Lists non-admin users with their consumer profiles, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_consumer_accounts(
        &self,
    ) -> Result<Vec<(users::Model, Option<consumers::Model>)>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Role.ne(UserRole::Admin.as_str()))
            .find_also_related(consumers::Entity)
            .order_by_desc(users::Column::CreatedAt)
            .all(&*self.db)
            .await
    }

    /// Counts non-admin users.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count_consumer_accounts(&self) -> Result<u64, DbErr> {
        users::Entity::find()
            .filter(users::Column::Role.ne(UserRole::Admin.as_str()))
            .count(&*self.db)
            .await
    }
}
