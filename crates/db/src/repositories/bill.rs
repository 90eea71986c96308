//! Bill repository for database operations.

use std::sync::Arc;

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::bills;

/// Fields for creating or replacing a bill on its (consumer, month, year)
/// key.
#[derive(Debug, Clone)]
pub struct UpsertBillInput {
    /// Owning consumer.
    pub consumer_id: Uuid,
    /// Billing month index (1-12).
    pub month: i16,
    /// Billing year.
    pub year: i32,
    /// Metered usage.
    pub cubic_meters: Decimal,
    /// Rate at billing time.
    pub rate_per_cubic_meter: Decimal,
    /// Billed amount.
    pub amount: Decimal,
    /// Payment status text.
    pub status: String,
    /// Manual residual amount.
    pub balance: Decimal,
}

/// Bill repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct BillRepository {
    db: Arc<DatabaseConnection>,
}

impl BillRepository {
    /// Creates a new bill repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Finds a bill by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<bills::Model>, DbErr> {
        bills::Entity::find_by_id(id).one(&*self.db).await
    }

    /// Lists a consumer's bills, newest (year, month) first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn bills_for_consumer(&self, consumer_id: Uuid) -> Result<Vec<bills::Model>, DbErr> {
        bills::Entity::find()
            .filter(bills::Column::ConsumerId.eq(consumer_id))
            .order_by_desc(bills::Column::Year)
            .order_by_desc(bills::Column::Month)
            .all(&*self.db)
            .await
    }

    /// Lists every bill, newest (year, month) first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_all(&self) -> Result<Vec<bills::Model>, DbErr> {
        bills::Entity::find()
            .order_by_desc(bills::Column::Year)
            .order_by_desc(bills::Column::Month)
            .all(&*self.db)
            .await
    }

    /// Inserts a bill, or replaces the editable fields of the existing
    /// bill on the same (consumer, month, year) key.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query or write fails.
    pub async fn upsert(&self, input: UpsertBillInput) -> Result<bills::Model, DbErr> {
        let now = chrono::Utc::now();
        let existing = bills::Entity::find()
            .filter(bills::Column::ConsumerId.eq(input.consumer_id))
            .filter(bills::Column::Month.eq(input.month))
            .filter(bills::Column::Year.eq(input.year))
            .one(&*self.db)
            .await?;

        if let Some(bill) = existing {
            let mut active: bills::ActiveModel = bill.into();
            active.cubic_meters = Set(input.cubic_meters);
            active.rate_per_cubic_meter = Set(input.rate_per_cubic_meter);
            active.amount = Set(input.amount);
            active.status = Set(input.status);
            active.balance = Set(input.balance);
            active.updated_at = Set(now.into());
            return active.update(&*self.db).await;
        }

        let bill = bills::ActiveModel {
            id: Set(Uuid::new_v4()),
            consumer_id: Set(input.consumer_id),
            month: Set(input.month),
            year: Set(input.year),
            cubic_meters: Set(input.cubic_meters),
            rate_per_cubic_meter: Set(input.rate_per_cubic_meter),
            amount: Set(input.amount),
            status: Set(input.status),
            balance: Set(input.balance),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        bill.insert(&*self.db).await
    }

    /// Rewrites a bill in place. Returns `None` for an unknown ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query or update fails.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpsertBillInput,
    ) -> Result<Option<bills::Model>, DbErr> {
        let Some(bill) = bills::Entity::find_by_id(id).one(&*self.db).await? else {
            return Ok(None);
        };

        let mut active: bills::ActiveModel = bill.into();
        active.month = Set(input.month);
        active.year = Set(input.year);
        active.cubic_meters = Set(input.cubic_meters);
        active.rate_per_cubic_meter = Set(input.rate_per_cubic_meter);
        active.amount = Set(input.amount);
        active.status = Set(input.status);
        active.balance = Set(input.balance);
        active.updated_at = Set(chrono::Utc::now().into());

        active.update(&*self.db).await.map(Some)
    }

    /// Sum of amounts on Paid bills plus total metered usage, for the
    /// admin metrics view.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn revenue_and_usage(&self) -> Result<(Decimal, Decimal), DbErr> {
        let all = bills::Entity::find().all(&*self.db).await?;
        let revenue = all
            .iter()
            .filter(|b| b.status == "Paid")
            .map(|b| b.amount)
            .sum();
        let cubic_meters = all.iter().map(|b| b.cubic_meters).sum();
        Ok((revenue, cubic_meters))
    }
}
