//! `SeaORM` Entity for the bills table.
//!
//! `month` is a 1-12 index; English names exist only at the API edge.
//! Unique on (consumer_id, month, year).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "bills")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub consumer_id: Uuid,
    pub month: i16,
    pub year: i32,
    pub cubic_meters: Decimal,
    pub rate_per_cubic_meter: Decimal,
    pub amount: Decimal,
    pub status: String,
    pub balance: Decimal,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::consumers::Entity",
        from = "Column::ConsumerId",
        to = "super::consumers::Column::Id"
    )]
    Consumers,
}

impl Related<super::consumers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Consumers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Converts the row into the core billing domain type.
    ///
    /// The table's CHECK constraint keeps `month` within 1-12.
    #[must_use]
    pub fn to_domain(&self) -> aquabill_core::billing::Bill {
        use aquabill_core::billing::BillStatus;
        use aquabill_core::month::Month;

        aquabill_core::billing::Bill {
            month: Month::from_index(self.month).unwrap_or(Month::January),
            year: self.year,
            cubic_meters: self.cubic_meters,
            rate_per_cubic_meter: self.rate_per_cubic_meter,
            amount: self.amount,
            status: BillStatus::parse(&self.status),
            balance: self.balance,
        }
    }
}
