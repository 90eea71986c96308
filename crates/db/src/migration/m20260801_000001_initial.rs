//! Initial schema: users, consumers, bills, support_info.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(INITIAL_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "DROP TABLE IF EXISTS support_info CASCADE;
             DROP TABLE IF EXISTS bills CASCADE;
             DROP TABLE IF EXISTS consumers CASCADE;
             DROP TABLE IF EXISTS users CASCADE;",
        )
        .await?;
        Ok(())
    }
}

const INITIAL_SQL: &str = r"
-- Portal accounts
CREATE TABLE users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    username VARCHAR(100) NOT NULL UNIQUE,
    email VARCHAR(150) NOT NULL UNIQUE,
    password_hash VARCHAR(255) NOT NULL,
    role VARCHAR(20) NOT NULL DEFAULT 'consumer',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_users_role CHECK (role IN ('admin', 'consumer'))
);

-- Billed water consumers. status caches the supply evaluation.
CREATE TABLE consumers (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID UNIQUE REFERENCES users(id) ON DELETE SET NULL,
    name VARCHAR(150) NOT NULL,
    address VARCHAR(255) NOT NULL,
    phone VARCHAR(60) NOT NULL DEFAULT '',
    email VARCHAR(150) NOT NULL DEFAULT '',
    rate_per_cubic_meter DECIMAL(10,2) NOT NULL DEFAULT 28.00,
    status VARCHAR(30) NOT NULL DEFAULT 'active',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- Monthly charge records. month is a 1-12 index.
CREATE TABLE bills (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    consumer_id UUID NOT NULL REFERENCES consumers(id) ON DELETE CASCADE,
    month SMALLINT NOT NULL,
    year INT NOT NULL,
    cubic_meters DECIMAL(10,2) NOT NULL DEFAULT 0,
    rate_per_cubic_meter DECIMAL(10,2) NOT NULL DEFAULT 28.00,
    amount DECIMAL(10,2) NOT NULL,
    status VARCHAR(30) NOT NULL DEFAULT 'Pending',
    balance DECIMAL(10,2) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_bills_month CHECK (month BETWEEN 1 AND 12),
    CONSTRAINT uq_bills UNIQUE (consumer_id, month, year)
);

-- Support desk contact details (singleton row)
CREATE TABLE support_info (
    id SMALLINT PRIMARY KEY,
    organization VARCHAR(150) NOT NULL DEFAULT 'Aquabill Support Desk',
    phone VARCHAR(60) NOT NULL DEFAULT '',
    email VARCHAR(150) NOT NULL DEFAULT '',
    address VARCHAR(255) NOT NULL DEFAULT '',
    facebook_url VARCHAR(255) NOT NULL DEFAULT '',
    hours VARCHAR(120) NOT NULL DEFAULT '',
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- Bill listing is always newest-first per consumer
CREATE INDEX idx_bills_consumer ON bills(consumer_id, year DESC, month DESC);

CREATE INDEX idx_consumers_user ON consumers(user_id);
";
