//! Seeds default accounts and the support_info singleton.
//!
//! Mirrors what the portal expects on first boot: one admin login, one
//! demo consumer login with a profile, and support contact defaults.

use sea_orm::Statement;
use sea_orm_migration::prelude::*;
use uuid::Uuid;

use aquabill_core::auth::hash_password;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        let backend = db.get_database_backend();

        let admin_hash =
            hash_password("Admin@123").map_err(|e| DbErr::Migration(e.to_string()))?;
        let consumer_hash =
            hash_password("password123").map_err(|e| DbErr::Migration(e.to_string()))?;
        let consumer_user_id = Uuid::new_v4();

        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (id, username, email, password_hash, role)
             VALUES ($1, 'admin', 'admin@aquabill.local', $2, 'admin')
             ON CONFLICT (username) DO NOTHING",
            [Uuid::new_v4().into(), admin_hash.into()],
        ))
        .await?;

        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (id, username, email, password_hash, role)
             VALUES ($1, 'consumer', 'consumer@aquabill.local', $2, 'consumer')
             ON CONFLICT (username) DO NOTHING",
            [consumer_user_id.into(), consumer_hash.into()],
        ))
        .await?;

        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO consumers (id, user_id, name, address, email)
             SELECT $1, id, 'Default Consumer', 'Pending address update', email
             FROM users WHERE username = 'consumer'
             ON CONFLICT (user_id) DO NOTHING",
            [Uuid::new_v4().into()],
        ))
        .await?;

        db.execute_unprepared(
            "INSERT INTO support_info (id) VALUES (1) ON CONFLICT (id) DO NOTHING",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "DELETE FROM support_info WHERE id = 1;
             DELETE FROM users WHERE username IN ('admin', 'consumer');",
        )
        .await?;
        Ok(())
    }
}
