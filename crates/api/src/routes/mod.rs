//! API route definitions.

use axum::{Json, Router, http::StatusCode, middleware, response::IntoResponse, response::Response};
use sea_orm::DbErr;
use serde_json::json;
use tracing::error;

use crate::{AppState, middleware::AuthUser, middleware::auth::auth_middleware};
use aquabill_core::supply::{SupplyStatus, evaluate_supply_status};
use aquabill_db::entities::consumers;
use aquabill_db::{BillRepository, ConsumerRepository};

pub mod admin;
pub mod auth;
pub mod billing;
pub mod health;
pub mod support;
pub mod user;

/// Creates the API router with public and protected routes.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Protected routes that require authentication
    let protected_routes = Router::new()
        .merge(user::routes())
        .merge(billing::routes())
        .merge(admin::routes())
        .merge(support::admin_routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(support::public_routes())
        .merge(protected_routes)
}

// ============================================================================
// Shared Handler Helpers
// ============================================================================

/// Rejects non-admin callers with a 403 response.
pub(crate) fn require_admin(auth: &AuthUser) -> Result<(), Response> {
    if auth.is_admin() {
        Ok(())
    } else {
        Err((
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": "forbidden",
                "message": "Admin access required"
            })),
        )
            .into_response())
    }
}

/// Generic 500 response used when a storage error has already been logged.
pub(crate) fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "internal_error",
            "message": "An error occurred"
        })),
    )
        .into_response()
}

/// Re-runs the supply evaluation for a consumer and refreshes the cached
/// status column when the result differs.
///
/// This is the pull-based reconciliation every consumer-facing read path
/// goes through; evaluation is idempotent so concurrent calls are safe.
pub(crate) async fn reconcile_supply_status(
    consumer_repo: &ConsumerRepository,
    bill_repo: &BillRepository,
    consumer: &consumers::Model,
) -> Result<SupplyStatus, DbErr> {
    let bills: Vec<_> = bill_repo
        .bills_for_consumer(consumer.id)
        .await?
        .iter()
        .map(aquabill_db::entities::bills::Model::to_domain)
        .collect();

    let today = chrono::Utc::now().date_naive();
    let status = evaluate_supply_status(&bills, today);
    if status.as_str() != consumer.status {
        consumer_repo.set_status(consumer.id, status).await?;
    }
    Ok(status)
}

/// Runs reconciliation for a consumer id, logging failures without
/// surfacing them; bill writes succeed even if the refresh races.
pub(crate) async fn reconcile_after_bill_write(state: &AppState, consumer_id: uuid::Uuid) {
    let consumer_repo = ConsumerRepository::new(state.db.clone());
    let bill_repo = BillRepository::new(state.db.clone());

    match consumer_repo.find_by_id(consumer_id).await {
        Ok(Some(consumer)) => {
            if let Err(e) =
                reconcile_supply_status(&consumer_repo, &bill_repo, &consumer).await
            {
                error!(error = %e, consumer_id = %consumer_id, "Supply status refresh failed");
            }
        }
        Ok(None) => {}
        Err(e) => {
            error!(error = %e, consumer_id = %consumer_id, "Failed to load consumer for status refresh");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aquabill_db::entities::bills;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;
    use uuid::Uuid;

    fn consumer_row(status: &str) -> consumers::Model {
        consumers::Model {
            id: Uuid::new_v4(),
            user_id: Some(Uuid::new_v4()),
            name: "Mara Santos".to_string(),
            address: "12 Riverside Rd".to_string(),
            phone: String::new(),
            email: "mara@example.com".to_string(),
            rate_per_cubic_meter: dec!(28.00),
            status: status.to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn bill_row(consumer_id: Uuid, month: i16, year: i32, status: &str) -> bills::Model {
        bills::Model {
            id: Uuid::new_v4(),
            consumer_id,
            month,
            year,
            cubic_meters: dec!(10),
            rate_per_cubic_meter: dec!(28.00),
            amount: dec!(280),
            status: status.to_string(),
            balance: dec!(0),
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    fn issued_update(log: &[sea_orm::Transaction]) -> bool {
        log.iter().any(|t| {
            let s = format!("{t:?}");
            s.contains("UPDATE") && s.contains("consumers")
        })
    }

    #[tokio::test]
    async fn reconcile_overwrites_stale_active_status() {
        let consumer = consumer_row("active");
        // A long-past bill that was never settled.
        let unpaid = bill_row(consumer.id, 1, 2000, "Pending");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![unpaid]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let consumer_repo = ConsumerRepository::new(db.clone());
        let bill_repo = BillRepository::new(db.clone());

        let status = reconcile_supply_status(&consumer_repo, &bill_repo, &consumer)
            .await
            .unwrap();
        assert_eq!(status, SupplyStatus::CutOff);

        drop(consumer_repo);
        drop(bill_repo);
        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        assert_eq!(log.len(), 2);
        assert!(issued_update(&log));
    }

    #[tokio::test]
    async fn reconcile_skips_write_when_status_matches() {
        let consumer = consumer_row("active");
        let paid = bill_row(consumer.id, 1, 2000, "Paid");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![paid]])
                .into_connection(),
        );

        let consumer_repo = ConsumerRepository::new(db.clone());
        let bill_repo = BillRepository::new(db.clone());

        let status = reconcile_supply_status(&consumer_repo, &bill_repo, &consumer)
            .await
            .unwrap();
        assert_eq!(status, SupplyStatus::Active);

        drop(consumer_repo);
        drop(bill_repo);
        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        assert_eq!(log.len(), 1);
        assert!(!issued_update(&log));
    }

    #[tokio::test]
    async fn reconcile_restores_active_after_settlement() {
        let consumer = consumer_row("cut_off");
        let paid = bill_row(consumer.id, 1, 2000, "Paid");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![paid]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let consumer_repo = ConsumerRepository::new(db.clone());
        let bill_repo = BillRepository::new(db.clone());

        let status = reconcile_supply_status(&consumer_repo, &bill_repo, &consumer)
            .await
            .unwrap();
        assert_eq!(status, SupplyStatus::Active);

        drop(consumer_repo);
        drop(bill_repo);
        assert!(issued_update(
            &Arc::try_unwrap(db).unwrap().into_transaction_log()
        ));
    }

    #[tokio::test]
    async fn bill_write_refresh_cuts_off_past_due_consumer() {
        let consumer = consumer_row("active");
        let consumer_id = consumer.id;
        let unpaid = bill_row(consumer_id, 1, 2000, "Pending");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![consumer]])
                .append_query_results([vec![unpaid]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let state = AppState {
            db: db.clone(),
            jwt_service: std::sync::Arc::new(aquabill_shared::JwtService::new(
                aquabill_shared::JwtConfig::default(),
            )),
        };

        reconcile_after_bill_write(&state, consumer_id).await;

        drop(state);
        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        assert_eq!(log.len(), 3);
        assert!(issued_update(&log));
    }
}
