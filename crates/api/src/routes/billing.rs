//! Billing routes: consumer billing view and admin bill management.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::AppState;
use crate::middleware::AuthUser;
use crate::routes::{
    internal_error, reconcile_after_bill_write, reconcile_supply_status, require_admin,
};
use crate::routes::user::current_month;
use aquabill_core::billing::BillingService;
use aquabill_core::month::Month;
use aquabill_db::entities::bills;
use aquabill_db::repositories::UpsertBillInput;
use aquabill_db::{BillRepository, ConsumerRepository, UserRepository};

/// Creates the billing routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/consumer/billing", get(consumer_billing))
        .route("/admin/billing/consumers", get(billing_consumers))
        .route("/admin/billing", post(create_bill))
        .route("/admin/billing/{id}", put(update_bill))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// A bill annotated with its due amount.
#[derive(Debug, Serialize)]
pub struct BillResponse {
    /// Bill ID.
    pub id: Uuid,
    /// Owning consumer.
    pub consumer_id: Uuid,
    /// Month name.
    pub month: String,
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
    /// Amount still owed.
    #[serde(rename = "dueAmount")]
    pub due_amount: Decimal,
}

impl BillResponse {
    fn from_model(bill: &bills::Model) -> Self {
        let month = Month::from_index(bill.month).unwrap_or(Month::January);
        Self {
            id: bill.id,
            consumer_id: bill.consumer_id,
            month: month.name().to_string(),
            year: bill.year,
            cubic_meters: bill.cubic_meters,
            rate_per_cubic_meter: bill.rate_per_cubic_meter,
            amount: bill.amount,
            status: bill.status.clone(),
            balance: bill.balance,
            due_amount: BillingService::due_amount(&bill.to_domain()),
        }
    }
}

/// A consumer with their bills and outstanding total, for the admin
/// billing screen.
#[derive(Debug, Serialize)]
pub struct ConsumerBilling {
    /// Consumer ID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Service address.
    pub address: String,
    /// Contact phone.
    pub phone: String,
    /// Contact email.
    pub email: String,
    /// Cached supply status.
    pub status: String,
    /// Sum of due amounts across the bills.
    pub outstanding: Decimal,
    /// The consumer's bills, newest first.
    pub bills: Vec<BillResponse>,
}

/// Request body for creating (or overwriting) a bill.
#[derive(Debug, Deserialize)]
pub struct SaveBillRequest {
    /// Owning consumer.
    pub consumer_id: Option<Uuid>,
    /// English month name.
    pub month: Option<String>,
    /// Billing year.
    pub year: Option<i32>,
    /// Metered usage; absent counts as 0.
    #[serde(default)]
    pub cubic_meters: Option<Decimal>,
    /// Rate; absent falls back to the default rate.
    #[serde(default)]
    pub rate_per_cubic_meter: Option<Decimal>,
    /// Billed amount.
    pub amount: Option<Decimal>,
    /// Status text; absent counts as Pending.
    #[serde(default)]
    pub status: Option<String>,
    /// Residual amount; absent counts as 0.
    #[serde(default)]
    pub balance: Option<Decimal>,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /consumer/billing - The caller's bills with due amounts and a
/// balance breakdown.
async fn consumer_billing(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let user_repo = UserRepository::new(state.db.clone());
    let consumer_repo = ConsumerRepository::new(state.db.clone());
    let bill_repo = BillRepository::new(state.db.clone());

    let user = match user_repo.find_by_id(auth.user_id()).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            return Json(json!({
                "bills": [],
                "balance": { "totalBalance": 0 }
            }))
            .into_response();
        }
        Err(e) => {
            error!(error = %e, "Failed to load user");
            return internal_error();
        }
    };

    let consumer = match consumer_repo
        .ensure_profile(user.id, &user.username, &user.email)
        .await
    {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Failed to load consumer profile");
            return internal_error();
        }
    };

    if let Err(e) = reconcile_supply_status(&consumer_repo, &bill_repo, &consumer).await {
        error!(error = %e, "Supply status evaluation failed");
        return internal_error();
    }

    let rows = match bill_repo.bills_for_consumer(consumer.id).await {
        Ok(b) => b,
        Err(e) => {
            error!(error = %e, "Failed to load bills");
            return internal_error();
        }
    };

    let domain: Vec<_> = rows.iter().map(bills::Model::to_domain).collect();
    let summary = BillingService::summarize(&domain, current_month());
    let bills_with_due: Vec<BillResponse> = rows.iter().map(BillResponse::from_model).collect();

    Json(json!({
        "bills": bills_with_due,
        "balance": summary.balance_summary,
    }))
    .into_response()
}

/// GET /admin/billing/consumers - Every consumer with their bills and
/// outstanding totals.
async fn billing_consumers(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    if let Err(response) = require_admin(&auth) {
        return response;
    }

    let consumer_repo = ConsumerRepository::new(state.db.clone());
    let bill_repo = BillRepository::new(state.db.clone());

    let consumers = match consumer_repo.list_all().await {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Failed to list consumers");
            return internal_error();
        }
    };
    let all_bills = match bill_repo.list_all().await {
        Ok(b) => b,
        Err(e) => {
            error!(error = %e, "Failed to list bills");
            return internal_error();
        }
    };

    let merged: Vec<ConsumerBilling> = consumers
        .into_iter()
        .map(|consumer| {
            let bills: Vec<BillResponse> = all_bills
                .iter()
                .filter(|b| b.consumer_id == consumer.id)
                .map(BillResponse::from_model)
                .collect();
            let outstanding = bills.iter().map(|b| b.due_amount).sum();
            ConsumerBilling {
                id: consumer.id,
                name: consumer.name,
                address: consumer.address,
                phone: consumer.phone,
                email: consumer.email,
                status: consumer.status,
                outstanding,
                bills,
            }
        })
        .collect();

    Json(json!({ "consumers": merged })).into_response()
}

/// POST /admin/billing - Create a bill, or overwrite the existing bill on
/// the same (consumer, month, year) key. Triggers the supply evaluation
/// for the affected consumer.
async fn create_bill(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<SaveBillRequest>,
) -> impl IntoResponse {
    if let Err(response) = require_admin(&auth) {
        return response;
    }

    let (Some(consumer_id), Some(month_name), Some(year), Some(amount)) = (
        payload.consumer_id,
        payload.month.as_deref(),
        payload.year,
        payload.amount,
    ) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "validation_error",
                "message": "Consumer ID, month, year, and amount are required"
            })),
        )
            .into_response();
    };

    let Some(month) = Month::from_name(month_name) else {
        return invalid_month();
    };

    let consumer_repo = ConsumerRepository::new(state.db.clone());
    match consumer_repo.find_by_id(consumer_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": "not_found",
                    "message": "Consumer not found"
                })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, "Failed to load consumer");
            return internal_error();
        }
    }

    let bill_repo = BillRepository::new(state.db.clone());
    let input = UpsertBillInput {
        consumer_id,
        month: month.index(),
        year,
        cubic_meters: payload.cubic_meters.unwrap_or(Decimal::ZERO),
        rate_per_cubic_meter: payload
            .rate_per_cubic_meter
            .unwrap_or_else(default_rate),
        amount,
        status: payload.status.unwrap_or_else(|| "Pending".to_string()),
        balance: payload.balance.unwrap_or(Decimal::ZERO),
    };

    match bill_repo.upsert(input).await {
        Ok(bill) => {
            info!(
                consumer_id = %consumer_id,
                bill_id = %bill.id,
                month = %month,
                year,
                "Bill saved"
            );
            reconcile_after_bill_write(&state, consumer_id).await;
            (StatusCode::OK, Json(json!({ "success": true, "id": bill.id }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to save bill");
            internal_error()
        }
    }
}

/// PUT /admin/billing/{id} - Rewrite a bill. Triggers the supply
/// evaluation for the affected consumer.
async fn update_bill(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SaveBillRequest>,
) -> impl IntoResponse {
    if let Err(response) = require_admin(&auth) {
        return response;
    }

    let (Some(month_name), Some(year), Some(amount)) =
        (payload.month.as_deref(), payload.year, payload.amount)
    else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "validation_error",
                "message": "Month, year, and amount are required"
            })),
        )
            .into_response();
    };

    let Some(month) = Month::from_name(month_name) else {
        return invalid_month();
    };

    let bill_repo = BillRepository::new(state.db.clone());
    let Some(existing) = (match bill_repo.find_by_id(id).await {
        Ok(b) => b,
        Err(e) => {
            error!(error = %e, "Failed to load bill");
            return internal_error();
        }
    }) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": "Bill not found"
            })),
        )
            .into_response();
    };

    let input = UpsertBillInput {
        consumer_id: existing.consumer_id,
        month: month.index(),
        year,
        cubic_meters: payload.cubic_meters.unwrap_or(Decimal::ZERO),
        rate_per_cubic_meter: payload
            .rate_per_cubic_meter
            .unwrap_or_else(default_rate),
        amount,
        status: payload.status.unwrap_or_else(|| "Pending".to_string()),
        balance: payload.balance.unwrap_or(Decimal::ZERO),
    };

    match bill_repo.update(id, input).await {
        Ok(Some(bill)) => {
            info!(bill_id = %bill.id, "Bill updated");
            reconcile_after_bill_write(&state, bill.consumer_id).await;
            Json(json!({ "success": true })).into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": "Bill not found"
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to update bill");
            internal_error()
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn invalid_month() -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "validation_error",
            "message": "Month must be an English month name"
        })),
    )
        .into_response()
}

/// Default billing rate per cubic meter.
fn default_rate() -> Decimal {
    Decimal::new(2800, 2)
}
