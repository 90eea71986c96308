//! Authenticated user routes: profile, usage, password change.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::AppState;
use crate::middleware::AuthUser;
use crate::routes::{internal_error, reconcile_supply_status, require_admin};
use aquabill_core::billing::BillingService;
use aquabill_core::month::Month;
use aquabill_core::usage::estimate_usage_growth;
use aquabill_core::auth::{UserRole, hash_password, verify_password};
use aquabill_db::entities::bills;
use aquabill_db::repositories::UpdateUserInput;
use aquabill_db::{BillRepository, ConsumerRepository, UserRepository};
use aquabill_shared::auth::UserInfo;

/// Creates the user routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/user", get(get_profile))
        .route("/user/usage", get(get_usage))
        .route("/user/profile", put(update_profile))
        .route("/user/password", put(change_password))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Consumer profile with its derived supply status.
#[derive(Debug, Serialize)]
pub struct ConsumerProfile {
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
    /// Derived supply status (`active` or `cut_off`).
    pub status: String,
}

/// One row of the usage table shown to consumers.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRow {
    /// Bill ID.
    pub id: Uuid,
    /// Month name.
    pub month: String,
    /// "Month Year" label.
    pub reference: String,
    /// Metered usage.
    pub cubic_meters: Decimal,
    /// Billed amount in pesos.
    pub amount_peso: Decimal,
    /// Payment status text.
    pub status: String,
    /// Manual residual amount.
    pub balance: Decimal,
    /// Amount still owed.
    pub due_amount: Decimal,
    /// Settlement due date (25th of the billing month).
    pub due_date: String,
}

/// Request body for a login-detail change.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    /// New username.
    #[serde(default)]
    pub username: Option<String>,
    /// New email.
    #[serde(default)]
    pub email: Option<String>,
}

/// Request body for a password change.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    /// Current password, verified before the change.
    pub current_password: String,
    /// Replacement password.
    pub new_password: String,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /user - Authenticated account plus consumer profile.
///
/// For consumer-role users the profile is created lazily and the supply
/// evaluation runs as a side effect, so the returned status is current.
async fn get_profile(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let user_repo = UserRepository::new(state.db.clone());

    let user = match user_repo.find_by_id(auth.user_id()).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": "not_found",
                    "message": "User not found"
                })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, "Failed to load user");
            return internal_error();
        }
    };

    let mut consumer_profile = None;
    if UserRole::parse(&user.role) != UserRole::Admin {
        let consumer_repo = ConsumerRepository::new(state.db.clone());
        let bill_repo = BillRepository::new(state.db.clone());

        let profile = match consumer_repo
            .ensure_profile(user.id, &user.username, &user.email)
            .await
        {
            Ok(p) => p,
            Err(e) => {
                error!(error = %e, "Failed to load consumer profile");
                return internal_error();
            }
        };

        let status = match reconcile_supply_status(&consumer_repo, &bill_repo, &profile).await {
            Ok(s) => s,
            Err(e) => {
                error!(error = %e, "Supply status evaluation failed");
                return internal_error();
            }
        };

        consumer_profile = Some(ConsumerProfile {
            id: profile.id,
            name: profile.name,
            address: profile.address,
            phone: profile.phone,
            email: profile.email,
            status: status.as_str().to_string(),
        });
    }

    Json(json!({
        "user": UserInfo {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
        },
        "consumer": consumer_profile,
    }))
    .into_response()
}

/// GET /user/usage - Usage history with totals, balances, and growth.
async fn get_usage(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let user_repo = UserRepository::new(state.db.clone());
    let consumer_repo = ConsumerRepository::new(state.db.clone());
    let bill_repo = BillRepository::new(state.db.clone());

    let user = match user_repo.find_by_id(auth.user_id()).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            return Json(json!({
                "usage": [],
                "totals": { "amount": 0, "cubicMeters": 0, "outstanding": 0 },
                "currency": "PHP"
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
    let growth = estimate_usage_growth(&domain);

    let usage: Vec<UsageRow> = rows
        .iter()
        .map(|bill| {
            let month = Month::from_index(bill.month).unwrap_or(Month::January);
            UsageRow {
                id: bill.id,
                month: month.name().to_string(),
                reference: format!("{} {}", month.name(), bill.year),
                cubic_meters: bill.cubic_meters,
                amount_peso: bill.amount,
                status: bill.status.clone(),
                balance: bill.balance,
                due_amount: BillingService::due_amount(&bill.to_domain()),
                due_date: format!("{:04}-{:02}-25", bill.year, bill.month),
            }
        })
        .collect();

    Json(json!({
        "usage": usage,
        "totals": summary.totals,
        "balance": summary.balance_summary,
        "currency": "PHP",
        "growth": growth,
    }))
    .into_response()
}

/// PUT /user/profile - Update the caller's own login details. Restricted
/// to administrators; consumer logins are managed from the admin screens.
async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> impl IntoResponse {
    if let Err(response) = require_admin(&auth) {
        return response;
    }

    let username = payload.username.as_deref().unwrap_or("").trim().to_string();
    let email = payload.email.as_deref().unwrap_or("").trim().to_string();
    if username.is_empty() || email.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "validation_error",
                "message": "Username and email are required"
            })),
        )
            .into_response();
    }

    let user_repo = UserRepository::new(state.db.clone());
    match user_repo
        .login_taken(&username, &email, Some(auth.user_id()))
        .await
    {
        Ok(true) => {
            return (
                StatusCode::CONFLICT,
                Json(json!({
                    "error": "conflict",
                    "message": "Username or email already exists"
                })),
            )
                .into_response();
        }
        Ok(false) => {}
        Err(e) => {
            error!(error = %e, "Failed to check login availability");
            return internal_error();
        }
    }

    let input = UpdateUserInput {
        username: Some(username),
        email: Some(email),
        password_hash: None,
    };
    match user_repo.update(auth.user_id(), input).await {
        Ok(Some(user)) => {
            info!(user_id = %user.id, "Profile updated");
            Json(json!({ "success": true })).into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": "User not found"
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to update profile");
            internal_error()
        }
    }
}

/// PUT /user/password - Change the caller's own password.
async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> impl IntoResponse {
    if payload.current_password.is_empty() || payload.new_password.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "validation_error",
                "message": "Current and new password are required"
            })),
        )
            .into_response();
    }
    if payload.new_password.len() < 6 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "validation_error",
                "message": "New password must be at least 6 characters long"
            })),
        )
            .into_response();
    }

    let user_repo = UserRepository::new(state.db.clone());
    let user = match user_repo.find_by_id(auth.user_id()).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": "not_found",
                    "message": "User not found"
                })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, "Failed to load user");
            return internal_error();
        }
    };

    match verify_password(&payload.current_password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "validation_error",
                    "message": "Current password is incorrect"
                })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, "Password verification error");
            return internal_error();
        }
    }

    let new_hash = match hash_password(&payload.new_password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "Password hashing error");
            return internal_error();
        }
    };

    let input = UpdateUserInput {
        password_hash: Some(new_hash),
        ..UpdateUserInput::default()
    };
    match user_repo.update(user.id, input).await {
        Ok(Some(_)) => {
            info!(user_id = %user.id, "Password changed");
            Json(json!({ "success": true })).into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": "User not found"
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to update password");
            internal_error()
        }
    }
}

/// The calendar month the summarizer treats as current.
pub(crate) fn current_month() -> Month {
    Month::of(chrono::Utc::now().date_naive())
}
