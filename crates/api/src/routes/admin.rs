//! Admin routes: account management, metrics, and sales reporting.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::AppState;
use crate::middleware::AuthUser;
use crate::routes::{internal_error, require_admin};
use aquabill_core::auth::{UserRole, hash_password};
use aquabill_core::billing::BillingService;
use aquabill_db::repositories::{UpdateConsumerInput, UpdateUserInput};
use aquabill_db::{BillRepository, ConsumerRepository, UserRepository};

/// Creates the admin routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(list_users).post(create_user))
        .route("/admin/users/{id}", put(update_user).delete(delete_user))
        .route("/admin/metrics", get(metrics))
        .route("/admin/sales", get(sales))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// A consumer account row with its linked profile.
#[derive(Debug, Serialize)]
pub struct AccountRow {
    /// User ID.
    pub id: Uuid,
    /// Login name.
    pub username: String,
    /// Login email.
    pub email: String,
    /// Portal role.
    pub role: String,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// Linked consumer profile, if any.
    pub consumer: Option<AccountConsumer>,
}

/// The consumer-profile part of an account row.
#[derive(Debug, Serialize)]
pub struct AccountConsumer {
    /// Consumer ID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Contact phone.
    pub phone: String,
    /// Service address.
    pub address: String,
    /// Cached supply status.
    pub status: String,
}

/// Request body for creating a consumer account.
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    /// Login name.
    pub username: Option<String>,
    /// Login email.
    pub email: Option<String>,
    /// Initial password.
    pub password: Option<String>,
    /// Consumer display name; falls back to the username.
    #[serde(default)]
    pub name: Option<String>,
    /// Service address.
    pub address: Option<String>,
    /// Contact phone.
    #[serde(default)]
    pub phone: Option<String>,
}

/// Request body for updating a consumer account. Every field is optional.
#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    /// New login name.
    #[serde(default)]
    pub username: Option<String>,
    /// New login email.
    #[serde(default)]
    pub email: Option<String>,
    /// New password.
    #[serde(default)]
    pub password: Option<String>,
    /// New consumer display name.
    #[serde(default)]
    pub name: Option<String>,
    /// New contact phone.
    #[serde(default)]
    pub phone: Option<String>,
    /// New service address.
    #[serde(default)]
    pub address: Option<String>,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /admin/users - Non-admin accounts with their consumer profiles,
/// newest first.
async fn list_users(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    if let Err(response) = require_admin(&auth) {
        return response;
    }

    let user_repo = UserRepository::new(state.db.clone());
    match user_repo.list_consumer_accounts().await {
        Ok(accounts) => {
            let users: Vec<AccountRow> = accounts
                .into_iter()
                .map(|(user, consumer)| AccountRow {
                    id: user.id,
                    username: user.username,
                    email: user.email,
                    role: user.role,
                    created_at: user.created_at.with_timezone(&Utc),
                    consumer: consumer.map(|c| AccountConsumer {
                        id: c.id,
                        name: c.name,
                        phone: c.phone,
                        address: c.address,
                        status: c.status,
                    }),
                })
                .collect();
            Json(json!({ "users": users })).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list consumer accounts");
            internal_error()
        }
    }
}

/// POST /admin/users - Create a consumer account: a login user plus a
/// consumer profile carrying the service details.
async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateAccountRequest>,
) -> impl IntoResponse {
    if let Err(response) = require_admin(&auth) {
        return response;
    }

    let (Some(username), Some(email), Some(password), Some(address)) = (
        payload.username.as_deref(),
        payload.email.as_deref(),
        payload.password.as_deref(),
        payload.address.as_deref(),
    ) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "validation_error",
                "message": "Username, email, password, and address are required"
            })),
        )
            .into_response();
    };

    let user_repo = UserRepository::new(state.db.clone());
    match user_repo.login_taken(username, email, None).await {
        Ok(true) => return login_conflict(),
        Ok(false) => {}
        Err(e) => {
            error!(error = %e, "Failed to check login availability");
            return internal_error();
        }
    }

    let password_hash = match hash_password(password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "Password hashing failed");
            return internal_error();
        }
    };

    let user = match user_repo
        .create(username, email, &password_hash, UserRole::Consumer.as_str())
        .await
    {
        Ok(u) => u,
        Err(e) => {
            error!(error = %e, "Failed to create user");
            return internal_error();
        }
    };

    let consumer_repo = ConsumerRepository::new(state.db.clone());
    let display_name = payload.name.as_deref().unwrap_or(username);
    let profile = match consumer_repo
        .ensure_profile(user.id, display_name, email)
        .await
    {
        Ok(p) => p,
        Err(e) => {
            error!(error = %e, "Failed to create consumer profile");
            return internal_error();
        }
    };

    let input = UpdateConsumerInput {
        name: Some(display_name.to_string()),
        address: Some(address.to_string()),
        phone: Some(payload.phone.unwrap_or_default()),
        email: Some(email.to_string()),
    };
    if let Err(e) = consumer_repo.update(profile.id, input).await {
        error!(error = %e, "Failed to fill consumer profile");
        return internal_error();
    }

    info!(user_id = %user.id, username, "Consumer account created");
    Json(json!({ "success": true, "id": user.id })).into_response()
}

/// PUT /admin/users/{id} - Update an account's login fields and its
/// consumer profile. Absent fields keep their current values.
async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAccountRequest>,
) -> impl IntoResponse {
    if let Err(response) = require_admin(&auth) {
        return response;
    }

    let user_repo = UserRepository::new(state.db.clone());
    let Some(user) = (match user_repo.find_by_id(id).await {
        Ok(u) => u,
        Err(e) => {
            error!(error = %e, "Failed to load user");
            return internal_error();
        }
    }) else {
        return account_not_found();
    };

    if payload.username.is_some() || payload.email.is_some() {
        let username = payload.username.as_deref().unwrap_or(&user.username);
        let email = payload.email.as_deref().unwrap_or(&user.email);
        match user_repo.login_taken(username, email, Some(id)).await {
            Ok(true) => return login_conflict(),
            Ok(false) => {}
            Err(e) => {
                error!(error = %e, "Failed to check login availability");
                return internal_error();
            }
        }
    }

    let password_hash = match payload.password.as_deref() {
        Some(password) => match hash_password(password) {
            Ok(h) => Some(h),
            Err(e) => {
                error!(error = %e, "Password hashing failed");
                return internal_error();
            }
        },
        None => None,
    };

    let input = UpdateUserInput {
        username: payload.username.clone(),
        email: payload.email.clone(),
        password_hash,
    };
    match user_repo.update(id, input).await {
        Ok(Some(_)) => {}
        Ok(None) => return account_not_found(),
        Err(e) => {
            error!(error = %e, "Failed to update user");
            return internal_error();
        }
    }

    if payload.name.is_some() || payload.phone.is_some() || payload.address.is_some() {
        let consumer_repo = ConsumerRepository::new(state.db.clone());
        let consumer = match consumer_repo.find_by_user_id(id).await {
            Ok(c) => c,
            Err(e) => {
                error!(error = %e, "Failed to load consumer profile");
                return internal_error();
            }
        };
        if let Some(consumer) = consumer {
            let input = UpdateConsumerInput {
                name: payload.name,
                address: payload.address,
                phone: payload.phone,
                email: payload.email,
            };
            if let Err(e) = consumer_repo.update(consumer.id, input).await {
                error!(error = %e, "Failed to update consumer profile");
                return internal_error();
            }
        }
    }

    Json(json!({ "success": true })).into_response()
}

/// DELETE /admin/users/{id} - Delete an account. The linked consumer
/// profile is detached, not removed, so its billing history survives.
async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(response) = require_admin(&auth) {
        return response;
    }

    let user_repo = UserRepository::new(state.db.clone());
    match user_repo.delete(id).await {
        Ok(true) => {
            info!(user_id = %id, "Account deleted");
            Json(json!({ "success": true })).into_response()
        }
        Ok(false) => account_not_found(),
        Err(e) => {
            error!(error = %e, "Failed to delete account");
            internal_error()
        }
    }
}

/// GET /admin/metrics - Portal totals for the admin dashboard.
async fn metrics(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    if let Err(response) = require_admin(&auth) {
        return response;
    }

    let user_repo = UserRepository::new(state.db.clone());
    let consumer_repo = ConsumerRepository::new(state.db.clone());
    let bill_repo = BillRepository::new(state.db.clone());

    let total_users = match user_repo.count_consumer_accounts().await {
        Ok(n) => n,
        Err(e) => {
            error!(error = %e, "Failed to count users");
            return internal_error();
        }
    };
    let consumer_metrics = match consumer_repo.metrics().await {
        Ok(m) => m,
        Err(e) => {
            error!(error = %e, "Failed to load consumer metrics");
            return internal_error();
        }
    };
    let (total_revenue, total_cubic_meters) = match bill_repo.revenue_and_usage().await {
        Ok(pair) => pair,
        Err(e) => {
            error!(error = %e, "Failed to sum billing totals");
            return internal_error();
        }
    };

    Json(json!({
        "metrics": {
            "totalUsers": total_users,
            "totalConsumers": consumer_metrics.total,
            "activeConsumers": consumer_metrics.active,
            "totalCubicMeters": total_cubic_meters,
            "totalRevenue": total_revenue,
        }
    }))
    .into_response()
}

/// GET /admin/sales - Every bill annotated with the amount already paid
/// and the amount still due.
async fn sales(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    if let Err(response) = require_admin(&auth) {
        return response;
    }

    let bill_repo = BillRepository::new(state.db.clone());
    let rows = match bill_repo.list_all().await {
        Ok(b) => b,
        Err(e) => {
            error!(error = %e, "Failed to list bills");
            return internal_error();
        }
    };

    let bills: Vec<_> = rows
        .iter()
        .map(|bill| {
            let domain = bill.to_domain();
            let amount_paid = (bill.amount - bill.balance).max(Decimal::ZERO);
            json!({
                "id": bill.id,
                "consumer_id": bill.consumer_id,
                "month": domain.month.name(),
                "year": bill.year,
                "cubic_meters": bill.cubic_meters,
                "rate_per_cubic_meter": bill.rate_per_cubic_meter,
                "amount": bill.amount,
                "balance": bill.balance,
                "status": bill.status,
                "amount_paid": amount_paid,
                "due_amount": BillingService::due_amount(&domain),
            })
        })
        .collect();

    Json(json!({ "bills": bills })).into_response()
}

// ============================================================================
// Helper Functions
// ============================================================================

fn login_conflict() -> axum::response::Response {
    (
        StatusCode::CONFLICT,
        Json(json!({
            "error": "conflict",
            "message": "Username or email already exists"
        })),
    )
        .into_response()
}

fn account_not_found() -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "not_found",
            "message": "Account not found"
        })),
    )
        .into_response()
}
