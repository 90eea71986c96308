//! Authentication routes.

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use serde_json::json;
use tracing::{error, info};

use crate::AppState;
use crate::routes::internal_error;
use aquabill_core::auth::{UserRole, verify_password};
use aquabill_db::{ConsumerRepository, UserRepository};
use aquabill_shared::auth::{LoginRequest, LoginResponse, UserInfo};

/// Creates the auth router.
pub fn routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}

/// POST /auth/login - Authenticate by username or email and return a token.
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> impl IntoResponse {
    let user_repo = UserRepository::new(state.db.clone());

    let user = match user_repo.find_by_login(&payload.username).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            info!(login = %payload.username, "Login attempt for unknown account");
            return invalid_credentials();
        }
        Err(e) => {
            error!(error = %e, "Database error during login");
            return internal_error();
        }
    };

    match verify_password(&payload.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            info!(user_id = %user.id, "Failed login attempt - invalid password");
            return invalid_credentials();
        }
        Err(e) => {
            error!(error = %e, "Password verification error");
            return internal_error();
        }
    }

    // Consumer-role accounts get a profile on first login.
    if UserRole::parse(&user.role) != UserRole::Admin {
        let consumer_repo = ConsumerRepository::new(state.db.clone());
        if let Err(e) = consumer_repo
            .ensure_profile(user.id, &user.username, &user.email)
            .await
        {
            error!(error = %e, user_id = %user.id, "Failed to provision consumer profile");
            return internal_error();
        }
    }

    let access_token = match state.jwt_service.generate_access_token(user.id, &user.role) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to generate access token");
            return internal_error();
        }
    };

    info!(user_id = %user.id, role = %user.role, "User logged in");

    Json(LoginResponse {
        access_token,
        expires_in: state.jwt_service.access_token_expires_in(),
        user: UserInfo {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
        },
    })
    .into_response()
}

fn invalid_credentials() -> axum::response::Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "invalid_credentials",
            "message": "Invalid username or password"
        })),
    )
        .into_response()
}
