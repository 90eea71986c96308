//! Support-info routes: public contact details and the admin editor.

use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::{get, put},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::AppState;
use crate::middleware::AuthUser;
use crate::routes::{internal_error, require_admin};
use aquabill_db::SupportRepository;
use aquabill_db::repositories::UpdateSupportInput;

/// Creates the public support routes.
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/support", get(get_support))
}

/// Creates the admin support routes.
pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/support", put(update_support))
}

/// Request body for replacing the support contact details. Absent fields
/// become empty strings.
#[derive(Debug, Deserialize, Default)]
pub struct UpdateSupportRequest {
    /// Organization name.
    #[serde(default)]
    pub organization: Option<String>,
    /// Contact phone.
    #[serde(default)]
    pub phone: Option<String>,
    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
    /// Office address.
    #[serde(default)]
    pub address: Option<String>,
    /// Facebook page URL.
    #[serde(default)]
    pub facebook_url: Option<String>,
    /// Office hours text.
    #[serde(default)]
    pub hours: Option<String>,
}

/// GET /support - Public support contact details.
async fn get_support(State(state): State<AppState>) -> impl IntoResponse {
    let repo = SupportRepository::new(state.db.clone());
    match repo.get().await {
        Ok(support) => Json(json!({ "support": support })).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to load support info");
            internal_error()
        }
    }
}

/// PUT /support - Replace the support contact details.
async fn update_support(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<UpdateSupportRequest>,
) -> impl IntoResponse {
    if let Err(response) = require_admin(&auth) {
        return response;
    }

    let input = UpdateSupportInput {
        organization: trimmed(payload.organization),
        phone: trimmed(payload.phone),
        email: trimmed(payload.email),
        address: trimmed(payload.address),
        facebook_url: trimmed(payload.facebook_url),
        hours: trimmed(payload.hours),
    };

    let repo = SupportRepository::new(state.db.clone());
    match repo.update(input).await {
        Ok(support) => {
            info!("Support info updated");
            Json(json!({ "support": support })).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to update support info");
            internal_error()
        }
    }
}

fn trimmed(value: Option<String>) -> String {
    value.unwrap_or_default().trim().to_string()
}
