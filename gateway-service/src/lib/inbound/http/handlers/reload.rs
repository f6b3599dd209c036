use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use super::FORBIDDEN;
use super::RELOAD_FAILED;
use crate::inbound::http::middleware::CurrentPrincipal;
use crate::inbound::http::router::AppState;

pub const ADMIN_AUTHORITY: &str = "ROLE_ADMIN";

/// Reload route policy, signing keys and accounts from configuration.
pub async fn reload(
    State(state): State<AppState>,
    principal: Option<Extension<CurrentPrincipal>>,
) -> Result<ApiSuccess<ReloadData>, ApiError> {
    let is_admin = principal
        .as_ref()
        .is_some_and(|Extension(CurrentPrincipal(p))| p.has_authority(ADMIN_AUTHORITY));

    if !is_admin {
        tracing::warn!(
            subject = principal.as_ref().map(|Extension(CurrentPrincipal(p))| p.id.as_str()),
            "Reload refused"
        );
        return Err(ApiError::Forbidden(FORBIDDEN.to_string()));
    }

    state.gateway.reload().await.map_err(|e| {
        tracing::error!(error = %e, "Reload failed, keeping previous configuration");
        ApiError::InternalServerError(RELOAD_FAILED.to_string())
    })?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        ReloadData {
            status: "RELOADED".to_string(),
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReloadData {
    pub status: String,
}
