use axum::http::StatusCode;
use axum::Extension;

use super::ApiError;
use super::ApiSuccess;
use super::PrincipalData;
use crate::inbound::http::middleware::CurrentPrincipal;

/// Return the principal the request was authenticated as.
pub async fn me(
    principal: Option<Extension<CurrentPrincipal>>,
) -> Result<ApiSuccess<PrincipalData>, ApiError> {
    // Absent only if the route policy left this path open
    let Some(Extension(CurrentPrincipal(principal))) = principal else {
        return Err(ApiError::Unauthorized(
            auth::RejectReason::MissingCredential.code().to_string(),
        ));
    };

    Ok(ApiSuccess::new(StatusCode::OK, (&principal).into()))
}
