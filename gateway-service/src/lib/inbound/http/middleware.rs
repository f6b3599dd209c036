use auth::AuthOutcome;
use auth::Principal;
use auth::RequestDescriptor;
use axum::extract::Request;
use axum::extract::State;
use axum::middleware::Next;
use axum::response::Response;

use super::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Extension type holding the principal a request was authenticated as
#[derive(Debug, Clone)]
pub struct CurrentPrincipal(pub Principal);

/// Middleware running every request through the authentication pipeline
///
/// Open routes pass through untouched, authenticated requests carry a
/// `CurrentPrincipal` extension, everything else is answered with 401.
pub async fn authenticate(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (mut parts, body) = req.into_parts();

    let outcome = {
        let descriptor = RequestDescriptor::new(&parts.method, parts.uri.path(), &parts.headers);
        state.gateway.pipeline().authenticate(&descriptor).await
    };

    match outcome {
        AuthOutcome::Anonymous => {}
        AuthOutcome::Authenticated(principal) => {
            parts.extensions.insert(CurrentPrincipal(principal));
        }
        AuthOutcome::Rejected(reason) => {
            return Err(ApiError::Unauthorized(reason.code().to_string()));
        }
    }

    Ok(next.run(Request::from_parts(parts, body)).await)
}
