use std::sync::Arc;

use super::outcome::AuthOutcome;
use super::outcome::RejectReason;
use super::request::extract_bearer;
use super::request::RequestDescriptor;
use crate::jwt::TokenCodec;
use crate::policy::Access;
use crate::policy::PolicyHandle;
use crate::principal::PrincipalResolver;
use crate::principal::PrincipalStore;
use crate::principal::ResolveError;

/// Stateless per-request authentication.
///
/// Each call walks classify → extract → verify → resolve from scratch and
/// ends in exactly one `AuthOutcome`. Nothing about a request survives the
/// call, so concurrent requests never see each other's principal. Dropping
/// the returned future abandons any in-flight principal lookup.
pub struct AuthPipeline<S>
where
    S: PrincipalStore,
{
    policy: Arc<PolicyHandle>,
    codec: Arc<TokenCodec>,
    resolver: Arc<PrincipalResolver<S>>,
}

impl<S> AuthPipeline<S>
where
    S: PrincipalStore,
{
    /// Create a pipeline from its collaborators.
    ///
    /// # Arguments
    /// * `policy` - Route classification
    /// * `codec` - Token verification
    /// * `resolver` - Subject to principal lookup
    pub fn new(
        policy: Arc<PolicyHandle>,
        codec: Arc<TokenCodec>,
        resolver: Arc<PrincipalResolver<S>>,
    ) -> Self {
        Self {
            policy,
            codec,
            resolver,
        }
    }

    pub fn policy(&self) -> &Arc<PolicyHandle> {
        &self.policy
    }

    pub fn codec(&self) -> &Arc<TokenCodec> {
        &self.codec
    }

    pub fn resolver(&self) -> &Arc<PrincipalResolver<S>> {
        &self.resolver
    }

    /// Decide whether a request may proceed.
    ///
    /// Never fails: every problem becomes `AuthOutcome::Rejected`.
    #[tracing::instrument(
        name = "auth_pipeline",
        skip_all,
        fields(method = %request.method, path = %request.path)
    )]
    pub async fn authenticate(&self, request: &RequestDescriptor<'_>) -> AuthOutcome {
        if self.policy.classify(request.path) == Access::Open {
            tracing::trace!("Open route, skipping authentication");
            return AuthOutcome::Anonymous;
        }

        let Some(credential) = extract_bearer(request.headers) else {
            return reject(RejectReason::MissingCredential);
        };

        let token = match self.codec.verify(credential) {
            Ok(token) => token,
            Err(e) => return reject(RejectReason::InvalidToken(e)),
        };

        match self.resolver.resolve(&token.subject).await {
            Ok(principal) => {
                tracing::debug!(subject = %principal.id, key_id = %token.key_id, "Request authenticated");
                AuthOutcome::Authenticated(principal)
            }
            Err(ResolveError::NotFound) => reject(RejectReason::UnknownPrincipal),
            Err(ResolveError::Timeout(_)) => reject(RejectReason::LookupTimeout),
            Err(e @ ResolveError::Store(_)) => {
                tracing::error!(error = %e, "Principal store failure");
                reject(RejectReason::LookupFailed)
            }
        }
    }
}

fn reject(reason: RejectReason) -> AuthOutcome {
    tracing::warn!(reason = %reason, code = reason.code(), "Request rejected");
    AuthOutcome::Rejected(reason)
}
