use http::StatusCode;
use thiserror::Error;

use crate::jwt::VerificationError;
use crate::principal::Principal;

/// Why a request was rejected.
///
/// `Display` carries the internal detail for logs; clients only get
/// `code()` and `status()`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("missing bearer credential")]
    MissingCredential,

    #[error("invalid token: {0}")]
    InvalidToken(VerificationError),

    #[error("token subject has no principal")]
    UnknownPrincipal,

    #[error("principal lookup timed out")]
    LookupTimeout,

    #[error("principal lookup failed")]
    LookupFailed,
}

impl RejectReason {
    /// Machine-readable code safe to send to clients.
    ///
    /// Token verification failures and unknown subjects share one code;
    /// lookup failures get a generic one. The variant itself is for logs.
    pub fn code(&self) -> &'static str {
        match self {
            RejectReason::MissingCredential => "MISSING_CREDENTIAL",
            RejectReason::InvalidToken(_) | RejectReason::UnknownPrincipal => "INVALID_TOKEN",
            RejectReason::LookupTimeout | RejectReason::LookupFailed => "UNAUTHENTICATED",
        }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }
}

/// Result of running one request through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Route is open; no credential was looked at
    Anonymous,
    Authenticated(Principal),
    Rejected(RejectReason),
}

impl AuthOutcome {
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            AuthOutcome::Authenticated(principal) => Some(principal),
            _ => None,
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, AuthOutcome::Rejected(_))
    }
}
