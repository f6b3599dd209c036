use thiserror::Error;

/// Route policy configuration errors.
///
/// Always fatal at start-up or reload; never raised per request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("Route policy has no rules")]
    Empty,

    #[error("Invalid route pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Route pattern {pattern:?} is declared both open and protected")]
    Contradictory { pattern: String },

    #[error("Route pattern {pattern:?} can never match: already covered by {covered_by:?}")]
    Unreachable { pattern: String, covered_by: String },
}
