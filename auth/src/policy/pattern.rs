use std::fmt;

use super::errors::PolicyError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Kind {
    /// Matches one path exactly
    Exact(String),
    /// Matches the prefix itself and everything below it
    Subtree(String),
    /// Matches every path
    Any,
}

/// Route path pattern.
///
/// Supported forms:
/// - `/public/health` exact path
/// - `/api/auth/**` (or `/api/auth/*`) the `/api/auth` subtree, split on
///   segment boundaries so `/api/authx` does not match
/// - `/**` or `*` every path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    kind: Kind,
}

impl PathPattern {
    /// Parse a pattern.
    ///
    /// # Errors
    /// * `InvalidPattern` - Empty, not absolute, or wildcard anywhere but the last segment
    pub fn parse(pattern: &str) -> Result<Self, PolicyError> {
        let raw = pattern.trim();
        let invalid = |reason: &str| PolicyError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };

        if raw.is_empty() {
            return Err(invalid("pattern is empty"));
        }

        if raw == "*" {
            return Ok(Self::any(raw));
        }

        if !raw.starts_with('/') {
            return Err(invalid("pattern must start with '/'"));
        }

        let kind = match raw.strip_suffix("/**").or_else(|| raw.strip_suffix("/*")) {
            Some(prefix) if prefix.contains('*') => {
                return Err(invalid("wildcard is only allowed as the last segment"))
            }
            Some("") => Kind::Any,
            Some(prefix) => Kind::Subtree(prefix.to_string()),
            None if raw.contains('*') => {
                return Err(invalid("wildcard is only allowed as the last segment"))
            }
            None => Kind::Exact(raw.to_string()),
        };

        Ok(Self {
            raw: raw.to_string(),
            kind,
        })
    }

    fn any(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            kind: Kind::Any,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, path: &str) -> bool {
        match &self.kind {
            Kind::Exact(exact) => path == exact,
            Kind::Subtree(prefix) => is_within(path, prefix),
            Kind::Any => true,
        }
    }

    /// True when every path matched by `other` is also matched by `self`.
    pub fn covers(&self, other: &PathPattern) -> bool {
        match (&self.kind, &other.kind) {
            (Kind::Any, _) => true,
            (_, Kind::Any) => false,
            (Kind::Subtree(prefix), Kind::Subtree(other)) => is_within(other, prefix),
            (Kind::Subtree(prefix), Kind::Exact(path)) => is_within(path, prefix),
            (Kind::Exact(path), Kind::Exact(other)) => path == other,
            (Kind::Exact(_), Kind::Subtree(_)) => false,
        }
    }

    /// Whether two patterns denote the same set of paths.
    pub fn same_as(&self, other: &PathPattern) -> bool {
        self.kind == other.kind
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn is_within(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
