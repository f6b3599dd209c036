use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::Deserialize;

use super::errors::PolicyError;
use super::pattern::PathPattern;

/// Classification of a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// No authentication required
    Open,
    /// Requires an authenticated principal
    Protected,
}

impl Access {
    pub fn from_requires_auth(requires_auth: bool) -> Self {
        if requires_auth {
            Access::Protected
        } else {
            Access::Open
        }
    }
}

/// Route rule as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RouteRuleConfig {
    pub pattern: String,
    pub requires_auth: bool,
}

impl RouteRuleConfig {
    pub fn new(pattern: impl Into<String>, requires_auth: bool) -> Self {
        Self {
            pattern: pattern.into(),
            requires_auth,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRule {
    pub pattern: PathPattern,
    pub access: Access,
}

impl RouteRule {
    pub fn new(pattern: PathPattern, access: Access) -> Self {
        Self { pattern, access }
    }
}

/// Ordered, immutable list of route rules.
///
/// The first rule whose pattern matches wins. A path no rule matches is
/// `Protected`; an empty policy protects everything.
#[derive(Debug, Clone, Default)]
pub struct RoutePolicy {
    rules: Vec<RouteRule>,
}

impl RoutePolicy {
    /// Build a policy from already parsed rules, without consistency checks.
    pub fn new(rules: Vec<RouteRule>) -> Self {
        Self { rules }
    }

    /// Build a policy from configuration, rejecting anything ambiguous.
    ///
    /// # Errors
    /// * `Empty` - No rules given
    /// * `InvalidPattern` - A pattern does not parse
    /// * `Contradictory` - Same pattern declared with both access levels
    /// * `Unreachable` - A rule is fully covered by an earlier one
    pub fn load(configured: &[RouteRuleConfig]) -> Result<Self, PolicyError> {
        if configured.is_empty() {
            return Err(PolicyError::Empty);
        }

        let mut rules: Vec<RouteRule> = Vec::with_capacity(configured.len());

        for entry in configured {
            let rule = RouteRule::new(
                PathPattern::parse(&entry.pattern)?,
                Access::from_requires_auth(entry.requires_auth),
            );

            for earlier in &rules {
                if earlier.pattern.same_as(&rule.pattern) && earlier.access != rule.access {
                    return Err(PolicyError::Contradictory {
                        pattern: rule.pattern.to_string(),
                    });
                }

                if earlier.pattern.covers(&rule.pattern) {
                    return Err(PolicyError::Unreachable {
                        pattern: rule.pattern.to_string(),
                        covered_by: earlier.pattern.to_string(),
                    });
                }
            }

            rules.push(rule);
        }

        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    /// Classify a request path.
    ///
    /// Any query string is ignored. Paths that are not in canonical form
    /// (relative, `.`/`..` or empty segments) are always `Protected`, so an
    /// open prefix cannot be used to reach a protected route.
    pub fn classify(&self, path: &str) -> Access {
        let path = strip_query(path);

        if !is_canonical(path) {
            return Access::Protected;
        }

        self.rules
            .iter()
            .find(|rule| rule.pattern.matches(path))
            .map_or(Access::Protected, |rule| rule.access)
    }
}

fn strip_query(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or_default()
}

fn is_canonical(path: &str) -> bool {
    let Some(rest) = path.strip_prefix('/') else {
        return false;
    };

    if rest.is_empty() {
        return true;
    }

    let segments: Vec<&str> = rest.split('/').collect();
    let last = segments.len() - 1;

    segments.iter().enumerate().all(|(i, segment)| match *segment {
        "." | ".." => false,
        // Only a single trailing slash may leave an empty segment
        "" => i == last,
        _ => true,
    })
}

/// Shared handle to the active route policy.
///
/// Reconfiguration swaps the whole policy; requests keep classifying against
/// the snapshot they started with.
pub struct PolicyHandle {
    policy: ArcSwap<RoutePolicy>,
}

impl PolicyHandle {
    pub fn new(policy: RoutePolicy) -> Self {
        Self {
            policy: ArcSwap::from_pointee(policy),
        }
    }

    pub fn current(&self) -> Arc<RoutePolicy> {
        self.policy.load_full()
    }

    pub fn replace(&self, policy: RoutePolicy) {
        tracing::info!(rules = policy.rules().len(), "Route policy replaced");
        self.policy.store(Arc::new(policy));
    }

    pub fn classify(&self, path: &str) -> Access {
        self.policy.load().classify(path)
    }
}
