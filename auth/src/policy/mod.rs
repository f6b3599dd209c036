pub mod errors;
pub mod pattern;
pub mod route_policy;

pub use errors::PolicyError;
pub use pattern::PathPattern;
pub use route_policy::Access;
pub use route_policy::PolicyHandle;
pub use route_policy::RoutePolicy;
pub use route_policy::RouteRule;
pub use route_policy::RouteRuleConfig;
