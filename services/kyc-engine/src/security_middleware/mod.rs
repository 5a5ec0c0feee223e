pub mod auth;
pub mod rate_limit;

pub use auth::{Claims, JwtAuth};
pub use rate_limit::RateLimiter;

/// Probes stay reachable without credentials or quota.
pub(crate) fn is_probe_path(path: &str) -> bool {
    path == "/health" || path == "/metrics"
}
