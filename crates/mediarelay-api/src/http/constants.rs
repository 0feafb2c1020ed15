//! Shared HTTP constants (headers, problem URIs).

pub(crate) const HEADER_REQUEST_ID: &str = "x-request-id";
pub(crate) const BEARER_PREFIX: &str = "Bearer ";
pub(crate) const METRICS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

pub(crate) const PROBLEM_INTERNAL: &str = "https://mediarelay.dev/problems/internal";
pub(crate) const PROBLEM_UNAUTHORIZED: &str = "https://mediarelay.dev/problems/unauthorized";
pub(crate) const PROBLEM_BAD_REQUEST: &str = "https://mediarelay.dev/problems/bad-request";
pub(crate) const PROBLEM_SERVICE_UNAVAILABLE: &str =
    "https://mediarelay.dev/problems/service-unavailable";
