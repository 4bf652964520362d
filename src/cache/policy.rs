//! Cache eligibility rules.
//!
//! Only safe reads are looked up, and only complete `200 OK` reads are stored.

use axum::http::{Method, StatusCode};

/// Whether a request with this method may be answered from the cache.
pub fn is_cacheable_method(method: &Method) -> bool {
    method == Method::GET
}

/// Whether a fully-read origin response may be stored.
pub fn should_store(method: &Method, status: StatusCode) -> bool {
    is_cacheable_method(method) && status == StatusCode::OK
}
