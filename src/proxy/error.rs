//! Proxy error taxonomy.

use axum::http::StatusCode;

/// Why a proxied request failed. Every variant is terminal for its request.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// The client did not supply a usable target.
    #[error("{0}")]
    BadRequest(String),

    /// Local failure building the outbound request or reading the origin body.
    #[error("{0}")]
    Internal(String),

    /// The origin could not be reached or the exchange failed in transit.
    #[error("{0}")]
    BadGateway(String),

    /// The origin did not answer within the configured deadline.
    #[error("{0}")]
    GatewayTimeout(String),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ProxyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ProxyError::GatewayTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ProxyError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ProxyError::Internal("x".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ProxyError::BadGateway("x".into()).status(), StatusCode::BAD_GATEWAY);
        assert_eq!(ProxyError::GatewayTimeout("x".into()).status(), StatusCode::GATEWAY_TIMEOUT);
    }
}
