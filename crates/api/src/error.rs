use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use lp_il_data::DataError;
use lp_il_domain::DomainError;
use serde::Serialize;

/// Errors surfaced to HTTP clients.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: String,
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Domain(DomainError::InvalidInput(_)) => {
                (StatusCode::BAD_REQUEST, "INVALID_INPUT")
            }
            Self::Domain(DomainError::UnsupportedPool(_)) => {
                (StatusCode::BAD_REQUEST, "UNSUPPORTED_POOL")
            }
            // domain validation that happened inside the data layer
            Self::Data(DataError::Domain(DomainError::InvalidInput(_))) => {
                (StatusCode::BAD_REQUEST, "INVALID_INPUT")
            }
            Self::Data(DataError::Domain(DomainError::UnsupportedPool(_))) => {
                (StatusCode::BAD_REQUEST, "UNSUPPORTED_POOL")
            }
            Self::Data(DataError::UnsupportedChain(_)) => {
                (StatusCode::SERVICE_UNAVAILABLE, "UNSUPPORTED_CHAIN")
            }
            Self::Data(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        if status.is_server_error() {
            tracing::error!(error = %self, error_code = %code, "request failed");
        } else {
            tracing::warn!(error = %self, error_code = %code, "request rejected");
        }

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        });

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let invalid = ApiError::Domain(DomainError::invalid("bad ratio"));
        assert_eq!(invalid.status_and_code().0, StatusCode::BAD_REQUEST);

        let unsupported = ApiError::Domain(DomainError::unsupported("curve"));
        assert_eq!(unsupported.status_and_code().1, "UNSUPPORTED_POOL");

        let chain = ApiError::Data(DataError::UnsupportedChain(999));
        assert_eq!(chain.status_and_code().0, StatusCode::SERVICE_UNAVAILABLE);

        let upstream = ApiError::Data(DataError::Rpc("boom".to_string()));
        assert_eq!(upstream.status_and_code().0, StatusCode::BAD_GATEWAY);
    }
}
