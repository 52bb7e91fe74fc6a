//! HTTP error envelope and mapping from domain errors.
//!
//! Keep the domain free of transport concerns by translating
//! [`Error`](crate::domain::Error) into Actix responses here. Bodies
//! serialise as `{"error": string, "details"?: string}`; internal failures
//! are redacted to a generic message and logged server-side with the
//! request's trace id.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::domain::{Error, ErrorCode};
use crate::middleware::TraceId;
use crate::middleware::trace::TRACE_ID_HEADER;

/// Standard error envelope returned by the HTTP surface.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Human-readable failure description.
    #[schema(example = "validation error")]
    pub error: String,
    /// Optional caller-safe detail text.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "title must not be empty")]
    pub details: Option<String>,
}

/// Adapter-level error carrying the domain failure it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError(Error);

impl ApiError {
    /// The wrapped domain error.
    #[must_use]
    pub const fn inner(&self) -> &Error {
        &self.0
    }

    const fn to_status_code(&self) -> StatusCode {
        match self.0.code() {
            ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn to_body(&self) -> ErrorBody {
        match self.0.code() {
            // Never leak internals; the full error is logged server-side.
            ErrorCode::InternalError => ErrorBody {
                error: "internal server error".to_owned(),
                details: None,
            },
            ErrorCode::ServiceUnavailable => ErrorBody {
                error: "service temporarily unavailable".to_owned(),
                details: None,
            },
            _ => ErrorBody {
                error: self.0.message().to_owned(),
                details: self.0.details().map(str::to_owned),
            },
        }
    }
}

impl From<Error> for ApiError {
    fn from(value: Error) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for ApiError {}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.to_status_code()
    }

    fn error_response(&self) -> HttpResponse {
        if matches!(
            self.0.code(),
            ErrorCode::InternalError | ErrorCode::ServiceUnavailable
        ) {
            error!(
                code = ?self.0.code(),
                message = %self.0.message(),
                trace_id = ?TraceId::current(),
                "request failed"
            );
        }

        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = TraceId::current() {
            builder.insert_header((TRACE_ID_HEADER, id.to_string()));
        }
        builder.json(self.to_body())
    }
}

/// Convenience alias for HTTP handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use actix_web::body::to_bytes;
    use rstest::rstest;
    use serde_json::Value;

    async fn body_json(error: &ApiError) -> Value {
        let response = error.error_response();
        let bytes = to_bytes(response.into_body()).await.expect("body bytes");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[rstest]
    #[case(Error::invalid_request("validation error"), StatusCode::BAD_REQUEST)]
    #[case(Error::unauthorized("authentication required"), StatusCode::UNAUTHORIZED)]
    #[case(Error::forbidden("not the author"), StatusCode::FORBIDDEN)]
    #[case(Error::not_found("feedback not found"), StatusCode::NOT_FOUND)]
    #[case(Error::conflict("email already registered"), StatusCode::CONFLICT)]
    #[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
    #[case(Error::unavailable("db down"), StatusCode::SERVICE_UNAVAILABLE)]
    fn domain_codes_map_to_http_statuses(
        #[case] error: Error,
        #[case] expected: StatusCode,
    ) {
        assert_eq!(ApiError::from(error).status_code(), expected);
    }

    #[actix_web::test]
    async fn client_errors_expose_message_and_details() {
        let error = ApiError::from(
            Error::invalid_request("validation error")
                .with_details("title must not be empty"),
        );
        let value = body_json(&error).await;
        assert_eq!(
            value.get("error").and_then(Value::as_str),
            Some("validation error")
        );
        assert_eq!(
            value.get("details").and_then(Value::as_str),
            Some("title must not be empty")
        );
    }

    #[actix_web::test]
    async fn internal_errors_are_redacted() {
        let error =
            ApiError::from(Error::internal("connection to 10.0.0.3:5432 refused"));
        let value = body_json(&error).await;
        assert_eq!(
            value.get("error").and_then(Value::as_str),
            Some("internal server error")
        );
        assert!(value.get("details").is_none());
    }

    #[actix_web::test]
    async fn details_are_omitted_when_absent() {
        let error = ApiError::from(Error::not_found("feedback not found"));
        let value = body_json(&error).await;
        assert!(value.get("details").is_none());
    }
}
