//! Mapping from domain errors onto HTTP responses.
//!
//! The domain stays transport agnostic; this module decides status codes
//! and redacts internal failures before they reach clients.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use tracing::error;

use crate::domain::{Error, ErrorCode};

const TRACE_ID_HEADER: &str = "trace-id";

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self.code() {
            ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        if self.code() == ErrorCode::InternalError {
            error!(message = self.message(), "internal error returned to client");
            let redacted = Error::internal("Internal server error");
            return builder.json(redacted);
        }
        builder.json(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use rstest::rstest;
    use serde_json::Value;

    #[rstest]
    #[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
    #[case(Error::unauthorized("who"), StatusCode::UNAUTHORIZED)]
    #[case(Error::forbidden("no"), StatusCode::FORBIDDEN)]
    #[case(Error::not_found("gone"), StatusCode::NOT_FOUND)]
    #[case(Error::conflict("dupe"), StatusCode::CONFLICT)]
    #[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
    fn codes_map_to_statuses(#[case] err: Error, #[case] expected: StatusCode) {
        assert_eq!(err.status_code(), expected);
    }

    #[actix_web::test]
    async fn internal_errors_are_redacted() {
        let err = Error::internal("database password rejected")
            .with_details(serde_json::json!({ "secret": true }));
        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = to_bytes(response.into_body()).await.expect("body");
        let payload: Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(
            payload.get("message").and_then(Value::as_str),
            Some("Internal server error")
        );
        assert!(payload.get("details").is_none());
    }

    #[actix_web::test]
    async fn client_errors_keep_their_payload() {
        let err = Error::conflict("Recipe with this title already exists");
        let response = err.error_response();
        let bytes = to_bytes(response.into_body()).await.expect("body");
        let payload: Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(payload.get("code").and_then(Value::as_str), Some("conflict"));
        assert_eq!(
            payload.get("message").and_then(Value::as_str),
            Some("Recipe with this title already exists")
        );
    }
}
