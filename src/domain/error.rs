//! Domain-level error taxonomy.
//!
//! Errors are transport agnostic; the inbound HTTP layer maps them onto
//! status codes. Each error carries a stable machine-readable code, a
//! human-readable message, the ambient trace identifier when one is in
//! scope, and optional structured details for clients.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::middleware::trace::TraceId;

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request is malformed or fails validation.
    InvalidRequest,
    /// Authentication failed or is missing.
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    Forbidden,
    /// The requested resource does not exist.
    NotFound,
    /// The request collides with existing state, e.g. a duplicate slug,
    /// email, or review.
    Conflict,
    /// An unexpected error occurred inside the service.
    InternalError,
}

/// Error payload returned by every failing endpoint.
///
/// # Examples
/// ```
/// use tastebook::domain::{Error, ErrorCode};
///
/// let err = Error::not_found("Recipe not found");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Error {
    #[schema(example = "invalid_request")]
    code: ErrorCode,
    #[schema(example = "Something went wrong")]
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl Error {
    /// Create a new error, capturing the ambient trace identifier.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            trace_id: TraceId::current().map(|id| id.to_string()),
            details: None,
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Trace identifier propagated into the response header.
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Supplementary structured details for clients.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach structured details to the error.
    ///
    /// # Examples
    /// ```
    /// use serde_json::json;
    /// use tastebook::domain::Error;
    ///
    /// let err = Error::invalid_request("bad").with_details(json!({ "field": "name" }));
    /// assert!(err.details().is_some());
    /// ```
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Convenience constructor for [`ErrorCode::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Convenience constructor for [`ErrorCode::Forbidden`].
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(Error::invalid_request("bad"), ErrorCode::InvalidRequest)]
    #[case(Error::unauthorized("who"), ErrorCode::Unauthorized)]
    #[case(Error::forbidden("no"), ErrorCode::Forbidden)]
    #[case(Error::not_found("gone"), ErrorCode::NotFound)]
    #[case(Error::conflict("dupe"), ErrorCode::Conflict)]
    #[case(Error::internal("boom"), ErrorCode::InternalError)]
    fn constructors_set_codes(#[case] err: Error, #[case] expected: ErrorCode) {
        assert_eq!(err.code(), expected);
    }

    #[test]
    fn serialises_snake_case_codes_and_camel_case_fields() {
        let err = Error::conflict("duplicate").with_details(json!({ "field": "email" }));
        let value = serde_json::to_value(&err).expect("serialise error");
        assert_eq!(value.get("code").and_then(Value::as_str), Some("conflict"));
        assert_eq!(
            value.get("message").and_then(Value::as_str),
            Some("duplicate")
        );
        assert_eq!(
            value
                .get("details")
                .and_then(|details| details.get("field"))
                .and_then(Value::as_str),
            Some("email")
        );
        // Absent trace id is omitted entirely rather than serialised as null.
        assert!(value.get("traceId").is_none());
    }

    #[test]
    fn round_trips_through_json() {
        let err = Error::not_found("Recipe not found");
        let json = serde_json::to_string(&err).expect("serialise");
        let back: Error = serde_json::from_str(&json).expect("deserialise");
        assert_eq!(back.code(), ErrorCode::NotFound);
        assert_eq!(back.message(), "Recipe not found");
    }
}
