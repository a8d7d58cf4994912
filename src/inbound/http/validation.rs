//! Shared validation helpers for inbound HTTP adapters.

use serde_json::json;

use crate::domain::Error;

/// The payload omitted a required field.
pub(crate) fn missing_field_error(field: &str) -> Error {
    Error::invalid_request(format!("{field} is required")).with_details(json!({
        "field": field,
        "code": "missing_field",
    }))
}

/// The payload supplied a field but it was empty or whitespace.
pub(crate) fn blank_field_error(field: &str) -> Error {
    Error::invalid_request(format!("{field} must not be empty")).with_details(json!({
        "field": field,
        "code": "blank_field",
    }))
}

/// A path or payload identifier was not a valid UUID.
pub(crate) fn invalid_id_error(field: &str, value: &str) -> Error {
    Error::invalid_request(format!("{field} is not a valid identifier")).with_details(json!({
        "field": field,
        "value": value,
        "code": "invalid_id",
    }))
}

/// Require a present, non-blank string field, returning it trimmed.
pub(crate) fn require_text(value: Option<String>, field: &str) -> Result<String, Error> {
    let value = value.ok_or_else(|| missing_field_error(field))?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(blank_field_error(field));
    }
    Ok(trimmed.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;

    #[test]
    fn require_text_trims_and_validates() {
        assert_eq!(
            require_text(Some("  Soup  ".to_owned()), "title").expect("present"),
            "Soup"
        );
        assert!(require_text(None, "title").is_err());
        let err = require_text(Some("   ".to_owned()), "title").expect_err("blank");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[test]
    fn errors_carry_field_details() {
        let err = invalid_id_error("recipeId", "nope");
        let details = err.details().expect("details");
        assert_eq!(details.get("field").and_then(|v| v.as_str()), Some("recipeId"));
        assert_eq!(details.get("code").and_then(|v| v.as_str()), Some("invalid_id"));
    }
}
