//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every validation failure becomes `invalid_request` with a
//! `{ "field", "code" }` details object so clients can highlight the
//! offending input.

use serde_json::json;

use crate::domain::{Error, UserValidationError};

/// Name of a request field, as spelled on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub(crate) fn as_str(self) -> &'static str {
        self.0
    }
}

pub(crate) const USERNAME: FieldName = FieldName::new("username");
pub(crate) const BIO: FieldName = FieldName::new("bio");
pub(crate) const QUERY: FieldName = FieldName::new("q");
pub(crate) const AVATAR: FieldName = FieldName::new("avatar");

fn field_error(field: FieldName, code: &str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code,
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let name = field.as_str();
    field_error(field, "missing_field", format!("missing required field: {name}"))
}

pub(crate) fn invalid_field_error(field: FieldName, err: &UserValidationError) -> Error {
    field_error(field, err.code(), err.to_string())
}

/// Body or query that failed to deserialise at all.
pub(crate) fn malformed_request_error(what: &str, err: &impl std::fmt::Display) -> Error {
    Error::invalid_request(format!("malformed {what}: {err}"))
        .with_details(json!({ "code": "malformed_request" }))
}
