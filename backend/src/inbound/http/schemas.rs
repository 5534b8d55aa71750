//! OpenAPI schema definitions for domain types.
//!
//! Domain types stay free of utoipa derives. The wrappers here mirror their
//! wire shape and register under the domain type's name, so the generated
//! document reads as if the domain types were annotated directly.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// The uploaded file is not a supported image type.
    #[schema(rename = "invalid_media_type")]
    InvalidMediaType,
    /// The upload exceeds the configured size limit.
    #[schema(rename = "payload_too_large")]
    PayloadTooLarge,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request conflicts with existing data.
    #[schema(rename = "conflict")]
    Conflict,
    /// A backing service is temporarily unavailable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "bio must be at most 255 characters")]
    message: String,
    /// Correlation identifier, also sent as the `trace-id` header.
    #[schema(example = "6f2b1c9e-3d4a-4f5b-8c7d-9e0f1a2b3c4d")]
    trace_id: Option<String>,
    /// Field-level context such as `{"field":"bio","code":"bio_too_long"}`.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::UserSummary`].
#[derive(ToSchema)]
#[schema(as = crate::domain::UserSummary)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct UserSummarySchema {
    /// Stable user identifier.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    id: String,
    /// Unique username.
    #[schema(example = "alice")]
    username: String,
    /// Server-relative avatar path, when one is set.
    #[schema(example = "/static/avatars/0b6f6a0e6a434d4ea4a42f0d1b8f4c21.png")]
    avatar: Option<String>,
}

/// Multipart body for avatar uploads.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct AvatarUploadSchema {
    /// JPEG or PNG image file.
    #[schema(value_type = String, format = Binary)]
    avatar: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::PartialSchema;

    fn schema_to_json<T: PartialSchema>() -> String {
        serde_json::to_string(&T::schema()).expect("schema serialises to JSON")
    }

    #[rstest]
    #[case("invalid_request")]
    #[case("invalid_media_type")]
    #[case("payload_too_large")]
    #[case("unauthorized")]
    #[case("not_found")]
    #[case("conflict")]
    #[case("service_unavailable")]
    #[case("internal_error")]
    fn error_code_schema_lists_every_code(#[case] code: &str) {
        assert!(schema_to_json::<ErrorCodeSchema>().contains(code), "missing {code}");
    }

    #[test]
    fn error_schema_registers_under_domain_name() {
        // utoipa replaces :: with . in schema names
        assert_eq!(ErrorSchema::name(), "crate.domain.Error");
        let json = schema_to_json::<ErrorSchema>();
        assert!(json.contains("traceId"), "camelCase trace id expected: {json}");
    }

    #[test]
    fn summary_schema_has_wire_fields() {
        let json = schema_to_json::<UserSummarySchema>();
        for field in ["id", "username", "avatar"] {
            assert!(json.contains(field), "missing {field}");
        }
    }

    #[test]
    fn avatar_upload_is_binary() {
        let json = schema_to_json::<AvatarUploadSchema>();
        assert!(json.contains("binary"), "binary format expected: {json}");
    }
}
