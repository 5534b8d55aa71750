//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every profile, search and health endpoint together
//! with the schema wrappers from [`crate::inbound::http::schemas`] and the
//! session cookie security scheme. Swagger UI serves it in debug builds.

use crate::inbound::http::profile::{BioRequest, UserResponse, UsernameRequest};
use crate::inbound::http::schemas::{
    AvatarUploadSchema, ErrorCodeSchema, ErrorSchema, UserSummarySchema,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie carrying the signed-in user id.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Profile service API",
        description = "Avatar, bio and username management plus public username search."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::profile::update_avatar,
        crate::inbound::http::profile::update_bio,
        crate::inbound::http::profile::update_username,
        crate::inbound::http::search::search_users,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        UserResponse,
        BioRequest,
        UsernameRequest,
        UserSummarySchema,
        AvatarUploadSchema,
        ErrorSchema,
        ErrorCodeSchema
    )),
    tags(
        (name = "profile", description = "Profile updates for the signed-in user"),
        (name = "search", description = "Public username search"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
