//! Profile endpoints for the signed-in user.
//!
//! ```text
//! PUT /api/v1/me/avatar    multipart/form-data; field "avatar"
//! PUT /api/v1/me/bio       {"bio":"Mathematician"}
//! PUT /api/v1/me/username  {"username":"ada"}
//! ```
//!
//! Handlers validate wire input into domain types, call the
//! [`ProfileCommand`](crate::domain::ports::ProfileCommand) port and render
//! the refreshed user with an absolute `avatarUrl`.

use actix_multipart::Multipart;
use actix_web::{put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Bio, PublicUrl, User, Username};
use crate::inbound::http::ApiResult;
use crate::inbound::http::extractors::read_avatar_part;
use crate::inbound::http::schemas::{AvatarUploadSchema, ErrorSchema};
use crate::inbound::http::session::CurrentUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{BIO, USERNAME, invalid_field_error, missing_field_error};

/// Request body for `PUT /api/v1/me/bio`. Omit `bio` or send `null` to clear.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BioRequest {
    /// New bio; `null` or absent clears it.
    #[serde(default)]
    #[schema(max_length = 255, example = "Mathematician and writer")]
    pub bio: Option<String>,
}

/// Request body for `PUT /api/v1/me/username`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UsernameRequest {
    /// Requested username.
    #[serde(default)]
    #[schema(min_length = 1, max_length = 16, example = "ada")]
    pub username: Option<String>,
}

/// User as rendered to clients.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// Stable user identifier.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    /// Unique username.
    #[schema(example = "ada")]
    pub username: String,
    /// Free-text bio, when set.
    pub bio: Option<String>,
    /// Server-relative path of the stored avatar.
    #[schema(example = "/static/avatars/0b6f6a0e6a434d4ea4a42f0d1b8f4c21.png")]
    pub avatar: Option<String>,
    /// Absolute URL of the stored avatar.
    #[schema(example = "https://localhost:8000/static/avatars/0b6f6a0e6a434d4ea4a42f0d1b8f4c21.png")]
    pub avatar_url: Option<String>,
}

impl UserResponse {
    /// Render `user`, resolving the avatar against `public_url`.
    pub fn from_user(user: &User, public_url: &PublicUrl) -> Self {
        let avatar = user.avatar().map(|path| path.as_ref().to_owned());
        Self {
            id: user.id().to_string(),
            username: user.username().as_ref().to_owned(),
            bio: user.bio().map(|bio| bio.as_ref().to_owned()),
            avatar_url: avatar.as_deref().map(|path| public_url.static_url(path)),
            avatar,
        }
    }
}

fn render(state: &HttpState, user: &User) -> web::Json<UserResponse> {
    web::Json(UserResponse::from_user(user, &state.public_url))
}

/// Upload a new avatar image.
///
/// Accepts JPEG or PNG up to the configured size. The previous file stays on
/// disk unless pruning is enabled.
#[utoipa::path(
    put,
    path = "/api/v1/me/avatar",
    request_body(content = AvatarUploadSchema, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Avatar updated", body = UserResponse),
        (status = 400, description = "Missing file or unsupported media type", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema),
        (status = 413, description = "Avatar too large", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema),
        (status = 503, description = "Database unavailable", body = ErrorSchema)
    ),
    tags = ["profile"],
    operation_id = "updateAvatar"
)]
#[put("/me/avatar")]
pub async fn update_avatar(
    state: web::Data<HttpState>,
    user: CurrentUser,
    payload: Multipart,
) -> ApiResult<web::Json<UserResponse>> {
    let upload = read_avatar_part(payload, &state.avatar_policy).await?;
    let updated = state.profile.update_avatar(user.id(), upload).await?;
    Ok(render(&state, &updated))
}

/// Replace or clear the bio.
#[utoipa::path(
    put,
    path = "/api/v1/me/bio",
    request_body = BioRequest,
    responses(
        (status = 200, description = "Bio updated", body = UserResponse),
        (status = 400, description = "Bio too long or malformed body", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema),
        (status = 503, description = "Database unavailable", body = ErrorSchema)
    ),
    tags = ["profile"],
    operation_id = "updateBio"
)]
#[put("/me/bio")]
pub async fn update_bio(
    state: web::Data<HttpState>,
    user: CurrentUser,
    payload: web::Json<BioRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let bio = payload
        .into_inner()
        .bio
        .map(Bio::new)
        .transpose()
        .map_err(|err| invalid_field_error(BIO, &err))?;
    let updated = state.profile.update_bio(user.id(), bio).await?;
    Ok(render(&state, &updated))
}

/// Change the username.
///
/// Fails with `409 Conflict` when another user holds the name.
#[utoipa::path(
    put,
    path = "/api/v1/me/username",
    request_body = UsernameRequest,
    responses(
        (status = 200, description = "Username updated", body = UserResponse),
        (status = 400, description = "Invalid username", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema),
        (status = 409, description = "Username already taken", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema),
        (status = 503, description = "Database unavailable", body = ErrorSchema)
    ),
    tags = ["profile"],
    operation_id = "updateUsername"
)]
#[put("/me/username")]
pub async fn update_username(
    state: web::Data<HttpState>,
    user: CurrentUser,
    payload: web::Json<UsernameRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let raw = payload
        .into_inner()
        .username
        .ok_or_else(|| missing_field_error(USERNAME))?;
    let username = Username::new(raw).map_err(|err| invalid_field_error(USERNAME, &err))?;
    let updated = state.profile.update_username(user.id(), username).await?;
    Ok(render(&state, &updated))
}

#[cfg(test)]
#[path = "profile_tests.rs"]
mod tests;
