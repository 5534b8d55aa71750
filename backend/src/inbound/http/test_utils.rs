//! Test helpers for inbound HTTP components.

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{HttpResponse, test, web};

use crate::domain::UserId;
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;

/// Route that signs the caller in as the user named in the path.
pub const SIGN_IN_PATH: &str = "/test/sign-in/{user_id}";

const BOUNDARY: &str = "profile-test-boundary";

/// Session middleware with a fresh key, cookie name `session` and the
/// `Secure` flag off so plain-HTTP test requests keep the cookie.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Stand-in for the account service: writes `user_id` into the session.
pub async fn sign_in(session: SessionContext, user_id: web::Path<UserId>) -> ApiResult<HttpResponse> {
    session.persist_user(&user_id)?;
    Ok(HttpResponse::NoContent().finish())
}

/// Sign in through [`sign_in`] and return the issued session cookie.
pub async fn session_cookie(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    user_id: &UserId,
) -> Cookie<'static> {
    let request = test::TestRequest::get()
        .uri(&format!("/test/sign-in/{user_id}"))
        .to_request();
    let response = test::call_service(app, request).await;
    assert!(response.status().is_success(), "sign-in failed");
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned()
}

/// Multipart body with a single `avatar` file part.
///
/// Returns the `Content-Type` header value and the encoded body.
pub fn avatar_multipart(content_type: &str, file_name: &str, data: &[u8]) -> (String, Vec<u8>) {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"avatar\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

/// Multipart body with a text part under `name` and no avatar.
pub fn text_multipart(name: &str, value: &str) -> (String, Vec<u8>) {
    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n--{BOUNDARY}--\r\n"
    )
    .into_bytes();
    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}
