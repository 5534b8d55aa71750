//! Shared harness for HTTP integration tests.
//!
//! Wires the real profile service to an in-memory user repository and a
//! `cap-std` avatar store rooted in a temporary directory.
#![allow(dead_code, reason = "each test binary uses a subset of the harness")]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpResponse, test, web};
use serde_json::Value;
use tempfile::TempDir;

use profile_service::Trace;
use profile_service::domain::{AvatarPolicy, Error, ProfileService, PublicUrl, User, UserId, Username};
use profile_service::inbound::http::extractors::{json_config, query_config};
use profile_service::inbound::http::profile::{update_avatar, update_bio, update_username};
use profile_service::inbound::http::search::search_users;
use profile_service::inbound::http::session::SessionContext;
use profile_service::inbound::http::state::HttpState;
use profile_service::outbound::{CapStdAvatarStore, InMemoryUserRepository};

const BOUNDARY: &str = "integration-boundary";

/// Profile service over real adapters plus the avatar directory it writes to.
pub struct Harness {
    pub policy: AvatarPolicy,
    state: HttpState,
    dir: TempDir,
}

impl Harness {
    /// Harness seeded with users named `usernames`, using `policy`.
    pub fn new(usernames: &[&str], policy: AvatarPolicy) -> (Self, Vec<UserId>) {
        let users: Vec<User> = usernames
            .iter()
            .map(|name| User::new(UserId::random(), Username::new(*name).expect("username")))
            .collect();
        let ids = users.iter().map(|user| *user.id()).collect();
        let repository = InMemoryUserRepository::with_users(users).expect("seed users");
        let dir = tempfile::tempdir().expect("tempdir");
        let store = CapStdAvatarStore::open(dir.path().join("avatars")).expect("avatar store");
        let service = Arc::new(ProfileService::new(
            Arc::new(repository),
            Arc::new(store),
            policy.clone(),
        ));
        let state = HttpState::new(service.clone(), service, PublicUrl::new("localhost", 8000))
            .with_avatar_policy(policy.clone());
        (Self { policy, state, dir }, ids)
    }

    /// Directory avatars are written to.
    pub fn avatar_dir(&self) -> PathBuf {
        self.dir.path().join("avatars")
    }

    /// File names currently in the avatar directory.
    pub fn stored_files(&self) -> Vec<String> {
        list_files(&self.avatar_dir())
    }

    /// App mounting the API the way the server does, plus a sign-in route.
    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        let session = SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
            .cookie_name("session".to_owned())
            .cookie_secure(false)
            .build();
        App::new()
            .app_data(web::Data::new(self.state.clone()))
            .app_data(json_config())
            .app_data(query_config())
            .wrap(Trace)
            .service(
                web::scope("/api/v1")
                    .wrap(session)
                    .route("/test/sign-in/{user_id}", web::get().to(sign_in))
                    .service(update_avatar)
                    .service(update_bio)
                    .service(update_username)
                    .service(search_users),
            )
    }
}

fn list_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("read avatar dir")
        .map(|entry| entry.expect("dir entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

async fn sign_in(session: SessionContext, user_id: web::Path<UserId>) -> Result<HttpResponse, Error> {
    session.persist_user(&user_id)?;
    Ok(HttpResponse::NoContent().finish())
}

/// Sign in as `user_id` and return the session cookie.
pub async fn session_cookie(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    user_id: &UserId,
) -> Cookie<'static> {
    let request = test::TestRequest::get()
        .uri(&format!("/api/v1/test/sign-in/{user_id}"))
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

/// PUT a single-file multipart body to `/api/v1/me/avatar`.
pub fn avatar_request(
    cookie: Option<Cookie<'static>>,
    content_type: &str,
    file_name: &str,
    data: &[u8],
) -> actix_http::Request {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"avatar\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    let mut request = test::TestRequest::put()
        .uri("/api/v1/me/avatar")
        .insert_header((
            actix_web::http::header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(body);
    if let Some(cookie) = cookie {
        request = request.cookie(cookie);
    }
    request.to_request()
}

/// PUT a JSON body to `uri` as the holder of `cookie`.
pub fn json_put(uri: &str, cookie: Cookie<'static>, body: &Value) -> actix_http::Request {
    test::TestRequest::put()
        .uri(uri)
        .cookie(cookie)
        .set_json(body)
        .to_request()
}

/// Read a response body as JSON.
pub async fn read_json(response: ServiceResponse) -> Value {
    let body = test::read_body(response).await;
    serde_json::from_slice(&body).expect("json body")
}
