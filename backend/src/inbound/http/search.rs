//! Public username search.
//!
//! ```text
//! GET /api/v1/search?q=ali
//! ```

use actix_web::{get, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::{UserSummary, UsernamePrefix};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, UserSummarySchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{QUERY, invalid_field_error, missing_field_error};

/// Query string for `GET /api/v1/search`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Case-insensitive username prefix, 1 to 20 characters.
    #[param(min_length = 1, max_length = 20, example = "ali")]
    pub q: Option<String>,
}

/// Find up to five users whose username starts with `q`.
#[utoipa::path(
    get,
    path = "/api/v1/search",
    params(SearchParams),
    responses(
        (status = 200, description = "Matching users", body = [UserSummarySchema]),
        (status = 400, description = "Missing, empty or overlong query", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema),
        (status = 503, description = "Database unavailable", body = ErrorSchema)
    ),
    tags = ["search"],
    operation_id = "searchUsers",
    security([])
)]
#[get("/search")]
pub async fn search_users(
    state: web::Data<HttpState>,
    params: web::Query<SearchParams>,
) -> ApiResult<web::Json<Vec<UserSummary>>> {
    let raw = params
        .into_inner()
        .q
        .ok_or_else(|| missing_field_error(QUERY))?;
    let prefix = UsernamePrefix::new(raw).map_err(|err| invalid_field_error(QUERY, &err))?;
    let found = state.search.search(&prefix).await?;
    Ok(web::Json(found))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use serde_json::Value;

    use super::*;
    use crate::domain::ports::{MockProfileCommand, MockUserSearchQuery};
    use crate::domain::{Error, PublicUrl, User, UserId, Username};

    fn summary(name: &str) -> UserSummary {
        User::new(UserId::random(), Username::new(name).expect("username")).summary()
    }

    async fn get_json(search: MockUserSearchQuery, uri: &str) -> (StatusCode, Value) {
        let state = HttpState::new(
            Arc::new(MockProfileCommand::new()),
            Arc::new(search),
            PublicUrl::default(),
        );
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(web::scope("/api/v1").service(search_users)),
        )
        .await;
        let response =
            actix_test::call_service(&app, actix_test::TestRequest::get().uri(uri).to_request())
                .await;
        let status = response.status();
        let body = actix_test::read_body(response).await;
        (status, serde_json::from_slice(&body).expect("json body"))
    }

    #[actix_web::test]
    async fn returns_summaries_from_the_port() {
        let mut search = MockUserSearchQuery::new();
        search
            .expect_search()
            .withf(|prefix| prefix.as_ref() == "Ali")
            .times(1)
            .return_once(|_| Ok(vec![summary("alice"), summary("Alistair")]));

        let (status, body) = get_json(search, "/api/v1/search?q=Ali").await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<&str> = body
            .as_array()
            .expect("array")
            .iter()
            .filter_map(|entry| entry.get("username").and_then(Value::as_str))
            .collect();
        assert_eq!(names, ["alice", "Alistair"]);
        let first = body.get(0).expect("first entry");
        assert!(first.get("id").is_some());
        assert!(first.get("bio").is_none());
    }

    #[rstest]
    #[case("/api/v1/search", "missing_field")]
    #[case("/api/v1/search?q=", "empty_query")]
    #[case("/api/v1/search?q=abcdefghijklmnopqrstu", "query_too_long")]
    #[actix_web::test]
    async fn rejects_invalid_queries(#[case] uri: &str, #[case] code: &str) {
        let mut search = MockUserSearchQuery::new();
        search.expect_search().times(0);

        let (status, body) = get_json(search, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.get("code").and_then(Value::as_str), Some("invalid_request"));
        let details = body.get("details").expect("details");
        assert_eq!(details.get("field").and_then(Value::as_str), Some("q"));
        assert_eq!(details.get("code").and_then(Value::as_str), Some(code));
    }

    #[actix_web::test]
    async fn twenty_character_query_is_accepted() {
        let mut search = MockUserSearchQuery::new();
        search.expect_search().times(1).return_once(|_| Ok(Vec::new()));

        let (status, body) = get_json(search, "/api/v1/search?q=abcdefghijklmnopqrst").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::Array(Vec::new()));
    }

    #[actix_web::test]
    async fn store_outage_is_service_unavailable() {
        let mut search = MockUserSearchQuery::new();
        search
            .expect_search()
            .return_once(|_| Err(Error::service_unavailable("user store is unavailable")));

        let (status, body) = get_json(search, "/api/v1/search?q=ali").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            body.get("code").and_then(Value::as_str),
            Some("service_unavailable")
        );
    }
}
