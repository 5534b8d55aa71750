//! Liveness and readiness probes for orchestrators and load balancers.
//!
//! Readiness flips on once startup has finished and, when a database is
//! configured, also requires the pool to answer a ping.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpResponse, get, http::header, web};
use tracing::warn;

use crate::domain::ports::ReadinessProbe;

/// Shared probe state.
pub struct HealthState {
    ready: AtomicBool,
    dependency: Option<Arc<dyn ReadinessProbe>>,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            ready: AtomicBool::new(false),
            dependency: None,
        }
    }
}

impl HealthState {
    /// Not ready, with no dependency to check.
    pub fn new() -> Self {
        Self::default()
    }

    /// Also require `probe` to succeed before reporting ready.
    #[must_use]
    pub fn with_dependency(mut self, probe: Arc<dyn ReadinessProbe>) -> Self {
        self.dependency = Some(probe);
        self
    }

    /// Mark startup as complete.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Whether startup has completed.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    async fn dependency_ok(&self) -> bool {
        let Some(probe) = &self.dependency else {
            return true;
        };
        match probe.check().await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "readiness dependency check failed");
                false
            }
        }
    }

    fn probe_response(probe_ok: bool) -> HttpResponse {
        let mut response = if probe_ok {
            HttpResponse::Ok()
        } else {
            HttpResponse::ServiceUnavailable()
        };
        response
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .finish()
    }
}

/// Readiness probe: 200 when startup finished and dependencies answer.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Server is ready to handle traffic"),
        (status = 503, description = "Server or database is not ready")
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    let ok = state.is_ready() && state.dependency_ok().await;
    HealthState::probe_response(ok)
}

/// Liveness probe: 200 whenever the worker can answer at all.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Server is alive")
    )
)]
#[get("/health/live")]
pub async fn live() -> HttpResponse {
    HealthState::probe_response(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockReadinessProbe, ReadinessError};
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use rstest::rstest;

    async fn probe(state: HealthState, uri: &str) -> (StatusCode, Option<String>) {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(ready)
                .service(live),
        )
        .await;
        let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        let cache = res
            .headers()
            .get(header::CACHE_CONTROL)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        (res.status(), cache)
    }

    fn failing_probe() -> Arc<dyn ReadinessProbe> {
        let mut probe = MockReadinessProbe::new();
        probe
            .expect_check()
            .returning(|| Err(ReadinessError::unavailable("database", "connection refused")));
        Arc::new(probe)
    }

    #[rstest]
    #[case(false, StatusCode::SERVICE_UNAVAILABLE)]
    #[case(true, StatusCode::OK)]
    #[actix_web::test]
    async fn readiness_follows_startup(#[case] started: bool, #[case] expected: StatusCode) {
        let state = HealthState::new();
        if started {
            state.mark_ready();
        }
        let (status, cache) = probe(state, "/health/ready").await;
        assert_eq!(status, expected);
        assert_eq!(cache.as_deref(), Some("no-store"));
    }

    #[actix_web::test]
    async fn failing_dependency_is_not_ready() {
        let state = HealthState::new().with_dependency(failing_probe());
        state.mark_ready();
        let (status, _) = probe(state, "/health/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[actix_web::test]
    async fn liveness_does_not_wait_for_startup() {
        let state = HealthState::new().with_dependency(failing_probe());
        let (status, cache) = probe(state, "/health/live").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cache.as_deref(), Some("no-store"));
    }
}
