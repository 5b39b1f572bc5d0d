use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use core_config::AppInfo;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use utoipa::ToSchema;

pub const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// A boxed future for health checks with a string error
pub type HealthCheckFuture = Pin<Box<dyn Future<Output = Result<(), String>> + Send>>;

type HealthCheckFn = Arc<dyn Fn() -> HealthCheckFuture + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CheckResult {
    pub status: HealthStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckResult {
    fn healthy() -> Self {
        Self {
            status: HealthStatus::Healthy,
            error: None,
        }
    }

    fn unhealthy(error: String) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            error: Some(error),
        }
    }
}

/// Aggregate of all registered checks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthResult {
    pub status: HealthStatus,
    pub checks: BTreeMap<String, CheckResult>,
}

impl HealthResult {
    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

impl IntoResponse for HealthResult {
    fn into_response(self) -> Response {
        let status = if self.is_healthy() {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        };
        (status, Json(self)).into_response()
    }
}

/// Named dependency checks run for readiness probes.
///
/// ```ignore
/// let mut checker = HealthChecker::new();
/// checker.add_check("database", move || {
///     let db = db.clone();
///     async move { check_health(&db).await.map_err(|e| e.to_string()) }
/// });
/// let result = checker.readiness().await;
/// ```
#[derive(Clone)]
pub struct HealthChecker {
    checks: BTreeMap<String, HealthCheckFn>,
    timeout: Duration,
}

impl HealthChecker {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_CHECK_TIMEOUT)
    }

    /// All checks of one run share this deadline.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            checks: BTreeMap::new(),
            timeout,
        }
    }

    /// Register `check` under `name`, replacing any check with the same name.
    pub fn add_check<F, Fut>(&mut self, name: impl Into<String>, check: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), String>> + Send + 'static,
    {
        let check: HealthCheckFn = Arc::new(move || Box::pin(check()) as HealthCheckFuture);
        self.checks.insert(name.into(), check);
    }

    /// Run every check concurrently.
    ///
    /// A check that fails or misses the deadline marks itself and the aggregate unhealthy.
    pub async fn check(&self) -> HealthResult {
        let deadline = Instant::now() + self.timeout;
        let timeout = self.timeout;

        let runs = self.checks.iter().map(|(name, check)| {
            let fut = check();
            async move {
                let result = match tokio::time::timeout_at(deadline, fut).await {
                    Ok(Ok(())) => CheckResult::healthy(),
                    Ok(Err(e)) => CheckResult::unhealthy(e),
                    Err(_) => CheckResult::unhealthy(format!(
                        "health check timed out after {}ms",
                        timeout.as_millis()
                    )),
                };
                if let Some(error) = &result.error {
                    tracing::warn!(check = %name, %error, "Health check failed");
                }
                (name.clone(), result)
            }
        });

        let checks: BTreeMap<_, _> = join_all(runs).await.into_iter().collect();
        let status = if checks.values().all(|c| c.status == HealthStatus::Healthy) {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy
        };

        HealthResult { status, checks }
    }

    /// The process is up; dependencies are not consulted.
    pub fn liveness(&self) -> HealthResult {
        HealthResult {
            status: HealthStatus::Healthy,
            checks: BTreeMap::from([("liveness".to_string(), CheckResult::healthy())]),
        }
    }

    pub async fn readiness(&self) -> HealthResult {
        self.check().await
    }
}

impl Default for HealthChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub name: String,
    pub version: String,
}

#[derive(Clone)]
struct HealthState {
    app: AppInfo,
    checker: Arc<HealthChecker>,
}

async fn health_handler(State(state): State<HealthState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        name: state.app.name.to_string(),
        version: state.app.version.to_string(),
    })
}

async fn liveness_handler(State(state): State<HealthState>) -> HealthResult {
    state.checker.liveness()
}

async fn readiness_handler(State(state): State<HealthState>) -> HealthResult {
    state.checker.readiness().await
}

/// `GET /health`, `GET /health/live` and `GET /health/ready`.
///
/// Readiness answers 503 while any check is unhealthy.
pub fn health_router(app_info: AppInfo, checker: Arc<HealthChecker>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/health/live", get(liveness_handler))
        .route("/health/ready", get(readiness_handler))
        .with_state(HealthState {
            app: app_info,
            checker,
        })
}
