//! Server infrastructure: router assembly, health probes, graceful shutdown.
//!
//! ```ignore
//! use axum_helpers::server::{create_production_app, create_router, health_router, HealthChecker};
//! use core_config::{app_info, server::ServerConfig};
//!
//! let router = create_router::<ApiDoc>(api_routes)
//!     .merge(health_router(app_info!(), Arc::new(HealthChecker::new())));
//!
//! let config = ServerConfig::default();
//! create_production_app(router, &config, config.shutdown_timeout, async {}).await?;
//! ```

pub mod app;
pub mod health;
pub mod shutdown;

pub use app::{create_production_app, create_router, serve_until_shutdown};
pub use health::{
    CheckResult, HealthCheckFuture, HealthChecker, HealthResponse, HealthResult, HealthStatus,
    health_router,
};
pub use shutdown::{ShutdownCoordinator, shutdown_signal};
