use axum_helpers::{HealthChecker, create_production_app, create_router, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use database::postgres::{DatabaseConnection, check_health};
use domain_users::{InMemoryUserRepository, PgUserRepository};
use std::sync::Arc;
use tracing::{error, info, warn};

mod api;
mod config;
mod openapi;

use config::Config;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    let config = Config::from_env()?;

    init_tracing(&config.environment);

    let mut checker = HealthChecker::with_timeout(config.health_check_timeout);

    let (api_routes, db): (_, Option<DatabaseConnection>) = match config.database.clone() {
        Some(database) => {
            let db = database::postgres::connect_from_config_with_retry(database, None)
                .await
                .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))?;

            let probe = db.clone();
            checker.add_check("database", move || {
                let db = probe.clone();
                async move { check_health(&db).await.map_err(|e| e.to_string()) }
            });

            let routes = api::routes(PgUserRepository::new(db.clone()), &config);
            (routes, Some(db))
        }
        None => {
            warn!("Using the in-memory user store; users are lost on restart");
            (api::routes(InMemoryUserRepository::new(), &config), None)
        }
    };

    let router = create_router::<openapi::ApiDoc>(api_routes);

    // - /health: app name/version
    // - /health/live: process is up
    // - /health/ready: runs the registered dependency checks
    let app = router.merge(health_router(config.app, Arc::new(checker)));

    info!(
        store = ?config.store,
        shutdown_timeout = ?config.server.shutdown_timeout,
        "Starting users API"
    );

    create_production_app(
        app,
        &config.server,
        config.server.shutdown_timeout,
        async move {
            if let Some(db) = db {
                info!("Shutting down: closing database connections");
                if let Err(e) = database::postgres::close(db).await {
                    error!("Error closing PostgreSQL: {}", e);
                }
            }
        },
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Users API shutdown complete");
    Ok(())
}
