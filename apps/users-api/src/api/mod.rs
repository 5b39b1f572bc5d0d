use axum::Router;
use domain_users::{UserRepository, UserService, handlers};

use crate::config::Config;

/// Creates the API routes without the `/api` prefix.
/// The `/api` prefix will be added by the `create_router` helper.
pub fn routes<R: UserRepository + 'static>(repository: R, config: &Config) -> Router {
    let service = UserService::with_store_timeout(repository, config.store_timeout);

    Router::new().nest(
        "/users",
        handlers::router_with_max_page_size(service, config.max_page_size),
    )
}
