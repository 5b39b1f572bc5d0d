//! # Axum Helpers
//!
//! Shared HTTP plumbing for the users service.
//!
//! - **[`server`]**: router assembly, health probes, graceful shutdown
//! - **[`errors`]**: structured error responses with error codes
//! - **[`extractors`]**: UUID path and validated JSON extractors

pub mod errors;
pub mod extractors;
pub mod server;

pub use server::{
    HealthChecker, HealthResult, ShutdownCoordinator, create_production_app, create_router,
    health_router, serve_until_shutdown, shutdown_signal,
};

pub use errors::{AppError, ErrorCode, ErrorResponse};

pub use extractors::{UuidPath, ValidatedJson};

pub use errors::responses::{
    BadRequestResponse, BadRequestUuidResponse, BadRequestValidationResponse, ConflictResponse,
    InternalServerErrorResponse, NotFoundResponse, ServiceUnavailableResponse,
};
