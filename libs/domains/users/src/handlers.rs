use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    AppError, BadRequestResponse, BadRequestUuidResponse, BadRequestValidationResponse,
    ConflictResponse, InternalServerErrorResponse, NotFoundResponse, ServiceUnavailableResponse,
    UuidPath, ValidatedJson,
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::UserResult;
use crate::models::{
    CreateUserRequest, DEFAULT_MAX_PAGE_SIZE, ListUsersQuery, ListUsersResponse,
    UpdateUserRequest, UserResponse,
};
use crate::repository::UserRepository;
use crate::service::UserService;

pub const TAG: &str = "users";

/// OpenAPI documentation for Users API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_users,
        create_user,
        get_user,
        get_user_by_email,
        update_user,
        delete_user,
    ),
    components(
        schemas(UserResponse, CreateUserRequest, UpdateUserRequest, ListUsersResponse),
        responses(
            NotFoundResponse,
            BadRequestResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            ConflictResponse,
            InternalServerErrorResponse,
            ServiceUnavailableResponse
        )
    ),
    tags(
        (name = TAG, description = "User management endpoints")
    )
)]
pub struct ApiDoc;

struct UsersState<R: UserRepository> {
    service: UserService<R>,
    max_page_size: u64,
}

/// Create the users router with all HTTP endpoints
pub fn router<R: UserRepository + 'static>(service: UserService<R>) -> Router {
    router_with_max_page_size(service, DEFAULT_MAX_PAGE_SIZE)
}

/// Like [`router`], rejecting list requests whose `limit` exceeds `max_page_size`.
pub fn router_with_max_page_size<R: UserRepository + 'static>(
    service: UserService<R>,
    max_page_size: u64,
) -> Router {
    let state = Arc::new(UsersState {
        service,
        max_page_size,
    });

    Router::new()
        .route("/", get(list_users).post(create_user))
        .route(
            "/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/email/{email}", get(get_user_by_email))
        .with_state(state)
}

/// List users, newest first
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Page of users", body = ListUsersResponse),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn list_users<R: UserRepository>(
    State(state): State<Arc<UsersState<R>>>,
    query: Result<Query<ListUsersQuery>, QueryRejection>,
) -> Result<Json<ListUsersResponse>, AppError> {
    let query = query.map(|Query(query)| query).unwrap_or_default();
    let page = query.page(state.max_page_size).map_err(|_| {
        AppError::BadRequest(format!("limit cannot exceed {}", state.max_page_size))
    })?;

    let users = state.service.list_users(page.limit, page.offset).await?;

    Ok(Json(ListUsersResponse {
        users: users.into_iter().map(UserResponse::from).collect(),
        limit: page.limit,
        offset: page.offset,
    }))
}

/// Create a new user
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created successfully", body = UserResponse),
        (status = 400, response = BadRequestResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn create_user<R: UserRepository>(
    State(state): State<Arc<UsersState<R>>>,
    ValidatedJson(input): ValidatedJson<CreateUserRequest>,
) -> UserResult<impl IntoResponse> {
    let user = state.service.create_user(&input.email, &input.name).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_user<R: UserRepository>(
    State(state): State<Arc<UsersState<R>>>,
    UuidPath(id): UuidPath,
) -> UserResult<Json<UserResponse>> {
    let user = state.service.get_user(id).await?;
    Ok(Json(user.into()))
}

/// Get a user by email address
#[utoipa::path(
    get,
    path = "/email/{email}",
    tag = TAG,
    params(
        ("email" = String, Path, description = "User email address")
    ),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_user_by_email<R: UserRepository>(
    State(state): State<Arc<UsersState<R>>>,
    Path(email): Path<String>,
) -> UserResult<Json<UserResponse>> {
    let user = state.service.get_user_by_email(&email).await?;
    Ok(Json(user.into()))
}

/// Rename a user
#[utoipa::path(
    put,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated successfully", body = UserResponse),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_user<R: UserRepository>(
    State(state): State<Arc<UsersState<R>>>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateUserRequest>,
) -> UserResult<Json<UserResponse>> {
    let user = state.service.update_user(id, &input.name).await?;
    Ok(Json(user.into()))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User deleted successfully"),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_user<R: UserRepository>(
    State(state): State<Arc<UsersState<R>>>,
    UuidPath(id): UuidPath,
) -> UserResult<StatusCode> {
    state.service.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
