//! User management handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::Json,
    routing::{get, patch, post},
    Extension, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::auth_middleware;
use crate::api::AppState;
use crate::domain::{Scope, ScopeSet, UpdateUser, User, UserResponse};
use crate::errors::AppResult;
use crate::services::Registration;
use crate::types::{NoContent, PageParams};

/// User registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// Login name, unique among active accounts
    #[validate(length(min = 1, message = "invalid payload (username must not be empty)"))]
    #[schema(example = "runner42")]
    pub username: String,
    /// Password (strength policy applies)
    #[validate(length(min = 1, message = "invalid payload (password must not be empty)"))]
    #[schema(example = "testing123G")]
    pub password: String,
    /// Email address
    #[schema(example = "runner@example.com")]
    pub email: Option<String>,
    /// Display name
    #[schema(example = "Jane Doe")]
    pub name: Option<String>,
}

/// Scope replacement request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateScopesRequest {
    /// Full replacement scope set
    pub scopes: Vec<Scope>,
}

/// Create user routes.
///
/// Everything except registration requires an authenticated actor;
/// registration is registered after the layer so it stays public.
pub fn user_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/:id", patch(update_user).delete(expire_user))
        .route("/:id/scopes", patch(update_scopes))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
        .route("/", post(register))
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = UserResponse),
        (status = 400, description = "Invalid payload or weak password"),
        (status = 409, description = "Username already exists")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let user = state
        .auth_service
        .register(Registration {
            username: payload.username,
            password: payload.password,
            email: payload.email,
            name: payload.name,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// List user accounts
#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(PageParams),
    responses(
        (status = 200, description = "Accounts visible to the actor", body = [UserResponse]),
        (status = 400, description = "Invalid paging"),
        (status = 403, description = "Actor is not a manager or admin")
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    Extension(actor): Extension<User>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<Vec<UserResponse>>> {
    let users = state.user_service.list_users(&actor, &params).await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Update a user's details
#[utoipa::path(
    patch,
    path = "/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = UpdateUser,
    responses(
        (status = 204, description = "User updated"),
        (status = 400, description = "Invalid payload, weak password or missing target"),
        (status = 403, description = "Hierarchy rules deny the update")
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    Extension(actor): Extension<User>,
    Path(id): Path<Uuid>,
    ValidatedJson(changes): ValidatedJson<UpdateUser>,
) -> AppResult<NoContent> {
    state.user_service.update_user(&actor, id, changes).await?;
    Ok(NoContent)
}

/// Replace a user's scopes
#[utoipa::path(
    patch,
    path = "/users/{id}/scopes",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = UpdateScopesRequest,
    responses(
        (status = 204, description = "Scopes replaced"),
        (status = 400, description = "Invalid payload or missing target"),
        (status = 403, description = "Hierarchy rules deny the update")
    )
)]
pub async fn update_scopes(
    State(state): State<AppState>,
    Extension(actor): Extension<User>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateScopesRequest>,
) -> AppResult<NoContent> {
    let scopes: ScopeSet = payload.scopes.into_iter().collect();
    state.user_service.update_scopes(&actor, id, scopes).await?;
    Ok(NoContent)
}

/// Expire (soft-delete) a user
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "User expired"),
        (status = 400, description = "Missing target"),
        (status = 403, description = "Hierarchy rules deny the expiry")
    )
)]
pub async fn expire_user(
    State(state): State<AppState>,
    Extension(actor): Extension<User>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    state.user_service.expire_user(&actor, id).await?;
    Ok(NoContent)
}
