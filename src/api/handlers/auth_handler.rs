//! Authentication handlers.

use axum::{
    extract::State,
    middleware,
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::auth_middleware;
use crate::api::AppState;
use crate::domain::{User, UserResponse};
use crate::errors::AppResult;
use crate::services::TokenResponse;
use crate::types::NoContent;

/// Login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// Login name
    #[validate(length(min = 1, message = "username is required"))]
    #[schema(example = "runner42")]
    pub username: String,
    /// Account password
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Logout request carrying the refresh token to drop
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LogoutRequest {
    pub refresh_token: String,
}

/// Envelope for the current-user endpoint
#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    pub me: UserResponse,
}

/// Create authentication routes.
///
/// `/me` and `/logout` sit behind the auth middleware; login itself is
/// registered after the layer so it stays public.
pub fn auth_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/me", get(me))
        .route("/logout", post(logout))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
        .route("/", post(login))
}

/// Login and get a token pair
#[utoipa::path(
    post,
    path = "/auth",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let tokens = state
        .auth_service
        .login(&payload.username, &payload.password)
        .await?;

    Ok(Json(tokens))
}

/// Get the authenticated actor's own profile
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = MeResponse),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn me(Extension(actor): Extension<User>) -> Json<MeResponse> {
    Json(MeResponse {
        me: UserResponse::from(actor),
    })
}

/// Drop the cached refresh token
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    request_body = LogoutRequest,
    responses(
        (status = 204, description = "Refresh token dropped"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    Extension(actor): Extension<User>,
    ValidatedJson(payload): ValidatedJson<LogoutRequest>,
) -> AppResult<NoContent> {
    state
        .auth_service
        .logout(actor.id, &payload.refresh_token)
        .await?;

    Ok(NoContent)
}
