//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{activity_handler, auth_handler, user_handler};
use crate::domain::{Scope, UpdateUser, UserResponse};
use crate::services::{TokenResponse, WeekStats};

/// OpenAPI documentation for the jogtrack API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "jogtrack",
        version = "0.1.0",
        description = "Jogging tracker API with scope-based access control and weekly reports"
    ),
    paths(
        // Authentication endpoints
        auth_handler::login,
        auth_handler::me,
        auth_handler::logout,
        // User endpoints
        user_handler::register,
        user_handler::list_users,
        user_handler::update_user,
        user_handler::update_scopes,
        user_handler::expire_user,
        // Activity-record endpoints
        activity_handler::create_result,
        activity_handler::list_results,
        activity_handler::get_result,
        activity_handler::update_result,
        activity_handler::delete_result,
        activity_handler::weekly_report,
    ),
    components(
        schemas(
            // Domain types
            Scope,
            UserResponse,
            UpdateUser,
            // Auth types
            auth_handler::LoginRequest,
            auth_handler::LogoutRequest,
            auth_handler::MeResponse,
            TokenResponse,
            // User handler types
            user_handler::RegisterRequest,
            user_handler::UpdateScopesRequest,
            // Activity handler types
            activity_handler::CreateResultRequest,
            activity_handler::UpdateResultRequest,
            activity_handler::CreateResultResponse,
            activity_handler::ActivityResponse,
            // Report types
            WeekStats,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Login, logout and current-user lookup"),
        (name = "Users", description = "Registration and account management"),
        (name = "Results", description = "Activity records and weekly reports")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT token obtained from POST /auth"))
                        .build(),
                ),
            );
        }
    }
}
