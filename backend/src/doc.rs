//! OpenAPI documentation configuration.
//!
//! Defines [`ApiDoc`], the generated OpenAPI specification for the REST
//! surface: every endpoint from the inbound layer, the request/response
//! schemas, and the bearer-token security scheme. Swagger UI serves the
//! document in debug builds.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::categories::{
    CategoryResponse, CreateCategoryRequest, StatusResponse,
};
use crate::inbound::http::error::ErrorBody;
use crate::inbound::http::feedback::{
    AuthorResponse, FeedbackItemResponse, FeedbackListResponse, FeedbackRequest,
    PaginationMeta, VoteResponse,
};
use crate::inbound::http::users::{
    AuthResponse, LoginRequest, RegisterRequest, UpdateProfileRequest, UserResponse,
};

/// Enrich the generated document with the bearer-token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some(
                        "Signed token issued at registration or login; expires after 24 hours.",
                    ))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
///
/// Swagger UI is enabled in debug builds only.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Feedback board API",
        description = "HTTP interface for feedback posts, voting, accounts and taxonomy."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::get_profile,
        crate::inbound::http::users::update_profile,
        crate::inbound::http::users::delete_account,
        crate::inbound::http::feedback::list_feedback,
        crate::inbound::http::feedback::create_feedback,
        crate::inbound::http::feedback::update_feedback,
        crate::inbound::http::feedback::delete_feedback,
        crate::inbound::http::feedback::toggle_vote,
        crate::inbound::http::categories::list_categories,
        crate::inbound::http::categories::list_statuses,
        crate::inbound::http::categories::create_category,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorBody,
        RegisterRequest,
        LoginRequest,
        UpdateProfileRequest,
        UserResponse,
        AuthResponse,
        FeedbackRequest,
        AuthorResponse,
        FeedbackItemResponse,
        FeedbackListResponse,
        PaginationMeta,
        VoteResponse,
        CategoryResponse,
        StatusResponse,
        CreateCategoryRequest,
    )),
    tags(
        (name = "users", description = "Account registration, login and profile"),
        (name = "feedback", description = "Feedback posts and voting"),
        (name = "categories", description = "Category and status reference data"),
        (name = "health", description = "Probes for orchestration")
    )
)]
pub struct ApiDoc;
