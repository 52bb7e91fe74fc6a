//! Taxonomy HTTP handlers.
//!
//! ```text
//! GET /api/categories
//! GET /api/categories/statuses
//! POST /api/categories {"name":"Docs"}
//! ```
//!
//! The statuses list lives under the categories scope because the original
//! API shipped it there and clients depend on the path.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Category, CategoryName, Status};

use super::auth::BearerUser;
use super::error::{ApiResult, ErrorBody};
use super::state::HttpState;
use super::validation::validation_error;

/// A feedback category.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    /// Stable identifier.
    pub id: i32,
    /// Unique name.
    pub name: String,
}

impl From<Category> for CategoryResponse {
    fn from(value: Category) -> Self {
        Self {
            id: value.id.get(),
            name: value.name,
        }
    }
}

/// A workflow status.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    /// Stable identifier.
    pub id: i32,
    /// Unique name.
    pub name: String,
}

impl From<Status> for StatusResponse {
    fn from(value: Status) -> Self {
        Self {
            id: value.id.get(),
            name: value.name,
        }
    }
}

/// Category creation request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    /// Unique category name.
    pub name: String,
}

/// List all categories in id order.
#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "Categories", body = [CategoryResponse]),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tags = ["categories"],
    operation_id = "listCategories",
    security([])
)]
#[get("/categories")]
pub async fn list_categories(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<CategoryResponse>>> {
    let categories = state.taxonomy.categories().await?;
    Ok(web::Json(
        categories.into_iter().map(CategoryResponse::from).collect(),
    ))
}

/// List all statuses in id order.
#[utoipa::path(
    get,
    path = "/api/categories/statuses",
    responses(
        (status = 200, description = "Statuses", body = [StatusResponse]),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tags = ["categories"],
    operation_id = "listStatuses",
    security([])
)]
#[get("/categories/statuses")]
pub async fn list_statuses(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<StatusResponse>>> {
    let statuses = state.taxonomy.statuses().await?;
    Ok(web::Json(
        statuses.into_iter().map(StatusResponse::from).collect(),
    ))
}

/// Create a category with a unique name.
#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 401, description = "Unauthorised", body = ErrorBody),
        (status = 409, description = "Name already exists", body = ErrorBody)
    ),
    tags = ["categories"],
    operation_id = "createCategory"
)]
#[post("/categories")]
pub async fn create_category(
    state: web::Data<HttpState>,
    _user: BearerUser,
    payload: web::Json<CreateCategoryRequest>,
) -> ApiResult<HttpResponse> {
    let name = CategoryName::new(payload.into_inner().name).map_err(validation_error)?;
    let category = state.taxonomy.create_category(name).await?;
    Ok(HttpResponse::Created().json(CategoryResponse::from(category)))
}
