//! Feedback board HTTP handlers.
//!
//! ```text
//! GET /api/feedback?page&limit&categoryId&statusId&sortBy
//! POST /api/feedback
//! PUT /api/feedback/{id}
//! DELETE /api/feedback/{id}
//! POST /api/feedback/{post_id}/vote
//! ```
//!
//! The list endpoint accepts an optional bearer token: authenticated
//! callers get their per-post vote flag, anonymous callers always see
//! `hasVoted: false`.

use actix_web::{HttpResponse, delete, get, post, put, web};
use pagination::{PageRequest, Pagination};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    AuthorSummary, CategoryId, FeedbackItem, FeedbackListQuery, ListFilter,
    PostDescription, PostDraft, PostId, PostTitle, SortKey, StatusId,
};

use super::auth::{BearerUser, MaybeBearerUser};
use super::categories::{CategoryResponse, StatusResponse};
use super::error::{ApiResult, ErrorBody};
use super::state::HttpState;
use super::validation::validation_error;

/// Query parameters accepted by the list endpoint.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListFeedbackParams {
    /// 1-based page number; defaults to 1.
    pub page: Option<u32>,
    /// Page size; defaults to 10.
    pub limit: Option<u32>,
    /// Restrict to one category.
    pub category_id: Option<i32>,
    /// Restrict to one status.
    pub status_id: Option<i32>,
    /// `createdAt` (default) or `votes`.
    pub sort_by: Option<String>,
}

/// Post creation / full-replace request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    /// Short summary line.
    pub title: String,
    /// Full description body.
    pub description: String,
    /// Classifying category id.
    pub category_id: i32,
    /// Workflow status id.
    pub status_id: i32,
}

/// Author details embedded in a feedback item.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthorResponse {
    /// Author's user id.
    pub id: i32,
    /// Author's email.
    pub email: String,
    /// Author's display name, when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Author's avatar reference, when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl From<AuthorSummary> for AuthorResponse {
    fn from(value: AuthorSummary) -> Self {
        Self {
            id: value.id.get(),
            email: value.email.into(),
            display_name: value.display_name.map(String::from),
            avatar: value.avatar,
        }
    }
}

/// A fully hydrated feedback item.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackItemResponse {
    /// Stable post identifier.
    pub id: i32,
    /// Short summary line.
    pub title: String,
    /// Full description body.
    pub description: String,
    /// Author details.
    pub author: AuthorResponse,
    /// Resolved category.
    pub category: CategoryResponse,
    /// Resolved status.
    pub status: StatusResponse,
    /// Record creation timestamp, RFC 3339.
    pub created_at: String,
    /// Last modification timestamp, RFC 3339.
    pub updated_at: String,
    /// Current vote count.
    pub votes: u64,
    /// Whether the requesting user has voted; always `false` for
    /// anonymous callers.
    pub has_voted: bool,
}

impl From<FeedbackItem> for FeedbackItemResponse {
    fn from(value: FeedbackItem) -> Self {
        let FeedbackItem { entry, has_voted } = value;
        Self {
            id: entry.post.id.get(),
            title: entry.post.title.into(),
            description: entry.post.description.into(),
            author: AuthorResponse::from(entry.author),
            category: CategoryResponse::from(entry.category),
            status: StatusResponse::from(entry.status),
            created_at: entry.post.created_at.to_rfc3339(),
            updated_at: entry.post.updated_at.to_rfc3339(),
            votes: entry.vote_count,
            has_voted,
        }
    }
}

/// Pagination envelope accompanying the list response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    /// Total matching posts.
    pub total: u64,
    /// Page count at the requested size.
    pub pages: u64,
    /// The 1-based page returned.
    pub current_page: u32,
}

impl From<Pagination> for PaginationMeta {
    fn from(value: Pagination) -> Self {
        Self {
            total: value.total,
            pages: value.pages,
            current_page: value.current_page,
        }
    }
}

/// One page of the feedback list.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackListResponse {
    /// The page of posts in requested order.
    pub posts: Vec<FeedbackItemResponse>,
    /// Totals for the filtered result set.
    pub pagination: PaginationMeta,
}

/// Result of a vote toggle.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoteResponse {
    /// Whether the caller's vote exists after the toggle.
    pub voted: bool,
}

fn parse_list_params(params: ListFeedbackParams) -> Result<FeedbackListQuery, crate::domain::Error> {
    let page = PageRequest::from_raw(params.page, params.limit).map_err(validation_error)?;
    let sort = params
        .sort_by
        .map(|raw| raw.parse::<SortKey>())
        .transpose()
        .map_err(validation_error)?
        .unwrap_or_default();
    Ok(FeedbackListQuery {
        filter: ListFilter {
            category_id: params.category_id.map(CategoryId::new),
            status_id: params.status_id.map(StatusId::new),
        },
        sort,
        page,
    })
}

fn parse_draft(payload: FeedbackRequest) -> Result<PostDraft, crate::domain::Error> {
    let title = PostTitle::new(payload.title).map_err(validation_error)?;
    let description =
        PostDescription::new(payload.description).map_err(validation_error)?;
    Ok(PostDraft {
        title,
        description,
        category_id: CategoryId::new(payload.category_id),
        status_id: StatusId::new(payload.status_id),
    })
}

/// List feedback, filtered, sorted and paginated.
#[utoipa::path(
    get,
    path = "/api/feedback",
    params(ListFeedbackParams),
    responses(
        (status = 200, description = "One page of feedback", body = FeedbackListResponse),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 401, description = "Invalid bearer token", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tags = ["feedback"],
    operation_id = "listFeedback",
    security((), ("BearerToken" = []))
)]
#[get("/feedback")]
pub async fn list_feedback(
    state: web::Data<HttpState>,
    viewer: MaybeBearerUser,
    params: web::Query<ListFeedbackParams>,
) -> ApiResult<web::Json<FeedbackListResponse>> {
    let query = parse_list_params(params.into_inner())?;
    let requester = viewer.0.map(|claims| claims.user_id);
    let page = state.feedback.list(query, requester).await?;

    Ok(web::Json(FeedbackListResponse {
        posts: page
            .items
            .into_iter()
            .map(FeedbackItemResponse::from)
            .collect(),
        pagination: PaginationMeta::from(page.pagination),
    }))
}

/// Create a feedback post owned by the caller.
#[utoipa::path(
    post,
    path = "/api/feedback",
    request_body = FeedbackRequest,
    responses(
        (status = 201, description = "Feedback created", body = FeedbackItemResponse),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 401, description = "Unauthorised", body = ErrorBody)
    ),
    tags = ["feedback"],
    operation_id = "createFeedback"
)]
#[post("/feedback")]
pub async fn create_feedback(
    state: web::Data<HttpState>,
    user: BearerUser,
    payload: web::Json<FeedbackRequest>,
) -> ApiResult<HttpResponse> {
    let draft = parse_draft(payload.into_inner())?;
    let item = state.feedback.create(user.0.user_id, draft).await?;
    Ok(HttpResponse::Created().json(FeedbackItemResponse::from(item)))
}

/// Fully replace a post's content; author only.
#[utoipa::path(
    put,
    path = "/api/feedback/{id}",
    params(("id" = i32, Path, description = "Post identifier")),
    request_body = FeedbackRequest,
    responses(
        (status = 200, description = "Feedback updated", body = FeedbackItemResponse),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 401, description = "Unauthorised", body = ErrorBody),
        (status = 403, description = "Not the author", body = ErrorBody),
        (status = 404, description = "Unknown post", body = ErrorBody)
    ),
    tags = ["feedback"],
    operation_id = "updateFeedback"
)]
#[put("/feedback/{id}")]
pub async fn update_feedback(
    state: web::Data<HttpState>,
    user: BearerUser,
    path: web::Path<i32>,
    payload: web::Json<FeedbackRequest>,
) -> ApiResult<web::Json<FeedbackItemResponse>> {
    let post_id = PostId::new(path.into_inner());
    let draft = parse_draft(payload.into_inner())?;
    let item = state
        .feedback
        .update(user.0.user_id, post_id, draft)
        .await?;
    Ok(web::Json(FeedbackItemResponse::from(item)))
}

/// Delete a post; author only.
#[utoipa::path(
    delete,
    path = "/api/feedback/{id}",
    params(("id" = i32, Path, description = "Post identifier")),
    responses(
        (status = 204, description = "Feedback deleted"),
        (status = 401, description = "Unauthorised", body = ErrorBody),
        (status = 403, description = "Not the author", body = ErrorBody),
        (status = 404, description = "Unknown post", body = ErrorBody)
    ),
    tags = ["feedback"],
    operation_id = "deleteFeedback"
)]
#[delete("/feedback/{id}")]
pub async fn delete_feedback(
    state: web::Data<HttpState>,
    user: BearerUser,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    let post_id = PostId::new(path.into_inner());
    state.feedback.delete(user.0.user_id, post_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Toggle the caller's vote on a post.
#[utoipa::path(
    post,
    path = "/api/feedback/{post_id}/vote",
    params(("post_id" = i32, Path, description = "Post identifier")),
    responses(
        (status = 200, description = "Vote toggled", body = VoteResponse),
        (status = 401, description = "Unauthorised", body = ErrorBody),
        (status = 404, description = "Unknown post", body = ErrorBody)
    ),
    tags = ["feedback"],
    operation_id = "toggleVote"
)]
#[post("/feedback/{post_id}/vote")]
pub async fn toggle_vote(
    state: web::Data<HttpState>,
    user: BearerUser,
    path: web::Path<i32>,
) -> ApiResult<web::Json<VoteResponse>> {
    let post_id = PostId::new(path.into_inner());
    let outcome = state.feedback.toggle_vote(user.0.user_id, post_id).await?;
    Ok(web::Json(VoteResponse {
        voted: outcome.voted,
    }))
}
