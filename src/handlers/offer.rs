use crate::error::{AppError, AppResult};
use crate::handlers::post::LikeResponse;
use crate::middleware::{AuthUser, MaybeAuthUser};
use crate::response::{ApiResponse, PaginatedResponse, PaginationQuery};
use crate::services::message::thread_path;
use crate::services::notification::Notifier;
use crate::services::offer::{NewOffer, OfferService, OfferView};
use crate::services::user::UserService;
use axum::{
    extract::{Path, Query},
    http::{header, HeaderMap},
    response::IntoResponse,
    Extension, Json,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOfferRequest {
    /// Headline (1-100 characters)
    #[validate(length(min = 1, max = 100))]
    pub head: String,
    #[validate(length(min = 1, max = 5000))]
    pub content: String,
    pub image_url: Option<String>,
    /// Space separated topics
    #[serde(default)]
    #[validate(length(max = 200))]
    pub topics: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApplyResponse {
    /// Conversation with the offer's owner
    pub thread: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/offers",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Live offers, newest first", body = PaginatedResponse<OfferView>),
    ),
    tag = "offers"
)]
pub async fn list_offers(
    Extension(db): Extension<DatabaseConnection>,
    Extension(notifier): Extension<Notifier>,
    Query(params): Query<PaginationQuery>,
) -> AppResult<impl IntoResponse> {
    let (page, per_page) = params.resolve();
    let (items, total) = OfferService::new(db, notifier)
        .feed(page, per_page)
        .await?;
    Ok(ApiResponse::ok(PaginatedResponse::new(
        items, total, page, per_page,
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/offers/{id}",
    params(("id" = i32, Path, description = "Offer ID")),
    responses(
        (status = 200, description = "Offer", body = OfferView),
        (status = 303, description = "Missing, removed or blocked; Location is the offer list"),
    ),
    tag = "offers"
)]
pub async fn get_offer(
    Extension(db): Extension<DatabaseConnection>,
    Extension(notifier): Extension<Notifier>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let offer = OfferService::new(db, notifier).detail(viewer, id).await?;
    Ok(ApiResponse::ok(offer))
}

#[utoipa::path(
    post,
    path = "/api/v1/offers",
    security(("jwt_token" = [])),
    request_body = CreateOfferRequest,
    responses(
        (status = 200, description = "Offer published", body = OfferView),
        (status = 400, description = "Validation error", body = AppError),
        (status = 403, description = "Posting is disabled while you have active strikes", body = AppError),
    ),
    tag = "offers"
)]
pub async fn create_offer(
    Extension(db): Extension<DatabaseConnection>,
    Extension(notifier): Extension<Notifier>,
    auth_user: AuthUser,
    Json(payload): Json<CreateOfferRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let author = UserService::new(db.clone(), notifier.clone())
        .get_by_id(auth_user.user_id)
        .await?;
    let service = OfferService::new(db, notifier);
    let offer = service
        .create(
            &author,
            NewOffer {
                head: payload.head,
                content: payload.content,
                image_url: payload.image_url,
                topics: payload.topics,
            },
        )
        .await?
        .into_result()?;

    let view = service
        .find_view(offer.id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::ok(view))
}

#[utoipa::path(
    delete,
    path = "/api/v1/offers/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Offer ID")),
    responses(
        (status = 200, description = "Offer deleted"),
        (status = 303, description = "Not the author; Location is the offer"),
    ),
    tag = "offers"
)]
pub async fn delete_offer(
    Extension(db): Extension<DatabaseConnection>,
    Extension(notifier): Extension<Notifier>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    OfferService::new(db, notifier)
        .delete(auth_user.user_id, id)
        .await?;
    Ok(ApiResponse::with_message((), "Offer deleted"))
}

#[utoipa::path(
    post,
    path = "/api/v1/offers/{id}/like",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Offer ID")),
    responses(
        (status = 200, description = "Like state after the toggle", body = LikeResponse),
        (status = 403, description = "Suspended members cannot like", body = AppError),
    ),
    tag = "offers"
)]
pub async fn like_offer(
    Extension(db): Extension<DatabaseConnection>,
    Extension(notifier): Extension<Notifier>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let (liked, likes) = OfferService::new(db, notifier)
        .toggle_like(auth_user.user_id, id)
        .await?;
    Ok(ApiResponse::ok(LikeResponse { liked, likes }))
}

#[utoipa::path(
    post,
    path = "/api/v1/offers/{id}/apply",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Offer ID")),
    responses(
        (status = 200, description = "Offer link sent to its owner", body = ApplyResponse),
        (status = 303, description = "Offer missing or blocked; Location is the offer list"),
    ),
    tag = "offers"
)]
pub async fn apply_to_offer(
    Extension(db): Extension<DatabaseConnection>,
    Extension(notifier): Extension<Notifier>,
    auth_user: AuthUser,
    headers: HeaderMap,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let applicant = UserService::new(db.clone(), notifier.clone())
        .get_by_id(auth_user.user_id)
        .await?;
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");
    let origin = format!("http://{}", host);

    let owner = OfferService::new(db, notifier)
        .apply(&applicant, id, &origin)
        .await?;
    Ok(ApiResponse::ok(ApplyResponse {
        thread: thread_path(&owner),
    }))
}
