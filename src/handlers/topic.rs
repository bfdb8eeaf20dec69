use crate::error::AppResult;
use crate::response::ApiResponse;
use crate::services::notification::Notifier;
use crate::services::offer::{OfferService, OfferView};
use crate::services::post::{PostService, PostView};
use crate::services::topic::TopicService;
use axum::{extract::Path, response::IntoResponse, Extension};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct TopicResponse {
    pub id: i32,
    pub name: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/topics",
    responses(
        (status = 200, description = "Every topic by name", body = Vec<TopicResponse>),
    ),
    tag = "topics"
)]
pub async fn list_topics(
    Extension(db): Extension<DatabaseConnection>,
) -> AppResult<impl IntoResponse> {
    let topics = TopicService::new(db).list().await?;
    let items: Vec<TopicResponse> = topics
        .into_iter()
        .map(|t| TopicResponse {
            id: t.id,
            name: t.name,
        })
        .collect();
    Ok(ApiResponse::ok(items))
}

#[utoipa::path(
    get,
    path = "/api/v1/topics/{name}/posts",
    params(("name" = String, Path, description = "Topic name")),
    responses(
        (status = 200, description = "Live posts with this topic", body = Vec<PostView>),
        (status = 303, description = "Unknown topic; Location is the feed"),
    ),
    tag = "topics"
)]
pub async fn topic_posts(
    Extension(db): Extension<DatabaseConnection>,
    Extension(notifier): Extension<Notifier>,
    Path(name): Path<String>,
) -> AppResult<impl IntoResponse> {
    let posts = PostService::new(db, notifier).by_topic(&name).await?;
    Ok(ApiResponse::ok(posts))
}

#[utoipa::path(
    get,
    path = "/api/v1/topics/{name}/offers",
    params(("name" = String, Path, description = "Topic name")),
    responses(
        (status = 200, description = "Live offers with this topic", body = Vec<OfferView>),
        (status = 303, description = "Unknown topic; Location is the offer list"),
    ),
    tag = "topics"
)]
pub async fn topic_offers(
    Extension(db): Extension<DatabaseConnection>,
    Extension(notifier): Extension<Notifier>,
    Path(name): Path<String>,
) -> AppResult<impl IntoResponse> {
    let offers = OfferService::new(db, notifier).by_topic(&name).await?;
    Ok(ApiResponse::ok(offers))
}
