use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::response::ApiResponse;
use crate::services::notification::Notifier;
use crate::services::upload::{UploadConfig, UploadKind, UploadService};
use crate::services::user::{ProfileUpdate, UserService};
use axum::{
    body::Bytes,
    extract::{Multipart, Query},
    response::IntoResponse,
    Extension,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct ImageTarget {
    /// `post` or `offer`
    pub target: Option<String>,
}

/// First field of a multipart body with its declared content type.
pub(crate) async fn read_file(multipart: &mut Multipart) -> AppResult<(Bytes, String)> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read upload: {}", e)))?
        .ok_or_else(|| AppError::Validation("No file provided".to_string()))?;

    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();

    let data = field
        .bytes()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read file data: {}", e)))?;

    Ok((data, content_type))
}

/// Upload and set the caller's avatar.
/// POST /upload/avatar (multipart form: field "file")
pub async fn upload_avatar(
    Extension(db): Extension<DatabaseConnection>,
    Extension(notifier): Extension<Notifier>,
    Extension(config): Extension<UploadConfig>,
    auth_user: AuthUser,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let (data, content_type) = read_file(&mut multipart).await?;
    let url = UploadService::save_file(
        &config,
        &data,
        &content_type,
        UploadKind::Avatar,
        &[auth_user.user_id],
    )
    .await?;

    UserService::new(db, notifier)
        .update_profile(
            auth_user.user_id,
            ProfileUpdate {
                avatar_url: Some(url.clone()),
                ..Default::default()
            },
        )
        .await?;

    Ok(ApiResponse::ok(UploadResponse { url }))
}

/// Upload and set the caller's CV (PDF only).
/// POST /upload/cv (multipart form: field "file")
pub async fn upload_cv(
    Extension(db): Extension<DatabaseConnection>,
    Extension(notifier): Extension<Notifier>,
    Extension(config): Extension<UploadConfig>,
    auth_user: AuthUser,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let (data, content_type) = read_file(&mut multipart).await?;
    let url = UploadService::save_file(
        &config,
        &data,
        &content_type,
        UploadKind::Cv,
        &[auth_user.user_id],
    )
    .await?;

    UserService::new(db, notifier)
        .update_profile(
            auth_user.user_id,
            ProfileUpdate {
                cv_url: Some(url.clone()),
                ..Default::default()
            },
        )
        .await?;

    Ok(ApiResponse::ok(UploadResponse { url }))
}

/// Upload an image to attach to a post or offer.
/// POST /upload/image?target=post|offer (multipart form: field "file")
pub async fn upload_image(
    Extension(config): Extension<UploadConfig>,
    auth_user: AuthUser,
    Query(query): Query<ImageTarget>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let kind = match query.target.as_deref() {
        None | Some("post") => UploadKind::PostImage,
        Some("offer") => UploadKind::OfferImage,
        Some(other) => {
            return Err(AppError::Validation(format!(
                "Unknown upload target: {}",
                other
            )))
        }
    };

    let (data, content_type) = read_file(&mut multipart).await?;
    let url =
        UploadService::save_file(&config, &data, &content_type, kind, &[auth_user.user_id])
            .await?;

    Ok(ApiResponse::ok(UploadResponse { url }))
}
