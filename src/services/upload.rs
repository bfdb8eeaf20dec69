use crate::error::{AppError, AppResult};
use std::path::Path;
use tokio::fs;
use uuid::Uuid;

#[derive(Clone)]
pub struct UploadConfig {
    pub upload_dir: String,
}

const MAX_FILE_SIZE: usize = 5 * 1024 * 1024; // 5 MB
const IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];
const DOCUMENT_TYPES: &[&str] = &["application/pdf"];

/// What an upload is attached to. Decides the folder, the file name prefix
/// and which content types are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Avatar,
    Cv,
    PostImage,
    OfferImage,
    MessageImage,
}

impl UploadKind {
    fn subdirectory(self) -> &'static str {
        match self {
            UploadKind::Avatar => "avatars",
            UploadKind::Cv => "cvs",
            UploadKind::PostImage => "posts",
            UploadKind::OfferImage => "offers",
            UploadKind::MessageImage => "messages",
        }
    }

    fn entity(self) -> &'static str {
        match self {
            UploadKind::Avatar => "profile",
            UploadKind::Cv => "cv",
            UploadKind::PostImage => "post",
            UploadKind::OfferImage => "offer",
            UploadKind::MessageImage => "message",
        }
    }

    fn allowed_types(self) -> &'static [&'static str] {
        match self {
            UploadKind::Cv => DOCUMENT_TYPES,
            _ => IMAGE_TYPES,
        }
    }
}

/// Validate file magic bytes match the declared content type.
fn validate_magic_bytes(data: &[u8], content_type: &str) -> bool {
    match content_type {
        "image/jpeg" => data.len() >= 3 && data[..3] == [0xFF, 0xD8, 0xFF],
        "image/png" => data.len() >= 4 && data[..4] == [0x89, 0x50, 0x4E, 0x47],
        "image/gif" => data.len() >= 4 && data[..4] == [0x47, 0x49, 0x46, 0x38],
        "image/webp" => {
            data.len() >= 12
                && data[..4] == [0x52, 0x49, 0x46, 0x46]
                && data[8..12] == [0x57, 0x45, 0x42, 0x50]
        }
        "application/pdf" => data.starts_with(b"%PDF"),
        _ => false,
    }
}

fn extension(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "application/pdf" => Some("pdf"),
        _ => None,
    }
}

/// `<entity>_<owner ids joined by '_'>_<uuid>.<ext>`
fn stored_name(kind: UploadKind, owners: &[i32], id: Uuid, ext: &str) -> String {
    let owners = owners
        .iter()
        .map(|o| o.to_string())
        .collect::<Vec<_>>()
        .join("_");
    format!("{}_{}_{}.{}", kind.entity(), owners, id, ext)
}

pub struct UploadService;

impl UploadService {
    /// Save an uploaded file to disk.
    /// Returns the public URL path (e.g., `/uploads/avatars/profile_7_<uuid>.jpg`).
    pub async fn save_file(
        config: &UploadConfig,
        data: &[u8],
        content_type: &str,
        kind: UploadKind,
        owners: &[i32],
    ) -> AppResult<String> {
        if data.len() > MAX_FILE_SIZE {
            return Err(AppError::PayloadTooLarge);
        }

        if !kind.allowed_types().contains(&content_type) {
            return Err(AppError::Validation(format!(
                "Unsupported file type: {}. Allowed: {}",
                content_type,
                kind.allowed_types().join(", ")
            )));
        }

        if !validate_magic_bytes(data, content_type) {
            return Err(AppError::Validation(
                "File content does not match declared content type".to_string(),
            ));
        }

        let ext = extension(content_type)
            .ok_or_else(|| AppError::Validation("Unsupported file type".to_string()))?;
        let filename = stored_name(kind, owners, Uuid::new_v4(), ext);
        let dir = Path::new(&config.upload_dir).join(kind.subdirectory());

        fs::create_dir_all(&dir).await.map_err(|e| {
            AppError::Internal(anyhow::anyhow!("Failed to create upload directory: {}", e))
        })?;

        fs::write(dir.join(&filename), data)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to write file: {}", e)))?;

        tracing::debug!(?kind, file = %filename, "upload stored");
        Ok(format!("/uploads/{}/{}", kind.subdirectory(), filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jpeg_magic_bytes_valid() {
        let data = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        assert!(validate_magic_bytes(&data, "image/jpeg"));
    }

    #[test]
    fn webp_magic_bytes_valid() {
        let data = [
            0x52, 0x49, 0x46, 0x46, // RIFF
            0x00, 0x00, 0x00, 0x00, // size
            0x57, 0x45, 0x42, 0x50, // WEBP
        ];
        assert!(validate_magic_bytes(&data, "image/webp"));
    }

    #[test]
    fn pdf_magic_bytes_valid() {
        assert!(validate_magic_bytes(b"%PDF-1.7\n", "application/pdf"));
        assert!(!validate_magic_bytes(b"<html>", "application/pdf"));
    }

    #[test]
    fn wrong_magic_bytes_rejected() {
        let png_data = [0x89, 0x50, 0x4E, 0x47];
        assert!(!validate_magic_bytes(&png_data, "image/jpeg"));
        assert!(!validate_magic_bytes(&[], "image/png"));
    }

    #[test]
    fn cv_accepts_only_pdf() {
        assert!(UploadKind::Cv.allowed_types().contains(&"application/pdf"));
        assert!(!UploadKind::Cv.allowed_types().contains(&"image/png"));
        assert!(!UploadKind::Avatar.allowed_types().contains(&"application/pdf"));
    }

    #[test]
    fn stored_name_lists_every_owner() {
        let id = Uuid::nil();
        assert_eq!(
            stored_name(UploadKind::MessageImage, &[3, 9], id, "png"),
            format!("message_3_9_{}.png", id)
        );
        assert_eq!(
            stored_name(UploadKind::Avatar, &[4], id, "jpg"),
            format!("profile_4_{}.jpg", id)
        );
    }
}
