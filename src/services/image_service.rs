use bytes::Bytes;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::database::user_repo;
use crate::error::AppError;
use crate::services::blob_store::BlobStore;
use crate::services::user_service;

pub struct UploadedFile {
    pub original_name: String,
    pub content_type: String,
    pub body: Bytes,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageLink {
    pub image_url: String,
    pub image_name: String,
}

fn ensure_owner(actor_id: &str, user_id: &str) -> Result<(), AppError> {
    if actor_id != user_id {
        return Err(AppError::Forbidden(
            "you can only manage your own pictures".to_string(),
        ));
    }
    Ok(())
}

/// `<original name>-<uuid>`, with the name reduced to URL-safe characters.
pub fn image_key(original_name: &str) -> String {
    let cleaned: String = original_name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let base = if cleaned.is_empty() { "image" } else { &cleaned };
    format!("{}-{}", base, Uuid::new_v4())
}

/// Stores every file and appends it to the user's pictures. Returns the new
/// keys in upload order.
pub async fn upload_images(
    pool: &SqlitePool,
    blobs: &dyn BlobStore,
    actor_id: &str,
    user_id: &str,
    files: Vec<UploadedFile>,
) -> Result<Vec<String>, AppError> {
    ensure_owner(actor_id, user_id)?;
    if files.is_empty() {
        return Err(AppError::BadRequest("files required".to_string()));
    }
    // Fail before touching the blob store if the account is gone.
    user_service::get_user(pool, user_id).await?;

    let mut keys = Vec::with_capacity(files.len());
    for file in files {
        let key = image_key(&file.original_name);
        if let Err(e) = store_one(pool, blobs, user_id, &key, file).await {
            discard_upload(pool, blobs, user_id, &keys).await;
            return Err(e);
        }
        keys.push(key);
    }

    info!(user_id = %user_id, count = keys.len(), "images_uploaded");
    Ok(keys)
}

async fn store_one(
    pool: &SqlitePool,
    blobs: &dyn BlobStore,
    user_id: &str,
    key: &str,
    file: UploadedFile,
) -> Result<(), AppError> {
    blobs.put(key, file.body, &file.content_type).await?;
    let pushed = match user_repo::push_picture(pool, user_id, key).await {
        Ok(n) => n,
        Err(e) => {
            discard_blob(blobs, user_id, key).await;
            return Err(e.into());
        }
    };
    if pushed == 0 {
        discard_blob(blobs, user_id, key).await;
        return Err(AppError::NotFound(format!("no such user: {user_id}")));
    }
    Ok(())
}

/// Best effort: a partial upload leaves neither pictures nor blobs behind.
async fn discard_upload(pool: &SqlitePool, blobs: &dyn BlobStore, user_id: &str, keys: &[String]) {
    for key in keys {
        if let Err(e) = user_repo::pull_picture(pool, user_id, key).await {
            warn!(user_id = %user_id, image = %key, error = %e, "picture_rollback_failed");
        }
        discard_blob(blobs, user_id, key).await;
    }
}

async fn discard_blob(blobs: &dyn BlobStore, user_id: &str, key: &str) {
    if let Err(e) = blobs.delete(key).await {
        warn!(user_id = %user_id, image = %key, error = %e, "orphaned_image");
    }
}

pub async fn delete_image(
    pool: &SqlitePool,
    blobs: &dyn BlobStore,
    actor_id: &str,
    user_id: &str,
    image_name: &str,
) -> Result<(), AppError> {
    ensure_owner(actor_id, user_id)?;
    let image_name = image_name.trim();
    if image_name.is_empty() {
        return Err(AppError::BadRequest("no image name provided".to_string()));
    }

    let user = user_service::get_user(pool, user_id).await?;
    if !user.pictures.iter().any(|p| p.image == image_name) {
        return Err(AppError::NotFound(format!("no such image: {image_name}")));
    }

    blobs.delete(image_name).await?;
    user_repo::pull_picture(pool, user_id, image_name).await?;

    info!(user_id = %user_id, image = %image_name, "image_deleted");
    Ok(())
}

pub async fn list_images(
    pool: &SqlitePool,
    blobs: &dyn BlobStore,
    user_id: &str,
) -> Result<Vec<ImageLink>, AppError> {
    let user = user_service::get_user(pool, user_id).await?;
    Ok(user
        .pictures
        .into_iter()
        .map(|p| ImageLink {
            image_url: blobs.object_url(&p.image),
            image_name: p.image,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_key_keeps_safe_name_and_appends_uuid() {
        let key = image_key("my photo.jpg");
        assert!(key.starts_with("my_photo.jpg-"));
        assert_eq!(key.len(), "my_photo.jpg-".len() + 36);
    }

    #[test]
    fn image_key_falls_back_for_empty_name() {
        assert!(image_key("  ").starts_with("image-"));
    }

    #[test]
    fn non_owner_is_forbidden() {
        assert!(matches!(ensure_owner("a", "b"), Err(AppError::Forbidden(_))));
        assert!(ensure_owner("a", "a").is_ok());
    }
}
