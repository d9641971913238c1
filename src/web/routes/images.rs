use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde_json::json;

use crate::error::AppError;
use crate::services::image_service::{self, UploadedFile};
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::AppState;

/// Every part carrying a file name is treated as an image; other parts are
/// ignored.
pub async fn upload_images_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(user_id): Path<String>,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("malformed multipart body: {e}")))?
    {
        let Some(original_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let body = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("could not read {original_name}: {e}")))?;

        files.push(UploadedFile {
            original_name,
            content_type,
            body,
        });
    }

    let keys = image_service::upload_images(
        &state.pool,
        state.blobs.as_ref(),
        &auth_user.id,
        &user_id,
        files,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "data": { "message": "Images Uploaded", "images": keys }
        })),
    ))
}

pub async fn list_images_handler(
    Extension(_auth_user): Extension<AuthenticatedUser>,
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let images = image_service::list_images(&state.pool, state.blobs.as_ref(), &user_id).await?;
    Ok(Json(json!({ "status": "success", "images": images })))
}

pub async fn delete_image_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path((user_id, image_name)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    image_service::delete_image(
        &state.pool,
        state.blobs.as_ref(),
        &auth_user.id,
        &user_id,
        &image_name,
    )
    .await?;

    Ok(Json(json!({
        "status": "success",
        "data": { "message": format!("Image Deleted {image_name}") }
    })))
}
