use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::AppError;
use crate::services::user_service::{self, UpdateProfileRequest};
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::AppState;

/// Sign in with an existing token: echoes the caller's profile.
pub async fn me_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let user = user_service::load_authenticated(&state.pool, &auth_user.id).await?;
    Ok(Json(json!({ "status": "success", "data": { "user": user } })))
}

pub async fn update_me_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = user_service::update_self(&state.pool, &auth_user.id, body).await?;
    Ok(Json(json!({ "status": "success", "data": user })))
}

pub async fn user_handler(
    Extension(_auth_user): Extension<AuthenticatedUser>,
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let user = user_service::get_user(&state.pool, &user_id).await?;
    Ok(Json(json!({ "status": "success", "data": user })))
}

pub async fn delete_user_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    user_service::delete_user(&state.pool, state.blobs.as_ref(), &auth_user.id, &user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupBody {
    pub user_ids: Vec<String>,
}

pub async fn lookup_users_handler(
    Extension(_auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Json(body): Json<LookupBody>,
) -> Result<impl IntoResponse, AppError> {
    let users = user_service::get_users(&state.pool, &body.user_ids).await?;
    Ok(Json(json!({ "status": "success", "data": users })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IsUniqueBody {
    pub field_name: String,
    pub value: String,
}

pub async fn is_unique_handler(
    State(state): State<AppState>,
    Json(body): Json<IsUniqueBody>,
) -> Result<impl IntoResponse, AppError> {
    let unique = user_service::is_unique(&state.pool, &body.field_name, &body.value).await?;
    Ok(Json(json!({ "status": "success", "isUnique": unique })))
}
