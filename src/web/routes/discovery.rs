use axum::{extract::State, response::IntoResponse, Extension, Json};
use serde_json::json;

use crate::error::AppError;
use crate::services::{discovery_service, user_service};
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::AppState;

pub async fn discovery_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let current = user_service::get_user(&state.pool, &auth_user.id).await?;
    let now_ms = chrono::Utc::now().timestamp_millis();

    let result = discovery_service::discover(&state.pool, &current, now_ms).await?;
    Ok(Json(json!({
        "status": "success",
        "count": result.count,
        "data": result.data,
    })))
}
