use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use cookie::{Cookie, SameSite};
use serde_json::json;

use crate::error::AppError;
use crate::services::user_service::{self, SigninRequest, SignupRequest};
use crate::web::middleware::auth::ACCESS_TOKEN_COOKIE;
use crate::web::AppState;

fn access_cookie(value: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(ACCESS_TOKEN_COOKIE, value);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie
}

fn with_cookie(mut response: Response, cookie: Cookie<'_>) -> Result<Response, AppError> {
    let value = HeaderValue::from_str(&cookie.to_string())
        .map_err(|e| AppError::Internal(e.into()))?;
    response.headers_mut().append(header::SET_COOKIE, value);
    Ok(response)
}

pub async fn signup_handler(
    State(state): State<AppState>,
    Json(body): Json<SignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = user_service::sign_up(&state.pool, body).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "status": "success", "data": user })),
    ))
}

pub async fn signin_handler(
    State(state): State<AppState>,
    Json(body): Json<SigninRequest>,
) -> Result<Response, AppError> {
    let outcome = user_service::sign_in(&state.pool, &state.tokens, body).await?;
    let cookie = access_cookie(outcome.token.clone());
    let response = Json(json!({ "status": "success", "data": outcome })).into_response();
    with_cookie(response, cookie)
}

pub async fn logout_handler() -> Result<Response, AppError> {
    let mut cookie = access_cookie(String::new());
    cookie.make_removal();
    with_cookie(StatusCode::NO_CONTENT.into_response(), cookie)
}
