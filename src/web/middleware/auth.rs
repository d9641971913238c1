use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use cookie::Cookie;
use tracing::debug;

use crate::error::AppError;
use crate::web::AppState;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub id: String,
}

/// Bearer header first, then the `access_token` cookie.
fn extract_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|hv| hv.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());
    if bearer.is_some() {
        return bearer;
    }

    headers
        .get(header::COOKIE)
        .and_then(|hv| hv.to_str().ok())
        .and_then(|cookies| {
            Cookie::split_parse(cookies)
                .filter_map(Result::ok)
                .find(|c| c.name() == ACCESS_TOKEN_COOKIE)
                .map(|c| c.value().to_string())
        })
        .filter(|t| !t.is_empty())
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_token(request.headers()) else {
        return AppError::Unauthorized("please sign in".to_string()).into_response();
    };

    match state.tokens.verify_token(&token) {
        Ok(claims) => {
            request
                .extensions_mut()
                .insert(AuthenticatedUser { id: claims.sub });
            next.run(request).await
        }
        Err(e) => {
            debug!(error = %e, "token_rejected");
            AppError::Unauthorized("invalid or expired token".to_string()).into_response()
        }
    }
}
