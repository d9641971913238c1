pub mod middleware;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{header::CACHE_CONTROL, HeaderValue, StatusCode},
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use sqlx::SqlitePool;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::services::auth_service::TokenService;
use crate::services::blob_store::BlobStore;
use routes::{auth, discovery, images, user};

const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub tokens: TokenService,
    pub blobs: Arc<dyn BlobStore>,
}

fn timeout_layer(request_timeout: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, request_timeout)
}

pub fn router(state: AppState, request_timeout: Duration) -> Router {
    let protected_routes = Router::new()
        .route("/discovery", get(discovery::discovery_handler))
        .route(
            "/users/me",
            get(user::me_handler).patch(user::update_me_handler),
        )
        .route("/users/lookup", post(user::lookup_users_handler))
        .route(
            "/users/:user_id",
            get(user::user_handler).delete(user::delete_user_handler),
        )
        .route(
            "/users/:user_id/images",
            get(images::list_images_handler)
                .post(images::upload_images_handler)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route(
            "/users/:user_id/images/:image_name",
            delete(images::delete_image_handler),
        )
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .route("/users/signup", post(auth::signup_handler))
        .route("/users/signin", post(auth::signin_handler))
        .route("/users/is-unique", post(user::is_unique_handler))
        .route("/logout", post(auth::logout_handler))
        .merge(protected_routes)
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(timeout_layer(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .with_state(state)
}
