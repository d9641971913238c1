use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::database::user_repo::{self, NewUser, UniqueField, UserChanges};
use crate::error::AppError;
use crate::models::{Gender, GeoPoint, Preferences, UserProfile};
use crate::services::auth_service::{self, TokenService};
use crate::services::blob_store::BlobStore;

const MIN_PASSWORD_LEN: usize = 6;
const BAD_CREDENTIALS: &str = "wrong username or password";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub name: Option<String>,
    pub gender: Gender,
    pub birth_date_in_ms: i64,
    pub geometry: Option<GeoPoint>,
    pub preferences: Option<Preferences>,
}

#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SigninOutcome {
    pub token: String,
    pub user: UserProfile,
}

/// Fields a user may change on their own profile. Likes, dislikes, pictures
/// and credentials have their own flows.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub gender: Option<Gender>,
    pub birth_date_in_ms: Option<i64>,
    pub geometry: Option<GeoPoint>,
    pub preferences: Option<Preferences>,
}

fn check_location_and_preferences(
    geometry: Option<&GeoPoint>,
    preferences: Option<&Preferences>,
) -> Result<(), AppError> {
    if let Some(g) = geometry {
        if !g.is_valid() {
            return Err(AppError::BadRequest(format!(
                "geometry.coordinates must be [longitude, latitude] in range, got [{}, {}]",
                g.longitude(),
                g.latitude()
            )));
        }
    }
    if let Some(p) = preferences {
        p.validate().map_err(AppError::BadRequest)?;
    }
    Ok(())
}

pub async fn sign_up(pool: &SqlitePool, req: SignupRequest) -> Result<UserProfile, AppError> {
    let username = req.username.trim();
    let email = req.email.trim();
    if username.is_empty() {
        return Err(AppError::BadRequest("username is required".to_string()));
    }
    if !email.contains('@') {
        return Err(AppError::BadRequest("email is invalid".to_string()));
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    check_location_and_preferences(req.geometry.as_ref(), req.preferences.as_ref())?;

    let user_id = Uuid::new_v4().to_string();
    let password_hash = auth_service::hash_password(&req.password);
    user_repo::insert_user(
        pool,
        NewUser {
            user_id: &user_id,
            username,
            email,
            password_hash: &password_hash,
            name: req.name.as_deref().map(str::trim).filter(|s| !s.is_empty()),
            gender: req.gender,
            birth_date_ms: req.birth_date_in_ms,
            geometry: req.geometry,
            preferences: req.preferences,
        },
    )
    .await?;

    info!(user_id = %user_id, "user_signed_up");
    get_user(pool, &user_id).await
}

pub async fn sign_in(
    pool: &SqlitePool,
    tokens: &TokenService,
    req: SigninRequest,
) -> Result<SigninOutcome, AppError> {
    let Some(creds) = user_repo::load_credentials_by_username(pool, req.username.trim()).await?
    else {
        return Err(AppError::Unauthorized(BAD_CREDENTIALS.to_string()));
    };

    if !auth_service::verify_password(&req.password, &creds.password_hash) {
        return Err(AppError::Unauthorized(BAD_CREDENTIALS.to_string()));
    }

    let user = get_user(pool, &creds.user_id).await?;
    let token = tokens.create_token(&user.id, &user.username, &user.email)?;
    Ok(SigninOutcome { token, user })
}

pub async fn get_user(pool: &SqlitePool, user_id: &str) -> Result<UserProfile, AppError> {
    user_repo::load_user(pool, user_id)
        .await?
        .map(UserProfile::from)
        .ok_or_else(|| AppError::NotFound(format!("no such user: {user_id}")))
}

pub async fn get_users(pool: &SqlitePool, user_ids: &[String]) -> Result<Vec<UserProfile>, AppError> {
    let rows = user_repo::load_users(pool, user_ids).await?;
    Ok(rows.into_iter().map(UserProfile::from).collect())
}

pub async fn update_self(
    pool: &SqlitePool,
    user_id: &str,
    req: UpdateProfileRequest,
) -> Result<UserProfile, AppError> {
    check_location_and_preferences(req.geometry.as_ref(), req.preferences.as_ref())?;

    let changes = UserChanges {
        name: req.name.map(|s| s.trim().to_string()),
        gender: req.gender,
        birth_date_ms: req.birth_date_in_ms,
        geometry: req.geometry,
        preferences: req.preferences,
    };

    if user_repo::update_user(pool, user_id, &changes).await? == 0 {
        return Err(AppError::NotFound(format!("no such user: {user_id}")));
    }
    get_user(pool, user_id).await
}

/// Removes the account, then its picture blobs. Blob cleanup failures are
/// logged; the account is already gone at that point.
pub async fn delete_user(
    pool: &SqlitePool,
    blobs: &dyn BlobStore,
    actor_id: &str,
    user_id: &str,
) -> Result<(), AppError> {
    if actor_id != user_id {
        return Err(AppError::Forbidden(
            "you can only delete your own account".to_string(),
        ));
    }

    let user = get_user(pool, user_id).await?;
    if user_repo::delete_user(pool, user_id).await? == 0 {
        return Err(AppError::NotFound(format!("no such user: {user_id}")));
    }

    for picture in &user.pictures {
        if let Err(e) = blobs.delete(&picture.image).await {
            warn!(user_id = %user_id, image = %picture.image, error = %e, "picture_cleanup_failed");
        }
    }
    info!(user_id = %user_id, "user_deleted");
    Ok(())
}

pub async fn is_unique(pool: &SqlitePool, field_name: &str, value: &str) -> Result<bool, AppError> {
    let field = UniqueField::parse(field_name).ok_or_else(|| {
        AppError::BadRequest(format!(
            "fieldName must be one of username, email; got {field_name:?}"
        ))
    })?;
    let exists = user_repo::field_value_exists(pool, field, value.trim()).await?;
    Ok(!exists)
}

/// Resolves the profile behind a verified token subject.
pub async fn load_authenticated(pool: &SqlitePool, user_id: &str) -> Result<UserProfile, AppError> {
    match user_repo::load_user(pool, user_id).await? {
        Some(row) => Ok(UserProfile::from(row)),
        None => Err(AppError::Unauthorized(format!(
            "account {user_id} no longer exists"
        ))),
    }
}
