use sqlx::types::Json;

use super::{Gender, GenderPreference, Picture};

/// Profile columns as stored. Never carries the credential; see
/// [`UserCredentialsRow`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UsersRow {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub name: Option<String>,
    pub gender: Gender,
    pub birth_date_ms: i64,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub likes: Json<Vec<String>>,
    pub dislikes: Json<Vec<String>>,
    pub pictures: Json<Vec<Picture>>,
    pub pref_distance_km: Option<f64>,
    pub pref_min_age: Option<i64>,
    pub pref_max_age: Option<i64>,
    pub pref_gender: Option<GenderPreference>,
    pub created_at: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserCredentialsRow {
    pub user_id: String,
    pub password_hash: String,
}
