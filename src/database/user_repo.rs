use sqlx::{sqlite::SqliteArguments, Arguments, SqlitePool};

use crate::models::{Gender, GeoPoint, Preferences, UserCredentialsRow, UsersRow};

pub const SQL_LOAD_USER: &str = select_profiles!("WHERE user_id = ?1 LIMIT 1");

pub async fn load_user(pool: &SqlitePool, user_id: &str) -> sqlx::Result<Option<UsersRow>> {
    sqlx::query_as::<_, UsersRow>(SQL_LOAD_USER)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn load_users(pool: &SqlitePool, user_ids: &[String]) -> sqlx::Result<Vec<UsersRow>> {
    if user_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut sql = String::from(select_profiles!("WHERE user_id IN ("));
    let mut args = SqliteArguments::default();
    for (i, id) in user_ids.iter().enumerate() {
        sql.push_str(if i == 0 { "?" } else { ", ?" });
        args.add(id.as_str()).map_err(sqlx::Error::Encode)?;
    }
    sql.push_str(") ORDER BY user_id");

    sqlx::query_as_with::<_, UsersRow, _>(&sql, args)
        .fetch_all(pool)
        .await
}

const SQL_LOAD_CREDENTIALS_BY_USERNAME: &str = r#"
SELECT user_id, password_hash
FROM users
WHERE username = ?1
LIMIT 1
"#;

pub async fn load_credentials_by_username(
    pool: &SqlitePool,
    username: &str,
) -> sqlx::Result<Option<UserCredentialsRow>> {
    sqlx::query_as::<_, UserCredentialsRow>(SQL_LOAD_CREDENTIALS_BY_USERNAME)
        .bind(username)
        .fetch_optional(pool)
        .await
}

pub struct NewUser<'a> {
    pub user_id: &'a str,
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub name: Option<&'a str>,
    pub gender: Gender,
    pub birth_date_ms: i64,
    pub geometry: Option<GeoPoint>,
    pub preferences: Option<Preferences>,
}

const SQL_INSERT_USER: &str = r#"
INSERT INTO users (
  user_id,
  username,
  email,
  password_hash,
  name,
  gender,
  birth_date_ms,
  longitude,
  latitude,
  pref_distance_km,
  pref_min_age,
  pref_max_age,
  pref_gender
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
"#;

pub async fn insert_user(pool: &SqlitePool, user: NewUser<'_>) -> sqlx::Result<()> {
    let prefs = user.preferences;
    sqlx::query(SQL_INSERT_USER)
        .bind(user.user_id)
        .bind(user.username)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.name)
        .bind(user.gender)
        .bind(user.birth_date_ms)
        .bind(user.geometry.map(|g| g.longitude()))
        .bind(user.geometry.map(|g| g.latitude()))
        .bind(prefs.map(|p| p.distance))
        .bind(prefs.map(|p| i64::from(p.ages.min)))
        .bind(prefs.map(|p| i64::from(p.ages.max)))
        .bind(prefs.map(|p| p.gender))
        .execute(pool)
        .await?;
    Ok(())
}

/// Self-service profile edits. `None` leaves the column untouched.
#[derive(Debug, Default, Clone)]
pub struct UserChanges {
    pub name: Option<String>,
    pub gender: Option<Gender>,
    pub birth_date_ms: Option<i64>,
    pub geometry: Option<GeoPoint>,
    pub preferences: Option<Preferences>,
}

const SQL_UPDATE_USER: &str = r#"
UPDATE users
SET name = COALESCE(?1, name),
    gender = COALESCE(?2, gender),
    birth_date_ms = COALESCE(?3, birth_date_ms),
    longitude = COALESCE(?4, longitude),
    latitude = COALESCE(?5, latitude),
    pref_distance_km = COALESCE(?6, pref_distance_km),
    pref_min_age = COALESCE(?7, pref_min_age),
    pref_max_age = COALESCE(?8, pref_max_age),
    pref_gender = COALESCE(?9, pref_gender),
    updated_at = CURRENT_TIMESTAMP
WHERE user_id = ?10
"#;

pub async fn update_user(
    pool: &SqlitePool,
    user_id: &str,
    changes: &UserChanges,
) -> sqlx::Result<u64> {
    let prefs = changes.preferences;
    let res = sqlx::query(SQL_UPDATE_USER)
        .bind(changes.name.as_deref())
        .bind(changes.gender)
        .bind(changes.birth_date_ms)
        .bind(changes.geometry.map(|g| g.longitude()))
        .bind(changes.geometry.map(|g| g.latitude()))
        .bind(prefs.map(|p| p.distance))
        .bind(prefs.map(|p| i64::from(p.ages.min)))
        .bind(prefs.map(|p| i64::from(p.ages.max)))
        .bind(prefs.map(|p| p.gender))
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_DELETE_USER: &str = r#"
DELETE FROM users
WHERE user_id = ?1
"#;

pub async fn delete_user(pool: &SqlitePool, user_id: &str) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_DELETE_USER)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

/// Columns that may be checked for uniqueness before signup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    Email,
}

impl UniqueField {
    pub fn parse(field_name: &str) -> Option<Self> {
        match field_name.trim() {
            "username" => Some(UniqueField::Username),
            "email" => Some(UniqueField::Email),
            _ => None,
        }
    }
}

const SQL_USERNAME_EXISTS: &str = "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?1)";
const SQL_EMAIL_EXISTS: &str = "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1)";

pub async fn field_value_exists(
    pool: &SqlitePool,
    field: UniqueField,
    value: &str,
) -> sqlx::Result<bool> {
    let sql = match field {
        UniqueField::Username => SQL_USERNAME_EXISTS,
        UniqueField::Email => SQL_EMAIL_EXISTS,
    };
    let found: i64 = sqlx::query_scalar(sql).bind(value).fetch_one(pool).await?;
    Ok(found != 0)
}

// Appended pictures take the next display position.
const SQL_PUSH_PICTURE: &str = r#"
UPDATE users
SET pictures = json_insert(
        pictures,
        '$[#]',
        json_object('image', ?1, 'order', json_array_length(pictures))
    ),
    updated_at = CURRENT_TIMESTAMP
WHERE user_id = ?2
"#;

pub async fn push_picture(pool: &SqlitePool, user_id: &str, image: &str) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_PUSH_PICTURE)
        .bind(image)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

// Survivors are renumbered so `order` stays equal to list position.
const SQL_PULL_PICTURE: &str = r#"
UPDATE users
SET pictures = (
        SELECT COALESCE(
            json_group_array(json_object('image', image, 'order', position)),
            '[]'
        )
        FROM (
            SELECT json_extract(value, '$.image') AS image,
                   ROW_NUMBER() OVER (ORDER BY key) - 1 AS position
            FROM json_each(users.pictures)
            WHERE json_extract(value, '$.image') != ?1
            ORDER BY key
        )
    ),
    updated_at = CURRENT_TIMESTAMP
WHERE user_id = ?2
  AND EXISTS (
        SELECT 1
        FROM json_each(users.pictures)
        WHERE json_extract(value, '$.image') = ?1
    )
"#;

/// Returns 0 when the user or the picture does not exist.
pub async fn pull_picture(pool: &SqlitePool, user_id: &str, image: &str) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_PULL_PICTURE)
        .bind(image)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}
