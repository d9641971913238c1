//! Shared setup: in-memory SQLite with migrations, profile fixtures and an
//! in-memory blob store.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use bytes::Bytes;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use matchpool::database::user_repo::{self, NewUser};
use matchpool::models::{AgeRange, Gender, GenderPreference, GeoPoint, Preferences};
use matchpool::services::auth_service::{self, TokenService};
use matchpool::services::blob_store::{BlobStore, BlobStoreError};
use matchpool::services::discovery_service::MS_PER_YEAR;
use matchpool::web::{self, AppState};

pub const NOW: i64 = 1_700_000_000_000;
pub const SECRET: &str = "test_secret_key";
pub const ISSUER: &str = "matchpool-test";
pub const PASSWORD: &str = "correct horse";

pub async fn test_pool() -> SqlitePool {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    // One connection: every new connection to :memory: is a fresh database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");
    pool
}

/// Birth instant for someone `years` old at [`NOW`], half a year into that age.
pub fn born_years_ago(years: i64) -> i64 {
    NOW - years * MS_PER_YEAR - MS_PER_YEAR / 2
}

pub fn prefs(distance: f64, min: u32, max: u32, gender: GenderPreference) -> Preferences {
    Preferences {
        distance,
        ages: AgeRange { min, max },
        gender,
    }
}

pub struct Seed<'a> {
    pub id: &'a str,
    pub gender: Gender,
    pub age: i64,
    pub at: Option<(f64, f64)>,
    pub preferences: Option<Preferences>,
}

impl<'a> Seed<'a> {
    pub fn new(id: &'a str, gender: Gender, age: i64, lon: f64, lat: f64) -> Self {
        Self {
            id,
            gender,
            age,
            at: Some((lon, lat)),
            preferences: None,
        }
    }

    pub fn with_preferences(mut self, p: Preferences) -> Self {
        self.preferences = Some(p);
        self
    }
}

pub async fn seed(pool: &SqlitePool, s: Seed<'_>) {
    let hash = auth_service::hash_password(PASSWORD);
    let email = format!("{}@example.com", s.id);
    user_repo::insert_user(
        pool,
        NewUser {
            user_id: s.id,
            username: s.id,
            email: &email,
            password_hash: &hash,
            name: Some(s.id),
            gender: s.gender,
            birth_date_ms: born_years_ago(s.age),
            geometry: s.at.map(|(lon, lat)| GeoPoint::new(lon, lat)),
            preferences: s.preferences,
        },
    )
    .await
    .expect("seed user");
}

pub async fn set_evaluations(pool: &SqlitePool, id: &str, likes: &[&str], dislikes: &[&str]) {
    sqlx::query("UPDATE users SET likes = ?1, dislikes = ?2 WHERE user_id = ?3")
        .bind(serde_json::to_string(likes).unwrap())
        .bind(serde_json::to_string(dislikes).unwrap())
        .bind(id)
        .execute(pool)
        .await
        .expect("set likes/dislikes");
}

#[derive(Default)]
pub struct MemoryBlobStore {
    pub objects: Mutex<HashMap<String, (String, Bytes)>>,
    pub fail: bool,
    /// Puts beyond this many succeed no more.
    pub fail_after: Option<usize>,
    pub puts: AtomicUsize,
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<(), BlobStoreError> {
        let attempt = self.puts.fetch_add(1, Ordering::SeqCst);
        if self.fail || self.fail_after.is_some_and(|n| attempt >= n) {
            return Err(BlobStoreError::Upstream {
                url: key.to_string(),
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            });
        }
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (content_type.to_string(), body));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), BlobStoreError> {
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    fn object_url(&self, key: &str) -> String {
        format!("memory://bucket/{key}")
    }
}

pub fn tokens() -> TokenService {
    TokenService::new(SECRET, ISSUER.to_string(), 1)
}

pub fn bearer(user_id: &str) -> String {
    let token = tokens()
        .create_token(user_id, user_id, &format!("{user_id}@example.com"))
        .unwrap();
    format!("Bearer {token}")
}

pub fn app(pool: SqlitePool, blobs: Arc<MemoryBlobStore>) -> Router {
    web::router(
        AppState {
            pool,
            tokens: tokens(),
            blobs,
        },
        Duration::from_secs(5),
    )
}
