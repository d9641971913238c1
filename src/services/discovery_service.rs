use std::collections::BTreeSet;

use serde::Serialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, warn};

use crate::database::discovery_repo::{self, BirthWindow, CandidateQuery};
use crate::geo;
use crate::models::{GeoPoint, Preferences, UserProfile};

pub const MS_PER_YEAR: i64 = 31_536_000_000;
pub const MAX_CANDIDATES: usize = 20;

#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// The caller's profile cannot drive a search; fixable by the client.
    #[error("{0}")]
    Validation(String),

    #[error("profile store unavailable: {0}")]
    StoreUnavailable(#[from] sqlx::Error),
}

#[derive(Debug, Serialize)]
pub struct DiscoveryResult {
    pub count: usize,
    pub data: Vec<UserProfile>,
}

/// Concrete filter bounds derived from a user's stored preferences.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchBounds {
    pub radius_radians: f64,
    pub birth_window: BirthWindow,
}

pub fn normalize_preferences(prefs: &Preferences, now_ms: i64) -> SearchBounds {
    let min_ms = now_ms.saturating_sub(i64::from(prefs.ages.max).saturating_mul(MS_PER_YEAR));
    let max_ms = now_ms.saturating_sub(i64::from(prefs.ages.min).saturating_mul(MS_PER_YEAR));

    SearchBounds {
        radius_radians: geo::km_to_radians(prefs.distance),
        birth_window: BirthWindow { min_ms, max_ms },
    }
}

pub fn build_exclusion_set(self_id: &str, likes: &[String], dislikes: &[String]) -> BTreeSet<String> {
    likes
        .iter()
        .chain(dislikes)
        .cloned()
        .chain(std::iter::once(self_id.to_string()))
        .collect()
}

/// The parts of a profile discovery depends on, checked up front.
#[derive(Debug, Clone, Copy)]
struct Searcher<'a> {
    id: &'a str,
    center: GeoPoint,
    preferences: Preferences,
}

fn validate(current: &UserProfile) -> Result<Searcher<'_>, DiscoveryError> {
    let center = current.geometry.ok_or_else(|| {
        DiscoveryError::Validation("profile has no geometry.coordinates".to_string())
    })?;
    if !center.is_valid() {
        return Err(DiscoveryError::Validation(format!(
            "geometry.coordinates out of range: [{}, {}]",
            center.longitude(),
            center.latitude()
        )));
    }

    let preferences = current
        .preferences
        .ok_or_else(|| DiscoveryError::Validation("profile has no preferences".to_string()))?;
    preferences.validate().map_err(DiscoveryError::Validation)?;

    Ok(Searcher {
        id: &current.id,
        center,
        preferences,
    })
}

pub fn compose_candidate_query(
    center: GeoPoint,
    preferences: &Preferences,
    exclude: BTreeSet<String>,
    bounds: SearchBounds,
) -> CandidateQuery {
    CandidateQuery {
        exclude,
        center,
        radius_radians: bounds.radius_radians,
        birth_window: bounds.birth_window,
        gender: preferences.gender.required_gender(),
        limit: MAX_CANDIDATES,
    }
}

/// Candidate pool for `current`, evaluated at `now_ms`.
///
/// `current` is a read-only snapshot; nothing here writes to the store.
pub async fn discover(
    pool: &SqlitePool,
    current: &UserProfile,
    now_ms: i64,
) -> Result<DiscoveryResult, DiscoveryError> {
    let searcher = validate(current)?;

    let exclude = build_exclusion_set(searcher.id, &current.likes, &current.dislikes);
    let bounds = normalize_preferences(&searcher.preferences, now_ms);
    let excluded = exclude.len();
    let query = compose_candidate_query(searcher.center, &searcher.preferences, exclude, bounds);

    let rows = discovery_repo::query_bounded(pool, &query)
        .await
        .map_err(|e| {
            warn!(user_id = %searcher.id, error = %e, "discovery_query_failed");
            DiscoveryError::StoreUnavailable(e)
        })?;

    let data: Vec<UserProfile> = rows.into_iter().map(UserProfile::from).collect();
    debug!(
        user_id = %searcher.id,
        excluded,
        count = data.len(),
        "discovery_done"
    );

    Ok(DiscoveryResult {
        count: data.len(),
        data,
    })
}
