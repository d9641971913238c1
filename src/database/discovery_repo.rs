use std::cmp::Ordering;
use std::collections::BTreeSet;

use sqlx::{sqlite::SqliteArguments, Arguments, SqlitePool};

use crate::geo;
use crate::models::{Gender, GeoPoint, UsersRow};

/// Inclusive bounds on `birth_date_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BirthWindow {
    pub min_ms: i64,
    pub max_ms: i64,
}

impl BirthWindow {
    pub fn contains(&self, birth_date_ms: i64) -> bool {
        (self.min_ms..=self.max_ms).contains(&birth_date_ms)
    }
}

/// One bounded candidate lookup. All predicates are ANDed.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateQuery {
    pub exclude: BTreeSet<String>,
    pub center: GeoPoint,
    pub radius_radians: f64,
    pub birth_window: BirthWindow,
    /// `None` means any gender.
    pub gender: Option<Gender>,
    pub limit: usize,
}

/// Runs the SQL prefilter, then keeps only rows inside the spherical cap,
/// closest first (ties by `user_id`), truncated to `query.limit`.
pub async fn query_bounded(
    pool: &SqlitePool,
    query: &CandidateQuery,
) -> sqlx::Result<Vec<UsersRow>> {
    if query.limit == 0 {
        return Ok(Vec::new());
    }

    let mut sql = String::from(select_profiles!(
        "WHERE longitude IS NOT NULL AND latitude IS NOT NULL"
    ));
    let mut args = SqliteArguments::default();

    // 1. exclusion set, bound as one JSON array so its size never meets
    // SQLite's host parameter limit
    if !query.exclude.is_empty() {
        sql.push_str(" AND user_id NOT IN (SELECT value FROM json_each(?))");
        let ids = serde_json::to_string(&query.exclude)
            .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
        args.add(ids).map_err(sqlx::Error::Encode)?;
    }

    // 2. geo prefilter, refined below
    let bbox = geo::bounding_box(&query.center, query.radius_radians);
    sql.push_str(" AND latitude BETWEEN ? AND ?");
    args.add(bbox.min_lat).map_err(sqlx::Error::Encode)?;
    args.add(bbox.max_lat).map_err(sqlx::Error::Encode)?;
    if let Some((min_lon, max_lon)) = bbox.lon {
        sql.push_str(" AND longitude BETWEEN ? AND ?");
        args.add(min_lon).map_err(sqlx::Error::Encode)?;
        args.add(max_lon).map_err(sqlx::Error::Encode)?;
    }

    // 3. age window
    sql.push_str(" AND birth_date_ms BETWEEN ? AND ?");
    args.add(query.birth_window.min_ms)
        .map_err(sqlx::Error::Encode)?;
    args.add(query.birth_window.max_ms)
        .map_err(sqlx::Error::Encode)?;

    // 4. gender
    if let Some(gender) = query.gender {
        sql.push_str(" AND gender = ?");
        args.add(gender).map_err(sqlx::Error::Encode)?;
    }

    sql.push_str(" ORDER BY user_id");

    let rows = sqlx::query_as_with::<_, UsersRow, _>(&sql, args)
        .fetch_all(pool)
        .await?;

    let mut scored: Vec<(f64, UsersRow)> = rows
        .into_iter()
        .filter_map(|row| {
            let point = GeoPoint::new(row.longitude?, row.latitude?);
            let angle = geo::central_angle(&query.center, &point);
            (angle <= query.radius_radians).then_some((angle, row))
        })
        .collect();

    scored.sort_by(|(a_angle, a), (b_angle, b)| {
        a_angle
            .partial_cmp(b_angle)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
    scored.truncate(query.limit);

    Ok(scored.into_iter().map(|(_, row)| row).collect())
}
