use serde::{Deserialize, Serialize};

use super::{AgeRange, Gender, GeoPoint, Preferences, UsersRow};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Picture {
    /// Opaque blob store key.
    pub image: String,
    pub order: u32,
}

/// Public shape of a user. This is the serialization allow-list: anything
/// not listed here (the password hash in particular) never leaves the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub email: String,
    pub name: Option<String>,
    pub gender: Gender,
    pub birth_date_in_ms: i64,
    pub geometry: Option<GeoPoint>,
    pub likes: Vec<String>,
    pub dislikes: Vec<String>,
    pub preferences: Option<Preferences>,
    pub pictures: Vec<Picture>,
    pub created_at: String,
}

impl From<UsersRow> for UserProfile {
    fn from(row: UsersRow) -> Self {
        let geometry = row
            .longitude
            .zip(row.latitude)
            .map(|(lon, lat)| GeoPoint::new(lon, lat));

        let ages = row
            .pref_min_age
            .and_then(|v| u32::try_from(v).ok())
            .zip(row.pref_max_age.and_then(|v| u32::try_from(v).ok()))
            .map(|(min, max)| AgeRange { min, max });

        let preferences = match (row.pref_distance_km, ages, row.pref_gender) {
            (Some(distance), Some(ages), Some(gender)) => Some(Preferences {
                distance,
                ages,
                gender,
            }),
            _ => None,
        };

        let mut pictures = row.pictures.0;
        pictures.sort_by_key(|p| p.order);

        Self {
            id: row.user_id,
            username: row.username,
            email: row.email,
            name: row.name,
            gender: row.gender,
            birth_date_in_ms: row.birth_date_ms,
            geometry,
            likes: row.likes.0,
            dislikes: row.dislikes.0,
            preferences,
            pictures,
            created_at: row.created_at,
        }
    }
}
