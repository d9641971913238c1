/// `SELECT <profile columns> FROM users <tail>`. The column list is the
/// projection allow-list for every profile read; `password_hash` is only
/// ever selected by the credential lookup.
macro_rules! select_profiles {
    ($($tail:literal),* $(,)?) => {
        concat!(
            "SELECT user_id, username, email, name, gender, birth_date_ms, ",
            "longitude, latitude, likes, dislikes, pictures, ",
            "pref_distance_km, pref_min_age, pref_max_age, pref_gender, created_at ",
            "FROM users ",
            $($tail),*
        )
    };
}

pub mod discovery_repo;
pub mod user_repo;
