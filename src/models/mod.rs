pub mod gender;
pub mod geo_point;
pub mod user_preferences;
pub mod user_profiles;
pub mod users;

pub use gender::{Gender, GenderPreference};
pub use geo_point::GeoPoint;
pub use user_preferences::{AgeRange, Preferences};
pub use user_profiles::{Picture, UserProfile};
pub use users::{UserCredentialsRow, UsersRow};
