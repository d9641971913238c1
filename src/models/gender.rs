use std::fmt;

use serde::{Deserialize, Serialize};

/// A profile's own gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    NonBinary,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::NonBinary => "non_binary",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Desired gender in discovery. `All` is the wildcard and never a profile's
/// own gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum GenderPreference {
    All,
    Male,
    Female,
    NonBinary,
}

impl GenderPreference {
    /// The gender a candidate must have, or `None` for the wildcard.
    pub fn required_gender(&self) -> Option<Gender> {
        match self {
            GenderPreference::All => None,
            GenderPreference::Male => Some(Gender::Male),
            GenderPreference::Female => Some(Gender::Female),
            GenderPreference::NonBinary => Some(Gender::NonBinary),
        }
    }
}
