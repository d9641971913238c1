use serde::{Deserialize, Serialize};

use super::GenderPreference;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeRange {
    pub min: u32,
    pub max: u32,
}

/// Discovery constraints a user sets for their own results.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    /// Max radius in kilometers.
    pub distance: f64,
    pub ages: AgeRange,
    pub gender: GenderPreference,
}

impl Preferences {
    pub fn validate(&self) -> Result<(), String> {
        if !self.distance.is_finite() || self.distance <= 0.0 {
            return Err(format!(
                "preferences.distance must be greater than 0, got {}",
                self.distance
            ));
        }
        if self.ages.min > self.ages.max {
            return Err(format!(
                "preferences.ages.min ({}) must not exceed preferences.ages.max ({})",
                self.ages.min, self.ages.max
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefs(distance: f64, min: u32, max: u32) -> Preferences {
        Preferences {
            distance,
            ages: AgeRange { min, max },
            gender: GenderPreference::All,
        }
    }

    #[test]
    fn accepts_equal_age_bounds() {
        assert!(prefs(10.0, 30, 30).validate().is_ok());
    }

    #[test]
    fn rejects_inverted_ages_and_zero_distance() {
        assert!(prefs(10.0, 40, 30).validate().is_err());
        assert!(prefs(0.0, 20, 30).validate().is_err());
        assert!(prefs(f64::NAN, 20, 30).validate().is_err());
    }
}
