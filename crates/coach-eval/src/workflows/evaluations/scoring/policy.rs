use serde::{Deserialize, Serialize};

use super::super::domain::Rating;

/// How a single rating is reported back to the coach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingBand {
    Strength,
    Acceptable,
    Opportunity,
    NoSignal,
}

impl Rating {
    pub const fn band(self) -> RatingBand {
        match self {
            Rating::Evident => RatingBand::Strength,
            Rating::InDevelopment => RatingBand::Acceptable,
            Rating::ToDevelop | Rating::NoEvidence => RatingBand::Opportunity,
            Rating::Unrated | Rating::NotApplicable => RatingBand::NoSignal,
        }
    }
}
