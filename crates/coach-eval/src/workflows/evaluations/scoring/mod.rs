mod policy;
mod rules;

pub use policy::RatingBand;
pub use rules::{classify, effectiveness_percent, overall_average, section_average};

use super::domain::{EvaluationSections, SectionKind};
pub(crate) use rules::round_to_hundredths;
use serde::{Deserialize, Serialize};

/// Average for one section, kept alongside the section it came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionAverage {
    pub section: SectionKind,
    pub average: f64,
}

/// Every derived field of an evaluation, computed in one pass from its sections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub section_averages: Vec<SectionAverage>,
    /// Stored rounded to two decimals; effectiveness is derived from the unrounded mean.
    pub overall_average: f64,
    pub effectiveness_percent: u8,
    pub strengths: Vec<String>,
    pub opportunity_areas: Vec<String>,
}

impl ScoreCard {
    pub fn average_for(&self, section: SectionKind) -> f64 {
        self.section_averages
            .iter()
            .find(|entry| entry.section == section)
            .map(|entry| entry.average)
            .unwrap_or(0.0)
    }

    pub fn has_signal(&self) -> bool {
        self.overall_average > 0.0
    }
}

pub fn score(sections: &EvaluationSections) -> ScoreCard {
    let section_averages: Vec<SectionAverage> = sections
        .iter()
        .map(|(section, data)| SectionAverage {
            section,
            average: section_average(data.ratings()),
        })
        .collect();

    let averages: Vec<f64> = section_averages.iter().map(|entry| entry.average).collect();
    let overall = overall_average(&averages);
    let (strengths, opportunity_areas) = classify(sections);

    ScoreCard {
        section_averages,
        overall_average: round_to_hundredths(overall),
        effectiveness_percent: effectiveness_percent(overall),
        strengths,
        opportunity_areas,
    }
}
