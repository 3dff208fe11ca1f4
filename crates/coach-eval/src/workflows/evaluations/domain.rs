use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for stored evaluations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EvaluationId(pub String);

impl fmt::Display for EvaluationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reference to the employee being evaluated. The employee record itself lives elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmployeeRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CoachRef {
    pub id: String,
    pub name: String,
}

/// Acting organization and coach, supplied by the caller on every operation that needs them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoachContext {
    pub organization_id: String,
    pub coach: CoachRef,
}

/// Ordinal rating for a single competency. Lower is better; `Unrated` and `NotApplicable`
/// carry no signal and never take part in an average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Rating {
    #[default]
    Unrated,
    Evident,
    InDevelopment,
    ToDevelop,
    NoEvidence,
    NotApplicable,
}

impl Rating {
    pub const fn value(self) -> u8 {
        match self {
            Rating::Unrated => 0,
            Rating::Evident => 1,
            Rating::InDevelopment => 2,
            Rating::ToDevelop => 3,
            Rating::NoEvidence => 4,
            Rating::NotApplicable => 5,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Rating::Unrated => "Unrated",
            Rating::Evident => "Evident",
            Rating::InDevelopment => "En Desarrollo",
            Rating::ToDevelop => "Por Desarrollar",
            Rating::NoEvidence => "Sin Evidencia",
            Rating::NotApplicable => "No Aplica",
        }
    }

    /// Anything other than `Unrated` counts toward section completeness, including N/A.
    pub const fn is_rated(self) -> bool {
        !matches!(self, Rating::Unrated)
    }

    pub const fn counts_toward_average(self) -> bool {
        matches!(
            self,
            Rating::Evident | Rating::InDevelopment | Rating::ToDevelop | Rating::NoEvidence
        )
    }
}

impl TryFrom<u8> for Rating {
    type Error = InvalidRating;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Rating::Unrated),
            1 => Ok(Rating::Evident),
            2 => Ok(Rating::InDevelopment),
            3 => Ok(Rating::ToDevelop),
            4 => Ok(Rating::NoEvidence),
            5 => Ok(Rating::NotApplicable),
            other => Err(InvalidRating(other)),
        }
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.value()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("rating must be between 0 and 5, got {0}")]
pub struct InvalidRating(pub u8);

/// The four fixed evaluation sections, in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    PlanningAndOrganization,
    NonNegotiables,
    SystemsUsage,
    ProductKnowledge,
}

impl SectionKind {
    pub const fn ordered() -> [SectionKind; 4] {
        [
            SectionKind::PlanningAndOrganization,
            SectionKind::NonNegotiables,
            SectionKind::SystemsUsage,
            SectionKind::ProductKnowledge,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            SectionKind::PlanningAndOrganization => "planning_and_organization",
            SectionKind::NonNegotiables => "non_negotiables",
            SectionKind::SystemsUsage => "systems_usage",
            SectionKind::ProductKnowledge => "product_knowledge",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            SectionKind::PlanningAndOrganization => "Planeación y Organización",
            SectionKind::NonNegotiables => "No Negociables",
            SectionKind::SystemsUsage => "Uso de Sistemas",
            SectionKind::ProductKnowledge => "Conocimiento del Producto",
        }
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            SectionKind::PlanningAndOrganization => 0,
            SectionKind::NonNegotiables => 1,
            SectionKind::SystemsUsage => 2,
            SectionKind::ProductKnowledge => 3,
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetencyScore {
    pub competency: String,
    pub rating: Rating,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl CompetencyScore {
    pub fn unrated(competency: impl Into<String>) -> Self {
        Self {
            competency: competency.into(),
            rating: Rating::Unrated,
            note: None,
        }
    }
}

/// Ordered competency scores for one section plus the last computed average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub items: Vec<CompetencyScore>,
    pub average: f64,
}

impl Section {
    pub fn unrated<I, S>(competencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            items: competencies
                .into_iter()
                .map(CompetencyScore::unrated)
                .collect(),
            average: 0.0,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.items.iter().all(|item| item.rating.is_rated())
    }

    pub fn ratings(&self) -> impl Iterator<Item = Rating> + '_ {
        self.items.iter().map(|item| item.rating)
    }

    pub fn unrated_competencies(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter(|item| !item.rating.is_rated())
            .map(|item| item.competency.as_str())
            .collect()
    }

    pub(crate) fn item_mut(&mut self, competency: &str) -> Option<&mut CompetencyScore> {
        self.items
            .iter_mut()
            .find(|item| item.competency == competency)
    }
}

/// Exactly four sections, one per [`SectionKind`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSections {
    pub planning_and_organization: Section,
    pub non_negotiables: Section,
    pub systems_usage: Section,
    pub product_knowledge: Section,
}

impl EvaluationSections {
    pub fn get(&self, kind: SectionKind) -> &Section {
        match kind {
            SectionKind::PlanningAndOrganization => &self.planning_and_organization,
            SectionKind::NonNegotiables => &self.non_negotiables,
            SectionKind::SystemsUsage => &self.systems_usage,
            SectionKind::ProductKnowledge => &self.product_knowledge,
        }
    }

    pub fn get_mut(&mut self, kind: SectionKind) -> &mut Section {
        match kind {
            SectionKind::PlanningAndOrganization => &mut self.planning_and_organization,
            SectionKind::NonNegotiables => &mut self.non_negotiables,
            SectionKind::SystemsUsage => &mut self.systems_usage,
            SectionKind::ProductKnowledge => &mut self.product_knowledge,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (SectionKind, &Section)> + '_ {
        SectionKind::ordered()
            .into_iter()
            .map(move |kind| (kind, self.get(kind)))
    }

    pub fn incomplete(&self) -> Vec<SectionKind> {
        self.iter()
            .filter(|(_, section)| !section.is_complete())
            .map(|(kind, _)| kind)
            .collect()
    }
}

/// Lifecycle state. Finalization metadata only exists on the finalized variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EvaluationStatus {
    Draft {
        #[serde(default)]
        last_saved_at: Option<DateTime<Utc>>,
    },
    Finalized {
        finalized_at: DateTime<Utc>,
        finalized_by: CoachRef,
    },
}

impl EvaluationStatus {
    pub const fn label(&self) -> &'static str {
        match self {
            EvaluationStatus::Draft { .. } => "draft",
            EvaluationStatus::Finalized { .. } => "finalized",
        }
    }
}

/// Aggregate root for a single coaching evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub id: EvaluationId,
    pub organization_id: String,
    pub employee: EmployeeRef,
    pub coach: CoachRef,
    pub date: NaiveDate,
    pub status: EvaluationStatus,
    pub sections: EvaluationSections,
    pub overall_average: f64,
    pub effectiveness_percent: u8,
    pub strengths: Vec<String>,
    pub opportunity_areas: Vec<String>,
    #[serde(default)]
    pub general_notes: Option<String>,
    #[serde(default)]
    pub commitments: Vec<String>,
    #[serde(default)]
    pub next_review: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
