use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::domain::{
    CoachRef, CompetencyScore, EmployeeRef, Evaluation, EvaluationId, EvaluationStatus,
    SectionKind,
};

/// Read-only projection handed to API callers and viewers of finalized evaluations.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationView {
    pub id: EvaluationId,
    pub employee: EmployeeRef,
    pub coach: CoachRef,
    pub date: NaiveDate,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finalized_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finalized_by: Option<CoachRef>,
    pub sections: Vec<SectionView>,
    pub overall_average: f64,
    pub effectiveness_percent: u8,
    pub strengths: Vec<String>,
    pub opportunity_areas: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub general_notes: Option<String>,
    pub commitments: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_review: Option<NaiveDate>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionView {
    pub section: SectionKind,
    pub label: &'static str,
    pub complete: bool,
    pub average: f64,
    pub items: Vec<CompetencyScore>,
}

/// Compact row for listings.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationSummaryView {
    pub id: EvaluationId,
    pub employee: EmployeeRef,
    pub date: NaiveDate,
    pub status: &'static str,
    pub effectiveness_percent: u8,
    pub opportunity_count: usize,
}

impl Evaluation {
    pub fn view(&self) -> EvaluationView {
        let (finalized_at, finalized_by) = match &self.status {
            EvaluationStatus::Finalized {
                finalized_at,
                finalized_by,
            } => (Some(*finalized_at), Some(finalized_by.clone())),
            EvaluationStatus::Draft { .. } => (None, None),
        };

        EvaluationView {
            id: self.id.clone(),
            employee: self.employee.clone(),
            coach: self.coach.clone(),
            date: self.date,
            status: self.status.label(),
            finalized_at,
            finalized_by,
            sections: self
                .sections
                .iter()
                .map(|(kind, section)| SectionView {
                    section: kind,
                    label: kind.label(),
                    complete: section.is_complete(),
                    average: section.average,
                    items: section.items.clone(),
                })
                .collect(),
            overall_average: self.overall_average,
            effectiveness_percent: self.effectiveness_percent,
            strengths: self.strengths.clone(),
            opportunity_areas: self.opportunity_areas.clone(),
            general_notes: self.general_notes.clone(),
            commitments: self.commitments.clone(),
            next_review: self.next_review,
            updated_at: self.updated_at,
        }
    }

    pub fn summary_view(&self) -> EvaluationSummaryView {
        EvaluationSummaryView {
            id: self.id.clone(),
            employee: self.employee.clone(),
            date: self.date,
            status: self.status.label(),
            effectiveness_percent: self.effectiveness_percent,
            opportunity_count: self.opportunity_areas.len(),
        }
    }
}
