use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::CompetencyCatalog;
use super::domain::{
    CoachContext, CoachRef, EmployeeRef, Evaluation, EvaluationId, EvaluationStatus, Rating,
    SectionKind,
};
use super::scoring::{self, ScoreCard};

/// Rejected lifecycle operations. None of these leave a partial change behind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    #[error("evaluation is incomplete; unrated competencies remain in: {}", join_sections(.sections))]
    IncompleteSection { sections: Vec<SectionKind> },
    #[error("a next review date is required before finalizing")]
    MissingNextReview,
    #[error("cannot {action} an evaluation that is {state}")]
    InvalidTransition {
        state: &'static str,
        action: &'static str,
    },
    #[error("competency '{competency}' is not part of section {section}")]
    UnknownCompetency {
        section: SectionKind,
        competency: String,
    },
    #[error("commitment {index} does not exist ({len} recorded)")]
    CommitmentOutOfRange { index: usize, len: usize },
}

impl LifecycleError {
    pub const fn kind(&self) -> &'static str {
        match self {
            LifecycleError::IncompleteSection { .. } => "incomplete_section",
            LifecycleError::MissingNextReview => "missing_next_review",
            LifecycleError::InvalidTransition { .. } => "invalid_transition",
            LifecycleError::UnknownCompetency { .. } => "unknown_competency",
            LifecycleError::CommitmentOutOfRange { .. } => "commitment_out_of_range",
        }
    }
}

fn join_sections(sections: &[SectionKind]) -> String {
    sections
        .iter()
        .map(|section| section.label())
        .collect::<Vec<_>>()
        .join(", ")
}

impl Evaluation {
    /// Start a draft with every catalog competency present and unrated.
    pub fn draft(
        id: EvaluationId,
        context: &CoachContext,
        employee: EmployeeRef,
        date: NaiveDate,
        catalog: &CompetencyCatalog,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            organization_id: context.organization_id.clone(),
            employee,
            coach: context.coach.clone(),
            date,
            status: EvaluationStatus::Draft {
                last_saved_at: None,
            },
            sections: catalog.unrated_sections(),
            overall_average: 0.0,
            effectiveness_percent: 0,
            strengths: Vec::new(),
            opportunity_areas: Vec::new(),
            general_notes: None,
            commitments: Vec::new(),
            next_review: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_draft(&self) -> bool {
        matches!(self.status, EvaluationStatus::Draft { .. })
    }

    pub fn is_finalized(&self) -> bool {
        matches!(self.status, EvaluationStatus::Finalized { .. })
    }

    pub fn finalized_at(&self) -> Option<DateTime<Utc>> {
        match &self.status {
            EvaluationStatus::Finalized { finalized_at, .. } => Some(*finalized_at),
            EvaluationStatus::Draft { .. } => None,
        }
    }

    pub(crate) fn ensure_draft(&self, action: &'static str) -> Result<(), LifecycleError> {
        match &self.status {
            EvaluationStatus::Draft { .. } => Ok(()),
            EvaluationStatus::Finalized { .. } => Err(LifecycleError::InvalidTransition {
                state: self.status.label(),
                action,
            }),
        }
    }

    pub fn rate(
        &mut self,
        section: SectionKind,
        competency: &str,
        rating: Rating,
    ) -> Result<(), LifecycleError> {
        self.ensure_draft("rate")?;
        let item = self
            .sections
            .get_mut(section)
            .item_mut(competency)
            .ok_or_else(|| LifecycleError::UnknownCompetency {
                section,
                competency: competency.to_string(),
            })?;
        item.rating = rating;
        Ok(())
    }

    pub fn annotate(
        &mut self,
        section: SectionKind,
        competency: &str,
        note: Option<String>,
    ) -> Result<(), LifecycleError> {
        self.ensure_draft("annotate")?;
        let item = self
            .sections
            .get_mut(section)
            .item_mut(competency)
            .ok_or_else(|| LifecycleError::UnknownCompetency {
                section,
                competency: competency.to_string(),
            })?;
        item.note = note.filter(|value| !value.trim().is_empty());
        Ok(())
    }

    pub fn set_general_notes(&mut self, notes: Option<String>) -> Result<(), LifecycleError> {
        self.ensure_draft("edit")?;
        self.general_notes = notes.filter(|value| !value.trim().is_empty());
        Ok(())
    }

    /// Returns `false` when the commitment was blank and therefore ignored.
    pub fn add_commitment(&mut self, commitment: impl Into<String>) -> Result<bool, LifecycleError> {
        self.ensure_draft("edit")?;
        let commitment = commitment.into();
        if commitment.trim().is_empty() {
            return Ok(false);
        }
        self.commitments.push(commitment);
        Ok(true)
    }

    pub fn remove_commitment(&mut self, index: usize) -> Result<String, LifecycleError> {
        self.ensure_draft("edit")?;
        if index >= self.commitments.len() {
            return Err(LifecycleError::CommitmentOutOfRange {
                index,
                len: self.commitments.len(),
            });
        }
        Ok(self.commitments.remove(index))
    }

    pub fn replace_commitments(&mut self, commitments: Vec<String>) -> Result<(), LifecycleError> {
        self.ensure_draft("edit")?;
        self.commitments = commitments
            .into_iter()
            .filter(|commitment| !commitment.trim().is_empty())
            .collect();
        Ok(())
    }

    pub fn set_next_review(&mut self, next_review: Option<NaiveDate>) -> Result<(), LifecycleError> {
        self.ensure_draft("edit")?;
        self.next_review = next_review;
        Ok(())
    }

    pub fn set_date(&mut self, date: NaiveDate) -> Result<(), LifecycleError> {
        self.ensure_draft("edit")?;
        self.date = date;
        Ok(())
    }

    pub fn incomplete_sections(&self) -> Vec<SectionKind> {
        self.sections.incomplete()
    }

    fn apply_score_card(&mut self, card: &ScoreCard) {
        for entry in &card.section_averages {
            self.sections.get_mut(entry.section).average = entry.average;
        }
        self.overall_average = card.overall_average;
        self.effectiveness_percent = card.effectiveness_percent;
        self.strengths = card.strengths.clone();
        self.opportunity_areas = card.opportunity_areas.clone();
    }

    /// Persistable draft checkpoint. Derived fields are always recomputed so stored drafts
    /// never carry stale averages.
    pub fn save_draft(&mut self, now: DateTime<Utc>) -> Result<ScoreCard, LifecycleError> {
        self.ensure_draft("save")?;
        let card = scoring::score(&self.sections);
        self.apply_score_card(&card);
        self.updated_at = now;
        self.status = EvaluationStatus::Draft {
            last_saved_at: Some(now),
        };
        Ok(card)
    }

    /// Terminal transition. Preconditions are checked in order (state, completeness,
    /// next review) before anything is touched.
    pub fn finalize(
        &mut self,
        coach: &CoachRef,
        now: DateTime<Utc>,
    ) -> Result<ScoreCard, LifecycleError> {
        self.ensure_draft("finalize")?;

        let incomplete = self.incomplete_sections();
        if !incomplete.is_empty() {
            return Err(LifecycleError::IncompleteSection {
                sections: incomplete,
            });
        }
        if self.next_review.is_none() {
            return Err(LifecycleError::MissingNextReview);
        }

        let card = scoring::score(&self.sections);
        self.apply_score_card(&card);
        self.updated_at = now;
        self.status = EvaluationStatus::Finalized {
            finalized_at: now,
            finalized_by: coach.clone(),
        };
        Ok(card)
    }

    /// Advisory only: a draft whose last save is older than `threshold`.
    pub fn is_stale(&self, now: DateTime<Utc>, threshold: chrono::Duration) -> bool {
        match &self.status {
            EvaluationStatus::Draft { .. } => now - self.updated_at > threshold,
            EvaluationStatus::Finalized { .. } => false,
        }
    }
}

/// Single rating change inside a [`DraftUpdate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingChange {
    pub section: SectionKind,
    pub competency: String,
    pub rating: Rating,
    #[serde(default)]
    pub note: Option<String>,
}

/// Batch of draft edits as submitted by a form save. Absent fields are left untouched;
/// `general_notes` and `next_review` sent as `null` clear the stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DraftUpdate {
    #[serde(default)]
    pub ratings: Vec<RatingChange>,
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub general_notes: Option<Option<String>>,
    #[serde(default)]
    pub commitments: Option<Vec<String>>,
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub next_review: Option<Option<NaiveDate>>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// Keeps an explicit `null` apart from a missing field: missing stays `None` through
/// `#[serde(default)]`, anything present becomes `Some`.
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl DraftUpdate {
    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
            && self.general_notes.is_none()
            && self.commitments.is_none()
            && self.next_review.is_none()
            && self.date.is_none()
    }

    /// Applies every change or none of them.
    pub fn apply(self, evaluation: &mut Evaluation) -> Result<(), LifecycleError> {
        evaluation.ensure_draft("edit")?;
        let mut staged = evaluation.clone();

        for change in self.ratings {
            staged.rate(change.section, &change.competency, change.rating)?;
            if change.note.is_some() {
                staged.annotate(change.section, &change.competency, change.note)?;
            }
        }
        if let Some(notes) = self.general_notes {
            staged.set_general_notes(notes)?;
        }
        if let Some(commitments) = self.commitments {
            staged.replace_commitments(commitments)?;
        }
        if let Some(next_review) = self.next_review {
            staged.set_next_review(next_review)?;
        }
        if let Some(date) = self.date {
            staged.set_date(date)?;
        }

        *evaluation = staged;
        Ok(())
    }
}
