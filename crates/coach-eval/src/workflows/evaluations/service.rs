use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info};

use super::catalog::CompetencyCatalog;
use super::domain::{CoachContext, CoachRef, EmployeeRef, Evaluation, EvaluationId};
use super::lifecycle::{DraftUpdate, LifecycleError};
use super::repository::{EvaluationRepository, RepositoryError};
use super::session::EditSession;
use crate::config::EvaluationSettings;
use crate::workflows::reports::{OverviewReport, PeriodReport};

/// Service composing the competency catalog, the lifecycle rules and the repository.
pub struct EvaluationService<R> {
    repository: Arc<R>,
    catalog: Arc<CompetencyCatalog>,
    settings: EvaluationSettings,
}

static EVALUATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_evaluation_id() -> EvaluationId {
    let id = EVALUATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    EvaluationId(format!("eval-{id:06}"))
}

fn newest_first(evaluations: &mut [Evaluation]) {
    evaluations.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
}

impl<R> EvaluationService<R>
where
    R: EvaluationRepository + 'static,
{
    pub fn new(repository: Arc<R>, catalog: CompetencyCatalog, settings: EvaluationSettings) -> Self {
        Self {
            repository,
            catalog: Arc::new(catalog),
            settings,
        }
    }

    pub fn catalog(&self) -> &CompetencyCatalog {
        &self.catalog
    }

    pub fn settings(&self) -> &EvaluationSettings {
        &self.settings
    }

    /// Context for a coach acting within the configured organization.
    pub fn context_for(&self, coach: CoachRef) -> CoachContext {
        CoachContext {
            organization_id: self.settings.organization_id.clone(),
            coach,
        }
    }

    /// Create and persist an unrated draft for `employee`.
    pub fn start(
        &self,
        context: &CoachContext,
        employee: EmployeeRef,
        date: NaiveDate,
    ) -> Result<Evaluation, EvaluationServiceError> {
        let evaluation = Evaluation::draft(
            next_evaluation_id(),
            context,
            employee,
            date,
            &self.catalog,
            Utc::now(),
        );

        let stored = self.repository.insert(evaluation)?;
        info!(
            evaluation = %stored.id,
            employee = %stored.employee.id,
            coach = %stored.coach.id,
            "evaluation draft started"
        );
        Ok(stored)
    }

    /// Apply a batch of edits to a stored draft and persist it with fresh derived fields.
    pub fn save_draft(
        &self,
        id: &EvaluationId,
        update: DraftUpdate,
    ) -> Result<Evaluation, EvaluationServiceError> {
        let mut evaluation = self.get(id)?;
        update.apply(&mut evaluation)?;
        self.store_draft(evaluation)
    }

    /// Persist an edit buffer wholesale. The stored copy must still be a draft.
    pub fn persist_draft(&self, draft: Evaluation) -> Result<Evaluation, EvaluationServiceError> {
        let stored = self.get(&draft.id)?;
        stored.ensure_draft("save")?;
        self.store_draft(draft)
    }

    fn store_draft(&self, mut evaluation: Evaluation) -> Result<Evaluation, EvaluationServiceError> {
        let card = evaluation.save_draft(Utc::now())?;
        self.repository.update(evaluation.clone())?;
        debug!(
            evaluation = %evaluation.id,
            overall_average = card.overall_average,
            effectiveness = card.effectiveness_percent,
            "draft saved"
        );
        Ok(evaluation)
    }

    /// Gate and apply the draft → finalized transition. Nothing is written on failure.
    pub fn finalize(
        &self,
        id: &EvaluationId,
        context: &CoachContext,
    ) -> Result<Evaluation, EvaluationServiceError> {
        let mut evaluation = self.get(id)?;

        let card = match evaluation.finalize(&context.coach, Utc::now()) {
            Ok(card) => card,
            Err(err) => {
                debug!(evaluation = %id, reason = err.kind(), "finalization rejected");
                return Err(err.into());
            }
        };

        self.repository.update(evaluation.clone())?;
        info!(
            evaluation = %evaluation.id,
            effectiveness = card.effectiveness_percent,
            opportunities = card.opportunity_areas.len(),
            "evaluation finalized"
        );
        Ok(evaluation)
    }

    pub fn get(&self, id: &EvaluationId) -> Result<Evaluation, EvaluationServiceError> {
        let evaluation = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(evaluation)
    }

    /// Evaluations for one employee, most recent first.
    pub fn for_employee(&self, employee_id: &str) -> Result<Vec<Evaluation>, EvaluationServiceError> {
        let mut evaluations = self.repository.by_employee(employee_id)?;
        newest_first(&mut evaluations);
        Ok(evaluations)
    }

    pub fn list(&self) -> Result<Vec<Evaluation>, EvaluationServiceError> {
        let mut evaluations = self.repository.all()?;
        newest_first(&mut evaluations);
        Ok(evaluations)
    }

    /// Editing is only offered for drafts; finalized evaluations are read-only via [`get`].
    ///
    /// [`get`]: EvaluationService::get
    pub fn open_for_edit(&self, id: &EvaluationId) -> Result<EditSession, EvaluationServiceError> {
        let evaluation = self.get(id)?;
        Ok(EditSession::open(evaluation)?)
    }

    pub fn overview(&self, now: DateTime<Utc>) -> Result<OverviewReport, EvaluationServiceError> {
        let evaluations = self.repository.all()?;
        Ok(OverviewReport::build(
            &evaluations,
            now,
            self.settings.stale_draft_after,
        ))
    }

    pub fn period_report(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PeriodReport, EvaluationServiceError> {
        let evaluations = self.repository.all()?;
        Ok(PeriodReport::build(&evaluations, start, end))
    }
}

/// Error raised by the evaluation service.
#[derive(Debug, thiserror::Error)]
pub enum EvaluationServiceError {
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
