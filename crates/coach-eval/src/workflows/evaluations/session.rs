use chrono::{DateTime, NaiveDate, Utc};

use super::domain::{Evaluation, EvaluationId, EvaluationStatus, Rating, SectionKind};
use super::lifecycle::{DraftUpdate, LifecycleError};

/// What the caller must do before leaving an editing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitDecision {
    Clean,
    /// Unsaved edits exist; warn the coach before discarding them.
    UnsavedChanges,
}

/// Exclusive owner of an in-progress draft. Every accepted mutation bumps the revision and
/// marks the buffer dirty until a save of that same revision lands.
#[derive(Debug, Clone)]
pub struct EditSession {
    buffer: Evaluation,
    revision: u64,
    saved_revision: u64,
    last_saved_at: Option<DateTime<Utc>>,
}

impl EditSession {
    pub fn open(evaluation: Evaluation) -> Result<Self, LifecycleError> {
        evaluation.ensure_draft("edit")?;
        Ok(Self {
            buffer: evaluation,
            revision: 0,
            saved_revision: 0,
            last_saved_at: None,
        })
    }

    pub fn id(&self) -> &EvaluationId {
        &self.buffer.id
    }

    pub fn evaluation(&self) -> &Evaluation {
        &self.buffer
    }

    pub fn is_dirty(&self) -> bool {
        self.revision != self.saved_revision
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        self.last_saved_at
    }

    fn touched<T>(&mut self, result: Result<T, LifecycleError>) -> Result<T, LifecycleError> {
        if result.is_ok() {
            self.revision += 1;
        }
        result
    }

    pub fn rate(
        &mut self,
        section: SectionKind,
        competency: &str,
        rating: Rating,
    ) -> Result<(), LifecycleError> {
        let result = self.buffer.rate(section, competency, rating);
        self.touched(result)
    }

    pub fn annotate(
        &mut self,
        section: SectionKind,
        competency: &str,
        note: Option<String>,
    ) -> Result<(), LifecycleError> {
        let result = self.buffer.annotate(section, competency, note);
        self.touched(result)
    }

    pub fn set_general_notes(&mut self, notes: Option<String>) -> Result<(), LifecycleError> {
        let result = self.buffer.set_general_notes(notes);
        self.touched(result)
    }

    pub fn add_commitment(&mut self, commitment: impl Into<String>) -> Result<bool, LifecycleError> {
        let added = self.buffer.add_commitment(commitment)?;
        if added {
            self.revision += 1;
        }
        Ok(added)
    }

    pub fn remove_commitment(&mut self, index: usize) -> Result<String, LifecycleError> {
        let result = self.buffer.remove_commitment(index);
        self.touched(result)
    }

    pub fn set_next_review(&mut self, next_review: Option<NaiveDate>) -> Result<(), LifecycleError> {
        let result = self.buffer.set_next_review(next_review);
        self.touched(result)
    }

    pub fn apply(&mut self, update: DraftUpdate) -> Result<(), LifecycleError> {
        if update.is_empty() {
            return Ok(());
        }
        let result = update.apply(&mut self.buffer);
        self.touched(result)
    }

    /// Copy of the buffer tagged with the revision it represents.
    pub fn snapshot(&self) -> (u64, Evaluation) {
        (self.revision, self.buffer.clone())
    }

    /// Record a completed save. When edits arrived while the save was in flight the buffer
    /// stays dirty and keeps those edits; otherwise it adopts the stored copy.
    pub fn mark_saved(&mut self, revision: u64, stored: Evaluation) {
        let saved_at = match &stored.status {
            EvaluationStatus::Draft { last_saved_at } => {
                last_saved_at.unwrap_or(stored.updated_at)
            }
            EvaluationStatus::Finalized { finalized_at, .. } => *finalized_at,
        };
        self.last_saved_at = Some(saved_at);

        if revision == self.revision {
            self.buffer = stored;
            self.saved_revision = revision;
        }
    }

    pub fn request_exit(&self) -> ExitDecision {
        if self.is_dirty() {
            ExitDecision::UnsavedChanges
        } else {
            ExitDecision::Clean
        }
    }

    /// Drop the buffer without saving. Callers are expected to have checked
    /// [`request_exit`](EditSession::request_exit) first.
    pub fn discard(self) -> EvaluationId {
        self.buffer.id
    }
}
