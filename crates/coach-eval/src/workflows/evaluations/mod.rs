//! Coaching evaluations: the competency catalog, scoring rules, the draft → finalized
//! lifecycle, autosaving edit sessions, and the HTTP surface over them.

pub mod autosave;
pub mod catalog;
pub mod domain;
pub mod lifecycle;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod session;
pub mod views;

#[cfg(test)]
mod tests;

pub use autosave::{Autosaver, DraftSaver, SaveOutcome, SharedSession};
pub use catalog::{CatalogError, CatalogView, CompetencyCatalog};
pub use domain::{
    CoachContext, CoachRef, CompetencyScore, EmployeeRef, Evaluation, EvaluationId,
    EvaluationSections, EvaluationStatus, InvalidRating, Rating, Section, SectionKind,
};
pub use lifecycle::{DraftUpdate, LifecycleError, RatingChange};
pub use repository::{EvaluationRepository, RepositoryError};
pub use router::{evaluation_router, FinalizeRequest, PeriodQuery, StartEvaluationRequest};
pub use scoring::{RatingBand, ScoreCard, SectionAverage};
pub use service::{EvaluationService, EvaluationServiceError};
pub use session::{EditSession, ExitDecision};
pub use views::{EvaluationSummaryView, EvaluationView, SectionView};
