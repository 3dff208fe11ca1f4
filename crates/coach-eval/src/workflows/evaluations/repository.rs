use super::domain::{Evaluation, EvaluationId};

/// Document-store abstraction so the service can be exercised without a real backend.
pub trait EvaluationRepository: Send + Sync {
    fn insert(&self, evaluation: Evaluation) -> Result<Evaluation, RepositoryError>;
    fn update(&self, evaluation: Evaluation) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &EvaluationId) -> Result<Option<Evaluation>, RepositoryError>;
    fn by_employee(&self, employee_id: &str) -> Result<Vec<Evaluation>, RepositoryError>;
    fn all(&self) -> Result<Vec<Evaluation>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("evaluation already exists")]
    Conflict,
    #[error("evaluation not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
