use coach_eval::workflows::evaluations::{
    Evaluation, EvaluationId, EvaluationRepository, RepositoryError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local document store. Evaluations are lost on restart.
#[derive(Default, Clone)]
pub(crate) struct InMemoryEvaluationRepository {
    records: Arc<Mutex<HashMap<EvaluationId, Evaluation>>>,
}

impl InMemoryEvaluationRepository {
    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<EvaluationId, Evaluation>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("evaluation store poisoned".to_string()))
    }
}

impl EvaluationRepository for InMemoryEvaluationRepository {
    fn insert(&self, evaluation: Evaluation) -> Result<Evaluation, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.contains_key(&evaluation.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(evaluation.id.clone(), evaluation.clone());
        Ok(evaluation)
    }

    fn update(&self, evaluation: Evaluation) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        if guard.contains_key(&evaluation.id) {
            guard.insert(evaluation.id.clone(), evaluation);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &EvaluationId) -> Result<Option<Evaluation>, RepositoryError> {
        Ok(self.lock()?.get(id).cloned())
    }

    fn by_employee(&self, employee_id: &str) -> Result<Vec<Evaluation>, RepositoryError> {
        Ok(self
            .lock()?
            .values()
            .filter(|evaluation| evaluation.employee.id == employee_id)
            .cloned()
            .collect())
    }

    fn all(&self) -> Result<Vec<Evaluation>, RepositoryError> {
        Ok(self.lock()?.values().cloned().collect())
    }
}
