use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::config::EvaluationSettings;
use crate::workflows::evaluations::{
    CoachContext, CoachRef, CompetencyCatalog, EmployeeRef, Evaluation, EvaluationId,
    EvaluationRepository, EvaluationService, Rating, RepositoryError, SectionKind,
};

pub(super) fn coach() -> CoachRef {
    CoachRef {
        id: "coach-7".to_string(),
        name: "Laura Méndez".to_string(),
    }
}

pub(super) fn context() -> CoachContext {
    CoachContext {
        organization_id: "org-herflo".to_string(),
        coach: coach(),
    }
}

pub(super) fn employee() -> EmployeeRef {
    EmployeeRef {
        id: "emp-42".to_string(),
        name: "Carlos Ruiz".to_string(),
    }
}

pub(super) fn catalog() -> CompetencyCatalog {
    CompetencyCatalog::reference()
}

pub(super) fn settings() -> EvaluationSettings {
    EvaluationSettings {
        organization_id: "org-herflo".to_string(),
        ..EvaluationSettings::default()
    }
}

pub(super) fn evaluation_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 12).expect("valid date")
}

pub(super) fn next_review() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, 12).expect("valid date")
}

pub(super) fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, day, hour, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn new_draft(id: &str) -> Evaluation {
    Evaluation::draft(
        EvaluationId(id.to_string()),
        &context(),
        employee(),
        evaluation_date(),
        &catalog(),
        at(12, 9),
    )
}

/// Give every competency of `section` the same rating.
pub(super) fn rate_section(evaluation: &mut Evaluation, section: SectionKind, rating: Rating) {
    let names: Vec<String> = evaluation
        .sections
        .get(section)
        .items
        .iter()
        .map(|item| item.competency.clone())
        .collect();
    for name in names {
        evaluation
            .rate(section, &name, rating)
            .expect("draft accepts ratings");
    }
}

pub(super) fn rate_all(evaluation: &mut Evaluation, rating: Rating) {
    for section in SectionKind::ordered() {
        rate_section(evaluation, section, rating);
    }
}

pub(super) fn first_competency(section: SectionKind) -> String {
    catalog().competencies(section)[0].clone()
}

pub(super) fn build_service() -> (EvaluationService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = EvaluationService::new(repository.clone(), catalog(), settings());
    (service, repository)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<EvaluationId, Evaluation>>>,
    pub(super) updates: Arc<AtomicUsize>,
}

impl MemoryRepository {
    pub(super) fn stored(&self, id: &EvaluationId) -> Option<Evaluation> {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .get(id)
            .cloned()
    }

    pub(super) fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }
}

impl EvaluationRepository for MemoryRepository {
    fn insert(&self, evaluation: Evaluation) -> Result<Evaluation, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&evaluation.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(evaluation.id.clone(), evaluation.clone());
        Ok(evaluation)
    }

    fn update(&self, evaluation: Evaluation) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if !guard.contains_key(&evaluation.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(evaluation.id.clone(), evaluation);
        self.updates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn fetch(&self, id: &EvaluationId) -> Result<Option<Evaluation>, RepositoryError> {
        Ok(self.stored(id))
    }

    fn by_employee(&self, employee_id: &str) -> Result<Vec<Evaluation>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|evaluation| evaluation.employee.id == employee_id)
            .cloned()
            .collect())
    }

    fn all(&self) -> Result<Vec<Evaluation>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

/// Memory store whose writes can be switched off to simulate an outage.
#[derive(Default, Clone)]
pub(super) struct FlakyRepository {
    pub(super) inner: MemoryRepository,
    pub(super) failing: Arc<AtomicBool>,
}

impl FlakyRepository {
    pub(super) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl EvaluationRepository for FlakyRepository {
    fn insert(&self, evaluation: Evaluation) -> Result<Evaluation, RepositoryError> {
        self.inner.insert(evaluation)
    }

    fn update(&self, evaluation: Evaluation) -> Result<(), RepositoryError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("connection reset".to_string()));
        }
        self.inner.update(evaluation)
    }

    fn fetch(&self, id: &EvaluationId) -> Result<Option<Evaluation>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn by_employee(&self, employee_id: &str) -> Result<Vec<Evaluation>, RepositoryError> {
        self.inner.by_employee(employee_id)
    }

    fn all(&self) -> Result<Vec<Evaluation>, RepositoryError> {
        self.inner.all()
    }
}

pub(super) struct UnavailableRepository;

impl EvaluationRepository for UnavailableRepository {
    fn insert(&self, _evaluation: Evaluation) -> Result<Evaluation, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _evaluation: Evaluation) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &EvaluationId) -> Result<Option<Evaluation>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn by_employee(&self, _employee_id: &str) -> Result<Vec<Evaluation>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn all(&self) -> Result<Vec<Evaluation>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
