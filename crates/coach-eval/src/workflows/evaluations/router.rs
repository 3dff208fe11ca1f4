use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;

use super::domain::{CoachContext, CoachRef, EmployeeRef, EvaluationId};
use super::lifecycle::{DraftUpdate, LifecycleError};
use super::repository::{EvaluationRepository, RepositoryError};
use super::service::{EvaluationService, EvaluationServiceError};

/// Body for starting a new draft. The acting coach comes from the caller's session.
#[derive(Debug, Clone, Deserialize)]
pub struct StartEvaluationRequest {
    pub coach: CoachRef,
    pub employee: EmployeeRef,
    #[serde(default)]
    pub organization_id: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FinalizeRequest {
    pub coach: CoachRef,
}

/// Inclusive date range for `GET /api/v1/reports/period`.
#[derive(Debug, Clone, Deserialize)]
pub struct PeriodQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Router builder exposing HTTP endpoints for the evaluation lifecycle.
pub fn evaluation_router<R>(service: Arc<EvaluationService<R>>) -> Router
where
    R: EvaluationRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/evaluations",
            post(start_handler::<R>).get(list_handler::<R>),
        )
        .route("/api/v1/evaluations/:evaluation_id", get(get_handler::<R>))
        .route(
            "/api/v1/evaluations/:evaluation_id/draft",
            put(save_draft_handler::<R>),
        )
        .route(
            "/api/v1/evaluations/:evaluation_id/finalize",
            post(finalize_handler::<R>),
        )
        .route(
            "/api/v1/employees/:employee_id/evaluations",
            get(employee_handler::<R>),
        )
        .route("/api/v1/catalog", get(catalog_handler::<R>))
        .route("/api/v1/reports/overview", get(overview_handler::<R>))
        .route("/api/v1/reports/period", get(period_handler::<R>))
        .with_state(service)
}

pub(crate) fn status_for(error: &EvaluationServiceError) -> StatusCode {
    match error {
        EvaluationServiceError::Lifecycle(LifecycleError::InvalidTransition { .. }) => {
            StatusCode::CONFLICT
        }
        EvaluationServiceError::Lifecycle(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EvaluationServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        EvaluationServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        EvaluationServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

pub(crate) fn error_response(error: EvaluationServiceError) -> Response {
    let status = status_for(&error);
    let payload = match &error {
        EvaluationServiceError::Lifecycle(LifecycleError::IncompleteSection { sections }) => json!({
            "error": error.to_string(),
            "kind": "incomplete_section",
            "sections": sections,
        }),
        EvaluationServiceError::Lifecycle(lifecycle) => json!({
            "error": error.to_string(),
            "kind": lifecycle.kind(),
        }),
        EvaluationServiceError::Repository(_) => json!({
            "error": error.to_string(),
        }),
    };
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn start_handler<R>(
    State(service): State<Arc<EvaluationService<R>>>,
    axum::Json(request): axum::Json<StartEvaluationRequest>,
) -> Response
where
    R: EvaluationRepository + 'static,
{
    let StartEvaluationRequest {
        coach,
        employee,
        organization_id,
        date,
    } = request;

    let context = match organization_id {
        Some(organization_id) => CoachContext {
            organization_id,
            coach,
        },
        None => service.context_for(coach),
    };
    let date = date.unwrap_or_else(|| Utc::now().date_naive());

    match service.start(&context, employee, date) {
        Ok(evaluation) => (StatusCode::CREATED, axum::Json(evaluation.view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_handler<R>(State(service): State<Arc<EvaluationService<R>>>) -> Response
where
    R: EvaluationRepository + 'static,
{
    match service.list() {
        Ok(evaluations) => {
            let rows: Vec<_> = evaluations.iter().map(|e| e.summary_view()).collect();
            (StatusCode::OK, axum::Json(rows)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_handler<R>(
    State(service): State<Arc<EvaluationService<R>>>,
    Path(evaluation_id): Path<String>,
) -> Response
where
    R: EvaluationRepository + 'static,
{
    match service.get(&EvaluationId(evaluation_id)) {
        Ok(evaluation) => (StatusCode::OK, axum::Json(evaluation.view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn save_draft_handler<R>(
    State(service): State<Arc<EvaluationService<R>>>,
    Path(evaluation_id): Path<String>,
    axum::Json(update): axum::Json<DraftUpdate>,
) -> Response
where
    R: EvaluationRepository + 'static,
{
    match service.save_draft(&EvaluationId(evaluation_id), update) {
        Ok(evaluation) => (StatusCode::OK, axum::Json(evaluation.view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn finalize_handler<R>(
    State(service): State<Arc<EvaluationService<R>>>,
    Path(evaluation_id): Path<String>,
    axum::Json(request): axum::Json<FinalizeRequest>,
) -> Response
where
    R: EvaluationRepository + 'static,
{
    let context = service.context_for(request.coach);
    match service.finalize(&EvaluationId(evaluation_id), &context) {
        Ok(evaluation) => (StatusCode::OK, axum::Json(evaluation.view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn employee_handler<R>(
    State(service): State<Arc<EvaluationService<R>>>,
    Path(employee_id): Path<String>,
) -> Response
where
    R: EvaluationRepository + 'static,
{
    match service.for_employee(&employee_id) {
        Ok(evaluations) => {
            let rows: Vec<_> = evaluations.iter().map(|e| e.summary_view()).collect();
            (StatusCode::OK, axum::Json(rows)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn catalog_handler<R>(State(service): State<Arc<EvaluationService<R>>>) -> Response
where
    R: EvaluationRepository + 'static,
{
    (StatusCode::OK, axum::Json(service.catalog().view())).into_response()
}

pub(crate) async fn overview_handler<R>(
    State(service): State<Arc<EvaluationService<R>>>,
) -> Response
where
    R: EvaluationRepository + 'static,
{
    match service.overview(Utc::now()) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn period_handler<R>(
    State(service): State<Arc<EvaluationService<R>>>,
    Query(period): Query<PeriodQuery>,
) -> Response
where
    R: EvaluationRepository + 'static,
{
    if period.start > period.end {
        let payload = json!({ "error": "period start must not be after its end" });
        return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
    }

    match service.period_report(period.start, period.end) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}
