use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::workflows::evaluations::router::{finalize_handler, get_handler, start_handler};
use crate::workflows::evaluations::{
    evaluation_router, EvaluationId, EvaluationService, FinalizeRequest, SectionKind,
    StartEvaluationRequest,
};

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn start_body() -> Value {
    json!({
        "coach": { "id": "coach-7", "name": "Laura Méndez" },
        "employee": { "id": "emp-42", "name": "Carlos Ruiz" },
        "date": "2025-06-12"
    })
}

fn all_ratings(rating: u8) -> Value {
    let ratings: Vec<Value> = SectionKind::ordered()
        .into_iter()
        .flat_map(|section| {
            catalog()
                .competencies(section)
                .iter()
                .map(|competency| {
                    json!({
                        "section": section.key(),
                        "competency": competency,
                        "rating": rating,
                    })
                })
                .collect::<Vec<_>>()
        })
        .collect();
    Value::Array(ratings)
}

#[tokio::test]
async fn start_route_creates_a_draft() {
    let (service, repository) = build_service();
    let router = evaluation_router(Arc::new(service));

    let response = router
        .oneshot(json_request("POST", "/api/v1/evaluations", start_body()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json_body(response).await;
    assert_eq!(body["status"], "draft");
    assert_eq!(body["sections"].as_array().unwrap().len(), 4);
    assert_eq!(body["effectiveness_percent"], 0);
    let id = body["id"].as_str().unwrap().to_string();
    assert!(repository.stored(&EvaluationId(id)).is_some());
}

#[tokio::test]
async fn draft_save_and_finalize_round_trip() {
    let (service, _) = build_service();
    let router = evaluation_router(Arc::new(service));

    let created = router
        .clone()
        .oneshot(json_request("POST", "/api/v1/evaluations", start_body()))
        .await
        .unwrap();
    let id = read_json_body(created).await["id"]
        .as_str()
        .unwrap()
        .to_string();

    let premature = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/evaluations/{id}/finalize"),
            json!({ "coach": { "id": "coach-7", "name": "Laura Méndez" } }),
        ))
        .await
        .unwrap();
    assert_eq!(premature.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(premature).await;
    assert_eq!(body["kind"], "incomplete_section");
    assert_eq!(body["sections"].as_array().unwrap().len(), 4);

    let saved = router
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/v1/evaluations/{id}/draft"),
            json!({ "ratings": all_ratings(2), "next_review": "2025-07-12" }),
        ))
        .await
        .unwrap();
    assert_eq!(saved.status(), StatusCode::OK);
    assert_eq!(read_json_body(saved).await["effectiveness_percent"], 75);

    let finalized = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/evaluations/{id}/finalize"),
            json!({ "coach": { "id": "coach-7", "name": "Laura Méndez" } }),
        ))
        .await
        .unwrap();
    assert_eq!(finalized.status(), StatusCode::OK);
    let body = read_json_body(finalized).await;
    assert_eq!(body["status"], "finalized");
    assert_eq!(body["finalized_by"]["id"], "coach-7");

    let again = router
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/evaluations/{id}/finalize"),
            json!({ "coach": { "id": "coach-7", "name": "Laura Méndez" } }),
        ))
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::CONFLICT);
    assert_eq!(read_json_body(again).await["kind"], "invalid_transition");
}

#[tokio::test]
async fn draft_save_with_null_clears_next_review() {
    let (service, repository) = build_service();
    let router = evaluation_router(Arc::new(service));

    let created = router
        .clone()
        .oneshot(json_request("POST", "/api/v1/evaluations", start_body()))
        .await
        .unwrap();
    let id = read_json_body(created).await["id"]
        .as_str()
        .unwrap()
        .to_string();
    let uri = format!("/api/v1/evaluations/{id}/draft");

    let scheduled = router
        .clone()
        .oneshot(json_request(
            "PUT",
            &uri,
            json!({ "next_review": "2025-07-12", "general_notes": "Seguimiento" }),
        ))
        .await
        .unwrap();
    let body = read_json_body(scheduled).await;
    assert_eq!(body["next_review"], "2025-07-12");
    assert_eq!(body["general_notes"], "Seguimiento");

    let cleared = router
        .oneshot(json_request("PUT", &uri, json!({ "next_review": null })))
        .await
        .unwrap();
    assert_eq!(cleared.status(), StatusCode::OK);
    let body = read_json_body(cleared).await;
    assert!(body.get("next_review").is_none());
    assert_eq!(body["general_notes"], "Seguimiento");

    let stored = repository.stored(&EvaluationId(id)).unwrap();
    assert_eq!(stored.next_review, None);
    assert_eq!(stored.general_notes.as_deref(), Some("Seguimiento"));
}

#[tokio::test]
async fn out_of_range_rating_is_rejected_at_the_boundary() {
    let (service, repository) = build_service();
    let draft = service
        .start(&context(), employee(), evaluation_date())
        .unwrap();
    let router = evaluation_router(Arc::new(service));
    let competency = first_competency(SectionKind::SystemsUsage);

    let response = router
        .oneshot(json_request(
            "PUT",
            &format!("/api/v1/evaluations/{}/draft", draft.id),
            json!({
                "ratings": [{ "section": "systems_usage", "competency": competency, "rating": 7 }]
            }),
        ))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
    assert_eq!(repository.update_count(), 0);
}

#[tokio::test]
async fn catalog_route_lists_sections_in_order() {
    let (service, _) = build_service();
    let router = evaluation_router(Arc::new(service));

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/catalog")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    let sizes: Vec<usize> = body["sections"]
        .as_array()
        .unwrap()
        .iter()
        .map(|section| section["competencies"].as_array().unwrap().len())
        .collect();
    assert_eq!(sizes, vec![4, 15, 6, 8]);
    assert_eq!(body["sections"][0]["section"], "planning_and_organization");
}

#[tokio::test]
async fn employee_route_lists_summaries() {
    let (service, _) = build_service();
    service
        .start(&context(), employee(), evaluation_date())
        .unwrap();
    let router = evaluation_router(Arc::new(service));

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/employees/emp-42/evaluations")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let rows = read_json_body(response).await;
    assert_eq!(rows.as_array().unwrap().len(), 1);
    assert_eq!(rows[0]["status"], "draft");
}

#[tokio::test]
async fn period_route_reports_the_requested_range() {
    let (service, _) = build_service();
    service
        .start(&context(), employee(), evaluation_date())
        .unwrap();
    let router = evaluation_router(Arc::new(service));
    let get = |uri: &str| Request::builder().uri(uri).body(Body::empty()).unwrap();

    let response = router
        .clone()
        .oneshot(get("/api/v1/reports/period?start=2025-06-01&end=2025-06-30"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["start"], "2025-06-01");
    assert_eq!(body["evaluations"].as_array().unwrap().len(), 1);
    assert!(body["weekly_trend"].as_array().unwrap().is_empty());

    let reversed = router
        .clone()
        .oneshot(get("/api/v1/reports/period?start=2025-06-30&end=2025-06-01"))
        .await
        .unwrap();
    assert_eq!(reversed.status(), StatusCode::BAD_REQUEST);

    let missing = router
        .oneshot(get("/api/v1/reports/period?start=2025-06-01"))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_handler_returns_not_found_for_unknown_ids() {
    let (service, _) = build_service();

    let response = get_handler::<MemoryRepository>(
        State(Arc::new(service)),
        Path("eval-unknown".to_string()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn start_handler_returns_internal_error_on_repository_failure() {
    let service = Arc::new(EvaluationService::new(
        Arc::new(UnavailableRepository),
        catalog(),
        settings(),
    ));
    let request: StartEvaluationRequest = serde_json::from_value(start_body()).unwrap();

    let response = start_handler::<UnavailableRepository>(State(service), axum::Json(request)).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn finalize_handler_rejects_unrated_drafts() {
    let (service, repository) = build_service();
    let draft = service
        .start(&context(), employee(), evaluation_date())
        .unwrap();
    let request = FinalizeRequest { coach: coach() };

    let response = finalize_handler::<MemoryRepository>(
        State(Arc::new(service)),
        Path(draft.id.0.clone()),
        axum::Json(request),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(repository.stored(&draft.id).unwrap().is_draft());
}
