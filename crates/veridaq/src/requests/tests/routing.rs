use super::common::*;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use crate::requests::domain::{FieldUpdate, RequestDraft, RequestId};
use crate::requests::repository::{RepositoryError, RequestRepository};
use crate::requests::router::{request_router, service_error, RequestApiState};
use crate::requests::service::{IndividualRequestService, RequestServiceError};
use crate::session::{SessionData, SessionOptions};

const TOKEN: &str = "tok-ada";

fn session_options() -> SessionOptions {
    SessionOptions {
        cookie_name: "veridaq-session".to_string(),
        password: "p".repeat(32),
        http_only: true,
        secure: false,
    }
}

fn router_with<R>(service: Arc<IndividualRequestService<R>>) -> axum::Router
where
    R: RequestRepository + 'static,
{
    let session = SessionData::logged_in(issuer().user_id.0, issuer().email);
    request_router(Arc::new(RequestApiState {
        service,
        sessions: Arc::new(MemorySessions::with(TOKEN, session)),
        session_options: session_options(),
    }))
}

fn post_draft(draft: &RequestDraft, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::post("/api/v1/individual-requests")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::COOKIE, format!("veridaq-session={token}"));
    }
    builder
        .body(Body::from(serde_json::to_vec(draft).expect("serializes")))
        .expect("request builds")
}

fn get_draft(id: &str, token: &str) -> Request<Body> {
    Request::get(format!("/api/v1/individual-requests/{id}"))
        .header(header::COOKIE, format!("veridaq-session={token}"))
        .body(Body::empty())
        .expect("request builds")
}

async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body collects");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn submit_route_creates_request() {
    let (service, repository) = build_service();
    let router = router_with(service);

    let response = router
        .oneshot(post_draft(&valid_draft(), Some(TOKEN)))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["issuerUser"], "user-ada");
    assert_eq!(body["issued"], false);
    assert_eq!(body["yearsOfRelationship"], "2016-03-14");
    assert_eq!(repository.len(), 1);
}

#[tokio::test]
async fn submit_route_requires_session() {
    let (service, repository) = build_service();

    let response = router_with(service.clone())
        .oneshot(post_draft(&valid_draft(), None))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = router_with(service)
        .oneshot(post_draft(&valid_draft(), Some("tok-unknown")))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(repository.len(), 0);
}

#[tokio::test]
async fn submit_route_returns_field_errors() {
    let (service, repository) = build_service();
    let draft = valid_draft()
        .with(FieldUpdate::PersonalityReview("brief".to_string()))
        .with(FieldUpdate::Relationship(String::new()));

    let response = router_with(service)
        .oneshot(post_draft(&draft, Some(TOKEN)))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    let errors = body["errors"].as_object().expect("error map");
    assert_eq!(errors.len(), 2);
    assert!(errors.contains_key("personalityReview"));
    assert!(errors.contains_key("relationship"));
    assert_eq!(repository.len(), 0);
}

#[tokio::test]
async fn submit_route_updates_existing_request() {
    let (service, repository) = build_service();
    let created = service
        .create_or_update(&issuer(), valid_fields(), None)
        .expect("created");
    let mut draft = valid_draft().with(FieldUpdate::Relationship("Sister".to_string()));
    draft.id = Some(created.id.clone());

    let response = router_with(service)
        .oneshot(post_draft(&draft, Some(TOKEN)))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let stored = repository
        .fetch(&created.id)
        .expect("fetch succeeds")
        .expect("present");
    assert_eq!(stored.fields.relationship, "Sister");
}

#[tokio::test]
async fn submit_route_maps_unknown_id_to_not_found() {
    let (service, _) = build_service();
    let mut draft = valid_draft();
    draft.id = Some(crate::requests::domain::RequestId("req-ghost".to_string()));

    let response = router_with(service)
        .oneshot(post_draft(&draft, Some(TOKEN)))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn submit_route_reports_outage_as_internal_error() {
    let service = Arc::new(IndividualRequestService::new(Arc::new(UnavailableRepository)));

    let response = router_with(service)
        .oneshot(post_draft(&valid_draft(), Some(TOKEN)))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn fetch_route_returns_draft() {
    let (service, _) = build_service();
    let created = service
        .create_or_update(&issuer(), valid_fields(), None)
        .expect("created");

    let response = router_with(service)
        .oneshot(get_draft(&created.id.0, TOKEN))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["id"], created.id.0);
    assert_eq!(body["email"], "ada@veridaq.test");
    assert_eq!(body["typeOfRequest"], "recommendation");
}

#[tokio::test]
async fn fetch_route_returns_not_found_for_unknown_id() {
    let (service, _) = build_service();

    let response = router_with(service)
        .oneshot(get_draft("req-none", TOKEN))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn fetch_route_hides_other_issuers_drafts() {
    let (service, _) = build_service();
    let created = service
        .create_or_update(&other_issuer(), valid_fields(), None)
        .expect("created");

    let response = router_with(service)
        .oneshot(get_draft(&created.id.0, TOKEN))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn submit_route_forbids_updating_other_issuers_drafts() {
    let (service, repository) = build_service();
    let created = service
        .create_or_update(&other_issuer(), valid_fields(), None)
        .expect("created");
    let mut draft = valid_draft().with(FieldUpdate::Relationship("Rival".to_string()));
    draft.id = Some(created.id.clone());

    let response = router_with(service)
        .oneshot(post_draft(&draft, Some(TOKEN)))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let stored = repository
        .fetch(&created.id)
        .expect("fetch succeeds")
        .expect("record kept");
    assert_eq!(stored.fields.relationship, valid_fields().relationship);
}

#[test]
fn service_errors_map_to_statuses() {
    let cases = [
        (
            RequestServiceError::Repository(RepositoryError::Conflict),
            StatusCode::CONFLICT,
        ),
        (
            RequestServiceError::Repository(RepositoryError::NotFound),
            StatusCode::NOT_FOUND,
        ),
        (
            RequestServiceError::Forbidden {
                id: RequestId("req-000001".to_string()),
            },
            StatusCode::FORBIDDEN,
        ),
        (
            RequestServiceError::Repository(RepositoryError::Unavailable("down".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    ];
    for (error, status) in cases {
        assert_eq!(service_error(error).status(), status);
    }
}
