use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use tracing::debug;

use super::domain::{RequestDraft, RequestId};
use super::repository::{RepositoryError, RequestRepository};
use super::schema::RequestSchema;
use super::service::{IndividualRequestService, RequestServiceError};
use crate::session::{AuthContext, SessionOptions, SessionStore};

/// Shared state behind the individual request endpoints.
pub struct RequestApiState<R, S> {
    pub service: Arc<IndividualRequestService<R>>,
    pub sessions: Arc<S>,
    pub session_options: SessionOptions,
}

impl<R, S> RequestApiState<R, S>
where
    S: SessionStore,
{
    fn authenticate(&self, headers: &HeaderMap) -> Option<AuthContext> {
        let token = self.session_options.token_from_headers(headers)?;
        let session = self.sessions.load(token)?;
        AuthContext::from_session(&session)
    }
}

/// Router builder exposing the create-or-update and fetch endpoints.
pub fn request_router<R, S>(state: Arc<RequestApiState<R, S>>) -> Router
where
    R: RequestRepository + 'static,
    S: SessionStore + 'static,
{
    Router::new()
        .route("/api/v1/individual-requests", post(submit_handler::<R, S>))
        .route(
            "/api/v1/individual-requests/:request_id",
            get(fetch_handler::<R, S>),
        )
        .with_state(state)
}

pub(crate) async fn submit_handler<R, S>(
    State(state): State<Arc<RequestApiState<R, S>>>,
    headers: HeaderMap,
    axum::Json(draft): axum::Json<RequestDraft>,
) -> Response
where
    R: RequestRepository + 'static,
    S: SessionStore + 'static,
{
    let Some(auth) = state.authenticate(&headers) else {
        return unauthorized();
    };

    let fields = match RequestSchema.validate(&draft) {
        Ok(fields) => fields,
        Err(errors) => {
            debug!(fields = errors.len(), "rejecting invalid individual request");
            let payload = json!({ "errors": errors });
            return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response();
        }
    };

    let status = if draft.id.is_some() {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    match state
        .service
        .create_or_update(&auth, fields, draft.id.as_ref())
    {
        Ok(record) => (status, axum::Json(record)).into_response(),
        Err(error) => service_error(error),
    }
}

pub(crate) async fn fetch_handler<R, S>(
    State(state): State<Arc<RequestApiState<R, S>>>,
    headers: HeaderMap,
    Path(request_id): Path<String>,
) -> Response
where
    R: RequestRepository + 'static,
    S: SessionStore + 'static,
{
    let Some(auth) = state.authenticate(&headers) else {
        return unauthorized();
    };

    match state.service.get(&auth, &RequestId(request_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record.to_draft())).into_response(),
        Err(RequestServiceError::Forbidden { id }) => {
            debug!(request_id = %id, "hiding request owned by another issuer");
            service_error(RequestServiceError::Repository(RepositoryError::NotFound))
        }
        Err(error) => service_error(error),
    }
}

fn unauthorized() -> Response {
    let payload = json!({ "error": "sign in to manage requests" });
    (StatusCode::UNAUTHORIZED, axum::Json(payload)).into_response()
}

pub(super) fn service_error(error: RequestServiceError) -> Response {
    let status = match &error {
        RequestServiceError::Constraint(_) => StatusCode::UNPROCESSABLE_ENTITY,
        RequestServiceError::Forbidden { .. } => StatusCode::FORBIDDEN,
        RequestServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        RequestServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        RequestServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
