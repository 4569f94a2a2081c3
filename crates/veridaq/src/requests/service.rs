use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::document::{check_constraints, ConstraintViolation, PersistedRequest};
use super::domain::{RequestFields, RequestId};
use super::repository::{RepositoryError, RequestRepository};
use crate::session::AuthContext;

/// Server-side create-or-update and lookup of individual requests.
pub struct IndividualRequestService<R> {
    repository: Arc<R>,
}

static REQUEST_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_request_id() -> RequestId {
    let id = REQUEST_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    RequestId(format!("req-{id:06}"))
}

impl<R> IndividualRequestService<R>
where
    R: RequestRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub fn create_or_update(
        &self,
        auth: &AuthContext,
        fields: RequestFields,
        existing_id: Option<&RequestId>,
    ) -> Result<PersistedRequest, RequestServiceError> {
        self.create_or_update_at(auth, fields, existing_id, Utc::now())
    }

    /// Store `fields` for the issuer in `auth`.
    ///
    /// Without `existing_id` a new unissued document is inserted. With one, the
    /// issuer's document is rewritten in place; issuance state, timestamps and
    /// badge are left untouched.
    pub fn create_or_update_at(
        &self,
        auth: &AuthContext,
        fields: RequestFields,
        existing_id: Option<&RequestId>,
        now: DateTime<Utc>,
    ) -> Result<PersistedRequest, RequestServiceError> {
        check_constraints(&fields, now)?;

        let Some(id) = existing_id else {
            let record = PersistedRequest::new(next_request_id(), &auth.user_id, fields, now);
            let stored = self.repository.insert(record)?;
            info!(request_id = %stored.id, issuer = %auth.email, "individual request created");
            return Ok(stored);
        };

        let mut record = self.owned_record(auth, id)?;
        record.fields = fields;
        self.repository.update(record.clone())?;
        info!(request_id = %record.id, issuer = %auth.email, "individual request updated");
        Ok(record)
    }

    /// Fetch a request the issuer in `auth` owns.
    pub fn get(
        &self,
        auth: &AuthContext,
        id: &RequestId,
    ) -> Result<PersistedRequest, RequestServiceError> {
        self.owned_record(auth, id)
    }

    fn owned_record(
        &self,
        auth: &AuthContext,
        id: &RequestId,
    ) -> Result<PersistedRequest, RequestServiceError> {
        let record = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        if !record.is_owned_by(&auth.user_id) {
            debug!(request_id = %id, "request belongs to another issuer");
            return Err(RequestServiceError::Forbidden { id: id.clone() });
        }
        Ok(record)
    }
}

/// Error raised by the request service.
#[derive(Debug, thiserror::Error)]
pub enum RequestServiceError {
    #[error(transparent)]
    Constraint(#[from] ConstraintViolation),
    #[error("request {id} belongs to another issuer")]
    Forbidden { id: RequestId },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
