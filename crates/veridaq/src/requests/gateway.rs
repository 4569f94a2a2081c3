use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use super::domain::{RequestDraft, RequestFields, RequestId};
use super::repository::{RepositoryError, RequestRepository};
use super::service::{IndividualRequestService, RequestServiceError};
use crate::session::AuthContext;

/// Persistence operations the request wizard depends on.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Create a request, or update `existing_id` in place when given.
    ///
    /// `Ok(false)` reports a handled rejection; `Err` reports a failure to
    /// reach storage at all.
    async fn create_or_update(
        &self,
        fields: RequestFields,
        existing_id: Option<RequestId>,
    ) -> Result<bool, GatewayError>;

    async fn fetch_by_id(&self, id: &RequestId) -> Result<Option<RequestDraft>, GatewayError>;
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("persistence unavailable: {0}")]
    Unavailable(String),
    #[error("unexpected persistence response: {0}")]
    Protocol(String),
}

/// Gateway calling the request service directly on behalf of one issuer.
pub struct StoreGateway<R> {
    service: Arc<IndividualRequestService<R>>,
    auth: AuthContext,
}

impl<R> StoreGateway<R>
where
    R: RequestRepository + 'static,
{
    pub fn new(service: Arc<IndividualRequestService<R>>, auth: AuthContext) -> Self {
        Self { service, auth }
    }
}

#[async_trait]
impl<R> PersistenceGateway for StoreGateway<R>
where
    R: RequestRepository + 'static,
{
    async fn create_or_update(
        &self,
        fields: RequestFields,
        existing_id: Option<RequestId>,
    ) -> Result<bool, GatewayError> {
        match self
            .service
            .create_or_update(&self.auth, fields, existing_id.as_ref())
        {
            Ok(_) => Ok(true),
            Err(RequestServiceError::Repository(RepositoryError::Unavailable(reason))) => {
                Err(GatewayError::Unavailable(reason))
            }
            Err(error) => {
                warn!(%error, issuer = %self.auth.email, "individual request rejected");
                Ok(false)
            }
        }
    }

    async fn fetch_by_id(&self, id: &RequestId) -> Result<Option<RequestDraft>, GatewayError> {
        match self.service.get(&self.auth, id) {
            Ok(record) => Ok(Some(record.to_draft())),
            Err(RequestServiceError::Repository(RepositoryError::NotFound))
            | Err(RequestServiceError::Forbidden { .. }) => Ok(None),
            Err(RequestServiceError::Repository(RepositoryError::Unavailable(reason))) => {
                Err(GatewayError::Unavailable(reason))
            }
            Err(other) => Err(GatewayError::Protocol(other.to_string())),
        }
    }
}
