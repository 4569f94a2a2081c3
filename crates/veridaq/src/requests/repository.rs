use super::document::PersistedRequest;
use super::domain::RequestId;

/// Storage abstraction so the service module can be exercised in isolation.
pub trait RequestRepository: Send + Sync {
    fn insert(&self, record: PersistedRequest) -> Result<PersistedRequest, RepositoryError>;
    fn update(&self, record: PersistedRequest) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &RequestId) -> Result<Option<PersistedRequest>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
