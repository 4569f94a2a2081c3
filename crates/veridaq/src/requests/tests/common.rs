use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::requests::document::PersistedRequest;
use crate::requests::domain::{FieldUpdate, RequestDraft, RequestFields, RequestId};
use crate::requests::gateway::{GatewayError, PersistenceGateway};
use crate::requests::repository::{RepositoryError, RequestRepository};
use crate::requests::service::IndividualRequestService;
use crate::session::{AuthContext, SessionData, SessionStore, UserId};

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn valid_draft() -> RequestDraft {
    RequestDraft {
        email: "ada@veridaq.test".to_string(),
        type_of_request: "recommendation".to_string(),
        addressee_full_name: "Grace Hopper".to_string(),
        relationship: "Former manager".to_string(),
        years_of_relationship: Some(date(2016, 3, 14)),
        personality_review: "Meticulous and generous with her time".to_string(),
        recommendation_statement: "I recommend Ada without reservation".to_string(),
        id: None,
    }
}

/// Edits that turn an empty form into [`valid_draft`].
pub(super) fn valid_updates() -> Vec<FieldUpdate> {
    let draft = valid_draft();
    vec![
        FieldUpdate::Email(draft.email),
        FieldUpdate::TypeOfRequest(draft.type_of_request),
        FieldUpdate::AddresseeFullName(draft.addressee_full_name),
        FieldUpdate::Relationship(draft.relationship),
        FieldUpdate::YearsOfRelationship(draft.years_of_relationship),
        FieldUpdate::PersonalityReview(draft.personality_review),
        FieldUpdate::RecommendationStatement(draft.recommendation_statement),
    ]
}

pub(super) fn valid_fields() -> RequestFields {
    crate::requests::schema::RequestSchema
        .validate_at(&valid_draft(), now())
        .expect("fixture draft is valid")
}

pub(super) fn issuer() -> AuthContext {
    AuthContext {
        user_id: UserId("user-ada".to_string()),
        email: "ada@veridaq.test".to_string(),
    }
}

pub(super) fn other_issuer() -> AuthContext {
    AuthContext {
        user_id: UserId("user-alan".to_string()),
        email: "alan@veridaq.test".to_string(),
    }
}

pub(super) fn build_service() -> (
    Arc<IndividualRequestService<MemoryRepository>>,
    Arc<MemoryRepository>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let service = Arc::new(IndividualRequestService::new(repository.clone()));
    (service, repository)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<RequestId, PersistedRequest>>>,
}

impl MemoryRepository {
    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("repository mutex poisoned").len()
    }
}

impl RequestRepository for MemoryRepository {
    fn insert(&self, record: PersistedRequest) -> Result<PersistedRequest, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: PersistedRequest) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if !guard.contains_key(&record.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(record.id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &RequestId) -> Result<Option<PersistedRequest>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

pub(super) struct UnavailableRepository;

impl RequestRepository for UnavailableRepository {
    fn insert(&self, _record: PersistedRequest) -> Result<PersistedRequest, RepositoryError> {
        Err(RepositoryError::Unavailable("document store offline".to_string()))
    }

    fn update(&self, _record: PersistedRequest) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("document store offline".to_string()))
    }

    fn fetch(&self, _id: &RequestId) -> Result<Option<PersistedRequest>, RepositoryError> {
        Err(RepositoryError::Unavailable("document store offline".to_string()))
    }
}

/// How a [`ScriptedGateway`] answers.
#[derive(Debug, Clone)]
pub(super) enum Reply<T> {
    Value(T),
    Fail,
}

/// Gateway returning canned answers and recording every call.
pub(super) struct ScriptedGateway {
    create_reply: Reply<bool>,
    fetch_reply: Reply<Option<RequestDraft>>,
    created: Mutex<Vec<(RequestFields, Option<RequestId>)>>,
    fetched: Mutex<Vec<RequestId>>,
}

impl ScriptedGateway {
    pub(super) fn new(create_reply: Reply<bool>, fetch_reply: Reply<Option<RequestDraft>>) -> Self {
        Self {
            create_reply,
            fetch_reply,
            created: Mutex::new(Vec::new()),
            fetched: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn storing() -> Self {
        Self::new(Reply::Value(true), Reply::Value(None))
    }

    pub(super) fn created(&self) -> Vec<(RequestFields, Option<RequestId>)> {
        self.created.lock().expect("gateway mutex poisoned").clone()
    }

    pub(super) fn fetched(&self) -> Vec<RequestId> {
        self.fetched.lock().expect("gateway mutex poisoned").clone()
    }
}

#[async_trait]
impl PersistenceGateway for ScriptedGateway {
    async fn create_or_update(
        &self,
        fields: RequestFields,
        existing_id: Option<RequestId>,
    ) -> Result<bool, GatewayError> {
        self.created
            .lock()
            .expect("gateway mutex poisoned")
            .push((fields, existing_id));
        match &self.create_reply {
            Reply::Value(stored) => Ok(*stored),
            Reply::Fail => Err(GatewayError::Unavailable("connection reset".to_string())),
        }
    }

    async fn fetch_by_id(&self, id: &RequestId) -> Result<Option<RequestDraft>, GatewayError> {
        self.fetched
            .lock()
            .expect("gateway mutex poisoned")
            .push(id.clone());
        match &self.fetch_reply {
            Reply::Value(draft) => Ok(draft.clone()),
            Reply::Fail => Err(GatewayError::Unavailable("connection reset".to_string())),
        }
    }
}

#[derive(Default)]
pub(super) struct MemorySessions {
    sessions: Mutex<HashMap<String, SessionData>>,
}

impl MemorySessions {
    pub(super) fn with(token: &str, session: SessionData) -> Self {
        let sessions = Self::default();
        sessions
            .sessions
            .lock()
            .expect("session mutex poisoned")
            .insert(token.to_string(), session);
        sessions
    }
}

impl SessionStore for MemorySessions {
    fn load(&self, token: &str) -> Option<SessionData> {
        self.sessions
            .lock()
            .expect("session mutex poisoned")
            .get(token)
            .cloned()
    }
}
