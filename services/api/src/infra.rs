use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use veridaq::requests::{PersistedRequest, RepositoryError, RequestId, RequestRepository};
use veridaq::session::{SessionData, SessionStore};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryRequestRepository {
    records: Arc<Mutex<HashMap<RequestId, PersistedRequest>>>,
}

impl InMemoryRequestRepository {
    pub(crate) fn records(&self) -> Vec<PersistedRequest> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut records: Vec<_> = guard.values().cloned().collect();
        records.sort_by(|a, b| a.id.0.cmp(&b.id.0));
        records
    }
}

impl RequestRepository for InMemoryRequestRepository {
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
        if guard.contains_key(&record.id) {
            guard.insert(record.id.clone(), record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &RequestId) -> Result<Option<PersistedRequest>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

/// Token-keyed sessions; stands in for the sealed cookie store.
#[derive(Default, Clone)]
pub(crate) struct InMemorySessionStore {
    sessions: Arc<Mutex<HashMap<String, SessionData>>>,
}

impl InMemorySessionStore {
    pub(crate) fn insert(&self, token: impl Into<String>, session: SessionData) {
        let mut guard = self.sessions.lock().expect("session mutex poisoned");
        guard.insert(token.into(), session);
    }
}

impl SessionStore for InMemorySessionStore {
    fn load(&self, token: &str) -> Option<SessionData> {
        let guard = self.sessions.lock().expect("session mutex poisoned");
        guard.get(token).cloned()
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
