//! Individual reference and recommendation requests: validation, the intake
//! wizard, and the persistence it submits to.

pub mod document;
pub mod domain;
pub mod gateway;
pub mod repository;
pub mod router;
pub mod schema;
pub mod service;
pub mod view;
pub mod wizard;

#[cfg(test)]
mod tests;

pub use document::{check_constraints, ConstraintViolation, PersistedRequest};
pub use domain::{FieldKey, FieldUpdate, RequestDraft, RequestFields, RequestId, TypeOfRequest};
pub use gateway::{GatewayError, PersistenceGateway, StoreGateway};
pub use repository::{RepositoryError, RequestRepository};
pub use router::{request_router, RequestApiState};
pub use schema::{DatePickerBounds, FieldErrors, RequestSchema};
pub use service::{IndividualRequestService, RequestServiceError};
pub use view::{FieldView, WizardView};
pub use wizard::{Outcome, RequestWizard, WizardError, WizardStep};
