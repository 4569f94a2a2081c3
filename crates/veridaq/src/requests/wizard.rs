//! Three-step request wizard.
//!
//! ```text
//! Identity --continue--> Details --submit--> Outcome(Success | Failure)
//!          <--previous--
//! ```
//!
//! Both asynchronous operations are split into a `begin_*` call that hands out
//! a ticket and a `finish_*` call that applies the result. Tickets are bound to
//! the mount generation, so results arriving after [`RequestWizard::unmount`]
//! are dropped. At most one submission can be in flight.
//!
//! Hydration only fills the form. A result that lands after the wizard has
//! reached its outcome, or while a submit is in flight, is dropped, and fields
//! the user has already edited keep the user's value.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::domain::{FieldKey, FieldUpdate, RequestDraft, RequestFields, RequestId};
use super::gateway::{GatewayError, PersistenceGateway};
use super::schema::{FieldErrors, RequestSchema};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Failure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Identity,
    Details,
    Outcome(Outcome),
}

impl WizardStep {
    pub const fn number(self) -> u8 {
        match self {
            WizardStep::Identity => 1,
            WizardStep::Details => 2,
            WizardStep::Outcome(_) => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("cannot {action} on step {step}")]
    InvalidTransition { action: &'static str, step: u8 },
    #[error("a submission is already in flight")]
    SubmissionPending,
    #[error("draft failed validation on {} field(s)", .0.len())]
    Invalid(FieldErrors),
    #[error("ticket belongs to an earlier mount of the wizard")]
    StaleTicket,
}

/// Permission to apply one hydration result.
#[derive(Debug)]
pub struct HydrationTicket {
    generation: u64,
    id: RequestId,
}

impl HydrationTicket {
    pub fn id(&self) -> &RequestId {
        &self.id
    }
}

/// A validated submission waiting on the gateway.
#[derive(Debug)]
pub struct SubmitTicket {
    generation: u64,
    fields: RequestFields,
    existing_id: Option<RequestId>,
}

impl SubmitTicket {
    pub fn fields(&self) -> &RequestFields {
        &self.fields
    }

    pub fn existing_id(&self) -> Option<&RequestId> {
        self.existing_id.as_ref()
    }
}

/// Form state for one request session: step, field values and their errors.
#[derive(Debug)]
pub struct RequestWizard {
    schema: RequestSchema,
    step: WizardStep,
    draft: RequestDraft,
    errors: FieldErrors,
    edited: BTreeSet<FieldKey>,
    doc_id: Option<RequestId>,
    generation: u64,
    mounted: bool,
    hydration_started: bool,
    submit_attempted: bool,
    submitting: bool,
}

impl RequestWizard {
    /// Mount a wizard, optionally editing the stored draft `doc_id`.
    pub fn new(doc_id: Option<RequestId>) -> Self {
        Self {
            schema: RequestSchema,
            step: WizardStep::Identity,
            draft: RequestDraft::empty(doc_id.clone()),
            errors: FieldErrors::default(),
            edited: BTreeSet::new(),
            doc_id,
            generation: 1,
            mounted: true,
            hydration_started: false,
            submit_attempted: false,
            submitting: false,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn draft(&self) -> &RequestDraft {
        &self.draft
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn doc_id(&self) -> Option<&RequestId> {
        self.doc_id.as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.step {
            WizardStep::Outcome(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn set_field(&mut self, update: FieldUpdate) -> Result<(), WizardError> {
        self.set_field_at(update, Utc::now())
    }

    /// Apply one edit. Once a submit has been attempted, the edited field is
    /// re-validated so its messages track the current value.
    pub fn set_field_at(
        &mut self,
        update: FieldUpdate,
        now: DateTime<Utc>,
    ) -> Result<(), WizardError> {
        if let WizardStep::Outcome(_) = self.step {
            return Err(self.invalid("edit fields"));
        }

        let key = update.key();
        self.edited.insert(key);
        self.draft = std::mem::take(&mut self.draft).with(update);
        if self.submit_attempted {
            let messages = self.schema.validate_field(key, &self.draft, now);
            self.errors.replace(key, messages);
        }
        Ok(())
    }

    /// Step 1 to step 2. The email is deliberately not checked here; all
    /// validation happens on submit.
    pub fn continue_to_details(&mut self) -> Result<(), WizardError> {
        match self.step {
            WizardStep::Identity => {
                self.step = WizardStep::Details;
                Ok(())
            }
            _ => Err(self.invalid("continue")),
        }
    }

    /// Step 2 back to step 1; field values are kept.
    pub fn previous(&mut self) -> Result<(), WizardError> {
        match self.step {
            WizardStep::Details => {
                self.step = WizardStep::Identity;
                Ok(())
            }
            _ => Err(self.invalid("go back")),
        }
    }

    /// Start the one-shot hydration fetch for this mount, if there is a draft id.
    pub fn begin_hydration(&mut self) -> Option<HydrationTicket> {
        if !self.mounted || self.hydration_started {
            return None;
        }
        let id = self.doc_id.clone()?;
        self.hydration_started = true;
        Some(HydrationTicket {
            generation: self.generation,
            id,
        })
    }

    /// Apply a hydration result; returns whether the form values changed.
    pub fn finish_hydration(
        &mut self,
        ticket: HydrationTicket,
        result: Result<Option<RequestDraft>, GatewayError>,
    ) -> bool {
        if !self.is_current(ticket.generation) {
            debug!(request_id = %ticket.id, "dropping hydration result for unmounted wizard");
            return false;
        }
        if self.submitting || self.outcome().is_some() {
            debug!(request_id = %ticket.id, "dropping hydration result after submission");
            return false;
        }

        match result {
            Ok(Some(stored)) => {
                let mut hydrated = self.draft.clone().hydrated_from(&stored);
                for key in &self.edited {
                    hydrated = hydrated.with(self.draft.value_of(*key));
                }
                let changed = hydrated != self.draft;
                self.draft = hydrated;
                debug!(
                    request_id = %ticket.id,
                    kept = self.edited.len(),
                    "wizard hydrated from stored draft"
                );
                changed
            }
            Ok(None) => {
                info!(request_id = %ticket.id, "no stored draft, starting empty");
                false
            }
            Err(error) => {
                warn!(request_id = %ticket.id, %error, "failed to load stored draft");
                false
            }
        }
    }

    pub async fn hydrate<G>(&mut self, gateway: &G) -> bool
    where
        G: PersistenceGateway + ?Sized,
    {
        let Some(ticket) = self.begin_hydration() else {
            return false;
        };
        let result = gateway.fetch_by_id(ticket.id()).await;
        self.finish_hydration(ticket, result)
    }

    pub fn begin_submit(&mut self) -> Result<SubmitTicket, WizardError> {
        self.begin_submit_at(Utc::now())
    }

    /// Validate the whole draft and, if it passes, lock the submit control.
    pub fn begin_submit_at(&mut self, now: DateTime<Utc>) -> Result<SubmitTicket, WizardError> {
        if self.step != WizardStep::Details {
            return Err(self.invalid("submit"));
        }
        if self.submitting {
            return Err(WizardError::SubmissionPending);
        }

        self.submit_attempted = true;
        match self.schema.validate_at(&self.draft, now) {
            Ok(fields) => {
                self.errors = FieldErrors::default();
                self.submitting = true;
                Ok(SubmitTicket {
                    generation: self.generation,
                    fields,
                    existing_id: self.doc_id.clone(),
                })
            }
            Err(errors) => {
                debug!(fields = errors.len(), "submission blocked by validation");
                self.errors = errors.clone();
                Err(WizardError::Invalid(errors))
            }
        }
    }

    /// Record the gateway's answer and move to the terminal step.
    pub fn finish_submit(
        &mut self,
        ticket: SubmitTicket,
        result: Result<bool, GatewayError>,
    ) -> Result<Outcome, WizardError> {
        if !self.is_current(ticket.generation) {
            return Err(WizardError::StaleTicket);
        }
        self.submitting = false;

        let outcome = match result {
            Ok(true) => Outcome::Success,
            Ok(false) => {
                warn!("individual request was not stored");
                Outcome::Failure
            }
            Err(error) => {
                warn!(%error, "individual request submission failed");
                Outcome::Failure
            }
        };
        self.step = WizardStep::Outcome(outcome);
        Ok(outcome)
    }

    pub async fn submit<G>(&mut self, gateway: &G) -> Result<Outcome, WizardError>
    where
        G: PersistenceGateway + ?Sized,
    {
        let ticket = self.begin_submit()?;
        let result = gateway
            .create_or_update(ticket.fields.clone(), ticket.existing_id.clone())
            .await;
        self.finish_submit(ticket, result)
    }

    /// Tear the wizard down; in-flight results are ignored from now on.
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.generation += 1;
        self.submitting = false;
    }

    fn is_current(&self, generation: u64) -> bool {
        self.mounted && generation == self.generation
    }

    fn invalid(&self, action: &'static str) -> WizardError {
        WizardError::InvalidTransition {
            action,
            step: self.step.number(),
        }
    }
}
