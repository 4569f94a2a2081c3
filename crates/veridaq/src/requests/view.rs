use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{FieldKey, TypeOfRequest};
use super::schema::DatePickerBounds;
use super::wizard::{Outcome, RequestWizard, WizardStep};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldView {
    pub key: FieldKey,
    pub label: &'static str,
    pub placeholder: &'static str,
    pub value: String,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RequestTypeOption {
    pub value: &'static str,
    pub label: &'static str,
}

/// Render model of the wizard's current step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum WizardView {
    Identity {
        step_label: String,
        fields: Vec<FieldView>,
    },
    Details {
        step_label: String,
        fields: Vec<FieldView>,
        request_types: Vec<RequestTypeOption>,
        date_bounds: DatePickerBounds,
        submit_enabled: bool,
    },
    Outcome {
        outcome: Outcome,
        message: &'static str,
    },
}

impl Outcome {
    pub const fn message(self) -> &'static str {
        match self {
            Outcome::Success => "Your request has been submitted.",
            Outcome::Failure => "We could not submit your request. Please try again later.",
        }
    }
}

impl RequestWizard {
    pub fn view(&self) -> WizardView {
        self.view_at(Utc::now())
    }

    pub fn view_at(&self, now: DateTime<Utc>) -> WizardView {
        let step = self.step();
        match step {
            WizardStep::Identity => WizardView::Identity {
                step_label: step_label(step),
                fields: self.fields_for(1),
            },
            WizardStep::Details => WizardView::Details {
                step_label: step_label(step),
                fields: self.fields_for(2),
                request_types: TypeOfRequest::ALL
                    .into_iter()
                    .map(|kind| RequestTypeOption {
                        value: kind.as_str(),
                        label: kind.label(),
                    })
                    .collect(),
                date_bounds: DatePickerBounds::as_of(now),
                submit_enabled: !self.is_submitting(),
            },
            WizardStep::Outcome(outcome) => WizardView::Outcome {
                outcome,
                message: outcome.message(),
            },
        }
    }

    fn fields_for(&self, step: u8) -> Vec<FieldView> {
        FieldKey::ALL
            .into_iter()
            .filter(|key| key.step() == step)
            .map(|key| FieldView {
                key,
                label: key.label(),
                placeholder: key.placeholder(),
                value: self.draft().display_value(key),
                errors: self.errors().get(key).to_vec(),
            })
            .collect()
    }
}

fn step_label(step: WizardStep) -> String {
    format!("Step {}", step.number())
}
