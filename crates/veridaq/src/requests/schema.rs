//! Client-side validation of request drafts.
//!
//! Every rule here is at least as strict as the matching entry in
//! [`DOCUMENT_CONSTRAINTS`](super::document::DOCUMENT_CONSTRAINTS), so a draft
//! accepted by [`RequestSchema`] is always accepted by the store.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::document::{PERSONALITY_REVIEW_MIN_LEN, RECOMMENDATION_STATEMENT_MIN_LEN};
use super::domain::{FieldKey, RequestDraft, RequestFields, TypeOfRequest};

/// Earliest relationship start the form accepts.
pub const EARLIEST_RELATIONSHIP_DATE: NaiveDate = match NaiveDate::from_ymd_opt(1900, 1, 1) {
    Some(date) => date,
    None => NaiveDate::MIN,
};

/// Field-keyed validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<FieldKey, Vec<String>>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields with at least one message.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: FieldKey) -> &[String] {
        self.0.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, key: FieldKey) -> bool {
        self.0.contains_key(&key)
    }

    pub fn push(&mut self, key: FieldKey, message: impl Into<String>) {
        self.0.entry(key).or_default().push(message.into());
    }

    /// Replaces the messages of one field; an empty list clears it.
    pub fn replace(&mut self, key: FieldKey, messages: Vec<String>) {
        if messages.is_empty() {
            self.0.remove(&key);
        } else {
            self.0.insert(key, messages);
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = FieldKey> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldKey, &[String])> {
        self.0.iter().map(|(key, messages)| (*key, messages.as_slice()))
    }
}

/// Range of dates the relationship picker lets the user select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DatePickerBounds {
    pub earliest: NaiveDate,
    pub latest: NaiveDate,
}

impl DatePickerBounds {
    pub fn as_of(now: DateTime<Utc>) -> Self {
        Self {
            earliest: EARLIEST_RELATIONSHIP_DATE,
            latest: now.date_naive(),
        }
    }

    pub fn is_selectable(&self, date: NaiveDate) -> bool {
        date >= self.earliest && date <= self.latest
    }
}

/// Independent per-field rules for a [`RequestDraft`]; there are no cross-field rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestSchema;

impl RequestSchema {
    pub fn validate(&self, draft: &RequestDraft) -> Result<RequestFields, FieldErrors> {
        self.validate_at(draft, Utc::now())
    }

    pub fn validate_at(
        &self,
        draft: &RequestDraft,
        now: DateTime<Utc>,
    ) -> Result<RequestFields, FieldErrors> {
        let mut errors = FieldErrors::default();
        for key in FieldKey::ALL {
            for message in self.validate_field(key, draft, now) {
                errors.push(key, message);
            }
        }

        match (
            TypeOfRequest::parse(&draft.type_of_request),
            draft.years_of_relationship,
        ) {
            (Some(type_of_request), Some(years_of_relationship)) if errors.is_empty() => {
                Ok(RequestFields {
                    email: draft.email.clone(),
                    type_of_request,
                    addressee_full_name: Some(draft.addressee_full_name.trim())
                        .filter(|name| !name.is_empty())
                        .map(str::to_string),
                    relationship: draft.relationship.clone(),
                    years_of_relationship,
                    personality_review: draft.personality_review.clone(),
                    recommendation_statement: draft.recommendation_statement.clone(),
                })
            }
            _ => Err(errors),
        }
    }

    /// Messages for a single field; empty when the field is valid.
    pub fn validate_field(
        &self,
        key: FieldKey,
        draft: &RequestDraft,
        now: DateTime<Utc>,
    ) -> Vec<String> {
        let mut messages = Vec::new();
        match key {
            FieldKey::Email => {
                if draft.email.is_empty() {
                    messages.push("Issuer email is required".to_string());
                }
            }
            FieldKey::TypeOfRequest => {
                if TypeOfRequest::parse(&draft.type_of_request).is_none() {
                    messages.push("Select either reference or recommendation".to_string());
                }
            }
            FieldKey::AddresseeFullName => {}
            FieldKey::Relationship => {
                if draft.relationship.is_empty() {
                    messages.push("Relationship is required".to_string());
                }
            }
            FieldKey::YearsOfRelationship => match draft.years_of_relationship {
                None => messages.push("Pick the date the relationship began".to_string()),
                Some(date) => {
                    let bounds = DatePickerBounds::as_of(now);
                    if date > bounds.latest {
                        messages.push("Date cannot be in the future".to_string());
                    }
                    if date < bounds.earliest {
                        messages.push(format!("Date cannot be before {}", bounds.earliest));
                    }
                }
            },
            FieldKey::PersonalityReview => {
                min_length(
                    &mut messages,
                    "Personality review",
                    &draft.personality_review,
                    PERSONALITY_REVIEW_MIN_LEN,
                );
            }
            FieldKey::RecommendationStatement => {
                min_length(
                    &mut messages,
                    "Recommendation statement",
                    &draft.recommendation_statement,
                    RECOMMENDATION_STATEMENT_MIN_LEN,
                );
            }
        }
        messages
    }
}

fn min_length(messages: &mut Vec<String>, label: &str, value: &str, min: usize) {
    if value.chars().count() < min {
        messages.push(format!("{label} must be at least {min} characters"));
    }
}
