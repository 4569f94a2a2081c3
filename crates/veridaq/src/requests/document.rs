//! Storage-engine independent contract for persisted individual requests.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{FieldKey, RequestDraft, RequestFields, RequestId};
use crate::session::UserId;

pub const PERSONALITY_REVIEW_MIN_LEN: usize = 10;
pub const RECOMMENDATION_STATEMENT_MIN_LEN: usize = 12;

/// Per-field rule enforced by the document store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldConstraint {
    pub field: FieldKey,
    pub required: bool,
    pub min_len: usize,
    /// Date values may not lie after the moment of writing.
    pub not_after_now: bool,
}

impl FieldConstraint {
    const fn text(field: FieldKey, min_len: usize) -> Self {
        Self {
            field,
            required: true,
            min_len,
            not_after_now: false,
        }
    }
}

/// Constraints of the individual request collection.
pub const DOCUMENT_CONSTRAINTS: [FieldConstraint; 7] = [
    FieldConstraint::text(FieldKey::Email, 1),
    FieldConstraint::text(FieldKey::TypeOfRequest, 1),
    FieldConstraint {
        field: FieldKey::AddresseeFullName,
        required: false,
        min_len: 0,
        not_after_now: false,
    },
    FieldConstraint::text(FieldKey::Relationship, 1),
    FieldConstraint {
        field: FieldKey::YearsOfRelationship,
        required: true,
        min_len: 0,
        not_after_now: true,
    },
    FieldConstraint::text(FieldKey::PersonalityReview, PERSONALITY_REVIEW_MIN_LEN),
    FieldConstraint::text(
        FieldKey::RecommendationStatement,
        RECOMMENDATION_STATEMENT_MIN_LEN,
    ),
];

/// Document rule broken by a write.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConstraintViolation {
    #[error("{field} is required")]
    Missing { field: FieldKey },
    #[error("{field} must be at least {min} characters (found {found})")]
    TooShort {
        field: FieldKey,
        min: usize,
        found: usize,
    },
    #[error("{field} must not be later than {max}")]
    AfterNow { field: FieldKey, max: NaiveDate },
}

/// Checks `fields` against [`DOCUMENT_CONSTRAINTS`] as of `now`.
pub fn check_constraints(
    fields: &RequestFields,
    now: DateTime<Utc>,
) -> Result<(), ConstraintViolation> {
    let today = now.date_naive();
    for constraint in DOCUMENT_CONSTRAINTS {
        let field = constraint.field;
        if field == FieldKey::YearsOfRelationship {
            if constraint.not_after_now && fields.years_of_relationship > today {
                return Err(ConstraintViolation::AfterNow { field, max: today });
            }
            continue;
        }

        match text_of(fields, field).map(|value| value.chars().count()) {
            None | Some(0) if constraint.required => {
                return Err(ConstraintViolation::Missing { field });
            }
            Some(found) if found < constraint.min_len => {
                return Err(ConstraintViolation::TooShort {
                    field,
                    min: constraint.min_len,
                    found,
                });
            }
            _ => {}
        }
    }
    Ok(())
}

fn text_of(fields: &RequestFields, field: FieldKey) -> Option<&str> {
    match field {
        FieldKey::Email => Some(fields.email.as_str()),
        FieldKey::TypeOfRequest => Some(fields.type_of_request.as_str()),
        FieldKey::AddresseeFullName => fields.addressee_full_name.as_deref(),
        FieldKey::Relationship => Some(fields.relationship.as_str()),
        FieldKey::PersonalityReview => Some(fields.personality_review.as_str()),
        FieldKey::RecommendationStatement => Some(fields.recommendation_statement.as_str()),
        FieldKey::YearsOfRelationship => None,
    }
}

/// Stored individual request, owned by the issuing account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedRequest {
    pub id: RequestId,
    pub issuer_user: UserId,
    pub user: UserId,
    #[serde(flatten)]
    pub fields: RequestFields,
    pub issued: bool,
    pub date_issued: DateTime<Utc>,
    pub date_requested: DateTime<Utc>,
    pub badge_url: Option<String>,
}

impl PersistedRequest {
    /// New, unissued document with collection defaults applied.
    pub fn new(id: RequestId, owner: &UserId, fields: RequestFields, now: DateTime<Utc>) -> Self {
        Self {
            id,
            issuer_user: owner.clone(),
            user: owner.clone(),
            fields,
            issued: false,
            date_issued: now,
            date_requested: now,
            badge_url: None,
        }
    }

    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.issuer_user == user
    }

    pub fn to_draft(&self) -> RequestDraft {
        self.fields.to_draft(Some(self.id.clone()))
    }
}
