use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier of a persisted individual request document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub String);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of letter the issuer asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeOfRequest {
    Reference,
    Recommendation,
}

impl TypeOfRequest {
    pub const ALL: [TypeOfRequest; 2] = [TypeOfRequest::Reference, TypeOfRequest::Recommendation];

    pub const fn as_str(self) -> &'static str {
        match self {
            TypeOfRequest::Reference => "reference",
            TypeOfRequest::Recommendation => "recommendation",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            TypeOfRequest::Reference => "Reference",
            TypeOfRequest::Recommendation => "Recommendation",
        }
    }

    /// Exact literal match; no trimming or case folding.
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == raw)
    }
}

impl fmt::Display for TypeOfRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Editable fields of the request form, in rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKey {
    Email,
    TypeOfRequest,
    AddresseeFullName,
    Relationship,
    YearsOfRelationship,
    PersonalityReview,
    RecommendationStatement,
}

impl FieldKey {
    pub const ALL: [FieldKey; 7] = [
        FieldKey::Email,
        FieldKey::TypeOfRequest,
        FieldKey::AddresseeFullName,
        FieldKey::Relationship,
        FieldKey::YearsOfRelationship,
        FieldKey::PersonalityReview,
        FieldKey::RecommendationStatement,
    ];

    pub const fn wire_name(self) -> &'static str {
        match self {
            FieldKey::Email => "email",
            FieldKey::TypeOfRequest => "typeOfRequest",
            FieldKey::AddresseeFullName => "addresseeFullName",
            FieldKey::Relationship => "relationship",
            FieldKey::YearsOfRelationship => "yearsOfRelationship",
            FieldKey::PersonalityReview => "personalityReview",
            FieldKey::RecommendationStatement => "recommendationStatement",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            FieldKey::Email => "Issuer Email",
            FieldKey::TypeOfRequest => "Request Type",
            FieldKey::AddresseeFullName => "Addressee Full Name",
            FieldKey::Relationship => "Relationship",
            FieldKey::YearsOfRelationship => "Years of Relationship",
            FieldKey::PersonalityReview => "Personality Review",
            FieldKey::RecommendationStatement => "Recommendation",
        }
    }

    pub const fn placeholder(self) -> &'static str {
        match self {
            FieldKey::Email => "Start typing",
            FieldKey::TypeOfRequest => "Select Request Type",
            FieldKey::AddresseeFullName => "John Doe",
            FieldKey::Relationship => "Father",
            FieldKey::YearsOfRelationship => "Pick a date",
            FieldKey::PersonalityReview => "I am...",
            FieldKey::RecommendationStatement => "Statement",
        }
    }

    /// Wizard step (1 or 2) on which the field is rendered.
    pub const fn step(self) -> u8 {
        match self {
            FieldKey::Email => 1,
            _ => 2,
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// A single edit coming from the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    Email(String),
    TypeOfRequest(String),
    AddresseeFullName(String),
    Relationship(String),
    YearsOfRelationship(Option<NaiveDate>),
    PersonalityReview(String),
    RecommendationStatement(String),
}

impl FieldUpdate {
    pub const fn key(&self) -> FieldKey {
        match self {
            FieldUpdate::Email(_) => FieldKey::Email,
            FieldUpdate::TypeOfRequest(_) => FieldKey::TypeOfRequest,
            FieldUpdate::AddresseeFullName(_) => FieldKey::AddresseeFullName,
            FieldUpdate::Relationship(_) => FieldKey::Relationship,
            FieldUpdate::YearsOfRelationship(_) => FieldKey::YearsOfRelationship,
            FieldUpdate::PersonalityReview(_) => FieldKey::PersonalityReview,
            FieldUpdate::RecommendationStatement(_) => FieldKey::RecommendationStatement,
        }
    }
}

/// Raw, unvalidated form values held by the wizard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDraft {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub type_of_request: String,
    #[serde(default)]
    pub addressee_full_name: String,
    #[serde(default)]
    pub relationship: String,
    #[serde(default)]
    pub years_of_relationship: Option<NaiveDate>,
    #[serde(default)]
    pub personality_review: String,
    #[serde(default)]
    pub recommendation_statement: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
}

impl RequestDraft {
    pub fn empty(id: Option<RequestId>) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Returns the draft with one field replaced.
    pub fn with(mut self, update: FieldUpdate) -> Self {
        match update {
            FieldUpdate::Email(value) => self.email = value,
            FieldUpdate::TypeOfRequest(value) => self.type_of_request = value,
            FieldUpdate::AddresseeFullName(value) => self.addressee_full_name = value,
            FieldUpdate::Relationship(value) => self.relationship = value,
            FieldUpdate::YearsOfRelationship(value) => self.years_of_relationship = value,
            FieldUpdate::PersonalityReview(value) => self.personality_review = value,
            FieldUpdate::RecommendationStatement(value) => self.recommendation_statement = value,
        }
        self
    }

    /// Overwrites every editable field with `stored`, keeping this draft's id.
    pub fn hydrated_from(self, stored: &RequestDraft) -> Self {
        Self {
            email: stored.email.clone(),
            type_of_request: stored.type_of_request.clone(),
            addressee_full_name: stored.addressee_full_name.clone(),
            relationship: stored.relationship.clone(),
            years_of_relationship: stored.years_of_relationship,
            personality_review: stored.personality_review.clone(),
            recommendation_statement: stored.recommendation_statement.clone(),
            id: self.id,
        }
    }

    /// Current value of `key`, as the edit that would set it.
    pub fn value_of(&self, key: FieldKey) -> FieldUpdate {
        match key {
            FieldKey::Email => FieldUpdate::Email(self.email.clone()),
            FieldKey::TypeOfRequest => FieldUpdate::TypeOfRequest(self.type_of_request.clone()),
            FieldKey::AddresseeFullName => {
                FieldUpdate::AddresseeFullName(self.addressee_full_name.clone())
            }
            FieldKey::Relationship => FieldUpdate::Relationship(self.relationship.clone()),
            FieldKey::YearsOfRelationship => {
                FieldUpdate::YearsOfRelationship(self.years_of_relationship)
            }
            FieldKey::PersonalityReview => {
                FieldUpdate::PersonalityReview(self.personality_review.clone())
            }
            FieldKey::RecommendationStatement => {
                FieldUpdate::RecommendationStatement(self.recommendation_statement.clone())
            }
        }
    }

    /// Display text of a field as the form renders it.
    pub fn display_value(&self, key: FieldKey) -> String {
        match key {
            FieldKey::Email => self.email.clone(),
            FieldKey::TypeOfRequest => TypeOfRequest::parse(&self.type_of_request)
                .map(|kind| kind.label().to_string())
                .unwrap_or_else(|| self.type_of_request.clone()),
            FieldKey::AddresseeFullName => self.addressee_full_name.clone(),
            FieldKey::Relationship => self.relationship.clone(),
            FieldKey::YearsOfRelationship => self
                .years_of_relationship
                .map(|date| date.format("%B %-d, %Y").to_string())
                .unwrap_or_default(),
            FieldKey::PersonalityReview => self.personality_review.clone(),
            FieldKey::RecommendationStatement => self.recommendation_statement.clone(),
        }
    }
}

/// Normalized values of a draft that passed the schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestFields {
    pub email: String,
    pub type_of_request: TypeOfRequest,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addressee_full_name: Option<String>,
    pub relationship: String,
    pub years_of_relationship: NaiveDate,
    pub personality_review: String,
    pub recommendation_statement: String,
}

impl RequestFields {
    pub fn to_draft(&self, id: Option<RequestId>) -> RequestDraft {
        RequestDraft {
            email: self.email.clone(),
            type_of_request: self.type_of_request.as_str().to_string(),
            addressee_full_name: self.addressee_full_name.clone().unwrap_or_default(),
            relationship: self.relationship.clone(),
            years_of_relationship: Some(self.years_of_relationship),
            personality_review: self.personality_review.clone(),
            recommendation_statement: self.recommendation_statement.clone(),
            id,
        }
    }
}
