//! Session cookie contract shared with the dashboard.
//!
//! Sealing and unsealing the cookie belongs to the session store; request
//! handling only ever sees an [`AuthContext`] derived from a logged-in
//! [`SessionData`].

use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::config::{AppEnvironment, SessionConfig};

/// Identifier of a dashboard account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Profile record held inside the session cookie.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub professional_designation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_balance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_onboarded: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_verified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_access_fee: Option<bool>,
    pub is_logged_in: bool,
}

impl SessionData {
    /// Session for a signed-in issuer with only the identity fields populated.
    pub fn logged_in(user_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            email: Some(email.into()),
            is_logged_in: true,
            ..Self::default()
        }
    }
}

/// Cookie attributes used when issuing the session cookie.
#[derive(Clone)]
pub struct SessionOptions {
    pub cookie_name: String,
    /// Secret handed to the cookie sealing store to encrypt session payloads.
    /// Token lookup goes through [`SessionStore`], which never needs it here.
    pub password: String,
    pub http_only: bool,
    pub secure: bool,
}

impl SessionOptions {
    pub fn from_config(config: &SessionConfig, environment: AppEnvironment) -> Self {
        Self {
            cookie_name: config.cookie_name.clone(),
            password: config.secret.clone(),
            http_only: true,
            secure: environment.is_production(),
        }
    }

    /// `Set-Cookie` value carrying `token`.
    pub fn set_cookie_header(&self, token: &str) -> String {
        let mut header = format!("{}={}; Path=/; SameSite=Lax", self.cookie_name, token);
        if self.http_only {
            header.push_str("; HttpOnly");
        }
        if self.secure {
            header.push_str("; Secure");
        }
        header
    }

    /// Session token carried by the request's `Cookie` headers, if any.
    pub fn token_from_headers<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.cookie_name)
            .map(|(_, token)| token)
            .filter(|token| !token.is_empty())
    }
}

impl std::fmt::Debug for SessionOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionOptions")
            .field("cookie_name", &self.cookie_name)
            .field("http_only", &self.http_only)
            .field("secure", &self.secure)
            .finish_non_exhaustive()
    }
}

/// Resolves a cookie token to the session it seals.
pub trait SessionStore: Send + Sync {
    fn load(&self, token: &str) -> Option<SessionData>;
}

/// The authenticated issuer a request runs on behalf of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: UserId,
    pub email: String,
}

impl AuthContext {
    /// Returns `None` unless the session is logged in with both identity fields.
    pub fn from_session(session: &SessionData) -> Option<Self> {
        if !session.is_logged_in {
            return None;
        }
        let user_id = session.user_id.clone().filter(|id| !id.is_empty())?;
        let email = session.email.clone().filter(|email| !email.is_empty())?;
        Some(Self {
            user_id: UserId(user_id),
            email,
        })
    }
}
