//! Identity port and axum extractor.
//!
//! Sign-in/sign-up flows belong to the external auth collaborator; this
//! system only verifies bearer tokens and passes the resulting
//! [`SessionContext`] explicitly into every operation. No ambient
//! current-user state.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{header::AUTHORIZATION, request::Parts, StatusCode};
use axum::extract::FromRequestParts;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use crate::problem;

/// Verified identity of the calling user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub user_id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

#[derive(Error, Debug, Clone)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Port for the external auth collaborator: token in, verified session out.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify(&self, token: &str) -> Result<SessionContext, AuthError>;
}

/// Extractor yielding the verified session for the current request.
/// Rejects with a 401 problem when no valid bearer credential is present.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub SessionContext);

fn bearer_token(parts: &Parts) -> Result<&str, AuthError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingToken)?;
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingToken)
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = problem::ProblemResponse;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let provider = parts
            .extensions
            .get::<Arc<dyn IdentityProvider>>()
            .cloned()
            .ok_or_else(|| {
                tracing::error!("IdentityProvider extension not installed");
                problem::internal_error("Identity provider not configured")
            })?;

        let token = bearer_token(parts).map_err(|e| {
            problem::from_parts(
                StatusCode::UNAUTHORIZED,
                "AUTH_UNAUTHENTICATED",
                "Unauthenticated",
                e.to_string(),
                parts.uri.path(),
            )
        })?;

        match provider.verify(token).await {
            Ok(session) => Ok(CurrentUser(session)),
            Err(AuthError::Unavailable(msg)) => {
                tracing::error!(error = %msg, "identity provider unavailable");
                Err(problem::internal_error("Identity provider unavailable"))
            }
            Err(e) => Err(problem::from_parts(
                StatusCode::UNAUTHORIZED,
                "AUTH_UNAUTHENTICATED",
                "Unauthenticated",
                e.to_string(),
                parts.uri.path(),
            )),
        }
    }
}

/// Fixed token → session map for development and tests.
#[derive(Default)]
pub struct StaticIdentityProvider {
    sessions: HashMap<String, SessionContext>,
}

impl StaticIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: impl Into<String>, session: SessionContext) -> Self {
        self.sessions.insert(token.into(), session);
        self
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn verify(&self, token: &str) -> Result<SessionContext, AuthError> {
        self.sessions
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}

/// Wire shape of the external provider's session endpoint.
#[derive(Debug, Deserialize)]
struct SessionDto {
    uid: Uuid,
    email: String,
    #[serde(rename = "displayName")]
    display_name: Option<String>,
    #[serde(rename = "photoUrl")]
    photo_url: Option<String>,
}

/// HTTP adapter delegating token verification to the auth collaborator.
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    base: Url,
}

impl HttpIdentityProvider {
    pub fn new(client: reqwest::Client, base: Url) -> Self {
        Self { client, base }
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    #[tracing::instrument(name = "serverkit.auth.verify", skip_all, fields(base = %self.base))]
    async fn verify(&self, token: &str) -> Result<SessionContext, AuthError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| AuthError::Unavailable("invalid auth base URL".into()))?
            .extend(&["session"]);

        let response = self
            .client
            .get(url.as_str())
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AuthError::InvalidToken);
        }
        if !response.status().is_success() {
            return Err(AuthError::Unavailable(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let dto: SessionDto = response
            .json()
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        Ok(SessionContext {
            user_id: dto.uid,
            email: dto.email,
            display_name: dto.display_name,
            photo_url: dto.photo_url,
        })
    }
}
