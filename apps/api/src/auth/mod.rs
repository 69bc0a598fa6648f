//! Identity provider integration — presence gating and sign-out.
//!
//! The report routes only care whether a user is present; identity details
//! beyond that are never inspected here.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use tracing::debug;

use crate::errors::AppError;
use crate::state::AppState;

const USER_PATH: &str = "/auth/v1/user";
const LOGOUT_PATH: &str = "/auth/v1/logout";

/// Minimal view of the signed-in user.
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    pub id: String,
}

/// Client for the external identity provider.
#[derive(Clone)]
pub struct IdentityClient {
    client: reqwest::Client,
    base_url: String,
}

impl IdentityClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .expect("Failed to build HTTP client"),
            base_url,
        }
    }

    /// Asks the provider who the bearer token belongs to. `None` means "no
    /// user present" (expired or invalid session), which is not an error.
    pub async fn current_user(&self, token: &str) -> Result<Option<UserInfo>, AppError> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, USER_PATH))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AppError::Identity(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            let user = response
                .json::<UserInfo>()
                .await
                .map_err(|e| AppError::Identity(format!("Malformed user response: {e}")))?;
            return Ok(Some(user));
        }

        match status.as_u16() {
            401 | 403 => Ok(None),
            _ => {
                let body = response.text().await.unwrap_or_default();
                Err(AppError::Identity(format!(
                    "User lookup failed: {status} - {body}"
                )))
            }
        }
    }

    /// Ends the session with the provider. An already-expired session counts
    /// as signed out.
    pub async fn sign_out(&self, token: &str) -> Result<(), AppError> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, LOGOUT_PATH))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AppError::Identity(e.to_string()))?;

        let status = response.status();
        if status.is_success() || status.as_u16() == 401 {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(AppError::Identity(format!(
            "Sign-out failed: {status} - {body}"
        )))
    }
}

/// Middleware gating a route on user presence: extracts the bearer token,
/// asks the identity provider, and rejects with 401 when no user is present.
pub async fn require_user(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())
        .ok_or(AppError::Unauthorized)?
        .to_string();

    let user = state
        .identity
        .current_user(&token)
        .await?
        .ok_or(AppError::Unauthorized)?;

    debug!("Authenticated request for user {}", user.id);
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// POST /api/v1/auth/signout
pub async fn handle_sign_out(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let token = bearer_token(&headers).ok_or(AppError::Unauthorized)?;
    state.identity.sign_out(token).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
