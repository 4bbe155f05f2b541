//! Client for the token-auth REST API.
//!
//! Every successful response carries the current credential set in its
//! `access-token`, `uid` and `client` headers. The client copies those into
//! the token store and keeps the session state in step with the store.

use std::time::Duration;

use reqwest::{header::HeaderMap, Client, Response};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::auth::{CredentialSlot, Credentials, SessionState, TokenStore};
use crate::models::{SignInRequest, SignUpInfo, User, UserEnvelope};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

const SIGN_IN_PATH: &str = "/auth/sign_in";
const REGISTRATION_PATH: &str = "/auth";
const VALIDATE_TOKEN_PATH: &str = "/auth/validate_token";

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Auth API client.
/// Clone is cheap - reqwest::Client, the store and the session are all shared.
#[derive(Clone, Debug)]
pub struct AuthClient {
    client: Client,
    base_url: String,
    store: TokenStore,
    session: SessionState,
}

impl AuthClient {
    /// Create a client for `base_url`, reading and writing credentials
    /// through `store` and publishing on `session`.
    pub fn new(
        base_url: impl Into<String>,
        store: TokenStore,
        session: SessionState,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            store,
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Locally signed in: all three credential slots are present
    pub fn is_logged_in(&self) -> bool {
        self.store.is_authenticated()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ===== Operations =====

    /// Sign in with email and password.
    pub async fn sign_in(&self, request: &SignInRequest) -> Result<User, ApiError> {
        debug!(email = %request.email, "Signing in");
        let user = self.post_for_credentials(SIGN_IN_PATH, request).await?;
        info!(user_id = %user.id, "Signed in");
        Ok(user)
    }

    /// Register a new account. A successful registration is also a sign-in.
    pub async fn sign_up(&self, info: &SignUpInfo) -> Result<User, ApiError> {
        debug!(email = %info.email, "Registering account");
        let user = self.post_for_credentials(REGISTRATION_PATH, info).await?;
        info!(user_id = %user.id, "Account registered");
        Ok(user)
    }

    /// Check the stored credentials with the server and rotate them.
    ///
    /// Any failure clears the stored credentials and publishes a signed-out
    /// session before the error is returned.
    pub async fn validate_token(&self) -> Result<User, ApiError> {
        let credentials = self.store.credentials().ok_or(ApiError::NotSignedIn)?;

        match self.request_validation(&credentials).await {
            Ok(user) => Ok(user),
            Err(e) => {
                warn!(error = %e, "Token validation failed, clearing credentials");
                self.discard_credentials();
                Err(e)
            }
        }
    }

    /// The signed-in user, or `None`.
    ///
    /// Makes no request when the store is not fully populated.
    pub async fn current_user(&self) -> Option<User> {
        if !self.is_logged_in() {
            debug!("No stored credentials");
            return None;
        }
        self.validate_token().await.ok()
    }

    /// Forget the stored credentials.
    pub fn log_out(&self) {
        self.discard_credentials();
        info!("Logged out");
    }

    // ===== Request plumbing =====

    async fn post_for_credentials<B: Serialize>(&self, path: &str, body: &B) -> Result<User, ApiError> {
        let url = self.url(path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .inspect_err(|e| error!(url = %url, error = %e, "Request failed"))?;

        let response = Self::check_response(response).await?;
        let credentials = Self::credentials_from_headers(response.headers()).ok_or_else(|| {
            ApiError::InvalidResponse(format!("{} response is missing credential headers", path))
        })?;
        let user = Self::parse_user(response).await?;

        self.store_credentials(&credentials)?;
        Ok(user)
    }

    async fn request_validation(&self, credentials: &Credentials) -> Result<User, ApiError> {
        let url = self.url(VALIDATE_TOKEN_PATH);
        let mut request = self.client.get(&url);
        for slot in CredentialSlot::ALL {
            request = request.header(slot.key(), credentials.get(slot));
        }

        let response = request
            .send()
            .await
            .inspect_err(|e| error!(url = %url, error = %e, "Request failed"))?;
        let response = Self::check_response(response).await?;

        // The server may answer without rotating; keep the current set then
        let rotated = Self::credentials_from_headers(response.headers());
        let user = Self::parse_user(response).await?;

        match rotated {
            Some(rotated) => self.store_credentials(&rotated)?,
            None => debug!("Validation response carried no new credentials"),
        }
        Ok(user)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let err = ApiError::from_status(status, &body);
            error!(status = status.as_u16(), error = %err, "Auth API returned an error");
            Err(err)
        }
    }

    async fn parse_user(response: Response) -> Result<User, ApiError> {
        let text = response.text().await?;
        let envelope: UserEnvelope = serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse user payload: {}", e)))?;
        Ok(envelope.data)
    }

    fn credentials_from_headers(headers: &HeaderMap) -> Option<Credentials> {
        let value = |slot: CredentialSlot| {
            headers
                .get(slot.key())
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        Credentials::from_parts(
            value(CredentialSlot::AccessToken),
            value(CredentialSlot::Uid),
            value(CredentialSlot::Client),
        )
    }

    /// Save a complete set, then publish what the store now holds.
    ///
    /// A failed save leaves the previous set (or nothing) in the store, so
    /// the session only changes if the store no longer agrees with it.
    fn store_credentials(&self, credentials: &Credentials) -> Result<(), ApiError> {
        if let Err(e) = self.store.save(credentials) {
            error!(error = %e, "Failed to save credentials");
            let stored = self.store.is_authenticated();
            if stored != self.session.is_logged_in() {
                self.session.publish(stored);
            }
            return Err(ApiError::Storage(e));
        }
        self.session.publish(self.store.is_authenticated());
        Ok(())
    }

    fn discard_credentials(&self) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear stored credentials");
        }
        self.session.publish(false);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use reqwest::header::HeaderValue;

    use super::*;
    use crate::auth::MemoryStore;

    fn client(base: &str) -> AuthClient {
        let store = TokenStore::new(Arc::new(MemoryStore::new()));
        let session = SessionState::from_store(&store);
        AuthClient::new(base, store, session).unwrap()
    }

    #[test]
    fn test_base_url_trailing_slash_dropped() {
        let c = client("http://localhost:3000/");
        assert_eq!(c.base_url(), "http://localhost:3000");
        assert_eq!(c.url(SIGN_IN_PATH), "http://localhost:3000/auth/sign_in");
    }

    #[test]
    fn test_credentials_from_headers_requires_all() {
        let mut headers = HeaderMap::new();
        headers.insert("access-token", HeaderValue::from_static("tok"));
        headers.insert("uid", HeaderValue::from_static("alice@example.com"));
        assert!(AuthClient::credentials_from_headers(&headers).is_none());

        headers.insert("client", HeaderValue::from_static("cli"));
        let creds = AuthClient::credentials_from_headers(&headers).unwrap();
        assert_eq!(creds.access_token, "tok");
        assert_eq!(creds.client, "cli");
    }

    #[test]
    fn test_credentials_from_headers_rejects_empty_value() {
        let mut headers = HeaderMap::new();
        headers.insert("access-token", HeaderValue::from_static(""));
        headers.insert("uid", HeaderValue::from_static("alice@example.com"));
        headers.insert("client", HeaderValue::from_static("cli"));
        assert!(AuthClient::credentials_from_headers(&headers).is_none());
    }

    #[test]
    fn test_log_out_publishes_false() {
        let c = client("http://localhost:3000");
        c.store()
            .save(&Credentials {
                access_token: "tok".into(),
                uid: "u".into(),
                client: "cli".into(),
            })
            .unwrap();
        c.session().publish(true);

        c.log_out();
        assert!(!c.is_logged_in());
        assert!(!c.session().is_logged_in());
    }

    #[tokio::test]
    async fn test_validate_without_credentials_is_not_signed_in() {
        // Unroutable base URL: a request would fail as a network error instead
        let c = client("http://127.0.0.1:9");
        assert!(matches!(c.validate_token().await, Err(ApiError::NotSignedIn)));
        assert!(c.current_user().await.is_none());
    }
}
