//! Session manager owned by the application root

use super::{ApiClient, ClientConfig, ClientError, RequestAuthenticator};
use crate::types::TokenResponse;
use singularity_core::validation::validate_registration;
use singularity_core::{
    AuthResult, Clock, LoginCredentials, Registration, Session, SessionEvents, SessionInvalidated,
    SessionStorage, SystemClock, TokenStore, User,
};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};

const LOGIN_FAILED: &str = "Login failed";
const REGISTRATION_FAILED: &str = "Registration failed";

/// Entry point for the UI layer
///
/// Bundles the API client, token store and request authenticator. Construct
/// one per application and hand it to whatever needs to talk to the backend.
/// Cloning is cheap and clones share the same session.
#[derive(Clone, Debug)]
pub struct SessionManager {
    authenticator: RequestAuthenticator,
}

impl SessionManager {
    /// Build a manager over the given storage backend using the system clock
    pub fn new(config: &ClientConfig, storage: Arc<dyn SessionStorage>) -> Result<Self, ClientError> {
        Self::with_clock(config, storage, Arc::new(SystemClock))
    }

    pub fn with_clock(
        config: &ClientConfig,
        storage: Arc<dyn SessionStorage>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ClientError> {
        let client = ApiClient::from_config(config)?;
        let store = TokenStore::with_clock(storage, clock).with_lifetime(config.token_lifetime());
        Ok(Self::from_parts(client, store, SessionEvents::new()))
    }

    pub fn from_parts(client: ApiClient, store: TokenStore, events: SessionEvents) -> Self {
        Self {
            authenticator: RequestAuthenticator::new(client, store, events),
        }
    }

    pub fn authenticator(&self) -> &RequestAuthenticator {
        &self.authenticator
    }

    pub fn store(&self) -> &TokenStore {
        self.authenticator.store()
    }

    /// Receive an event whenever the session is invalidated by the backend
    pub fn subscribe(&self) -> broadcast::Receiver<SessionInvalidated> {
        self.authenticator.events().subscribe()
    }

    /// Log in with email and password
    ///
    /// Never fails: errors are reported through [`AuthResult::error`].
    pub async fn login(&self, credentials: &LoginCredentials) -> AuthResult {
        let result = self.authenticator.client().login(credentials).await;
        match self.finish(result, LOGIN_FAILED) {
            Ok(user) => {
                info!(email = %credentials.email, "Logged in");
                AuthResult::success(user)
            }
            Err(message) => AuthResult::failure(message),
        }
    }

    /// Create an account and log in with it
    ///
    /// The form is validated locally first; invalid input never reaches the
    /// backend.
    pub async fn register(&self, registration: &Registration) -> AuthResult {
        if let Err(e) = validate_registration(registration) {
            return AuthResult::failure(e.to_string());
        }

        let result = self.authenticator.client().register(registration).await;
        match self.finish(result, REGISTRATION_FAILED) {
            Ok(user) => {
                info!(username = %registration.username, "Registered");
                AuthResult::success(user)
            }
            Err(message) => AuthResult::failure(message),
        }
    }

    /// Forget the current session
    pub fn logout(&self) -> Result<(), ClientError> {
        self.store().clear_tokens()?;
        info!("Logged out");
        Ok(())
    }

    /// Fetch the profile of the logged-in user
    pub async fn current_user(&self) -> Result<User, ClientError> {
        let request = self.authenticated_request(reqwest::Method::GET, "/auth/me");
        self.execute(request).await
    }

    /// Create a request builder for a protected endpoint
    ///
    /// Credentials are attached when the request is passed to
    /// [`SessionManager::execute`] or [`SessionManager::send`].
    pub fn authenticated_request(
        &self,
        method: reqwest::Method,
        path: &str,
    ) -> reqwest::RequestBuilder {
        self.authenticator.request(method, path)
    }

    pub async fn execute<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        self.authenticator.execute(request).await
    }

    pub async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ClientError> {
        self.authenticator.send(request).await
    }

    pub fn is_authenticated(&self) -> bool {
        self.store().has_session()
    }

    pub fn session(&self) -> Session {
        self.store().session()
    }

    fn finish(
        &self,
        result: Result<TokenResponse, ClientError>,
        fallback: &str,
    ) -> Result<Option<User>, String> {
        let tokens = result.map_err(|e| {
            warn!(error = %e, "{fallback}");
            e.detail().unwrap_or_else(|| fallback.to_string())
        })?;

        self.store()
            .set_tokens(&tokens.access_token, &tokens.refresh_token)
            .map_err(|e| {
                warn!(error = %e, "Failed to store session tokens");
                fallback.to_string()
            })?;

        Ok(tokens.user)
    }
}
