//! Bearer credential handling for outgoing requests
//!
//! Every request to a protected endpoint goes through [`RequestAuthenticator`].
//! Before sending it attaches the stored access token, refreshing it first when
//! the token store says it has expired. After the response arrives, a 401 ends
//! the session no matter which request received it.
//!
//! Refresh failures and 401s are terminal: the token store is cleared, a
//! [`SessionInvalidated`](singularity_core::SessionInvalidated) event is
//! broadcast, and nothing is retried.

use super::{ApiClient, ClientError};
use singularity_core::{InvalidationReason, SessionEvents, TokenStore};
use tracing::{debug, warn};

/// Attaches, refreshes and revokes bearer credentials around API calls
#[derive(Clone, Debug)]
pub struct RequestAuthenticator {
    client: ApiClient,
    store: TokenStore,
    events: SessionEvents,
}

impl RequestAuthenticator {
    pub fn new(client: ApiClient, store: TokenStore, events: SessionEvents) -> Self {
        Self {
            client,
            store,
            events,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    pub fn events(&self) -> &SessionEvents {
        &self.events
    }

    /// Create a request builder for a path under the API base URL
    pub fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client.request(method, path)
    }

    /// Attach a credential to a pending request
    ///
    /// A fresh access token is attached as is. An expired or missing one is
    /// replaced through the refresh endpoint when a refresh token is stored;
    /// the refresh token itself is kept. With no tokens at all the request is
    /// returned unchanged and the server decides.
    pub async fn authorize(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, ClientError> {
        if let Some(access_token) = self.store.access_token()
            && !self.store.is_token_expired()
        {
            return Ok(request.bearer_auth(access_token));
        }

        let Some(refresh_token) = self.store.refresh_token() else {
            debug!("No session tokens, sending request without credentials");
            return Ok(request);
        };

        debug!("Access token missing or expired, refreshing");
        let refreshed = match self.client.refresh(&refresh_token).await {
            Ok(refreshed) => refreshed,
            Err(e) => {
                warn!(error = %e, "Token refresh failed, ending session");
                self.invalidate(InvalidationReason::RefreshFailed);
                return Err(ClientError::RefreshFailed(Box::new(e)));
            }
        };

        self.store
            .set_tokens(&refreshed.access_token, &refresh_token)?;
        Ok(request.bearer_auth(refreshed.access_token))
    }

    /// Authorize and send a request, returning the successful response
    pub async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ClientError> {
        let request = self.authorize(request).await?;
        let result = self.client.send(request).await;
        self.inspect(result)
    }

    /// Authorize and send a request, decoding the JSON response
    pub async fn execute<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let request = self.authorize(request).await?;
        let result = self.client.execute(request).await;
        self.inspect(result)
    }

    /// Clear the token store and tell subscribers the session is gone
    pub fn invalidate(&self, reason: InvalidationReason) {
        if let Err(e) = self.store.clear_tokens() {
            warn!(error = %e, "Failed to clear session tokens");
        }
        self.events.emit(reason);
    }

    fn inspect<T>(&self, result: Result<T, ClientError>) -> Result<T, ClientError> {
        if let Err(error) = &result
            && error.is_auth_expired()
        {
            warn!("Request was rejected as unauthorized, ending session");
            self.invalidate(InvalidationReason::Unauthorized);
        }
        result
    }
}
