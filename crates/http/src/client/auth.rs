//! Authentication API client methods

use super::{ApiClient, ClientError};
use crate::types::{RefreshRequest, RefreshResponse, TokenResponse};
use reqwest::Method;
use singularity_core::{LoginCredentials, Registration};

impl ApiClient {
    /// Exchange email and password for a token pair
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<TokenResponse, ClientError> {
        let req = self.request(Method::POST, "/auth/login").json(credentials);
        self.execute(req).await
    }

    /// Create an account and receive its first token pair
    pub async fn register(&self, registration: &Registration) -> Result<TokenResponse, ClientError> {
        let req = self.request(Method::POST, "/auth/register").json(registration);
        self.execute(req).await
    }

    /// Trade a refresh token for a new access token
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, ClientError> {
        let req = self
            .request(Method::POST, "/auth/refresh")
            .json(&RefreshRequest {
                refresh_token: refresh_token.to_string(),
            });
        self.execute(req).await
    }
}
