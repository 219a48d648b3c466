//! Login, registration, and logout flows around the credential store.

use crate::client::AuthApi;
use crate::credentials::CredentialStore;
use crate::error::Result;
use crate::models::{RegisterInput, User};
use std::sync::Arc;
use tracing::info;

/// Credential lifecycle service.
///
/// Owns the only code paths that write the credential store: login (and
/// register-then-login) sets the token, logout clears it. The session
/// guard and API client only ever read.
pub struct AuthService<A: AuthApi> {
    api: A,
    credentials: Arc<dyn CredentialStore>,
}

impl<A: AuthApi> AuthService<A> {
    pub fn new(api: A, credentials: Arc<dyn CredentialStore>) -> Self {
        Self { api, credentials }
    }

    /// Authenticate and persist the returned bearer token.
    pub async fn login(&self, username: &str, password: &str) -> Result<User> {
        let payload = self.api.login(username, password).await?;
        self.credentials.set(&payload.access_token)?;
        info!("Logged in as {}", payload.user.username);
        Ok(payload.user)
    }

    /// Register a new account, then log in with the same credentials.
    pub async fn register(&self, username: &str, password: &str) -> Result<User> {
        let user = self
            .api
            .register(RegisterInput {
                username: username.to_string(),
                password: password.to_string(),
            })
            .await?;
        info!("Registered user {} (id {})", user.username, user.id);
        self.login(username, password).await
    }

    /// Destroy the session by clearing the stored credential.
    pub fn logout(&self) -> Result<()> {
        self.credentials.clear()?;
        info!("Logged out");
        Ok(())
    }
}
