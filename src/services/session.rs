use std::sync::Arc;

use crate::{
    client::BookApi,
    error::{AppError, AppResult},
    models::{LoginRequest, SignupForm, SignupRequest, User},
    services::validation::{validate_login, validate_signup},
    storage::Storage,
};

/// Holds the signed-in state
///
/// The token lives in the `auth_token` cookie and the user in local storage.
/// Any verification failure clears both.
pub struct AuthSession {
    api: Arc<dyn BookApi>,
    storage: Storage,
    token: Option<String>,
    user: Option<User>,
    /// True while an auth request is outstanding
    pub loading: bool,
}

impl AuthSession {
    /// Restores whatever was persisted, without contacting the backend
    pub async fn restore(api: Arc<dyn BookApi>, storage: Storage) -> Self {
        let token = storage.auth_token().await;
        let user = storage.cached_user().await;

        tracing::debug!(
            has_token = token.is_some(),
            has_user = user.is_some(),
            "Restored auth session"
        );

        Self {
            api,
            storage,
            token,
            user,
            loading: false,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Re-validates the stored token against the backend
    ///
    /// Returns whether the session is still signed in. Any failure, including
    /// network errors, logs the user out.
    pub async fn validate(&mut self) -> bool {
        let Some(token) = self.token.clone() else {
            if self.user.is_some() {
                tracing::debug!("Cached user without token, clearing");
                self.expire().await;
            }
            return false;
        };

        self.loading = true;
        let result = self.api.verify(&token).await;
        self.loading = false;

        match result {
            Ok(response) if response.valid => {
                let user = match self.user.take() {
                    Some(mut cached) => {
                        cached.id = response.user.id;
                        cached.username = response.user.username;
                        cached
                    }
                    None => User {
                        id: response.user.id,
                        username: response.user.username,
                        email: String::new(),
                    },
                };

                if let Err(e) = self.storage.set_cached_user(&user).await {
                    tracing::error!(error = %e, "Failed to cache verified user");
                }
                tracing::info!(username = %user.username, "Session verified");
                self.user = Some(user);
                true
            }
            Ok(_) => {
                tracing::warn!("Backend reported token as invalid, logging out");
                self.expire().await;
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "Token verification failed, logging out");
                self.expire().await;
                false
            }
        }
    }

    /// Logs in and persists the session
    pub async fn login(&mut self, username: &str, password: &str) -> AppResult<User> {
        validate_login(username, password).map_err(AppError::InvalidInput)?;

        let request = LoginRequest {
            username: username.trim().to_string(),
            password: password.to_string(),
        };

        self.loading = true;
        let result = self.api.login(&request).await;
        self.loading = false;

        let response = result.map_err(|e| {
            tracing::warn!(error = %e, "Login failed");
            e
        })?;
        self.store(response.token, response.user).await
    }

    /// Creates an account and persists the session
    pub async fn signup(&mut self, form: &SignupForm) -> AppResult<User> {
        validate_signup(form).map_err(AppError::InvalidInput)?;

        let request = SignupRequest::from(form);

        self.loading = true;
        let result = self.api.signup(&request).await;
        self.loading = false;

        let response = result.map_err(|e| {
            tracing::warn!(error = %e, "Signup failed");
            e
        })?;
        self.store(response.token, response.user).await
    }

    /// Tells the backend (best effort) and forgets the session locally
    pub async fn logout(&mut self) -> AppResult<()> {
        if let Some(token) = self.token.as_deref() {
            if let Err(e) = self.api.logout(token).await {
                tracing::debug!(error = %e, "Backend logout failed, clearing locally anyway");
            }
        }
        self.token = None;
        self.user = None;
        self.storage.clear_auth().await?;
        tracing::info!("Logged out");
        Ok(())
    }

    /// Local logout after the backend rejected the token
    pub async fn expire(&mut self) {
        self.token = None;
        self.user = None;
        if let Err(e) = self.storage.clear_auth().await {
            tracing::error!(error = %e, "Failed to clear stored credentials");
        }
    }

    async fn store(&mut self, token: String, user: User) -> AppResult<User> {
        self.storage.set_auth_token(&token).await?;
        self.storage.set_cached_user(&user).await?;
        tracing::info!(username = %user.username, "Signed in");
        self.token = Some(token);
        self.user = Some(user.clone());
        Ok(user)
    }
}
