// Auth service - Validates the sign-in form before calling the provider
use crate::application::auth_provider::AuthProvider;
use crate::domain::auth::{AuthError, AuthMode, Credentials, User};
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Clone)]
pub struct AuthService {
    provider: Arc<dyn AuthProvider>,
}

impl AuthService {
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self { provider }
    }

    pub async fn sign_in(&self, credentials: &Credentials) -> Result<User, AuthError> {
        credentials.validate(AuthMode::SignIn)?;
        let user = self
            .provider
            .sign_in(&credentials.email, &credentials.password)
            .await
            .inspect_err(|e| tracing::warn!("Sign-in failed: {}", e))?;
        tracing::info!("User {} signed in", user.email);
        Ok(user)
    }

    pub async fn sign_up(&self, credentials: &Credentials) -> Result<User, AuthError> {
        credentials.validate(AuthMode::SignUp)?;
        let user = self
            .provider
            .sign_up(&credentials.email, &credentials.password)
            .await
            .inspect_err(|e| tracing::warn!("Sign-up failed: {}", e))?;
        tracing::info!("User {} signed up", user.email);
        Ok(user)
    }

    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.provider.sign_out().await
    }

    pub fn current_user(&self) -> Option<User> {
        self.provider.watch_user().borrow().clone()
    }

    pub fn watch_user(&self) -> watch::Receiver<Option<User>> {
        self.provider.watch_user()
    }
}
