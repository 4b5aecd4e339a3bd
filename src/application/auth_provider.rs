// Authentication provider trait
use crate::domain::auth::{AuthError, User};
use async_trait::async_trait;
use tokio::sync::watch;

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError>;

    async fn sign_up(&self, email: &str, password: &str) -> Result<User, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Current user, updated on every sign-in and sign-out.
    fn watch_user(&self) -> watch::Receiver<Option<User>>;
}
