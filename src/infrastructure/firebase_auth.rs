// Firebase email/password authentication over the Identity Toolkit REST API
use crate::application::auth_provider::AuthProvider;
use crate::domain::auth::{AuthError, User};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

#[derive(Debug)]
pub struct FirebaseAuth {
    identity_url: String,
    api_key: String,
    client: reqwest::Client,
    user: watch::Sender<Option<User>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordResponse {
    local_id: String,
    #[serde(default)]
    email: String,
    id_token: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl FirebaseAuth {
    pub fn new(identity_url: String, api_key: String) -> Self {
        let (user, _) = watch::channel(None);
        Self {
            identity_url: identity_url.trim_end_matches('/').to_string(),
            api_key,
            client: reqwest::Client::new(),
            user,
        }
    }

    fn endpoint_url(&self, method: &str) -> String {
        format!(
            "{}/v1/accounts:{}?key={}",
            self.identity_url,
            method,
            urlencoding::encode(&self.api_key)
        )
    }

    async fn password_call(&self, method: &str, email: &str, password: &str) -> Result<User, AuthError> {
        let request = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };

        let response = self
            .client
            .post(self.endpoint_url(method))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Identity request {} failed: {}", method, e);
                AuthError::Unavailable
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            tracing::error!("Failed to read identity response: {}", e);
            AuthError::Unavailable
        })?;

        if !status.is_success() {
            return Err(rejection(&body));
        }

        let parsed: PasswordResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Malformed identity response: {}", e);
            AuthError::Unavailable
        })?;

        let user = User {
            uid: parsed.local_id,
            email: if parsed.email.is_empty() { email.to_string() } else { parsed.email },
            id_token: parsed.id_token,
        };
        self.user.send_replace(Some(user.clone()));
        Ok(user)
    }
}

/// The provider's own message, or a generic one when the body is unreadable.
fn rejection(body: &str) -> AuthError {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(parsed) if !parsed.error.message.is_empty() => AuthError::Rejected(parsed.error.message),
        _ => AuthError::Unavailable,
    }
}

#[async_trait]
impl AuthProvider for FirebaseAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError> {
        self.password_call("signInWithPassword", email, password).await
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<User, AuthError> {
        self.password_call("signUp", email, password).await
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        if let Some(user) = self.user.send_replace(None) {
            tracing::info!("User {} signed out", user.email);
        }
        Ok(())
    }

    fn watch_user(&self) -> watch::Receiver<Option<User>> {
        self.user.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url() {
        let auth = FirebaseAuth::new("https://identity.example.com/".into(), "web key".into());
        assert_eq!(
            auth.endpoint_url("signInWithPassword"),
            "https://identity.example.com/v1/accounts:signInWithPassword?key=web%20key"
        );
    }

    #[test]
    fn test_rejection_uses_provider_message() {
        let body = r#"{"error": {"code": 400, "message": "EMAIL_EXISTS", "errors": []}}"#;
        assert_eq!(rejection(body), AuthError::Rejected("EMAIL_EXISTS".into()));
    }

    #[test]
    fn test_unreadable_rejection() {
        assert_eq!(rejection("<html>502</html>"), AuthError::Unavailable);
    }

    #[test]
    fn test_request_shape() {
        let request = PasswordRequest {
            email: "a@b.c",
            password: "secret1",
            return_secure_token: true,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({"email": "a@b.c", "password": "secret1", "returnSecureToken": true})
        );
    }

    #[tokio::test]
    async fn test_sign_out_clears_user() {
        let auth = FirebaseAuth::new("https://identity.example.com".into(), "key".into());
        let rx = auth.watch_user();
        auth.user.send_replace(Some(User {
            uid: "u1".into(),
            email: "grower@example.com".into(),
            id_token: "t".into(),
        }));

        auth.sign_out().await.unwrap();

        assert!(rx.borrow().is_none());
    }
}
