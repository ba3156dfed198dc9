//! The auth facade used by portal code.
//!
//! Every operation delegates to exactly one provider call. Provider errors
//! are logged and handed back unchanged; nothing is retried or validated
//! locally.

use std::sync::Arc;

use crate::error::AuthResult;
use crate::provider::{AuthProvider, Subscription};
use crate::types::{
    AuthChangeEvent, Metadata, PasswordCredentials, ResetPasswordOptions, Session,
    SignUpCredentials, SignUpOptions, User, UserAttributes,
};

/// Page the emailed password-reset link opens, relative to the site origin.
pub const RESET_PASSWORD_PAGE: &str = "/reset-password.html";

pub struct AuthService<P> {
    provider: P,
    site_origin: String,
}

impl<P: AuthProvider> AuthService<P> {
    /// `site_origin` is the portal's public origin, e.g. `https://portal.example.com`.
    pub fn new(provider: P, site_origin: impl Into<String>) -> Self {
        Self {
            provider,
            site_origin: site_origin.into(),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Where password-reset emails send the user.
    pub fn reset_redirect_url(&self) -> String {
        format!(
            "{}{}",
            self.site_origin.trim_end_matches('/'),
            RESET_PASSWORD_PAGE
        )
    }

    /// Sign in with email and password.
    pub async fn sign_in(&self, email: &str, password: &str) -> AuthResult<User> {
        let result = self
            .provider
            .sign_in_with_password(PasswordCredentials {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await;

        match result {
            Ok(response) => Ok(response.user),
            Err(error) => {
                tracing::error!("Sign in error: {}", error.message);
                Err(error)
            }
        }
    }

    /// Sign up with email and password. `metadata` becomes the user's profile
    /// data (name, etc.).
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: Option<Metadata>,
    ) -> AuthResult<User> {
        let result = self
            .provider
            .sign_up(SignUpCredentials {
                email: email.to_string(),
                password: password.to_string(),
                options: SignUpOptions {
                    data: metadata.unwrap_or_default(),
                },
            })
            .await;

        match result {
            Ok(response) => Ok(response.user),
            Err(error) => {
                tracing::error!("Sign up error: {}", error.message);
                Err(error)
            }
        }
    }

    pub async fn sign_out(&self) -> AuthResult<()> {
        self.provider.sign_out().await.inspect_err(|error| {
            tracing::error!("Sign out error: {}", error.message);
        })
    }

    /// The signed-in user, or `None` when there is none or it cannot be fetched.
    pub async fn get_current_user(&self) -> Option<User> {
        match self.provider.get_user().await {
            Ok(user) => Some(user),
            Err(error) => {
                tracing::debug!("No current user: {}", error.message);
                None
            }
        }
    }

    pub async fn get_session(&self) -> Option<Session> {
        match self.provider.get_session().await {
            Ok(session) => session,
            Err(error) => {
                tracing::debug!("No current session: {}", error.message);
                None
            }
        }
    }

    /// Send a password reset email linking back to the portal's reset page.
    pub async fn reset_password(&self, email: &str) -> AuthResult<()> {
        let options = ResetPasswordOptions {
            redirect_to: Some(self.reset_redirect_url()),
        };

        self.provider
            .reset_password_for_email(email, options)
            .await
            .inspect_err(|error| {
                tracing::error!("Password reset error: {}", error.message);
            })
    }

    /// Update the password, either while logged in or from a reset link.
    pub async fn update_password(&self, new_password: &str) -> AuthResult<()> {
        let attributes = UserAttributes {
            password: Some(new_password.to_string()),
            ..Default::default()
        };

        match self.provider.update_user(attributes).await {
            Ok(_) => Ok(()),
            Err(error) => {
                tracing::error!("Update password error: {}", error.message);
                Err(error)
            }
        }
    }

    /// Subscribe to auth state changes. `callback` runs with `(event, session)`
    /// on every change until the returned subscription is unsubscribed.
    pub fn on_auth_state_change<F>(&self, callback: F) -> Subscription
    where
        F: Fn(AuthChangeEvent, Option<Session>) + Send + Sync + 'static,
    {
        self.provider.on_auth_state_change(Arc::new(callback))
    }

    pub async fn is_authenticated(&self) -> bool {
        self.get_session().await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthError;
    use crate::provider::AuthStateCallback;
    use crate::types::AuthResponse;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use uuid::Uuid;

    /// Provider double that records calls and replays canned results.
    #[derive(Default)]
    struct MockProvider {
        calls: Mutex<Vec<String>>,
        fail_with: Option<AuthError>,
        session: Option<Session>,
        reset_options: Mutex<Option<ResetPasswordOptions>>,
        sign_up_data: Mutex<Option<Metadata>>,
        callbacks: Mutex<Vec<AuthStateCallback>>,
    }

    impl MockProvider {
        fn failing(message: &str) -> Self {
            Self {
                fail_with: Some(AuthError::new(message).with_status(400)),
                ..Default::default()
            }
        }

        fn with_session() -> Self {
            Self {
                session: Some(test_session()),
                ..Default::default()
            }
        }

        fn record(&self, call: &str) {
            self.calls.lock().unwrap().push(call.to_string());
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn outcome<T>(&self, value: T) -> AuthResult<T> {
            match &self.fail_with {
                Some(error) => Err(error.clone()),
                None => Ok(value),
            }
        }
    }

    fn test_user() -> User {
        User {
            id: Uuid::parse_str("8d0fd2b3-9ca7-4d9e-a95f-9e13dded323e").unwrap(),
            email: Some("a@b.com".to_string()),
            user_metadata: Metadata::new(),
            extra: Metadata::new(),
        }
    }

    fn test_session() -> Session {
        Session {
            access_token: "access".to_string(),
            token_type: "bearer".to_string(),
            expires_in: 3600,
            expires_at: None,
            refresh_token: "refresh".to_string(),
            user: test_user(),
        }
    }

    #[async_trait]
    impl AuthProvider for MockProvider {
        async fn sign_in_with_password(
            &self,
            credentials: PasswordCredentials,
        ) -> AuthResult<AuthResponse> {
            self.record(&format!("sign_in:{}:{}", credentials.email, credentials.password));
            self.outcome(AuthResponse {
                user: test_user(),
                session: Some(test_session()),
            })
        }

        async fn sign_up(&self, credentials: SignUpCredentials) -> AuthResult<AuthResponse> {
            self.record(&format!("sign_up:{}", credentials.email));
            *self.sign_up_data.lock().unwrap() = Some(credentials.options.data);
            self.outcome(AuthResponse {
                user: test_user(),
                session: None,
            })
        }

        async fn sign_out(&self) -> AuthResult<()> {
            self.record("sign_out");
            self.outcome(())
        }

        async fn get_user(&self) -> AuthResult<User> {
            self.record("get_user");
            match &self.session {
                Some(session) => Ok(session.user.clone()),
                None => Err(AuthError::session_missing()),
            }
        }

        async fn get_session(&self) -> AuthResult<Option<Session>> {
            self.record("get_session");
            Ok(self.session.clone())
        }

        async fn reset_password_for_email(
            &self,
            email: &str,
            options: ResetPasswordOptions,
        ) -> AuthResult<()> {
            self.record(&format!("reset:{}", email));
            *self.reset_options.lock().unwrap() = Some(options);
            self.outcome(())
        }

        async fn update_user(&self, attributes: UserAttributes) -> AuthResult<User> {
            self.record(&format!(
                "update_user:{}",
                attributes.password.unwrap_or_default()
            ));
            self.outcome(test_user())
        }

        fn on_auth_state_change(&self, callback: AuthStateCallback) -> Subscription {
            self.record("subscribe");
            self.callbacks.lock().unwrap().push(callback);
            Subscription::new(|| {})
        }
    }

    fn service(provider: MockProvider) -> AuthService<Arc<MockProvider>> {
        AuthService::new(Arc::new(provider), "https://portal.example.com/")
    }

    /// In-memory sink for a test-local `tracing` subscriber.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn capture_logs() -> (LogBuffer, tracing::subscriber::DefaultGuard) {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        (logs, guard)
    }

    #[tokio::test]
    async fn test_sign_in_returns_provider_user() {
        let auth = service(MockProvider::default());

        let user = auth.sign_in("a@b.com", "pw").await.unwrap();

        assert_eq!(user, test_user());
        assert_eq!(auth.provider().calls(), vec!["sign_in:a@b.com:pw"]);
    }

    #[tokio::test]
    async fn test_sign_in_returns_provider_error() {
        let auth = service(MockProvider::failing("Invalid login credentials"));

        let err = auth.sign_in("a@b.com", "pw").await.unwrap_err();

        assert_eq!(err.message, "Invalid login credentials");
        assert_eq!(err.status, Some(400));
    }

    #[tokio::test]
    async fn test_sign_in_failure_is_logged() {
        let (logs, _guard) = capture_logs();
        let auth = service(MockProvider::failing("Invalid login credentials"));

        auth.sign_in("a@b.com", "hunter2").await.unwrap_err();

        let output = logs.contents();
        assert!(output.contains("ERROR"), "{}", output);
        assert!(
            output.contains("Sign in error: Invalid login credentials"),
            "{}",
            output
        );
        assert!(!output.contains("hunter2"));
    }

    #[tokio::test]
    async fn test_successful_sign_in_logs_no_error() {
        let (logs, _guard) = capture_logs();
        let auth = service(MockProvider::default());

        auth.sign_in("a@b.com", "pw").await.unwrap();

        assert!(!logs.contents().contains("Sign in error"));
    }

    #[tokio::test]
    async fn test_sign_up_passes_metadata() {
        let auth = service(MockProvider::default());
        let mut metadata = Metadata::new();
        metadata.insert("name".to_string(), json!("Pat"));

        auth.sign_up("a@b.com", "pw", Some(metadata.clone()))
            .await
            .unwrap();

        let sent = auth.provider().sign_up_data.lock().unwrap().clone();
        assert_eq!(sent, Some(metadata));
    }

    #[tokio::test]
    async fn test_sign_up_without_metadata_sends_empty_map() {
        let auth = service(MockProvider::default());

        auth.sign_up("a@b.com", "pw", None).await.unwrap();

        let sent = auth.provider().sign_up_data.lock().unwrap().clone();
        assert_eq!(sent, Some(Metadata::new()));
    }

    #[tokio::test]
    async fn test_sign_up_error() {
        let auth = service(MockProvider::failing("User already registered"));

        let err = auth.sign_up("a@b.com", "pw", None).await.unwrap_err();
        assert_eq!(err.message, "User already registered");
    }

    #[tokio::test]
    async fn test_sign_out() {
        let auth = service(MockProvider::default());
        assert!(auth.sign_out().await.is_ok());

        let auth = service(MockProvider::failing("network down"));
        assert_eq!(auth.sign_out().await.unwrap_err().message, "network down");
    }

    #[tokio::test]
    async fn test_get_current_user_swallows_missing_session() {
        let auth = service(MockProvider::default());
        assert_eq!(auth.get_current_user().await, None);

        let auth = service(MockProvider::with_session());
        assert_eq!(auth.get_current_user().await, Some(test_user()));
    }

    #[tokio::test]
    async fn test_is_authenticated_follows_session() {
        let auth = service(MockProvider::default());
        assert!(!auth.is_authenticated().await);
        assert_eq!(auth.provider().calls(), vec!["get_session"]);

        let auth = service(MockProvider::with_session());
        assert!(auth.is_authenticated().await);
        assert_eq!(auth.get_session().await, Some(test_session()));
    }

    #[tokio::test]
    async fn test_reset_password_redirects_to_reset_page() {
        let auth = service(MockProvider::default());

        auth.reset_password("a@b.com").await.unwrap();

        let options = auth.provider().reset_options.lock().unwrap().clone().unwrap();
        assert_eq!(
            options.redirect_to.as_deref(),
            Some("https://portal.example.com/reset-password.html")
        );
        assert_eq!(auth.provider().calls(), vec!["reset:a@b.com"]);
    }

    #[tokio::test]
    async fn test_reset_password_error() {
        let auth = service(MockProvider::failing("Email rate limit exceeded"));
        let err = auth.reset_password("a@b.com").await.unwrap_err();
        assert_eq!(err.message, "Email rate limit exceeded");
    }

    #[tokio::test]
    async fn test_update_password() {
        let auth = service(MockProvider::default());
        auth.update_password("n3w-pass").await.unwrap();
        assert_eq!(auth.provider().calls(), vec!["update_user:n3w-pass"]);

        let auth = service(MockProvider::failing("Password should be at least 6 characters"));
        assert!(auth.update_password("x").await.is_err());
    }

    #[tokio::test]
    async fn test_on_auth_state_change_forwards_callback() {
        let auth = service(MockProvider::default());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();

        let subscription = auth.on_auth_state_change(move |event, session| {
            sink.lock().unwrap().push((event, session.is_some()));
        });

        let callbacks = auth.provider().callbacks.lock().unwrap().clone();
        assert_eq!(callbacks.len(), 1);
        callbacks[0](AuthChangeEvent::SignedIn, Some(test_session()));
        callbacks[0](AuthChangeEvent::SignedOut, None);

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                (AuthChangeEvent::SignedIn, true),
                (AuthChangeEvent::SignedOut, false)
            ]
        );
        subscription.unsubscribe();
    }
}
