//! Supabase Auth (GoTrue) provider.
//!
//! Talks to the GoTrue REST endpoints under `/auth/v1`, keeps the current
//! session in memory, and broadcasts auth state changes to subscribers.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::RwLock;

use crate::error::{AuthError, AuthResult};
use crate::provider::{AuthProvider, AuthStateCallback, Subscription};
use crate::types::{
    AuthChangeEvent, AuthResponse, PasswordCredentials, ResetPasswordOptions, Session,
    SignUpCredentials, User, UserAttributes,
};

const EVENT_CHANNEL_CAPACITY: usize = 16;

type AuthEvent = (AuthChangeEvent, Option<Session>);

/// GoTrue error bodies vary by endpoint and server version.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
    error_code: Option<String>,
}

/// Sign-up returns a session when email confirmation is disabled, otherwise
/// just the pending user.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpBody {
    Session(Session),
    User(User),
}

pub struct SupabaseAuthClient {
    http: Client,
    auth_url: String,
    api_key: String,
    session: Arc<RwLock<Option<Session>>>,
    events: broadcast::Sender<AuthEvent>,
}

impl SupabaseAuthClient {
    /// Create a client for the project at `project_url` using its anon key.
    pub fn new(project_url: &str, api_key: impl Into<String>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            http: Client::new(),
            auth_url: format!("{}/auth/v1", project_url.trim_end_matches('/')),
            api_key: api_key.into(),
            session: Arc::new(RwLock::new(None)),
            events,
        }
    }

    /// Client for the portal's own Supabase project.
    pub fn from_shared_config() -> Self {
        Self::new(shared::SUPABASE_URL, shared::SUPABASE_ANON_KEY)
    }

    /// Restore a previously persisted session.
    pub async fn set_session(&self, session: Session) {
        self.store_session(Some(session), AuthChangeEvent::SignedIn)
            .await;
    }

    fn request(&self, method: Method, path: &str, bearer: Option<&str>) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.auth_url, path))
            .header("apikey", &self.api_key)
            .bearer_auth(bearer.unwrap_or(&self.api_key))
    }

    async fn execute(request: RequestBuilder) -> AuthResult<Response> {
        let response = request.send().await?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(error_from_response(response).await)
        }
    }

    async fn access_token(&self) -> Option<String> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|s| s.access_token.clone())
    }

    async fn store_session(&self, session: Option<Session>, event: AuthChangeEvent) {
        *self.session.write().await = session.clone();
        self.emit(event, session);
    }

    fn emit(&self, event: AuthChangeEvent, session: Option<Session>) {
        tracing::debug!(?event, "Auth state changed");
        if self.events.send((event, session)).is_err() {
            tracing::trace!("No auth state subscribers");
        }
    }
}

async fn error_from_response(response: Response) -> AuthError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let parsed: ErrorBody = serde_json::from_str(&body).unwrap_or_default();

    let message = parsed
        .msg
        .or(parsed.message)
        .or(parsed.error_description)
        .or_else(|| parsed.error.clone())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());

    let error = AuthError::new(message).with_status(status.as_u16());
    match parsed.error_code.or(parsed.error) {
        Some(code) => error.with_code(code),
        None => error,
    }
}

#[async_trait]
impl AuthProvider for SupabaseAuthClient {
    async fn sign_in_with_password(
        &self,
        credentials: PasswordCredentials,
    ) -> AuthResult<AuthResponse> {
        let request = self
            .request(Method::POST, "/token", None)
            .query(&[("grant_type", "password")])
            .json(&credentials);

        let session: Session = Self::execute(request).await?.json().await?;
        let user = session.user.clone();

        self.store_session(Some(session.clone()), AuthChangeEvent::SignedIn)
            .await;

        Ok(AuthResponse {
            user,
            session: Some(session),
        })
    }

    async fn sign_up(&self, credentials: SignUpCredentials) -> AuthResult<AuthResponse> {
        let body = serde_json::json!({
            "email": credentials.email,
            "password": credentials.password,
            "data": credentials.options.data,
        });
        let request = self.request(Method::POST, "/signup", None).json(&body);

        match Self::execute(request).await?.json::<SignUpBody>().await? {
            SignUpBody::Session(session) => {
                let user = session.user.clone();
                self.store_session(Some(session.clone()), AuthChangeEvent::SignedIn)
                    .await;
                Ok(AuthResponse {
                    user,
                    session: Some(session),
                })
            }
            SignUpBody::User(user) => {
                tracing::info!("Sign up pending email confirmation");
                Ok(AuthResponse {
                    user,
                    session: None,
                })
            }
        }
    }

    async fn sign_out(&self) -> AuthResult<()> {
        if let Some(token) = self.access_token().await {
            let request = self.request(Method::POST, "/logout", Some(&token));
            if let Err(err) = Self::execute(request).await {
                // An expired or revoked token is already signed out upstream.
                if !matches!(err.status, Some(401 | 403 | 404)) {
                    return Err(err);
                }
            }
        }

        self.store_session(None, AuthChangeEvent::SignedOut).await;
        Ok(())
    }

    async fn get_user(&self) -> AuthResult<User> {
        let token = self
            .access_token()
            .await
            .ok_or_else(AuthError::session_missing)?;

        let request = self.request(Method::GET, "/user", Some(&token));
        Ok(Self::execute(request).await?.json().await?)
    }

    async fn get_session(&self) -> AuthResult<Option<Session>> {
        Ok(self.session.read().await.clone())
    }

    async fn reset_password_for_email(
        &self,
        email: &str,
        options: ResetPasswordOptions,
    ) -> AuthResult<()> {
        let mut request = self
            .request(Method::POST, "/recover", None)
            .json(&serde_json::json!({ "email": email }));

        if let Some(redirect_to) = &options.redirect_to {
            request = request.query(&[("redirect_to", redirect_to)]);
        }

        Self::execute(request).await?;
        Ok(())
    }

    async fn update_user(&self, attributes: UserAttributes) -> AuthResult<User> {
        let token = self
            .access_token()
            .await
            .ok_or_else(AuthError::session_missing)?;

        let request = self
            .request(Method::PUT, "/user", Some(&token))
            .json(&attributes);
        let user: User = Self::execute(request).await?.json().await?;

        let session = {
            let mut guard = self.session.write().await;
            if let Some(session) = guard.as_mut() {
                session.user = user.clone();
            }
            guard.clone()
        };
        self.emit(AuthChangeEvent::UserUpdated, session);

        Ok(user)
    }

    /// Delivery runs on a task spawned onto the caller's tokio runtime. Called
    /// outside a runtime, nothing is delivered and the returned subscription
    /// is inert.
    fn on_auth_state_change(&self, callback: AuthStateCallback) -> Subscription {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                tracing::warn!("Auth state listener not registered: {}", e);
                return Subscription::new(|| {});
            }
        };

        let mut events = self.events.subscribe();
        let session = self.session.clone();

        let task = handle.spawn(async move {
            let initial = session.read().await.clone();
            callback(AuthChangeEvent::InitialSession, initial);

            loop {
                match events.recv().await {
                    Ok((event, session)) => callback(event, session),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Auth state subscriber fell behind");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        Subscription::new(move || task.abort())
    }
}
