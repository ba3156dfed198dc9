//! The capability contract for auth backends.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::AuthResult;
use crate::types::{
    AuthChangeEvent, AuthResponse, PasswordCredentials, ResetPasswordOptions, Session,
    SignUpCredentials, User, UserAttributes,
};

/// Invoked with every auth state change until the subscription is cancelled.
pub type AuthStateCallback = Arc<dyn Fn(AuthChangeEvent, Option<Session>) + Send + Sync>;

/// Operations an authentication backend must provide.
///
/// `SupabaseAuthClient` is the production implementation; tests substitute
/// their own.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in_with_password(&self, credentials: PasswordCredentials)
        -> AuthResult<AuthResponse>;

    async fn sign_up(&self, credentials: SignUpCredentials) -> AuthResult<AuthResponse>;

    async fn sign_out(&self) -> AuthResult<()>;

    /// Fetch the user behind the current session.
    async fn get_user(&self) -> AuthResult<User>;

    async fn get_session(&self) -> AuthResult<Option<Session>>;

    async fn reset_password_for_email(
        &self,
        email: &str,
        options: ResetPasswordOptions,
    ) -> AuthResult<()>;

    async fn update_user(&self, attributes: UserAttributes) -> AuthResult<User>;

    /// Register `callback` for auth state changes.
    fn on_auth_state_change(&self, callback: AuthStateCallback) -> Subscription;
}

#[async_trait]
impl<P: AuthProvider + ?Sized> AuthProvider for Arc<P> {
    async fn sign_in_with_password(
        &self,
        credentials: PasswordCredentials,
    ) -> AuthResult<AuthResponse> {
        (**self).sign_in_with_password(credentials).await
    }

    async fn sign_up(&self, credentials: SignUpCredentials) -> AuthResult<AuthResponse> {
        (**self).sign_up(credentials).await
    }

    async fn sign_out(&self) -> AuthResult<()> {
        (**self).sign_out().await
    }

    async fn get_user(&self) -> AuthResult<User> {
        (**self).get_user().await
    }

    async fn get_session(&self) -> AuthResult<Option<Session>> {
        (**self).get_session().await
    }

    async fn reset_password_for_email(
        &self,
        email: &str,
        options: ResetPasswordOptions,
    ) -> AuthResult<()> {
        (**self).reset_password_for_email(email, options).await
    }

    async fn update_user(&self, attributes: UserAttributes) -> AuthResult<User> {
        (**self).update_user(attributes).await
    }

    fn on_auth_state_change(&self, callback: AuthStateCallback) -> Subscription {
        (**self).on_auth_state_change(callback)
    }
}

/// Handle to an auth state subscription.
///
/// Dropping the handle does not cancel delivery; call `unsubscribe`.
pub struct Subscription {
    id: Uuid,
    cancel: Box<dyn FnOnce() + Send>,
}

impl Subscription {
    /// Create a handle that runs `cancel` when unsubscribed.
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            id: Uuid::new_v4(),
            cancel: Box::new(cancel),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn unsubscribe(self) {
        tracing::debug!(subscription = %self.id, "Auth state subscription cancelled");
        (self.cancel)();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
