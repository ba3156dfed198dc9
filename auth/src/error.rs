use thiserror::Error;

/// An error reported by the auth provider.
///
/// Provider errors are opaque; the facade only relies on `message`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AuthError {
    pub message: String,
    /// HTTP status of the failed provider call, when there was one.
    pub status: Option<u16>,
    /// Provider error code such as `invalid_credentials`.
    pub code: Option<String>,
}

impl AuthError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            code: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// No signed-in session to act on.
    pub fn session_missing() -> Self {
        Self::new("Auth session missing!")
            .with_status(400)
            .with_code("session_missing")
    }

    pub fn is_session_missing(&self) -> bool {
        self.code.as_deref() == Some("session_missing")
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        AuthError::new(err.to_string())
    }
}

pub type AuthResult<T> = Result<T, AuthError>;
