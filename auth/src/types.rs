//! Auth-related types.
//!
//! Field names follow the Supabase Auth wire format so provider responses
//! deserialize directly.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Free-form user metadata (name, farm, etc.).
pub type Metadata = Map<String, Value>;

/// An authenticated portal user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Metadata,
    /// Every other field the provider returned, kept verbatim.
    #[serde(flatten)]
    pub extra: Metadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    /// Unix timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    pub refresh_token: String,
    pub user: User,
}

/// Result of a sign-in or sign-up.
///
/// Sign-up leaves `session` empty when the project requires email
/// confirmation before the first login.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthResponse {
    pub user: User,
    pub session: Option<Session>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthChangeEvent {
    /// Delivered once to every new subscriber with the current session.
    InitialSession,
    SignedIn,
    SignedOut,
    UserUpdated,
    PasswordRecovery,
    TokenRefreshed,
}

#[derive(Debug, Clone, Serialize)]
pub struct PasswordCredentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SignUpOptions {
    /// Stored as the new user's `user_metadata`.
    pub data: Metadata,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignUpCredentials {
    pub email: String,
    pub password: String,
    pub options: SignUpOptions,
}

#[derive(Debug, Clone, Default)]
pub struct ResetPasswordOptions {
    /// Where the emailed recovery link lands.
    pub redirect_to: Option<String>,
}

/// Attributes to change on the signed-in user. Unset fields are left alone.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Metadata>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_keeps_unknown_fields() {
        let json = r#"{
            "id": "8d0fd2b3-9ca7-4d9e-a95f-9e13dded323e",
            "email": "grower@example.com",
            "aud": "authenticated",
            "role": "authenticated",
            "user_metadata": {"name": "Pat"}
        }"#;

        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.email.as_deref(), Some("grower@example.com"));
        assert_eq!(user.user_metadata["name"], "Pat");
        assert_eq!(user.extra["role"], "authenticated");
    }

    #[test]
    fn test_change_event_wire_names() {
        let json = serde_json::to_string(&AuthChangeEvent::InitialSession).unwrap();
        assert_eq!(json, r#""INITIAL_SESSION""#);

        let event: AuthChangeEvent = serde_json::from_str(r#""SIGNED_OUT""#).unwrap();
        assert_eq!(event, AuthChangeEvent::SignedOut);
    }

    #[test]
    fn test_user_attributes_skip_unset_fields() {
        let attrs = UserAttributes {
            password: Some("n3w-pass".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_string(&attrs).unwrap();
        assert_eq!(json, r#"{"password":"n3w-pass"}"#);
    }
}
