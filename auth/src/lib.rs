//! Authentication for the GrainTrack portal.
//!
//! This crate provides:
//! - `AuthProvider`, the capability contract an auth backend must satisfy
//! - `SupabaseAuthClient`, a provider speaking the Supabase Auth (GoTrue) REST API
//! - `AuthService`, the facade application code calls, which delegates to an
//!   injected provider and logs failures

mod error;
mod provider;
mod service;
mod supabase;
pub mod types;

pub use error::{AuthError, AuthResult};
pub use provider::{AuthProvider, AuthStateCallback, Subscription};
pub use service::AuthService;
pub use supabase::SupabaseAuthClient;
pub use types::{
    AuthChangeEvent, AuthResponse, Metadata, PasswordCredentials, ResetPasswordOptions,
    Session, SignUpCredentials, SignUpOptions, User, UserAttributes,
};
