//! Authentication module for managing user sessions and credentials.
//!
//! This module provides:
//! - `CredentialStore`: namespaced secret storage (`KeyringStore` for the OS
//!   keychain, `MemoryStore` for tests and throwaway runs)
//! - `TokenStore`: the access/refresh token pair under one namespace
//! - `SessionController`: login, registration and logout
//!
//! Tokens carry no client-side expiry. A stored access token counts as a
//! session until the server rejects it.

pub mod credentials;
pub mod session;

pub use credentials::{
    CredentialError, CredentialStore, KeyringStore, MemoryStore, TokenStore, ACCESS_TOKEN_KEY,
    REFRESH_TOKEN_KEY,
};
pub use session::{AuthState, SessionController};
