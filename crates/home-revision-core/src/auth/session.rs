use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::{Credentials, TokenPair};
use crate::notify::{Notice, Notifier};

use super::TokenStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    Authenticated,
}

/// Owns the authentication state and the stored token pair.
///
/// Operations take `&self`; state changes are published on a watch channel
/// so any number of UI observers can follow them.
pub struct SessionController {
    api: ApiClient,
    tokens: TokenStore,
    notifier: Notifier,
    state: watch::Sender<AuthState>,
}

impl SessionController {
    /// Start authenticated if an access token is already stored.
    /// The token is not validated against the server.
    pub fn new(api: ApiClient, tokens: TokenStore, notifier: Notifier) -> Self {
        let initial = match tokens.access_token() {
            Ok(Some(_)) => AuthState::Authenticated,
            Ok(None) => AuthState::Unauthenticated,
            Err(e) => {
                warn!(error = %e, "Could not read stored access token");
                AuthState::Unauthenticated
            }
        };
        info!(state = ?initial, "Session initialized");
        let (state, _) = watch::channel(initial);
        Self {
            api,
            tokens,
            notifier,
            state,
        }
    }

    pub fn state(&self) -> AuthState {
        *self.state.borrow()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state() == AuthState::Authenticated
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// Stored refresh token, if any. Nothing exchanges it yet.
    pub fn refresh_token(&self) -> Option<String> {
        self.tokens.refresh_token().unwrap_or_else(|e| {
            warn!(error = %e, "Could not read refresh token");
            None
        })
    }

    pub async fn login(&self, identifier: &str, secret: &str) -> Result<(), ApiError> {
        let credentials = Credentials::new(identifier, secret);
        let result = self.api.issue_token(&credentials).await;
        self.finish_auth("Login", result)?;
        self.notifier.send(Notice::success("Login successful"));
        Ok(())
    }

    pub async fn register(&self, identifier: &str, secret: &str) -> Result<(), ApiError> {
        let credentials = Credentials::new(identifier, secret);
        let result = self.api.register(&credentials).await;
        self.finish_auth("Registration", result)
    }

    /// Forget both tokens. Never fails.
    pub fn logout(&self) {
        self.tokens.clear();
        self.state.send_replace(AuthState::Unauthenticated);
        info!("Logged out");
    }

    /// Persist a freshly issued token pair and flip to authenticated, or
    /// report the failure. A rejected request leaves the state untouched; a
    /// failed token write has already cleared the store, so the session
    /// drops to unauthenticated.
    fn finish_auth(
        &self,
        action: &str,
        result: Result<TokenPair, ApiError>,
    ) -> Result<(), ApiError> {
        let stored = result.and_then(|tokens| self.tokens.save(&tokens).map_err(ApiError::from));
        match stored {
            Ok(()) => {
                self.state.send_replace(AuthState::Authenticated);
                info!(action, "Authenticated");
                Ok(())
            }
            Err(e) => {
                if matches!(e, ApiError::Credential(_)) {
                    self.state.send_replace(AuthState::Unauthenticated);
                }
                error!(action, error = %e, "Authentication failed");
                self.notifier.send(e.notice());
                Err(e)
            }
        }
    }
}
