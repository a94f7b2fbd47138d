//! Core library for the home-revision household inventory client.
//!
//! Provides the credential store, the session controller (login,
//! registration, logout) and the product sync controller (list, create,
//! update, delete with local reconciliation). Frontends construct a
//! [`Services`] bundle and drive everything through it.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod notify;
pub mod sync;
pub mod utils;

use std::sync::Arc;

pub use api::{ApiClient, ApiError};
pub use auth::{AuthState, CredentialStore, KeyringStore, MemoryStore, SessionController, TokenStore};
pub use config::Config;
pub use models::{Product, ProductEdit, ProductForm, Unit};
pub use notify::{Notice, NoticeKind, Notifier};
pub use sync::ProductSync;

/// Session and product controllers wired to one store, API client and
/// notifier.
pub struct Services {
    pub session: SessionController,
    pub products: ProductSync,
}

impl Services {
    pub fn new(
        config: &Config,
        store: Arc<dyn CredentialStore>,
        notifier: Notifier,
    ) -> Result<Self, ApiError> {
        let api = ApiClient::from_config(config)?;
        let tokens = TokenStore::new(store, config.keyring_namespace.clone());
        Ok(Self {
            session: SessionController::new(api.clone(), tokens.clone(), notifier.clone()),
            products: ProductSync::new(api, tokens, notifier),
        })
    }

    /// Log out and forget the cached product list
    pub fn logout(&self) {
        self.session.logout();
        self.products.clear();
    }
}
