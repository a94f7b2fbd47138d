//! Product Sync Controller.
//!
//! Runs product CRUD against the API and reconciles the in-memory list
//! with each outcome:
//! - `list` replaces the list wholesale
//! - `create` leaves the list alone; callers re-list to see the new id
//! - `update` merges the sent fields into the prior value and swaps it in
//! - `delete` drops the entry
//!
//! The access token is read from the store on every call. Overlapping
//! calls are not ordered: whichever completes last wins.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::auth::TokenStore;
use crate::models::{Product, ProductEdit, ProductForm};
use crate::notify::Notifier;

use super::ProductList;

pub struct ProductSync {
    api: ApiClient,
    tokens: TokenStore,
    notifier: Notifier,
    list: Arc<RwLock<ProductList>>,
}

impl ProductSync {
    pub fn new(api: ApiClient, tokens: TokenStore, notifier: Notifier) -> Self {
        Self {
            api,
            tokens,
            notifier,
            list: Arc::new(RwLock::new(ProductList::default())),
        }
    }

    // ===== Snapshots =====

    pub fn products(&self) -> Vec<Product> {
        self.read_list().products().to_vec()
    }

    pub fn get(&self, id: i64) -> Option<Product> {
        self.read_list().get(id).cloned()
    }

    pub fn age_display(&self) -> String {
        self.read_list().age_display()
    }

    /// Drop the cached list (e.g. after logout)
    pub fn clear(&self) {
        self.write_list().clear();
    }

    // ===== Remote operations =====

    /// Fetch the full list and replace the local copy. On failure the
    /// previous list is kept as is.
    pub async fn list(&self) -> Result<Vec<Product>, ApiError> {
        let result = self.fetch().await;
        let products = self.report(result)?;
        info!(count = products.len(), "Products loaded");
        self.write_list().replace_all(products.clone());
        Ok(products)
    }

    /// Validate the form and create the product. Nothing is added locally.
    pub async fn create(&self, form: &ProductForm) -> Result<(), ApiError> {
        let result = self.try_create(form).await;
        self.report(result)
    }

    /// Send only the fields of `edit` that differ from the listed product,
    /// then merge them into the local copy.
    pub async fn update(&self, id: i64, edit: &ProductEdit) -> Result<Product, ApiError> {
        let result = self.try_update(id, edit).await;
        self.report(result)
    }

    /// Quick stock change from a list row
    pub async fn adjust(
        &self,
        id: i64,
        quantity: u32,
        target_quantity: u32,
    ) -> Result<Product, ApiError> {
        self.update(id, &ProductEdit::quantities(quantity, target_quantity))
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        let result = self.try_delete(id).await;
        self.report(result)
    }

    /// Refresh in the background. The task only holds a weak reference to
    /// the list, so a result arriving after this controller is gone is
    /// dropped instead of applied.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn_refresh(&self) -> JoinHandle<()> {
        let api = self.api.clone();
        let tokens = self.tokens.clone();
        let notifier = self.notifier.clone();
        let list = Arc::downgrade(&self.list);

        tokio::spawn(async move {
            let result = Self::fetch_with(&api, &tokens).await;
            apply_refresh(&list, &notifier, result);
        })
    }

    // ===== Internals =====

    async fn fetch(&self) -> Result<Vec<Product>, ApiError> {
        Self::fetch_with(&self.api, &self.tokens).await
    }

    async fn fetch_with(api: &ApiClient, tokens: &TokenStore) -> Result<Vec<Product>, ApiError> {
        let token = access_token(tokens)?;
        api.list_products(&token).await
    }

    async fn try_create(&self, form: &ProductForm) -> Result<(), ApiError> {
        let product = form.validate()?;
        let token = access_token(&self.tokens)?;
        self.api.create_product(&token, &product).await?;
        info!(title = %product.title, "Product created");
        Ok(())
    }

    async fn try_update(&self, id: i64, edit: &ProductEdit) -> Result<Product, ApiError> {
        edit.validate()?;
        let current = self.get(id).ok_or(ApiError::UnknownProduct(id))?;
        let patch = edit.diff(&current);
        if patch.is_empty() {
            return Err(ApiError::NoChanges);
        }
        let token = access_token(&self.tokens)?;
        self.api.update_product(&token, id, &patch).await?;

        let updated = current.with_patch(&patch);
        if !self.write_list().replace(updated.clone()) {
            debug!(id, "Updated product no longer listed");
        }
        info!(id, "Product updated");
        Ok(updated)
    }

    async fn try_delete(&self, id: i64) -> Result<(), ApiError> {
        let token = access_token(&self.tokens)?;
        self.api.delete_product(&token, id).await?;
        if !self.write_list().remove(id) {
            debug!(id, "Deleted product was not listed");
        }
        info!(id, "Product deleted");
        Ok(())
    }

    /// Surface a failure to the user, then hand it back to the caller
    fn report<T>(&self, result: Result<T, ApiError>) -> Result<T, ApiError> {
        result.inspect_err(|e| {
            warn!(error = %e, "Product operation failed");
            self.notifier.send(e.notice());
        })
    }

    fn read_list(&self) -> RwLockReadGuard<'_, ProductList> {
        self.list.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_list(&self) -> RwLockWriteGuard<'_, ProductList> {
        self.list.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn access_token(tokens: &TokenStore) -> Result<String, ApiError> {
    tokens.access_token()?.ok_or(ApiError::MissingToken)
}

/// Apply a background listing if the owning controller still exists.
/// Returns whether the result was applied.
fn apply_refresh(
    list: &Weak<RwLock<ProductList>>,
    notifier: &Notifier,
    result: Result<Vec<Product>, ApiError>,
) -> bool {
    let Some(list) = list.upgrade() else {
        debug!("Product controller dropped; discarding refresh result");
        return false;
    };
    match result {
        Ok(products) => {
            info!(count = products.len(), "Products refreshed");
            list.write()
                .unwrap_or_else(PoisonError::into_inner)
                .replace_all(products);
            true
        }
        Err(e) => {
            warn!(error = %e, "Background refresh failed");
            notifier.send(e.notice());
            false
        }
    }
}
