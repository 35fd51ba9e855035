//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ApiConfig;
use crate::db::DocumentStore;
use crate::services::auth::{AuthService, CartIdCache, TokenVerifier, cart_id_cache};
use crate::services::cart::CartService;
use crate::services::checkout::CheckoutService;
use crate::services::history::HistoryService;
use crate::storage::BlobStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and hands out the store, blob
/// and identity handles that were constructed at startup.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    store: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
    tokens: TokenVerifier,
    cart_ids: CartIdCache,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - API configuration
    /// * `store` - Document store backend
    /// * `blobs` - Receipt storage backend
    #[must_use]
    pub fn new(config: ApiConfig, store: Arc<dyn DocumentStore>, blobs: Arc<dyn BlobStore>) -> Self {
        let tokens = TokenVerifier::new(&config.jwt_secret);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                blobs,
                tokens,
                cart_ids: cart_id_cache(),
            }),
        }
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the document store.
    #[must_use]
    pub fn store(&self) -> &dyn DocumentStore {
        self.inner.store.as_ref()
    }

    /// Get a reference to the blob store.
    #[must_use]
    pub fn blobs(&self) -> &dyn BlobStore {
        self.inner.blobs.as_ref()
    }

    #[must_use]
    pub fn auth_service(&self) -> AuthService<'_> {
        AuthService::new(self.store(), &self.inner.tokens, &self.inner.cart_ids)
    }

    #[must_use]
    pub fn cart_service(&self) -> CartService<'_> {
        CartService::new(self.store())
    }

    #[must_use]
    pub fn checkout_service(&self) -> CheckoutService<'_> {
        CheckoutService::new(
            self.store(),
            self.blobs(),
            self.inner.config.checkout_read_policy,
        )
    }

    #[must_use]
    pub fn history_service(&self) -> HistoryService<'_> {
        HistoryService::new(self.store())
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("store", &self.inner.store.backend())
            .field("blobs", &self.inner.blobs.backend())
            .finish_non_exhaustive()
    }
}
