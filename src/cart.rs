//! Persisted cart and checkout hand-off

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::metrics::metrics;
use crate::shopify::ShopifyError;
use crate::storage::{LocalStore, StorageError, CART_KEY};
use crate::structured_logging::OperationContext;
use crate::types::CartItem;

#[derive(Debug, Error)]
pub enum CartError {
    #[error("Carrinho vazio")]
    Empty,

    #[error("Erro ao criar checkout: {0}")]
    Checkout(#[from] ShopifyError),

    /// The checkout exists on the platform but the cart could not be saved
    #[error("Checkout criado, mas o carrinho não foi salvo: {source}")]
    Unsaved {
        url: String,
        #[source]
        source: StorageError,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Anything able to turn cart lines into a hosted checkout URL
#[async_trait]
pub trait CheckoutGateway: Send + Sync {
    async fn create_checkout(&self, items: &[CartItem]) -> Result<String, ShopifyError>;
}

/// Serialized cart, as stored under [`CART_KEY`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartState {
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub checkout_url: Option<String>,
}

/// Where the cart blob lives between runs
pub trait CartBackend: Send + Sync {
    fn load_cart(&self) -> Result<Option<CartState>, StorageError>;
    fn save_cart(&self, state: &CartState) -> Result<(), StorageError>;
}

impl CartBackend for LocalStore {
    fn load_cart(&self) -> Result<Option<CartState>, StorageError> {
        self.get(CART_KEY)
    }

    fn save_cart(&self, state: &CartState) -> Result<(), StorageError> {
        self.set(CART_KEY, state)
    }
}

/// Cart backed by the local store
///
/// Every change is written to the backend before it becomes visible in
/// memory, so a failed write leaves both sides on the previous state.
#[derive(Debug, Clone)]
pub struct CartStore<B = LocalStore> {
    store: B,
    state: CartState,
}

impl<B: CartBackend> CartStore<B> {
    /// Load the persisted cart; an unreadable blob starts an empty cart
    pub fn load(store: B) -> Result<Self, CartError> {
        let state = match store.load_cart() {
            Ok(state) => state.unwrap_or_default(),
            Err(StorageError::Corrupt { key, source }) => {
                tracing::warn!(key = %key, error = %source, "Discarding unreadable cart");
                CartState::default()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self { store, state })
    }

    pub fn items(&self) -> &[CartItem] {
        &self.state.items
    }

    /// URL of the last checkout created from this cart
    pub fn checkout_url(&self) -> Option<&str> {
        self.state.checkout_url.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.state.items.is_empty()
    }

    fn commit(&mut self, next: CartState) -> Result<(), CartError> {
        self.store.save_cart(&next)?;
        self.state = next;
        Ok(())
    }

    pub fn add_item(&mut self, item: CartItem) -> Result<(), CartError> {
        self.add_items([item])
    }

    pub fn add_items(&mut self, items: impl IntoIterator<Item = CartItem>) -> Result<(), CartError> {
        let mut next = self.state.clone();
        next.items.extend(items);
        self.commit(next)
    }

    /// Empty the cart and forget the last checkout
    pub fn clear(&mut self) -> Result<(), CartError> {
        self.commit(CartState::default())
    }

    /// Create a checkout for the current items
    ///
    /// On success the URL is remembered and the items are cleared; on
    /// failure the cart is left exactly as it was.
    pub async fn create_checkout<G>(&mut self, gateway: &G) -> Result<String, CartError>
    where
        G: CheckoutGateway + ?Sized,
    {
        self.checkout_items(Vec::new(), gateway).await
    }

    /// Create a checkout for the current items followed by `extra`
    ///
    /// `extra` is never stored: a failed checkout leaves the cart as it
    /// was, a successful one clears it like [`Self::create_checkout`].
    pub async fn checkout_items<G>(&mut self, extra: Vec<CartItem>, gateway: &G) -> Result<String, CartError>
    where
        G: CheckoutGateway + ?Sized,
    {
        let lines: Vec<CartItem> = self.state.items.iter().cloned().chain(extra).collect();
        if lines.is_empty() {
            return Err(CartError::Empty);
        }

        let ctx = OperationContext::new("checkout");
        match gateway.create_checkout(&lines).await {
            Ok(url) => {
                metrics().checkouts_created.inc();
                ctx.logger.log_checkout_created(lines.len(), &url);
                let next = CartState {
                    items: Vec::new(),
                    checkout_url: Some(url.clone()),
                };
                if let Err(source) = self.store.save_cart(&next) {
                    ctx.logger.error(&format!("Checkout {} not saved: {}", url, source));
                    return Err(CartError::Unsaved { url, source });
                }
                self.state = next;
                Ok(url)
            }
            Err(e) => {
                metrics().checkouts_failed.inc();
                ctx.logger.log_checkout_failed(lines.len(), &e.to_string());
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CartAttribute;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    struct FixedGateway(Result<String, ShopifyError>);

    #[async_trait]
    impl CheckoutGateway for FixedGateway {
        async fn create_checkout(&self, _items: &[CartItem]) -> Result<String, ShopifyError> {
            self.0.clone()
        }
    }

    fn item(n: u32) -> CartItem {
        CartItem {
            variant_id: "gid://shopify/ProductVariant/1".to_string(),
            quantity: 1,
            attributes: vec![CartAttribute::new(format!("Peça #{} - Comprimento", n), "500 mm")],
        }
    }

    #[tokio::test]
    async fn test_empty_cart_refuses_checkout() {
        let mut cart = CartStore::load(LocalStore::temporary().unwrap()).unwrap();
        let gateway = FixedGateway(Ok("https://x".into()));
        let err = cart.create_checkout(&gateway).await.unwrap_err();
        assert_eq!(err.to_string(), "Carrinho vazio");
    }

    #[tokio::test]
    async fn test_successful_checkout_clears_items() {
        let store = LocalStore::temporary().unwrap();
        let mut cart = CartStore::load(store.clone()).unwrap();
        cart.add_items([item(1), item(2)]).unwrap();

        let gateway = FixedGateway(Ok("https://loja.com/c?channel=online_store".into()));
        let url = cart.create_checkout(&gateway).await.unwrap();

        assert_eq!(url, "https://loja.com/c?channel=online_store");
        assert!(cart.is_empty());
        assert_eq!(cart.checkout_url(), Some(url.as_str()));

        let reloaded = CartStore::load(store).unwrap();
        assert!(reloaded.is_empty());
        assert_eq!(reloaded.checkout_url(), Some(url.as_str()));
    }

    #[tokio::test]
    async fn test_failed_checkout_keeps_items() {
        let mut cart = CartStore::load(LocalStore::temporary().unwrap()).unwrap();
        cart.add_item(item(1)).unwrap();

        let gateway = FixedGateway(Err(ShopifyError::UserErrors("Cart creation failed: x".into())));
        assert!(cart.create_checkout(&gateway).await.is_err());
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.checkout_url(), None);
    }

    #[derive(Default)]
    struct FlakyBackend {
        saved: Mutex<Option<CartState>>,
        fail_writes: AtomicBool,
    }

    impl CartBackend for Arc<FlakyBackend> {
        fn load_cart(&self) -> Result<Option<CartState>, StorageError> {
            Ok(self.saved.lock().unwrap().clone())
        }

        fn save_cart(&self, state: &CartState) -> Result<(), StorageError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
                return Err(StorageError::Backend(sled::Error::Io(io)));
            }
            *self.saved.lock().unwrap() = Some(state.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_unsaved_checkout_returns_url_and_keeps_state() {
        let backend = Arc::new(FlakyBackend::default());
        let mut cart = CartStore::load(backend.clone()).unwrap();
        cart.add_items([item(1), item(2)]).unwrap();
        backend.fail_writes.store(true, Ordering::SeqCst);

        let gateway = FixedGateway(Ok("https://loja.com/c/9".into()));
        match cart.create_checkout(&gateway).await {
            Err(CartError::Unsaved { url, .. }) => assert_eq!(url, "https://loja.com/c/9"),
            other => panic!("unexpected result: {:?}", other),
        }

        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.checkout_url(), None);
        let saved = backend.saved.lock().unwrap().clone().unwrap();
        assert_eq!(saved.items, cart.items());
        assert_eq!(saved.checkout_url, None);
    }

    #[test]
    fn test_failed_write_leaves_memory_unchanged() {
        let backend = Arc::new(FlakyBackend::default());
        let mut cart = CartStore::load(backend.clone()).unwrap();
        cart.add_item(item(1)).unwrap();
        backend.fail_writes.store(true, Ordering::SeqCst);

        assert!(matches!(cart.add_item(item(2)), Err(CartError::Storage(_))));
        assert!(matches!(cart.clear(), Err(CartError::Storage(_))));
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn test_corrupt_cart_starts_empty() {
        let store = LocalStore::temporary().unwrap();
        store.set(CART_KEY, &"garbage").unwrap();
        let cart = CartStore::load(store).unwrap();
        assert!(cart.is_empty());
    }
}
