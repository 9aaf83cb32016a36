//! Cart persistence and checkout hand-off

use async_trait::async_trait;
use prado_store::cart::{CartError, CartStore, CheckoutGateway};
use prado_store::configurator::Configurator;
use prado_store::shopify::ShopifyError;
use prado_store::storage::LocalStore;
use prado_store::types::{CartItem, ProductConfig, ServiceDetails, ServiceType};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

struct FakeGateway {
    result: Result<String, ShopifyError>,
    calls: AtomicUsize,
}

impl FakeGateway {
    fn ok(url: &str) -> Self {
        Self {
            result: Ok(url.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            result: Err(ShopifyError::UserErrors(message.to_string())),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CheckoutGateway for FakeGateway {
    async fn create_checkout(&self, _items: &[CartItem]) -> Result<String, ShopifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

/// Replays queued results and records how many lines each call carried
struct ScriptedGateway {
    results: Mutex<Vec<Result<String, ShopifyError>>>,
    lines_seen: Mutex<Vec<usize>>,
}

impl ScriptedGateway {
    fn new(mut results: Vec<Result<String, ShopifyError>>) -> Self {
        results.reverse();
        Self {
            results: Mutex::new(results),
            lines_seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl CheckoutGateway for ScriptedGateway {
    async fn create_checkout(&self, items: &[CartItem]) -> Result<String, ShopifyError> {
        self.lines_seen.lock().unwrap().push(items.len());
        self.results.lock().unwrap().pop().unwrap()
    }
}

fn configured_items() -> Vec<CartItem> {
    let mut configurator = Configurator::new(ProductConfig::default());
    let first = configurator.pieces()[0].id;
    configurator.update_length(first, 1200.0).unwrap();
    let second = configurator.add_piece();
    configurator.set_service(second, ServiceType::Rosca).unwrap();
    configurator
        .set_details(
            second,
            ServiceDetails {
                text: Some("M5 nas duas extremidades".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
    configurator
        .to_cart_items(Some("gid://shopify/ProductVariant/11"))
        .unwrap()
}

#[test]
fn test_cart_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut cart = CartStore::load(LocalStore::open(dir.path()).unwrap()).unwrap();
        cart.add_items(configured_items()).unwrap();
        assert_eq!(cart.items().len(), 2);
    }

    let cart = CartStore::load(LocalStore::open(dir.path()).unwrap()).unwrap();
    assert_eq!(cart.items().len(), 2);
    assert!(cart.items()[1]
        .attributes
        .iter()
        .any(|a| a.key == "Peça #2 - Serviço" && a.value == "Rosca"));
}

#[tokio::test]
async fn test_empty_cart_never_calls_gateway() {
    let gateway = FakeGateway::ok("https://loja.com/c");
    let mut cart = CartStore::load(LocalStore::temporary().unwrap()).unwrap();

    let err = cart.create_checkout(&gateway).await.unwrap_err();
    assert!(matches!(err, CartError::Empty));
    assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_failed_checkout_leaves_cart_untouched() {
    let gateway = FakeGateway::failing("Variant is out of stock");
    let store = LocalStore::temporary().unwrap();
    let mut cart = CartStore::load(store.clone()).unwrap();
    cart.add_items(configured_items()).unwrap();

    let err = cart.create_checkout(&gateway).await.unwrap_err();
    assert!(matches!(err, CartError::Checkout(_)));
    assert_eq!(cart.items().len(), 2);
    assert!(cart.checkout_url().is_none());
    assert_eq!(CartStore::load(store).unwrap().items().len(), 2);
}

#[test]
fn test_clear_removes_everything() {
    let store = LocalStore::temporary().unwrap();
    let mut cart = CartStore::load(store.clone()).unwrap();
    cart.add_items(configured_items()).unwrap();
    cart.clear().unwrap();
    assert!(cart.is_empty());
    assert!(cart.checkout_url().is_none());
    assert!(CartStore::load(store).unwrap().is_empty());
}

#[tokio::test]
async fn test_retried_checkout_does_not_duplicate_lines() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = ScriptedGateway::new(vec![
        Err(ShopifyError::UserErrors("Variant is out of stock".to_string())),
        Ok("https://loja.com/c/2".to_string()),
    ]);

    {
        let mut cart = CartStore::load(LocalStore::open(dir.path()).unwrap()).unwrap();
        let err = cart.checkout_items(configured_items(), &gateway).await.unwrap_err();
        assert!(matches!(err, CartError::Checkout(_)));
        assert!(cart.is_empty());
    }

    let mut cart = CartStore::load(LocalStore::open(dir.path()).unwrap()).unwrap();
    assert!(cart.is_empty());
    let url = cart.checkout_items(configured_items(), &gateway).await.unwrap();

    assert_eq!(url, "https://loja.com/c/2");
    assert_eq!(*gateway.lines_seen.lock().unwrap(), vec![2, 2]);
    assert!(cart.is_empty());
    assert_eq!(cart.checkout_url(), Some("https://loja.com/c/2"));
}

#[tokio::test]
async fn test_checkout_items_includes_stored_lines() {
    let gateway = ScriptedGateway::new(vec![Ok("https://loja.com/c/3".to_string())]);
    let mut cart = CartStore::load(LocalStore::temporary().unwrap()).unwrap();
    cart.add_items(configured_items()).unwrap();

    cart.checkout_items(configured_items(), &gateway).await.unwrap();
    assert_eq!(*gateway.lines_seen.lock().unwrap(), vec![4]);
    assert!(cart.is_empty());
}
