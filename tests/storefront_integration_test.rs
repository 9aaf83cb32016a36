//! Storefront client against a mocked Shopify endpoint

use mockito::{Matcher, Server};
use prado_store::cart::CartStore;
use prado_store::config::ShopifyConfig;
use prado_store::shopify::{ErrorKind, ShopifyError, StorefrontClient};
use prado_store::storage::LocalStore;
use prado_store::types::{CartAttribute, CartItem, ProductConfig};
use serde_json::json;

const PATH: &str = "/api/2025-07/graphql.json";

fn client(server: &Server) -> StorefrontClient {
    let config = ShopifyConfig {
        domain: server.url(),
        storefront_token: Some("storefront-token".to_string()),
        ..Default::default()
    };
    StorefrontClient::new(&config).unwrap()
}

fn product_node() -> serde_json::Value {
    json!({
        "id": "gid://shopify/Product/1",
        "title": "Perfil Estrutural 20x40",
        "description": "V-Slot preto",
        "handle": "perfil-20x40",
        "tags": ["perfil-estrutural", "v-slot"],
        "priceRange": { "minVariantPrice": { "amount": "99.0", "currencyCode": "BRL" } },
        "images": { "edges": [{ "node": { "url": "https://cdn/p.jpg", "altText": null } }] },
        "variants": { "edges": [{ "node": {
            "id": "gid://shopify/ProductVariant/11",
            "title": "Default Title",
            "price": { "amount": "89.90", "currencyCode": "BRL" }
        } }] },
        "metafields": [
            { "key": "codigo", "value": "PF2040" },
            { "key": "comprimento_min", "value": "50" },
            { "key": "comprimento_max", "value": "2500" },
            null,
            null
        ]
    })
}

fn item() -> CartItem {
    CartItem {
        variant_id: "gid://shopify/ProductVariant/11".to_string(),
        quantity: 1,
        attributes: vec![CartAttribute::new("Peça #1 - Comprimento", "1000 mm")],
    }
}

#[test]
fn test_missing_token_is_configuration_error() {
    let err = StorefrontClient::new(&ShopifyConfig::default()).unwrap_err();
    assert!(matches!(err, ShopifyError::Configuration(_)));
}

#[tokio::test]
async fn test_product_by_handle_maps_specs() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .match_header("X-Shopify-Storefront-Access-Token", "storefront-token")
        .match_body(Matcher::PartialJson(json!({ "variables": { "handle": "perfil-20x40" } })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "data": { "productByHandle": product_node() } }).to_string())
        .create_async()
        .await;

    let product = client(&server).product_by_handle("perfil-20x40").await.unwrap();
    mock.assert_async().await;

    assert_eq!(product.variant_id(), Some("gid://shopify/ProductVariant/11"));
    assert_eq!(product.specs.code.as_deref(), Some("PF2040"));
    assert_eq!(product.images.len(), 1);

    let config = product.product_config(&ProductConfig::default());
    assert_eq!(config.price_per_meter, 89.9);
    assert_eq!(config.min_length_mm, 50);
    assert_eq!(config.max_length_mm, 2500);
}

#[tokio::test]
async fn test_unknown_handle_is_not_found() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", PATH)
        .with_status(200)
        .with_body(r#"{"data":{"productByHandle":null}}"#)
        .create_async()
        .await;

    let err = client(&server).product_by_handle("nada").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_products_by_tag_sends_tag_query() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .match_body(Matcher::PartialJson(
            json!({ "variables": { "first": 50, "query": "tag:perfil-estrutural" } }),
        ))
        .with_status(200)
        .with_body(json!({ "data": { "products": { "edges": [{ "node": product_node() }] } } }).to_string())
        .create_async()
        .await;

    let products = client(&server).products_by_tag("perfil-estrutural", 50).await.unwrap();
    mock.assert_async().await;
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].handle, "perfil-20x40");
}

#[tokio::test]
async fn test_blank_search_sends_nothing() {
    let mut server = Server::new_async().await;
    let mock = server.mock("POST", PATH).expect(0).create_async().await;

    let products = client(&server).search("   ", 20).await.unwrap();
    assert!(products.is_empty());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_collections() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", PATH)
        .match_body(Matcher::Regex("getCollections".to_string()))
        .with_status(200)
        .with_body(
            json!({ "data": { "collections": { "edges": [
                { "node": { "id": "gid://shopify/Collection/1", "title": "Perfis", "handle": "perfis", "description": "" } }
            ] } } })
            .to_string(),
        )
        .create_async()
        .await;

    let collections = client(&server).collections(10).await.unwrap();
    assert_eq!(collections[0].handle, "perfis");
}

#[tokio::test]
async fn test_checkout_clears_cart_and_tags_channel() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .match_body(Matcher::Regex("cartCreate".to_string()))
        .with_status(200)
        .with_body(
            json!({ "data": { "cartCreate": {
                "cart": { "id": "gid://shopify/Cart/1", "checkoutUrl": "https://loja.com/cart/c/abc?key=k1" },
                "userErrors": []
            } } })
            .to_string(),
        )
        .create_async()
        .await;

    let store = LocalStore::temporary().unwrap();
    let mut cart = CartStore::load(store.clone()).unwrap();
    cart.add_item(item()).unwrap();

    let url = cart.create_checkout(&client(&server)).await.unwrap();
    mock.assert_async().await;

    assert_eq!(url, "https://loja.com/cart/c/abc?key=k1&channel=online_store");
    assert!(cart.items().is_empty());
    assert_eq!(cart.checkout_url(), Some(url.as_str()));

    let reloaded = CartStore::load(store).unwrap();
    assert!(reloaded.items().is_empty());
    assert_eq!(reloaded.checkout_url(), Some(url.as_str()));
}

#[tokio::test]
async fn test_checkout_user_errors_keep_cart() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", PATH)
        .with_status(200)
        .with_body(
            json!({ "data": { "cartCreate": {
                "cart": null,
                "userErrors": [{ "field": ["lines"], "message": "Variant is out of stock" }]
            } } })
            .to_string(),
        )
        .create_async()
        .await;

    let mut cart = CartStore::load(LocalStore::temporary().unwrap()).unwrap();
    cart.add_item(item()).unwrap();

    let err = cart.create_checkout(&client(&server)).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Erro ao criar checkout: Cart creation failed: Variant is out of stock"
    );
    assert_eq!(cart.items().len(), 1);
    assert!(cart.checkout_url().is_none());
}

#[tokio::test]
async fn test_missing_checkout_url() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", PATH)
        .with_status(200)
        .with_body(r#"{"data":{"cartCreate":{"cart":{"id":"c","checkoutUrl":null},"userErrors":[]}}}"#)
        .create_async()
        .await;

    let err = client(&server).cart_create(&[item()]).await.unwrap_err();
    assert_eq!(err.to_string(), "Unexpected response: No checkout URL returned from Shopify");
    assert_eq!(err.kind(), ErrorKind::Platform);
}
