//! Storefront API client: catalogue reads and checkout creation

use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

use super::errors::ShopifyError;
use super::graphql::{check_user_errors, shop_base_url, ApiSurface, Connection, GraphqlClient, UserError};
use super::queries;
use crate::cart::CheckoutGateway;
use crate::catalog;
use crate::config::ShopifyConfig;
use crate::types::{CartItem, ProductConfig};

/// Page size used when listing products for a category
pub const CATEGORY_PAGE_SIZE: u32 = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    pub amount: String,
    pub currency_code: String,
}

impl Money {
    pub fn value(&self) -> Option<f64> {
        self.amount.parse().ok()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    pub url: String,
    #[serde(default)]
    pub alt_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductVariant {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub price: Money,
}

/// Technical data kept in `custom.*` product metafields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductSpecs {
    pub code: Option<String>,
    pub min_length_mm: Option<u32>,
    pub max_length_mm: Option<u32>,
    pub weight: Option<String>,
    pub tolerance: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorefrontProduct {
    pub id: String,
    pub title: String,
    pub description: String,
    pub handle: String,
    pub tags: Vec<String>,
    pub price: Option<Money>,
    pub images: Vec<ProductImage>,
    pub variant: Option<ProductVariant>,
    pub specs: ProductSpecs,
}

impl StorefrontProduct {
    pub fn variant_id(&self) -> Option<&str> {
        self.variant.as_ref().map(|v| v.id.as_str())
    }

    /// Configurator settings for this product on top of `base`
    ///
    /// The variant price becomes the price per metre and length bounds
    /// from the metafields narrow the defaults when they are consistent.
    pub fn product_config(&self, base: &ProductConfig) -> ProductConfig {
        let mut config = base.clone();
        config.id = Some(self.id.clone());
        config.name = self.title.clone();

        let price = self
            .variant
            .as_ref()
            .and_then(|v| v.price.value())
            .or_else(|| self.price.as_ref().and_then(Money::value));
        if let Some(price) = price.filter(|p| p.is_finite() && *p >= 0.0) {
            config.price_per_meter = price;
        }

        let min = self.specs.min_length_mm.unwrap_or(config.min_length_mm);
        let max = self.specs.max_length_mm.unwrap_or(config.max_length_mm);
        if min >= 1 && min <= max {
            config.min_length_mm = min;
            config.max_length_mm = max;
        }
        if let Some(tolerance) = &self.specs.tolerance {
            config.cut_tolerance = tolerance.clone();
        }
        config
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    pub title: String,
    pub handle: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
struct KeyValue {
    key: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct PriceRange {
    #[serde(rename = "minVariantPrice")]
    min_variant_price: Money,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductNode {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    handle: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    price_range: Option<PriceRange>,
    #[serde(default)]
    images: Connection<ProductImage>,
    #[serde(default)]
    variants: Connection<ProductVariant>,
    #[serde(default)]
    metafields: Vec<Option<KeyValue>>,
}

impl From<ProductNode> for StorefrontProduct {
    fn from(node: ProductNode) -> Self {
        let mut specs = ProductSpecs::default();
        for field in node.metafields.into_iter().flatten() {
            let value = field.value.trim().to_string();
            match field.key.as_str() {
                "codigo" => specs.code = Some(value),
                "comprimento_min" => specs.min_length_mm = value.parse().ok(),
                "comprimento_max" => specs.max_length_mm = value.parse().ok(),
                "peso" => specs.weight = Some(value),
                "tolerancia" => specs.tolerance = Some(value),
                _ => {}
            }
        }

        Self {
            id: node.id,
            title: node.title,
            description: node.description,
            handle: node.handle,
            tags: node.tags,
            price: node.price_range.map(|r| r.min_variant_price),
            images: node.images.into_nodes(),
            variant: node.variants.into_nodes().into_iter().next(),
            specs,
        }
    }
}

#[derive(Deserialize)]
struct ProductsData {
    products: Connection<ProductNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductByHandleData {
    product_by_handle: Option<ProductNode>,
}

#[derive(Deserialize)]
struct CollectionsData {
    collections: Connection<Collection>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartCreateData {
    cart_create: CartCreatePayload,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartCreatePayload {
    cart: Option<CartNode>,
    #[serde(default)]
    user_errors: Vec<UserError>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartNode {
    #[serde(default)]
    checkout_url: Option<String>,
}

/// Tag the checkout URL with the online store sales channel
pub fn with_online_store_channel(checkout_url: &str) -> Result<String, ShopifyError> {
    let mut url = Url::parse(checkout_url)
        .map_err(|e| ShopifyError::Decode(format!("invalid checkout URL '{}': {}", checkout_url, e)))?;
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "channel")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(pairs)
        .append_pair("channel", "online_store");
    Ok(url.to_string())
}

/// Client for the public Storefront API
#[derive(Debug, Clone)]
pub struct StorefrontClient {
    gql: GraphqlClient,
}

impl StorefrontClient {
    pub fn new(config: &ShopifyConfig) -> Result<Self, ShopifyError> {
        let token = config
            .storefront_token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ShopifyError::Configuration("storefront token not configured".into()))?;
        let endpoint = ApiSurface::Storefront
            .endpoint(&shop_base_url(&config.domain), &config.storefront_api_version);
        let gql = GraphqlClient::new(
            ApiSurface::Storefront,
            endpoint,
            token,
            Duration::from_secs(config.timeout_secs),
        )?;
        Ok(Self { gql })
    }

    pub fn endpoint(&self) -> &str {
        self.gql.endpoint()
    }

    /// List products, optionally filtered by a Shopify search query
    pub async fn products(
        &self,
        first: u32,
        query: Option<&str>,
    ) -> Result<Vec<StorefrontProduct>, ShopifyError> {
        let query = query.map(str::trim).filter(|q| !q.is_empty());
        let data: ProductsData = self
            .gql
            .execute(queries::STOREFRONT_PRODUCTS, json!({ "first": first, "query": query }))
            .await?;
        Ok(data
            .products
            .into_nodes()
            .into_iter()
            .map(StorefrontProduct::from)
            .collect())
    }

    pub async fn product_by_handle(&self, handle: &str) -> Result<StorefrontProduct, ShopifyError> {
        let data: ProductByHandleData = self
            .gql
            .execute(queries::STOREFRONT_PRODUCT_BY_HANDLE, json!({ "handle": handle }))
            .await?;
        data.product_by_handle
            .map(StorefrontProduct::from)
            .ok_or_else(|| ShopifyError::NotFound(format!("product '{}'", handle)))
    }

    pub async fn collections(&self, first: u32) -> Result<Vec<Collection>, ShopifyError> {
        let data: CollectionsData = self
            .gql
            .execute(queries::STOREFRONT_COLLECTIONS, json!({ "first": first }))
            .await?;
        Ok(data.collections.into_nodes())
    }

    /// Products carrying the tag of a category or subcategory
    pub async fn products_by_tag(
        &self,
        slug: &str,
        first: u32,
    ) -> Result<Vec<StorefrontProduct>, ShopifyError> {
        let query = catalog::tag_query(slug, None);
        self.products(first, Some(&query)).await
    }

    /// Free-text search; a blank term returns nothing without a request
    pub async fn search(&self, term: &str, first: u32) -> Result<Vec<StorefrontProduct>, ShopifyError> {
        if term.trim().is_empty() {
            return Ok(Vec::new());
        }
        self.products(first, Some(term)).await
    }

    /// Create a cart with one line per item and return its checkout URL
    pub async fn cart_create(&self, items: &[CartItem]) -> Result<String, ShopifyError> {
        let lines: Vec<_> = items
            .iter()
            .map(|item| {
                json!({
                    "quantity": item.quantity,
                    "merchandiseId": item.variant_id,
                    "attributes": item.attributes,
                })
            })
            .collect();

        let data: CartCreateData = self
            .gql
            .execute(queries::CART_CREATE, json!({ "input": { "lines": lines } }))
            .await?;

        let payload = data.cart_create;
        check_user_errors(&payload.user_errors)
            .map_err(|e| ShopifyError::UserErrors(format!("Cart creation failed: {}", e)))?;

        let checkout_url = payload
            .cart
            .and_then(|c| c.checkout_url)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| ShopifyError::Decode("No checkout URL returned from Shopify".into()))?;

        with_online_store_channel(&checkout_url)
    }
}

#[async_trait]
impl CheckoutGateway for StorefrontClient {
    async fn create_checkout(&self, items: &[CartItem]) -> Result<String, ShopifyError> {
        self.cart_create(items).await
    }
}
