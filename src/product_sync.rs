//! Keeps a product's configurator settings in sync with the shop
//!
//! The settings live in the `configurador.perfil_config` JSON metafield and
//! the price per metre doubles as the price of the product's first variant.

use async_trait::async_trait;
use thiserror::Error;

use crate::shopify::admin::{AdminClient, AdminProductSummary, ProductConfigResult, VariantRef};
use crate::shopify::ShopifyError;
use crate::types::{ProductConfig, CONFIG_METAFIELD_KEY, CONFIG_METAFIELD_NAMESPACE};

/// Number of products listed in the admin picker
pub const ADMIN_PRODUCTS_PAGE: u32 = 20;

#[derive(Debug, Error)]
pub enum ProductSyncError {
    #[error("Selecione um produto: escolha ou crie um produto para salvar a configuração")]
    NoProductSelected,

    #[error(transparent)]
    Shopify(#[from] ShopifyError),
}

/// Admin operations the sync service relies on
#[async_trait]
pub trait ProductAdmin: Send + Sync {
    async fn list_products(&self, first: u32) -> Result<Vec<AdminProductSummary>, ShopifyError>;
    async fn load_config(&self, product_id: &str) -> Result<ProductConfigResult, ShopifyError>;
    async fn store_config(&self, product_id: &str, config: &ProductConfig) -> Result<(), ShopifyError>;
    async fn create_from_config(&self, config: &ProductConfig) -> Result<AdminProductSummary, ShopifyError>;
    async fn create_variant(&self, product_id: &str, price: f64, title: &str) -> Result<VariantRef, ShopifyError>;
    async fn update_variant_price(&self, variant_id: &str, price: f64) -> Result<VariantRef, ShopifyError>;
}

#[async_trait]
impl ProductAdmin for AdminClient {
    async fn list_products(&self, first: u32) -> Result<Vec<AdminProductSummary>, ShopifyError> {
        self.products(first).await
    }

    async fn load_config(&self, product_id: &str) -> Result<ProductConfigResult, ShopifyError> {
        self.product_config(product_id, CONFIG_METAFIELD_NAMESPACE, CONFIG_METAFIELD_KEY)
            .await
    }

    async fn store_config(&self, product_id: &str, config: &ProductConfig) -> Result<(), ShopifyError> {
        self.set_product_config(product_id, CONFIG_METAFIELD_NAMESPACE, CONFIG_METAFIELD_KEY, config)
            .await
    }

    async fn create_from_config(&self, config: &ProductConfig) -> Result<AdminProductSummary, ShopifyError> {
        self.create_product_from_config(config).await
    }

    async fn create_variant(&self, product_id: &str, price: f64, title: &str) -> Result<VariantRef, ShopifyError> {
        AdminClient::create_variant(self, product_id, price, Some(title)).await
    }

    async fn update_variant_price(&self, variant_id: &str, price: f64) -> Result<VariantRef, ShopifyError> {
        AdminClient::update_variant_price(self, variant_id, price).await
    }
}

/// Editing session over one selected product
pub struct ProductConfigService<A: ProductAdmin> {
    admin: A,
    defaults: ProductConfig,
    products: Vec<AdminProductSummary>,
    config: ProductConfig,
    selected_product_id: Option<String>,
    selected_variant_id: Option<String>,
    last_error: Option<String>,
}

impl<A: ProductAdmin> ProductConfigService<A> {
    pub fn new(admin: A, defaults: ProductConfig) -> Self {
        Self {
            admin,
            config: defaults.clone(),
            defaults,
            products: Vec::new(),
            selected_product_id: None,
            selected_variant_id: None,
            last_error: None,
        }
    }

    pub fn products(&self) -> &[AdminProductSummary] {
        &self.products
    }

    pub fn config(&self) -> &ProductConfig {
        &self.config
    }

    /// Replace the settings being edited
    pub fn set_config(&mut self, config: ProductConfig) {
        self.config = config;
    }

    pub fn selected_product_id(&self) -> Option<&str> {
        self.selected_product_id.as_deref()
    }

    pub fn selected_variant_id(&self) -> Option<&str> {
        self.selected_variant_id.as_deref()
    }

    /// Message of the last failed operation, cleared when the next one starts
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn record<T>(&mut self, result: Result<T, ProductSyncError>) -> Result<T, ProductSyncError> {
        if let Err(e) = &result {
            tracing::warn!(error = %e, "Product config operation failed");
            self.last_error = Some(e.to_string());
        }
        result
    }

    pub async fn load_products(&mut self) -> Result<&[AdminProductSummary], ProductSyncError> {
        self.last_error = None;
        let result = self.admin.list_products(ADMIN_PRODUCTS_PAGE).await.map_err(Into::into);
        self.products = self.record(result)?;
        Ok(&self.products)
    }

    /// Load a product's stored settings over the defaults
    ///
    /// Without a stored config the product title and variant price are used.
    pub async fn select_product(&mut self, product_id: &str) -> Result<&ProductConfig, ProductSyncError> {
        self.last_error = None;
        let result = self.admin.load_config(product_id).await.map_err(Into::into);
        let response = self.record(result)?;

        let mut config = match response.config {
            Some(stored) => stored,
            None => {
                let mut config = self.defaults.clone();
                if !response.product.title.is_empty() {
                    config.name = response.product.title.clone();
                }
                if let Some(price) = response.product.variant_price_value() {
                    config.price_per_meter = price;
                }
                config
            }
        };
        config.id = Some(product_id.to_string());

        self.selected_product_id = Some(product_id.to_string());
        self.selected_variant_id = response.product.variant_id;
        self.config = config;
        tracing::info!(product_id = %product_id, "Product configuration loaded");
        Ok(&self.config)
    }

    /// Create a product from the current settings and store them on it
    pub async fn create_product(&mut self) -> Result<AdminProductSummary, ProductSyncError> {
        self.last_error = None;
        let result = self.create_product_inner().await;
        self.record(result)
    }

    async fn create_product_inner(&mut self) -> Result<AdminProductSummary, ProductSyncError> {
        let created = self.admin.create_from_config(&self.config).await?;
        self.products.insert(0, created.clone());
        self.selected_product_id = Some(created.id.clone());
        self.selected_variant_id = created.variant_id.clone();
        self.config.id = Some(created.id.clone());

        self.admin.store_config(&created.id, &self.config).await?;
        tracing::info!(product_id = %created.id, "Product created with configuration");
        Ok(created)
    }

    /// Push the price to the variant (creating one if needed) and store the settings
    pub async fn save_config(&mut self) -> Result<(), ProductSyncError> {
        self.last_error = None;
        let result = self.save_config_inner().await;
        self.record(result)
    }

    async fn save_config_inner(&mut self) -> Result<(), ProductSyncError> {
        let product_id = self
            .selected_product_id
            .clone()
            .ok_or(ProductSyncError::NoProductSelected)?;

        let variant_id = match self.selected_variant_id.clone() {
            Some(id) => id,
            None => {
                let created = self
                    .admin
                    .create_variant(&product_id, self.config.price_per_meter, &self.config.name)
                    .await?;
                self.selected_variant_id = Some(created.id.clone());
                created.id
            }
        };

        self.admin
            .update_variant_price(&variant_id, self.config.price_per_meter)
            .await?;
        self.config.id = Some(product_id.clone());
        self.admin.store_config(&product_id, &self.config).await?;
        tracing::info!(product_id = %product_id, variant_id = %variant_id, "Product configuration saved");
        Ok(())
    }
}
