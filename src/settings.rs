//! Store-wide admin settings kept in the local store

use serde::{Deserialize, Serialize};

use crate::storage::{LocalStore, StorageError, SETTINGS_KEY};

/// Settings edited in the admin area
///
/// Serialized with the camelCase names used by the web admin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdminSettings {
    // Site
    pub site_name: String,
    pub site_description: String,
    pub contact_email: String,
    pub support_email: String,

    // Shopify
    pub shopify_domain: String,
    pub shopify_api_version: String,

    // Features
    pub enable_product_reviews: bool,
    pub enable_wishlist: bool,
    pub enable_newsletter: bool,
    pub maintenance_mode: bool,

    // Business
    pub business_name: String,
    pub business_address: String,
    pub business_phone: String,
    pub business_tax_id: String,

    // SEO
    pub meta_title: String,
    pub meta_description: String,
    pub meta_keywords: String,
}

impl Default for AdminSettings {
    fn default() -> Self {
        Self {
            site_name: "Prado Store".to_string(),
            site_description: "Loja de produtos em alumínio".to_string(),
            contact_email: "contato@prado.com.br".to_string(),
            support_email: "suporte@prado.com.br".to_string(),
            shopify_domain: String::new(),
            shopify_api_version: "2024-07".to_string(),
            enable_product_reviews: false,
            enable_wishlist: false,
            enable_newsletter: true,
            maintenance_mode: false,
            business_name: "Prado Indústria e Comércio".to_string(),
            business_address: String::new(),
            business_phone: String::new(),
            business_tax_id: String::new(),
            meta_title: "Prado - Produtos em Alumínio".to_string(),
            meta_description: "Sua loja de confiança para produtos em alumínio de alta qualidade"
                .to_string(),
            meta_keywords: "alumínio, perfis, estruturas, indústria".to_string(),
        }
    }
}

impl AdminSettings {
    /// Stored settings, or the defaults when nothing was saved
    pub fn load(store: &LocalStore) -> Result<Self, StorageError> {
        Ok(store.get(SETTINGS_KEY)?.unwrap_or_default())
    }

    pub fn save(&self, store: &LocalStore) -> Result<(), StorageError> {
        store.set(SETTINGS_KEY, self)?;
        tracing::info!("Settings saved");
        Ok(())
    }

    /// Discard unsaved edits by reloading the stored settings
    pub fn reset(&mut self, store: &LocalStore) -> Result<(), StorageError> {
        *self = Self::load(store)?;
        Ok(())
    }

    /// Meta keywords as a list
    pub fn keywords(&self) -> Vec<&str> {
        self.meta_keywords
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .collect()
    }
}
