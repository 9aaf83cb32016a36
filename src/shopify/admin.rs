//! Admin API client: products, configurator metafields, collections, media

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeSet;
use std::time::Duration;

use super::errors::ShopifyError;
use super::graphql::{check_user_errors, shop_base_url, ApiSurface, Connection, GraphqlClient, UserError};
use super::queries;
use crate::config::ShopifyConfig;
use crate::pricing::{round_half_up, CURRENCY_SCALE};
use crate::types::{ProductConfig, ProductStatus};

/// Namespace of the media gallery metafield
pub const MEDIA_METAFIELD_NAMESPACE: &str = "custom";

/// Key of the media gallery metafield
pub const MEDIA_METAFIELD_KEY: &str = "media_gallery";

/// Prices go to the Admin API as strings with two decimals
pub fn price_string(price: f64) -> String {
    format!("{:.2}", round_half_up(price, CURRENCY_SCALE))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminProductSummary {
    pub id: String,
    pub title: String,
    pub status: Option<String>,
    pub variant_id: Option<String>,
    pub variant_price: Option<String>,
}

impl AdminProductSummary {
    pub fn variant_price_value(&self) -> Option<f64> {
        self.variant_price.as_deref().and_then(|p| p.parse().ok())
    }
}

/// A product together with its stored configurator settings, if any
#[derive(Debug, Clone, PartialEq)]
pub struct ProductConfigResult {
    pub product: AdminProductSummary,
    pub config: Option<ProductConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductOption {
    pub name: String,
    pub values: Vec<String>,
}

/// Fields of a product created or updated from the admin area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInput {
    pub title: String,
    pub handle: Option<String>,
    pub description_html: String,
    pub vendor: Option<String>,
    pub product_type: Option<String>,
    pub tags: Vec<String>,
    pub status: ProductStatus,
    pub price: Option<f64>,
    pub options: Vec<ProductOption>,
}

impl ProductInput {
    fn to_variables(&self) -> serde_json::Value {
        let mut product = json!({
            "title": self.title,
            "descriptionHtml": self.description_html,
            "status": self.status.as_str(),
            "tags": self.tags,
        });
        if let Some(handle) = &self.handle {
            product["handle"] = json!(handle);
        }
        if let Some(vendor) = &self.vendor {
            product["vendor"] = json!(vendor);
        }
        if let Some(product_type) = &self.product_type {
            product["productType"] = json!(product_type);
        }
        if !self.options.is_empty() {
            product["options"] = json!(self.options);
        }
        product
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantRef {
    pub id: String,
    pub price: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminCollection {
    pub id: String,
    pub title: String,
    pub handle: String,
}

/// One media node of a product; only images carry fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaNode {
    pub id: String,
    pub alt: Option<String>,
    pub media_content_type: String,
    pub preview_url: Option<String>,
}

/// Media of a product plus the raw gallery metafield
#[derive(Debug, Clone, PartialEq)]
pub struct ProductMedia {
    pub product_id: String,
    pub title: String,
    pub handle: String,
    pub media: Vec<MediaNode>,
    pub gallery_metafield: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagedParameter {
    pub name: String,
    pub value: String,
}

/// Pre-signed upload location returned by `stagedUploadsCreate`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StagedTarget {
    pub url: String,
    pub resource_url: String,
    #[serde(default)]
    pub parameters: Vec<StagedParameter>,
}

/// Position and caption of one gallery image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaUpdate {
    pub id: String,
    pub alt: Option<String>,
    pub position: u32,
}

// Response shapes

#[derive(Deserialize)]
struct AdminVariantNode {
    id: String,
    #[serde(default)]
    price: Option<String>,
}

#[derive(Deserialize)]
struct MetafieldNode {
    #[serde(default)]
    value: Option<String>,
}

#[derive(Deserialize)]
struct AdminProductNode {
    id: String,
    title: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    variants: Connection<AdminVariantNode>,
    #[serde(default)]
    metafields: Vec<Option<MetafieldNode>>,
}

impl AdminProductNode {
    fn summary(self) -> (AdminProductSummary, Vec<Option<MetafieldNode>>) {
        let variant = self.variants.into_nodes().into_iter().next();
        let summary = AdminProductSummary {
            id: self.id,
            title: self.title,
            status: self.status,
            variant_id: variant.as_ref().map(|v| v.id.clone()),
            variant_price: variant.and_then(|v| v.price),
        };
        (summary, self.metafields)
    }
}

#[derive(Deserialize)]
struct ProductsData {
    products: Connection<AdminProductNode>,
}

#[derive(Deserialize)]
struct ProductData {
    product: Option<AdminProductNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetafieldsSetData {
    metafields_set: MutationPayload,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MutationPayload {
    #[serde(default)]
    user_errors: Vec<UserError>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductsCreateData {
    products_create: ProductsCreatePayload,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductsCreatePayload {
    #[serde(default)]
    products: Vec<AdminProductNode>,
    #[serde(default)]
    user_errors: Vec<UserError>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductUpdateData {
    product_update: ProductUpdatePayload,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductUpdatePayload {
    product: Option<AdminProductNode>,
    #[serde(default)]
    user_errors: Vec<UserError>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VariantPayload {
    product_variant: Option<VariantRef>,
    #[serde(default)]
    user_errors: Vec<UserError>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VariantCreateData {
    product_variant_create: VariantPayload,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VariantUpdateData {
    product_variant_update: VariantPayload,
}

#[derive(Deserialize)]
struct CollectionsData {
    collections: Connection<AdminCollection>,
}

#[derive(Deserialize)]
struct ProductCollectionsNode {
    #[serde(default)]
    collections: Connection<AdminCollection>,
}

#[derive(Deserialize)]
struct ProductCollectionsData {
    product: Option<ProductCollectionsNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CollectionAddData {
    collection_add_products: MutationPayload,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CollectionRemoveData {
    collection_remove_products: MutationPayload,
}

#[derive(Deserialize)]
struct PreviewImage {
    url: String,
}

#[derive(Deserialize)]
struct Preview {
    image: Option<PreviewImage>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMediaNode {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    alt: Option<String>,
    #[serde(default)]
    media_content_type: Option<String>,
    #[serde(default)]
    preview: Option<Preview>,
}

#[derive(Deserialize)]
struct MediaProductNode {
    id: String,
    title: String,
    handle: String,
    #[serde(default)]
    media: Connection<RawMediaNode>,
    #[serde(default)]
    metafield: Option<MetafieldNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MediaByHandleData {
    product_by_handle: Option<MediaProductNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StagedUploadsData {
    staged_uploads_create: StagedUploadsPayload,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StagedUploadsPayload {
    #[serde(default)]
    staged_targets: Vec<StagedTarget>,
    #[serde(default)]
    user_errors: Vec<UserError>,
}

#[derive(Deserialize)]
struct CreatedMedia {
    #[serde(default)]
    id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MediaPayload {
    #[serde(default)]
    media: Vec<CreatedMedia>,
    #[serde(default)]
    media_user_errors: Vec<UserError>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateMediaData {
    product_create_media: MediaPayload,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateMediaData {
    product_update_media: MediaPayload,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReorderMediaData {
    product_reorder_media: MediaPayload,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteMediaData {
    product_delete_media: MediaPayload,
}

/// Client for the Admin API
#[derive(Debug, Clone)]
pub struct AdminClient {
    gql: GraphqlClient,
}

impl AdminClient {
    pub fn new(config: &ShopifyConfig) -> Result<Self, ShopifyError> {
        let token = config
            .admin_token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ShopifyError::Configuration("admin token not configured".into()))?;
        let endpoint =
            ApiSurface::Admin.endpoint(&shop_base_url(&config.domain), &config.admin_api_version);
        let gql = GraphqlClient::new(
            ApiSurface::Admin,
            endpoint,
            token,
            Duration::from_secs(config.timeout_secs),
        )?;
        Ok(Self { gql })
    }

    pub fn endpoint(&self) -> &str {
        self.gql.endpoint()
    }

    pub async fn products(&self, first: u32) -> Result<Vec<AdminProductSummary>, ShopifyError> {
        let data: ProductsData = self
            .gql
            .execute(queries::ADMIN_PRODUCTS, json!({ "first": first }))
            .await?;
        Ok(data
            .products
            .into_nodes()
            .into_iter()
            .map(|node| node.summary().0)
            .collect())
    }

    /// Product plus the configurator metafield under `namespace.key`
    ///
    /// A metafield that does not parse is logged and treated as absent.
    pub async fn product_config(
        &self,
        id: &str,
        namespace: &str,
        key: &str,
    ) -> Result<ProductConfigResult, ShopifyError> {
        let data: ProductData = self
            .gql
            .execute(
                queries::ADMIN_PRODUCT_WITH_CONFIG,
                json!({ "id": id, "namespace": namespace, "key": key }),
            )
            .await?;
        let node = data
            .product
            .ok_or_else(|| ShopifyError::NotFound("Produto não encontrado na Shopify".into()))?;
        let (product, metafields) = node.summary();

        let raw = metafields
            .into_iter()
            .flatten()
            .next()
            .and_then(|m| m.value)
            .filter(|v| !v.trim().is_empty());
        let config = raw.and_then(|raw| match serde_json::from_str::<ProductConfig>(&raw) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(product_id = %product.id, error = %e, "Ignoring unreadable configurator metafield");
                None
            }
        });

        Ok(ProductConfigResult { product, config })
    }

    /// Store any JSON document as a `json` metafield
    pub async fn set_json_metafield<T: Serialize + ?Sized>(
        &self,
        owner_id: &str,
        namespace: &str,
        key: &str,
        value: &T,
    ) -> Result<(), ShopifyError> {
        let value = serde_json::to_string(value).map_err(|e| ShopifyError::Validation(e.to_string()))?;
        let data: MetafieldsSetData = self
            .gql
            .execute(
                queries::METAFIELDS_SET,
                json!({
                    "metafields": [{
                        "ownerId": owner_id,
                        "namespace": namespace,
                        "key": key,
                        "type": "json",
                        "value": value,
                    }]
                }),
            )
            .await?;
        check_user_errors(&data.metafields_set.user_errors)
    }

    pub async fn set_product_config(
        &self,
        owner_id: &str,
        namespace: &str,
        key: &str,
        config: &ProductConfig,
    ) -> Result<(), ShopifyError> {
        self.set_json_metafield(owner_id, namespace, key, config).await
    }

    async fn products_create(&self, product: serde_json::Value) -> Result<AdminProductSummary, ShopifyError> {
        let data: ProductsCreateData = self
            .gql
            .execute(queries::PRODUCTS_CREATE, json!({ "products": [product] }))
            .await?;
        check_user_errors(&data.products_create.user_errors)?;
        data.products_create
            .products
            .into_iter()
            .next()
            .map(|node| node.summary().0)
            .ok_or_else(|| ShopifyError::Decode("Produto não foi criado pela Shopify".into()))
    }

    /// Active product with one variant priced at the configured price per metre
    pub async fn create_product_from_config(
        &self,
        config: &ProductConfig,
    ) -> Result<AdminProductSummary, ShopifyError> {
        let product = json!({
            "title": config.name,
            "descriptionHtml": config.technical_description.clone().unwrap_or_default(),
            "status": ProductStatus::Active.as_str(),
            "variants": [{
                "price": price_string(config.price_per_meter),
                "title": config.name,
            }],
        });
        self.products_create(product).await
    }

    pub async fn create_product(&self, input: &ProductInput) -> Result<AdminProductSummary, ShopifyError> {
        if input.title.trim().is_empty() {
            return Err(ShopifyError::Validation("product title is required".into()));
        }
        let mut product = input.to_variables();
        if let Some(price) = input.price {
            product["variants"] = json!([{ "price": price_string(price) }]);
        }
        self.products_create(product).await
    }

    /// Update product fields and, when given, the price of `variant_id`
    pub async fn update_product(
        &self,
        id: &str,
        variant_id: Option<&str>,
        input: &ProductInput,
    ) -> Result<AdminProductSummary, ShopifyError> {
        let mut product = input.to_variables();
        product["id"] = json!(id);

        let data: ProductUpdateData = self
            .gql
            .execute(queries::PRODUCT_UPDATE, json!({ "input": product }))
            .await?;
        check_user_errors(&data.product_update.user_errors)?;
        let mut summary = data
            .product_update
            .product
            .map(|node| node.summary().0)
            .ok_or_else(|| ShopifyError::NotFound(format!("product '{}'", id)))?;

        if let (Some(variant_id), Some(price)) = (variant_id, input.price) {
            let variant = self.update_variant_price(variant_id, price).await?;
            summary.variant_id = Some(variant.id);
            summary.variant_price = Some(variant.price);
        }
        Ok(summary)
    }

    pub async fn create_variant(
        &self,
        product_id: &str,
        price: f64,
        title: Option<&str>,
    ) -> Result<VariantRef, ShopifyError> {
        let data: VariantCreateData = self
            .gql
            .execute(
                queries::PRODUCT_VARIANT_CREATE,
                json!({
                    "input": {
                        "productId": product_id,
                        "price": price_string(price),
                        "title": title,
                    }
                }),
            )
            .await?;
        let payload = data.product_variant_create;
        check_user_errors(&payload.user_errors)?;
        payload
            .product_variant
            .ok_or_else(|| ShopifyError::Decode("Variant não foi criado".into()))
    }

    pub async fn update_variant_price(&self, variant_id: &str, price: f64) -> Result<VariantRef, ShopifyError> {
        let data: VariantUpdateData = self
            .gql
            .execute(
                queries::PRODUCT_VARIANT_UPDATE,
                json!({ "input": { "id": variant_id, "price": price_string(price) } }),
            )
            .await?;
        let payload = data.product_variant_update;
        check_user_errors(&payload.user_errors)?;
        payload
            .product_variant
            .ok_or_else(|| ShopifyError::Decode("Variant não foi atualizado".into()))
    }

    pub async fn collections(&self, first: u32) -> Result<Vec<AdminCollection>, ShopifyError> {
        let data: CollectionsData = self
            .gql
            .execute(queries::ADMIN_COLLECTIONS, json!({ "first": first }))
            .await?;
        Ok(data.collections.into_nodes())
    }

    pub async fn product_collections(&self, product_id: &str) -> Result<Vec<AdminCollection>, ShopifyError> {
        let data: ProductCollectionsData = self
            .gql
            .execute(queries::PRODUCT_COLLECTIONS, json!({ "id": product_id }))
            .await?;
        data.product
            .map(|p| p.collections.into_nodes())
            .ok_or_else(|| ShopifyError::NotFound(format!("product '{}'", product_id)))
    }

    pub async fn add_product_to_collections(
        &self,
        product_id: &str,
        collection_ids: &[String],
    ) -> Result<(), ShopifyError> {
        for collection_id in collection_ids {
            let data: CollectionAddData = self
                .gql
                .execute(
                    queries::COLLECTION_ADD_PRODUCTS,
                    json!({ "id": collection_id, "productIds": [product_id] }),
                )
                .await?;
            check_user_errors(&data.collection_add_products.user_errors)?;
        }
        Ok(())
    }

    pub async fn remove_product_from_collections(
        &self,
        product_id: &str,
        collection_ids: &[String],
    ) -> Result<(), ShopifyError> {
        for collection_id in collection_ids {
            let data: CollectionRemoveData = self
                .gql
                .execute(
                    queries::COLLECTION_REMOVE_PRODUCTS,
                    json!({ "id": collection_id, "productIds": [product_id] }),
                )
                .await?;
            check_user_errors(&data.collection_remove_products.user_errors)?;
        }
        Ok(())
    }

    /// Make the product's collections equal to `desired`
    ///
    /// Returns the ids added and removed.
    pub async fn set_product_collections(
        &self,
        product_id: &str,
        desired: &[String],
    ) -> Result<(Vec<String>, Vec<String>), ShopifyError> {
        let current: BTreeSet<String> = self
            .product_collections(product_id)
            .await?
            .into_iter()
            .map(|c| c.id)
            .collect();
        let (to_add, to_remove) = collection_diff(&current, desired);

        if !to_add.is_empty() {
            self.add_product_to_collections(product_id, &to_add).await?;
        }
        if !to_remove.is_empty() {
            self.remove_product_from_collections(product_id, &to_remove).await?;
        }
        Ok((to_add, to_remove))
    }

    pub async fn product_media_by_handle(&self, handle: &str) -> Result<ProductMedia, ShopifyError> {
        let data: MediaByHandleData = self
            .gql
            .execute(queries::PRODUCT_MEDIA_BY_HANDLE, json!({ "handle": handle }))
            .await?;
        let node = data
            .product_by_handle
            .ok_or_else(|| ShopifyError::NotFound(format!("Produto não encontrado: {}", handle)))?;

        let media = node
            .media
            .into_nodes()
            .into_iter()
            .filter_map(|m| {
                Some(MediaNode {
                    id: m.id?,
                    alt: m.alt,
                    media_content_type: m.media_content_type.unwrap_or_default(),
                    preview_url: m.preview.and_then(|p| p.image).map(|i| i.url),
                })
            })
            .collect();

        Ok(ProductMedia {
            product_id: node.id,
            title: node.title,
            handle: node.handle,
            media,
            gallery_metafield: node.metafield.and_then(|m| m.value),
        })
    }

    /// Reserve an upload slot for one image
    pub async fn staged_upload(
        &self,
        file_name: &str,
        mime_type: &str,
        file_size: u64,
    ) -> Result<StagedTarget, ShopifyError> {
        let data: StagedUploadsData = self
            .gql
            .execute(
                queries::STAGED_UPLOADS_CREATE,
                json!({
                    "input": [{
                        "filename": file_name,
                        "mimeType": mime_type,
                        "resource": "IMAGE",
                        "fileSize": file_size.to_string(),
                        "httpMethod": "POST",
                    }]
                }),
            )
            .await?;
        let payload = data.staged_uploads_create;
        check_user_errors(&payload.user_errors)?;
        payload
            .staged_targets
            .into_iter()
            .next()
            .ok_or_else(|| ShopifyError::Decode("no staged upload target returned".into()))
    }

    /// POST the file to the staged target as a multipart form
    pub async fn upload_to_staged_target(
        &self,
        target: &StagedTarget,
        file_name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), ShopifyError> {
        let mut form = Form::new();
        for param in &target.parameters {
            form = form.text(param.name.clone(), param.value.clone());
        }
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime_type)
            .map_err(|e| ShopifyError::Validation(e.to_string()))?;
        form = form.part("file", part);

        let response = self
            .gql
            .http()
            .post(&target.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ShopifyError::from_reqwest(e, &target.url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ShopifyError::Status {
                endpoint: target.url.clone(),
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            });
        }
        Ok(())
    }

    /// Attach uploaded images to a product; returns the new media ids
    pub async fn create_product_media(
        &self,
        product_id: &str,
        sources: &[(String, String)],
    ) -> Result<Vec<String>, ShopifyError> {
        let media: Vec<_> = sources
            .iter()
            .map(|(original_source, alt)| {
                json!({
                    "originalSource": original_source,
                    "alt": alt,
                    "mediaContentType": "IMAGE",
                })
            })
            .collect();
        let data: CreateMediaData = self
            .gql
            .execute(
                queries::PRODUCT_CREATE_MEDIA,
                json!({ "productId": product_id, "media": media }),
            )
            .await?;
        let payload = data.product_create_media;
        check_user_errors(&payload.media_user_errors)?;
        Ok(payload.media.into_iter().filter_map(|m| m.id).collect())
    }

    /// Push captions and order, then delete `delete_ids`
    pub async fn update_product_media(
        &self,
        product_id: &str,
        items: &[MediaUpdate],
        delete_ids: &[String],
    ) -> Result<(), ShopifyError> {
        if !items.is_empty() {
            let media: Vec<_> = items
                .iter()
                .map(|item| json!({ "id": item.id, "alt": item.alt.clone().unwrap_or_default() }))
                .collect();
            let data: UpdateMediaData = self
                .gql
                .execute(
                    queries::PRODUCT_UPDATE_MEDIA,
                    json!({ "productId": product_id, "media": media }),
                )
                .await?;
            check_user_errors(&data.product_update_media.media_user_errors)?;

            let moves: Vec<_> = items
                .iter()
                .map(|item| {
                    json!({
                        "id": item.id,
                        "newPosition": item.position.saturating_sub(1).to_string(),
                    })
                })
                .collect();
            let data: ReorderMediaData = self
                .gql
                .execute(
                    queries::PRODUCT_REORDER_MEDIA,
                    json!({ "id": product_id, "moves": moves }),
                )
                .await?;
            check_user_errors(&data.product_reorder_media.media_user_errors)?;
        }

        if !delete_ids.is_empty() {
            let data: DeleteMediaData = self
                .gql
                .execute(
                    queries::PRODUCT_DELETE_MEDIA,
                    json!({ "productId": product_id, "mediaIds": delete_ids }),
                )
                .await?;
            check_user_errors(&data.product_delete_media.media_user_errors)?;
        }
        Ok(())
    }

    pub async fn set_media_metafield(&self, product_id: &str, items: &[MediaUpdate]) -> Result<(), ShopifyError> {
        self.set_json_metafield(product_id, MEDIA_METAFIELD_NAMESPACE, MEDIA_METAFIELD_KEY, items)
            .await
    }
}

/// Collection ids to add and to remove to go from `current` to `desired`
pub fn collection_diff(current: &BTreeSet<String>, desired: &[String]) -> (Vec<String>, Vec<String>) {
    let desired: BTreeSet<String> = desired.iter().cloned().collect();
    let to_add = desired.difference(current).cloned().collect();
    let to_remove = current.difference(&desired).cloned().collect();
    (to_add, to_remove)
}
