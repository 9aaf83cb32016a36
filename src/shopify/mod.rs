//! Shopify Storefront and Admin GraphQL clients

pub mod admin;
pub mod errors;
pub mod graphql;
pub mod media;
pub mod queries;
pub mod storefront;

pub use admin::{AdminClient, AdminProductSummary, ProductConfigResult, ProductInput, ProductOption};
pub use errors::{ErrorKind, ShopifyError};
pub use graphql::{ApiSurface, GraphqlClient};
pub use media::{MediaGallery, UploadFile, UploadState, UploadStatus};
pub use storefront::{Collection, StorefrontClient, StorefrontProduct};
