//! Prado Store - storefront and admin toolkit for cut-to-order aluminium
//! profiles sold through Shopify.
//!
//! The crate has no backend of its own: products, carts and media live on
//! the platform and are reached through the Storefront and Admin GraphQL
//! APIs. Locally it keeps small JSON blobs (cart, admin session, settings)
//! in a sled database.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod configurator;
pub mod import;
pub mod metrics;
pub mod pricing;
pub mod product_sync;
pub mod settings;
pub mod shopify;
pub mod storage;
pub mod structured_logging;
pub mod types;

// Re-export commonly used types
pub use cart::{CartBackend, CartError, CartStore, CheckoutGateway};
pub use config::AppConfig;
pub use configurator::Configurator;
pub use pricing::{compute_order_summary, compute_piece_total, format_currency, OrderSummary, Validation};
pub use shopify::{AdminClient, ShopifyError, StorefrontClient};
pub use storage::LocalStore;
pub use types::{CartItem, Piece, ProductConfig, ServiceType};
