//! GraphQL documents sent to Shopify

// Storefront API

pub const CART_CREATE: &str = r#"
mutation cartCreate($input: CartInput!) {
  cartCreate(input: $input) {
    cart {
      id
      checkoutUrl
    }
    userErrors {
      field
      message
    }
  }
}
"#;

pub const STOREFRONT_PRODUCTS: &str = r#"
query getProducts($first: Int!, $query: String) {
  products(first: $first, query: $query) {
    edges {
      node {
        id
        title
        description
        handle
        tags
        priceRange {
          minVariantPrice {
            amount
            currencyCode
          }
        }
        images(first: 5) {
          edges {
            node {
              url
              altText
            }
          }
        }
        variants(first: 1) {
          edges {
            node {
              id
              title
              price {
                amount
                currencyCode
              }
            }
          }
        }
        metafields(identifiers: [
          { namespace: "custom", key: "codigo" },
          { namespace: "custom", key: "comprimento_min" },
          { namespace: "custom", key: "comprimento_max" },
          { namespace: "custom", key: "peso" },
          { namespace: "custom", key: "tolerancia" }
        ]) {
          key
          value
        }
      }
    }
  }
}
"#;

pub const STOREFRONT_PRODUCT_BY_HANDLE: &str = r#"
query getProductByHandle($handle: String!) {
  productByHandle(handle: $handle) {
    id
    title
    description
    handle
    tags
    priceRange {
      minVariantPrice {
        amount
        currencyCode
      }
    }
    images(first: 5) {
      edges {
        node {
          url
          altText
        }
      }
    }
    variants(first: 1) {
      edges {
        node {
          id
          title
          price {
            amount
            currencyCode
          }
        }
      }
    }
    metafields(identifiers: [
      { namespace: "custom", key: "codigo" },
      { namespace: "custom", key: "comprimento_min" },
      { namespace: "custom", key: "comprimento_max" },
      { namespace: "custom", key: "peso" },
      { namespace: "custom", key: "tolerancia" }
    ]) {
      key
      value
    }
  }
}
"#;

pub const STOREFRONT_COLLECTIONS: &str = r#"
query getCollections($first: Int!) {
  collections(first: $first) {
    edges {
      node {
        id
        title
        handle
        description
      }
    }
  }
}
"#;

// Admin API

pub const ADMIN_PRODUCTS: &str = r#"
query getAdminProducts($first: Int!) {
  products(first: $first) {
    edges {
      node {
        id
        title
        status
        variants(first: 1) {
          edges {
            node {
              id
              price
            }
          }
        }
      }
    }
  }
}
"#;

pub const ADMIN_PRODUCT_WITH_CONFIG: &str = r#"
query getProductWithConfig($id: ID!, $namespace: String!, $key: String!) {
  product(id: $id) {
    id
    title
    status
    variants(first: 1) {
      edges {
        node {
          id
          price
        }
      }
    }
    metafields(identifiers: [{ namespace: $namespace, key: $key }]) {
      key
      namespace
      type
      value
    }
  }
}
"#;

pub const METAFIELDS_SET: &str = r#"
mutation metafieldsSet($metafields: [MetafieldsSetInput!]!) {
  metafieldsSet(metafields: $metafields) {
    metafields {
      id
      key
      namespace
    }
    userErrors {
      field
      message
    }
  }
}
"#;

pub const PRODUCTS_CREATE: &str = r#"
mutation productsCreate($products: [ProductInput!]!) {
  productsCreate(products: $products) {
    products {
      id
      title
      status
      variants(first: 1) {
        edges {
          node {
            id
            price
          }
        }
      }
    }
    userErrors {
      field
      message
    }
  }
}
"#;

pub const PRODUCT_UPDATE: &str = r#"
mutation productUpdate($input: ProductInput!) {
  productUpdate(input: $input) {
    product {
      id
      title
      status
      variants(first: 1) {
        edges {
          node {
            id
            price
          }
        }
      }
    }
    userErrors {
      field
      message
    }
  }
}
"#;

pub const PRODUCT_VARIANT_CREATE: &str = r#"
mutation productVariantCreate($input: ProductVariantInput!) {
  productVariantCreate(input: $input) {
    productVariant {
      id
      price
    }
    userErrors {
      field
      message
    }
  }
}
"#;

pub const PRODUCT_VARIANT_UPDATE: &str = r#"
mutation productVariantUpdate($input: ProductVariantInput!) {
  productVariantUpdate(input: $input) {
    productVariant {
      id
      price
    }
    userErrors {
      field
      message
    }
  }
}
"#;

pub const ADMIN_COLLECTIONS: &str = r#"
query getAdminCollections($first: Int!) {
  collections(first: $first) {
    edges {
      node {
        id
        title
        handle
      }
    }
  }
}
"#;

pub const PRODUCT_COLLECTIONS: &str = r#"
query getProductCollections($id: ID!) {
  product(id: $id) {
    id
    collections(first: 50) {
      edges {
        node {
          id
          title
          handle
        }
      }
    }
  }
}
"#;

pub const COLLECTION_ADD_PRODUCTS: &str = r#"
mutation collectionAddProducts($id: ID!, $productIds: [ID!]!) {
  collectionAddProducts(id: $id, productIds: $productIds) {
    collection {
      id
    }
    userErrors {
      field
      message
    }
  }
}
"#;

pub const COLLECTION_REMOVE_PRODUCTS: &str = r#"
mutation collectionRemoveProducts($id: ID!, $productIds: [ID!]!) {
  collectionRemoveProducts(id: $id, productIds: $productIds) {
    job {
      id
    }
    userErrors {
      field
      message
    }
  }
}
"#;

pub const PRODUCT_MEDIA_BY_HANDLE: &str = r#"
query productMediaByHandle($handle: String!) {
  productByHandle(handle: $handle) {
    id
    title
    handle
    media(first: 30) {
      edges {
        node {
          ... on MediaImage {
            id
            alt
            mediaContentType
            preview { image { url } }
          }
        }
      }
    }
    metafield(namespace: "custom", key: "media_gallery") {
      id
      value
    }
  }
}
"#;

pub const STAGED_UPLOADS_CREATE: &str = r#"
mutation stagedUploadsCreate($input: [StagedUploadInput!]!) {
  stagedUploadsCreate(input: $input) {
    stagedTargets {
      url
      resourceUrl
      parameters {
        name
        value
      }
    }
    userErrors {
      field
      message
    }
  }
}
"#;

pub const PRODUCT_CREATE_MEDIA: &str = r#"
mutation productCreateMedia($productId: ID!, $media: [CreateMediaInput!]!) {
  productCreateMedia(productId: $productId, media: $media) {
    media {
      ... on MediaImage {
        id
        alt
      }
    }
    mediaUserErrors {
      field
      message
    }
  }
}
"#;

pub const PRODUCT_UPDATE_MEDIA: &str = r#"
mutation productUpdateMedia($productId: ID!, $media: [UpdateMediaInput!]!) {
  productUpdateMedia(productId: $productId, media: $media) {
    media {
      ... on MediaImage {
        id
        alt
      }
    }
    mediaUserErrors {
      field
      message
    }
  }
}
"#;

pub const PRODUCT_REORDER_MEDIA: &str = r#"
mutation productReorderMedia($id: ID!, $moves: [MoveInput!]!) {
  productReorderMedia(id: $id, moves: $moves) {
    job {
      id
    }
    mediaUserErrors {
      field
      message
    }
  }
}
"#;

pub const PRODUCT_DELETE_MEDIA: &str = r#"
mutation productDeleteMedia($productId: ID!, $mediaIds: [ID!]!) {
  productDeleteMedia(productId: $productId, mediaIds: $mediaIds) {
    deletedMediaIds
    mediaUserErrors {
      field
      message
    }
  }
}
"#;
