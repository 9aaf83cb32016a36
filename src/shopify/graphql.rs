//! GraphQL transport shared by the Storefront and Admin clients

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::errors::ShopifyError;
use crate::metrics::{metrics, Timer};
use crate::structured_logging::StructuredLogger;

/// Which Shopify API a client talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiSurface {
    Storefront,
    Admin,
}

impl ApiSurface {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiSurface::Storefront => "storefront",
            ApiSurface::Admin => "admin",
        }
    }

    /// Header carrying the access token
    pub fn auth_header(&self) -> &'static str {
        match self {
            ApiSurface::Storefront => "X-Shopify-Storefront-Access-Token",
            ApiSurface::Admin => "X-Shopify-Access-Token",
        }
    }

    /// GraphQL endpoint for a shop base URL and API version
    pub fn endpoint(&self, base_url: &str, api_version: &str) -> String {
        match self {
            ApiSurface::Storefront => format!("{}/api/{}/graphql.json", base_url, api_version),
            ApiSurface::Admin => format!("{}/admin/api/{}/graphql.json", base_url, api_version),
        }
    }
}

/// Base URL of a shop: a bare domain gets `https://`, a full URL is kept
pub fn shop_base_url(domain: &str) -> String {
    let trimmed = domain.trim().trim_end_matches('/');
    if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

#[derive(Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
    variables: serde_json::Value,
}

#[derive(Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlErrorMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphqlErrorMessage {
    pub message: String,
}

/// Mutation-level error reported next to the payload
#[derive(Debug, Clone, Deserialize)]
pub struct UserError {
    #[serde(default)]
    pub field: Option<Vec<String>>,
    pub message: String,
}

/// Fail with the joined messages when a mutation reported user errors
pub fn check_user_errors(errors: &[UserError]) -> Result<(), ShopifyError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ShopifyError::from_messages(errors.iter().map(|e| e.message.as_str())))
    }
}

/// Relay-style connection as returned by list queries
#[derive(Debug, Clone, Deserialize)]
pub struct Connection<T> {
    #[serde(default = "Vec::new")]
    pub edges: Vec<Edge<T>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Edge<T> {
    pub node: T,
}

impl<T> Connection<T> {
    pub fn into_nodes(self) -> Vec<T> {
        self.edges.into_iter().map(|e| e.node).collect()
    }
}

impl<T> Default for Connection<T> {
    fn default() -> Self {
        Self { edges: Vec::new() }
    }
}

/// First word after `query`/`mutation`, for log lines
fn operation_name(query: &str) -> &str {
    query
        .split_whitespace()
        .skip_while(|w| *w != "query" && *w != "mutation")
        .nth(1)
        .map(|w| w.split(['(', '{']).next().unwrap_or(w))
        .unwrap_or("anonymous")
}

/// Authenticated GraphQL client for one surface of one shop
#[derive(Debug, Clone)]
pub struct GraphqlClient {
    http: reqwest::Client,
    surface: ApiSurface,
    endpoint: String,
    token: String,
}

impl GraphqlClient {
    pub fn new(
        surface: ApiSurface,
        endpoint: String,
        token: String,
        timeout: Duration,
    ) -> Result<Self, ShopifyError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ShopifyError::Configuration(e.to_string()))?;
        Ok(Self {
            http,
            surface,
            endpoint,
            token,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn surface(&self) -> ApiSurface {
        self.surface
    }

    /// Underlying HTTP client, for requests outside GraphQL (staged uploads)
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Run one query or mutation and decode its `data`
    pub async fn execute<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, ShopifyError> {
        let surface = self.surface.as_str();
        let operation = operation_name(query);
        let logger = StructuredLogger::new(surface.to_string());
        let timer = Timer::new();
        metrics().api_requests.with_label_values(&[surface]).inc();

        let result = self.send(query, variables).await;
        let latency_ms = timer.elapsed_ms();
        timer.finish(surface);
        logger.log_api_call(surface, operation, result.is_ok(), latency_ms);

        if let Err(e) = &result {
            metrics().api_errors.with_label_values(&[surface]).inc();
            tracing::warn!(surface = %surface, operation = %operation, error = %e, "Shopify request failed");
        }
        result
    }

    async fn send<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, ShopifyError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header(self.surface.auth_header(), &self.token)
            .json(&GraphqlRequest { query, variables })
            .send()
            .await
            .map_err(|e| ShopifyError::from_reqwest(e, &self.endpoint))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ShopifyError::Status {
                endpoint: self.endpoint.clone(),
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        let body: GraphqlResponse<T> = response
            .json()
            .await
            .map_err(|e| ShopifyError::Decode(e.to_string()))?;

        if !body.errors.is_empty() {
            let joined = body
                .errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(ShopifyError::GraphQl(joined));
        }

        body.data
            .ok_or_else(|| ShopifyError::Decode("response has no data".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        let base = shop_base_url("loja.myshopify.com");
        assert_eq!(base, "https://loja.myshopify.com");
        assert_eq!(
            ApiSurface::Storefront.endpoint(&base, "2025-07"),
            "https://loja.myshopify.com/api/2025-07/graphql.json"
        );
        assert_eq!(
            ApiSurface::Admin.endpoint(&base, "2024-10"),
            "https://loja.myshopify.com/admin/api/2024-10/graphql.json"
        );
        assert_eq!(shop_base_url("http://127.0.0.1:1234/"), "http://127.0.0.1:1234");
    }

    #[test]
    fn test_operation_name() {
        assert_eq!(operation_name("query GetProducts($first: Int!) { x }"), "GetProducts");
        assert_eq!(operation_name("mutation cartCreate($input: CartInput!) {"), "cartCreate");
        assert_eq!(operation_name("{ shop { name } }"), "anonymous");
    }

    #[test]
    fn test_user_errors_joined() {
        let errors = vec![
            UserError {
                field: None,
                message: "a".into(),
            },
            UserError {
                field: Some(vec!["title".into()]),
                message: "b".into(),
            },
        ];
        let err = check_user_errors(&errors).unwrap_err();
        assert_eq!(err.to_string(), "a, b");
        assert!(check_user_errors(&[]).is_ok());
    }

    #[tokio::test]
    async fn test_execute_joins_top_level_errors() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/admin/api/2024-10/graphql.json")
            .match_header("X-Shopify-Access-Token", "secret")
            .with_status(200)
            .with_body(r#"{"errors":[{"message":"Throttled"},{"message":"Access denied"}]}"#)
            .create_async()
            .await;

        let endpoint = ApiSurface::Admin.endpoint(&server.url(), "2024-10");
        let client =
            GraphqlClient::new(ApiSurface::Admin, endpoint, "secret".into(), Duration::from_secs(5))
                .unwrap();
        let err = client
            .execute::<serde_json::Value>("query Q { shop { name } }", serde_json::json!({}))
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert_eq!(err.to_string(), "GraphQL error: Throttled, Access denied");
    }

    #[tokio::test]
    async fn test_execute_maps_http_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/2025-07/graphql.json")
            .with_status(401)
            .create_async()
            .await;

        let endpoint = ApiSurface::Storefront.endpoint(&server.url(), "2025-07");
        let client =
            GraphqlClient::new(ApiSurface::Storefront, endpoint, "t".into(), Duration::from_secs(5))
                .unwrap();
        let err = client
            .execute::<serde_json::Value>("query Q { shop { name } }", serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ShopifyError::Status { status: 401, .. }));
    }
}
