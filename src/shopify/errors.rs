use thiserror::Error;

/// Coarse class of a failure, used to pick the message shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network, HTTP or platform-reported failure
    Platform,
    /// Input rejected before or by the platform
    Validation,
    /// The requested resource does not exist
    NotFound,
}

/// Errors returned by the Storefront and Admin API clients
#[derive(Debug, Clone, Error)]
pub enum ShopifyError {
    /// Transport-level errors (DNS, TLS, connection reset)
    #[error("Transport error: {message} (endpoint: {endpoint})")]
    Transport { endpoint: String, message: String },

    #[error("Timeout (endpoint: {endpoint})")]
    Timeout { endpoint: String },

    /// Non-2xx HTTP status
    #[error("Shopify API error: {status} {reason} (endpoint: {endpoint})")]
    Status {
        endpoint: String,
        status: u16,
        reason: String,
    },

    /// Top-level `errors` array of a GraphQL response
    #[error("GraphQL error: {0}")]
    GraphQl(String),

    /// `userErrors` returned by a mutation
    #[error("{0}")]
    UserErrors(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Response did not have the expected shape
    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl ShopifyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ShopifyError::NotFound(_) => ErrorKind::NotFound,
            ShopifyError::Validation(_) | ShopifyError::UserErrors(_) => ErrorKind::Validation,
            ShopifyError::Transport { .. }
            | ShopifyError::Timeout { .. }
            | ShopifyError::Status { .. }
            | ShopifyError::GraphQl(_)
            | ShopifyError::Decode(_)
            | ShopifyError::Configuration(_) => ErrorKind::Platform,
        }
    }

    /// Get the endpoint associated with this error, if any
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            ShopifyError::Transport { endpoint, .. } => Some(endpoint),
            ShopifyError::Timeout { endpoint } => Some(endpoint),
            ShopifyError::Status { endpoint, .. } => Some(endpoint),
            _ => None,
        }
    }

    /// Classify a reqwest failure
    pub fn from_reqwest(err: reqwest::Error, endpoint: &str) -> Self {
        if err.is_timeout() {
            ShopifyError::Timeout {
                endpoint: endpoint.to_string(),
            }
        } else if err.is_decode() {
            ShopifyError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ShopifyError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            }
        } else {
            ShopifyError::Transport {
                endpoint: endpoint.to_string(),
                message: err.to_string(),
            }
        }
    }

    /// Join a list of platform messages into one error
    pub fn from_messages<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = messages
            .into_iter()
            .map(|m| m.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        ShopifyError::UserErrors(joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind() {
        assert_eq!(ShopifyError::NotFound("x".into()).kind(), ErrorKind::NotFound);
        assert_eq!(ShopifyError::UserErrors("x".into()).kind(), ErrorKind::Validation);
        assert_eq!(
            ShopifyError::Timeout {
                endpoint: "e".into()
            }
            .kind(),
            ErrorKind::Platform
        );
    }

    #[test]
    fn test_error_endpoint() {
        let err = ShopifyError::Status {
            endpoint: "https://shop.test/api".to_string(),
            status: 502,
            reason: "Bad Gateway".to_string(),
        };
        assert_eq!(err.endpoint(), Some("https://shop.test/api"));
        assert_eq!(
            err.to_string(),
            "Shopify API error: 502 Bad Gateway (endpoint: https://shop.test/api)"
        );
        assert_eq!(ShopifyError::GraphQl("boom".into()).endpoint(), None);
    }

    #[test]
    fn test_from_messages_joins() {
        let err = ShopifyError::from_messages(["Title can't be blank", "Price invalid"]);
        assert_eq!(err.to_string(), "Title can't be blank, Price invalid");
    }
}
