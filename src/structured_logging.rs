//! Structured logging and operation context

use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

/// Install the global subscriber
///
/// `RUST_LOG` wins over `level` when set. Calling this twice is harmless;
/// the second call leaves the first subscriber in place.
pub fn init_logging(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("prado_store={},{}", level, level)));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if json {
        registry
            .with(fmt::layer().json().with_target(true).with_current_span(false))
            .try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };

    if let Err(e) = result {
        tracing::debug!(error = %e, "Logging already initialized");
    }
}

/// Structured logger bound to one operation
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    context_id: String,
}

impl StructuredLogger {
    pub fn new(context_id: String) -> Self {
        Self { context_id }
    }

    pub fn context_id(&self) -> &str {
        &self.context_id
    }

    pub fn log_api_call(&self, surface: &str, operation: &str, success: bool, latency_ms: u64) {
        tracing::debug!(
            context_id = %self.context_id,
            surface = %surface,
            operation = %operation,
            success = %success,
            latency_ms = %latency_ms,
            "Shopify API call"
        );
    }

    pub fn log_checkout_created(&self, lines: usize, checkout_url: &str) {
        tracing::info!(
            context_id = %self.context_id,
            lines = %lines,
            checkout_url = %checkout_url,
            "Checkout created"
        );
    }

    pub fn log_checkout_failed(&self, lines: usize, error: &str) {
        tracing::warn!(
            context_id = %self.context_id,
            lines = %lines,
            error = %error,
            "Checkout failed"
        );
    }

    pub fn log_import_row(&self, row: usize, code: &str, success: bool, error: Option<&str>) {
        if success {
            tracing::info!(
                context_id = %self.context_id,
                row = %row,
                code = %code,
                "Product imported"
            );
        } else {
            tracing::warn!(
                context_id = %self.context_id,
                row = %row,
                code = %code,
                error = ?error,
                "Product import failed"
            );
        }
    }

    pub fn log_upload(&self, file_name: &str, state: &str, error: Option<&str>) {
        tracing::debug!(
            context_id = %self.context_id,
            file_name = %file_name,
            state = %state,
            error = ?error,
            "Media upload"
        );
    }

    pub fn error(&self, message: &str) {
        tracing::error!(
            context_id = %self.context_id,
            message = %message,
            "Error"
        );
    }
}

/// Context carried through one user-level operation (checkout, import, ...)
#[derive(Debug, Clone)]
pub struct OperationContext {
    pub request_id: String,
    pub operation: String,
    pub logger: StructuredLogger,
}

impl OperationContext {
    pub fn new(operation: &str) -> Self {
        let request_id = Uuid::new_v4().to_string();
        Self {
            request_id: request_id.clone(),
            operation: operation.to_string(),
            logger: StructuredLogger::new(request_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_logger_shares_request_id() {
        let ctx = OperationContext::new("import");
        assert_eq!(ctx.operation, "import");
        assert_eq!(ctx.logger.context_id(), ctx.request_id);
        assert_ne!(OperationContext::new("import").request_id, ctx.request_id);
    }

    #[test]
    fn test_init_logging_twice_is_harmless() {
        init_logging("info", false);
        init_logging("debug", true);
    }
}
