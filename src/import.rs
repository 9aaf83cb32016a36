//! Bulk product import from `;`-separated CSV files

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use thiserror::Error;

use crate::metrics::metrics;
use crate::shopify::admin::{AdminClient, AdminProductSummary, ProductInput, ProductOption};
use crate::shopify::ShopifyError;
use crate::structured_logging::OperationContext;
use crate::types::ProductStatus;

/// Vendor set on every imported product
pub const IMPORT_VENDOR: &str = "Prado Industrial";

/// Product type used when the row has none
pub const DEFAULT_PRODUCT_TYPE: &str = "Componentes";

/// Example file offered to admins
pub const TEMPLATE: &str = "codigo;descricao;preco;categoria;tipo;tags;comprimento_min;comprimento_max\n\
PROD001;Produto Exemplo;99.90;movimentacao-linear;guia;destaque,promocao;100;500\n";

static NON_SLUG_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"));

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("CSV inválido: {0}")]
    Csv(#[from] csv::Error),

    #[error("Linha {row}: campo obrigatório '{field}' vazio")]
    MissingField { row: usize, field: &'static str },

    #[error("Linha {row}: preço inválido '{value}'")]
    InvalidPrice { row: usize, value: String },
}

/// One data row, with header aliases already resolved
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CsvProduct {
    /// 1-based line number in the file, header included
    pub row: usize,
    pub code: String,
    pub description: String,
    pub price: String,
    pub category: String,
    pub product_type: String,
    pub tags: String,
    pub min_length: String,
    pub max_length: String,
}

fn pick(fields: &HashMap<String, String>, aliases: &[&str]) -> String {
    aliases
        .iter()
        .filter_map(|alias| fields.get(*alias))
        .find(|value| !value.is_empty())
        .cloned()
        .unwrap_or_default()
}

/// Line of the first record byte at or after `offset`
///
/// The reader reports a record's position before any blank lines it
/// skipped, so those terminators are stepped over first.
fn line_at(text: &str, offset: usize) -> usize {
    let bytes = text.as_bytes();
    let mut start = offset.min(bytes.len());
    while start < bytes.len() && matches!(bytes[start], b'\n' | b'\r') {
        start += 1;
    }
    1 + bytes[..start].iter().filter(|&&b| b == b'\n').count()
}

/// Parse the file; header names are case-insensitive and support aliases
pub fn parse_csv(text: &str) -> Result<Vec<CsvProduct>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let mut products = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let fields: HashMap<String, String> = headers
            .iter()
            .cloned()
            .zip(record.iter().map(str::to_string))
            .collect();

        let price = pick(&fields, &["preco", "preço", "valor"]);
        products.push(CsvProduct {
            row: record
                .position()
                .map(|p| line_at(text, p.byte() as usize))
                .unwrap_or(index + 2),
            code: pick(&fields, &["codigo", "código"]),
            description: pick(&fields, &["descricao", "descrição", "nome"]),
            price: if price.is_empty() { "0".to_string() } else { price },
            category: pick(&fields, &["categoria"]),
            product_type: pick(&fields, &["tipo", "tipo_produto"]),
            tags: pick(&fields, &["tags"]),
            min_length: pick(&fields, &["comprimento_min", "comp_min"]),
            max_length: pick(&fields, &["comprimento_max", "comp_max"]),
        });
    }
    Ok(products)
}

/// Parse `csv_category:slug` lines; blank and malformed lines are skipped
pub fn parse_category_mapping(text: &str) -> BTreeMap<String, String> {
    text.lines()
        .filter_map(|line| {
            let (from, to) = line.split_once(':')?;
            let (from, to) = (from.trim(), to.trim());
            if from.is_empty() || to.is_empty() {
                None
            } else {
                Some((from.to_lowercase(), to.to_string()))
            }
        })
        .collect()
}

/// Lowercased code with every run of other characters replaced by `-`
pub fn slugify_handle(code: &str) -> String {
    NON_SLUG_RUN.replace_all(&code.to_lowercase(), "-").into_owned()
}

impl CsvProduct {
    fn description_html(&self) -> String {
        let mut html = format!("<p><strong>Código:</strong> {}</p>", self.code);
        if !self.min_length.is_empty() {
            html.push_str(&format!(
                "<p><strong>Comprimento Mínimo:</strong> {}mm</p>",
                self.min_length
            ));
        }
        if !self.max_length.is_empty() {
            html.push_str(&format!(
                "<p><strong>Comprimento Máximo:</strong> {}mm</p>",
                self.max_length
            ));
        }
        html
    }

    /// Product to create for this row
    pub fn to_product_input(&self, mapping: &BTreeMap<String, String>) -> Result<ProductInput, ImportError> {
        if self.code.is_empty() {
            return Err(ImportError::MissingField {
                row: self.row,
                field: "codigo",
            });
        }
        if self.description.is_empty() {
            return Err(ImportError::MissingField {
                row: self.row,
                field: "descricao",
            });
        }

        let normalized = self.price.replace(',', ".");
        let price: f64 = normalized
            .parse()
            .ok()
            .filter(|p: &f64| p.is_finite() && *p >= 0.0)
            .ok_or_else(|| ImportError::InvalidPrice {
                row: self.row,
                value: self.price.clone(),
            })?;

        let category = mapping
            .get(&self.category.to_lowercase())
            .cloned()
            .unwrap_or_else(|| self.category.clone());
        let tags: Vec<String> = [category, self.product_type.clone()]
            .into_iter()
            .chain(self.tags.split(',').map(|t| t.trim().to_string()))
            .filter(|t| !t.is_empty())
            .collect();

        let product_type = if self.product_type.is_empty() {
            DEFAULT_PRODUCT_TYPE.to_string()
        } else {
            self.product_type.clone()
        };

        Ok(ProductInput {
            title: self.description.clone(),
            handle: Some(slugify_handle(&self.code)),
            description_html: self.description_html(),
            vendor: Some(IMPORT_VENDOR.to_string()),
            product_type: Some(product_type),
            tags,
            status: ProductStatus::Active,
            price: Some(price),
            options: vec![ProductOption {
                name: "Comprimento".to_string(),
                values: vec!["Padrão".to_string()],
            }],
        })
    }
}

/// Destination of imported products
#[async_trait]
pub trait ProductCreator: Send + Sync {
    async fn create(&self, input: &ProductInput) -> Result<AdminProductSummary, ShopifyError>;
}

#[async_trait]
impl ProductCreator for AdminClient {
    async fn create(&self, input: &ProductInput) -> Result<AdminProductSummary, ShopifyError> {
        self.create_product(input).await
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowError {
    pub row: usize,
    pub product: String,
    pub error: String,
}

/// Outcome of an import run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    pub total: usize,
    pub processed: usize,
    pub success: usize,
    pub failed: usize,
    pub created: Vec<String>,
    pub errors: Vec<RowError>,
}

/// Sequential importer; a failing row never stops the run
pub struct Importer<C: ProductCreator> {
    creator: C,
    row_delay: Duration,
    mapping: BTreeMap<String, String>,
}

impl<C: ProductCreator> Importer<C> {
    pub fn new(creator: C, row_delay: Duration) -> Self {
        Self {
            creator,
            row_delay,
            mapping: BTreeMap::new(),
        }
    }

    pub fn with_category_mapping(mut self, mapping: BTreeMap<String, String>) -> Self {
        self.mapping = mapping;
        self
    }

    async fn import_row(&self, product: &CsvProduct) -> Result<AdminProductSummary, String> {
        let input = product.to_product_input(&self.mapping).map_err(|e| e.to_string())?;
        self.creator.create(&input).await.map_err(|e| e.to_string())
    }

    pub async fn run(&self, products: &[CsvProduct]) -> ImportReport {
        let ctx = OperationContext::new("csv_import");
        let mut report = ImportReport {
            total: products.len(),
            ..Default::default()
        };
        tracing::info!(
            context_id = %ctx.logger.context_id(),
            operation = %ctx.operation,
            total = products.len(),
            "Starting product import"
        );

        for (index, product) in products.iter().enumerate() {
            report.processed = index + 1;
            match self.import_row(product).await {
                Ok(created) => {
                    metrics().import_rows_ok.inc();
                    ctx.logger.log_import_row(product.row, &product.code, true, None);
                    report.success += 1;
                    report.created.push(created.id);
                }
                Err(error) => {
                    metrics().import_rows_failed.inc();
                    ctx.logger
                        .log_import_row(product.row, &product.code, false, Some(&error));
                    report.failed += 1;
                    report.errors.push(RowError {
                        row: product.row,
                        product: product.description.clone(),
                        error,
                    });
                }
            }

            if index + 1 < products.len() && !self.row_delay.is_zero() {
                tokio::time::sleep(self.row_delay).await;
            }
        }

        tracing::info!(
            context_id = %ctx.request_id,
            success = report.success,
            failed = report.failed,
            "Product import finished"
        );
        report
    }
}
