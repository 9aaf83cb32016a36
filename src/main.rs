//! Prado Store command line
//!
//! Quotes cut-to-order profiles, browses the storefront, turns a quote into
//! a Shopify checkout and runs the admin chores (product configuration,
//! CSV import, media gallery, settings).

#![deny(unused_imports)]
#![deny(unused_mut)]
#![deny(unused_variables)]
#![warn(unused_must_use)]

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use prado_store::auth::{hash_secret, AdminAuth};
use prado_store::cart::{CartError, CartStore};
use prado_store::catalog::{self, CATEGORIES, FEATURED_PRODUCTS};
use prado_store::config::AppConfig;
use prado_store::configurator::Configurator;
use prado_store::import::{parse_category_mapping, parse_csv, Importer, TEMPLATE};
use prado_store::metrics::metrics;
use prado_store::pricing::{format_currency, parse_input};
use prado_store::product_sync::ProductConfigService;
use prado_store::settings::AdminSettings;
use prado_store::shopify::media::{upload_all, MediaGallery, UploadFile};
use prado_store::shopify::storefront::CATEGORY_PAGE_SIZE;
use prado_store::shopify::{AdminClient, StorefrontClient};
use prado_store::storage::LocalStore;
use prado_store::structured_logging::init_logging;
use prado_store::types::{ServiceDetails, ServiceType};

/// Rows shown by `import --dry-run`
const PREVIEW_ROWS: usize = 5;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "prado-store", author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Price a list of pieces, e.g. `quote 1000x2 500x1:rosca:M6`
    Quote(QuoteArgs),

    /// List storefront products
    Products {
        /// Free-form storefront search query
        #[arg(short, long)]
        query: Option<String>,

        /// Category slug from the catalog
        #[arg(long)]
        category: Option<String>,

        /// Subcategory slug inside --category
        #[arg(long, requires = "category")]
        subcategory: Option<String>,

        #[arg(long, default_value_t = 20)]
        first: u32,
    },

    /// Search storefront products
    Search {
        term: String,

        #[arg(long, default_value_t = 20)]
        first: u32,
    },

    /// List storefront collections
    Collections {
        #[arg(long, default_value_t = 20)]
        first: u32,
    },

    /// Add configured pieces to the cart and open a checkout
    Checkout(QuoteArgs),

    /// Admin area
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },

    /// Import products from a `;`-separated CSV file
    Import {
        file: PathBuf,

        /// File with `csv_category:slug` lines
        #[arg(long)]
        mapping: Option<PathBuf>,

        /// Only parse and preview the file
        #[arg(long)]
        dry_run: bool,
    },

    /// Write the CSV import template
    ImportTemplate {
        #[arg(short, long, default_value = "template-importacao.csv")]
        output: PathBuf,
    },

    /// Product media gallery
    Media {
        #[command(subcommand)]
        command: MediaCommand,
    },

    /// Store settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },

    /// Show the category tree, or one category
    Catalog { slug: Option<String> },

    /// Print metrics in Prometheus text format
    Metrics,
}

#[derive(Args, Debug)]
struct QuoteArgs {
    /// Pieces as LENGTHxQTY[:service[:details]]
    #[arg(required = true)]
    pieces: Vec<String>,

    /// Storefront product handle to take price and limits from
    #[arg(long)]
    handle: Option<String>,

    /// Override the price per metre
    #[arg(long)]
    price_per_meter: Option<f64>,
}

#[derive(Subcommand, Debug)]
enum AdminCommand {
    /// Log in with email and password, or with the shared secret
    Login {
        #[arg(long, requires = "password", conflicts_with = "secret")]
        email: Option<String>,

        #[arg(long, env = "PRADO_ADMIN_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        #[arg(long, env = "PRADO_ADMIN_SECRET", hide_env_values = true)]
        secret: Option<String>,
    },
    Logout,
    Whoami,
    /// Print the hash of a secret, for the configuration file
    Hash { secret: String },
    /// List admin products
    Products,
    /// Configurator settings of a product
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Put a product in exactly the given collections
    Collections {
        product_id: String,
        collection_ids: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    Show {
        product_id: String,
    },
    Save {
        /// Product to update; a new product is created when omitted
        product_id: Option<String>,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        price_per_meter: Option<f64>,

        #[arg(long)]
        min_length: Option<u32>,

        #[arg(long)]
        max_length: Option<u32>,

        /// Per-service surcharge as service=amount
        #[arg(long = "surcharge")]
        surcharges: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
enum MediaCommand {
    List {
        handle: String,
    },
    Upload {
        handle: String,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Reorder, caption or delete images, then sync the gallery
    Edit {
        handle: String,

        /// Caption as media_id=text
        #[arg(long = "caption")]
        captions: Vec<String>,

        /// Move a media id one position up
        #[arg(long)]
        up: Vec<String>,

        /// Move a media id one position down
        #[arg(long)]
        down: Vec<String>,

        #[arg(long)]
        delete: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
enum SettingsCommand {
    Show,
    /// Set one field by its camelCase name
    Set { key: String, value: String },
    /// Restore the default settings
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = AppConfig::load(cli.config.as_deref());
    let config = match &loaded {
        Ok(config) => config.clone(),
        Err(_) => AppConfig::default(),
    };

    let level = if cli.verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    init_logging(level, cli.json_logs || config.logging.json || cfg!(feature = "json-logs"));

    if let Err(e) = loaded {
        if cli.config.is_some() {
            return Err(e).context("Failed to load configuration");
        }
        warn!("Configuration not loaded ({}), using defaults", e);
    }
    info!("🚀 Prado Store v{}", env!("CARGO_PKG_VERSION"));

    run(cli.command, config).await
}

async fn run(command: Command, config: AppConfig) -> Result<()> {
    match command {
        Command::Quote(args) => quote(&config, args).await,
        Command::Products {
            query,
            category,
            subcategory,
            first,
        } => {
            let client = storefront(&config)?;
            let products = match category {
                Some(slug) => {
                    let tag = subcategory.unwrap_or(slug);
                    client.products_by_tag(&tag, first.max(CATEGORY_PAGE_SIZE)).await?
                }
                None => client.products(first, query.as_deref()).await?,
            };
            for product in products {
                let price = product
                    .variant
                    .as_ref()
                    .and_then(|v| v.price.value())
                    .map(format_currency)
                    .unwrap_or_else(|| "-".to_string());
                println!("{:<60} {:>14}  {}", product.title, price, product.handle);
            }
            Ok(())
        }
        Command::Search { term, first } => {
            let products = storefront(&config)?.search(&term, first).await?;
            if products.is_empty() {
                println!("Nenhum produto encontrado para '{}'", term);
            }
            for product in products {
                println!("{}  ({})", product.title, product.handle);
            }
            Ok(())
        }
        Command::Collections { first } => {
            for collection in storefront(&config)?.collections(first).await? {
                println!("{:<40} {}", collection.title, collection.handle);
            }
            Ok(())
        }
        Command::Checkout(args) => checkout(&config, args).await,
        Command::Admin { command } => admin(&config, command).await,
        Command::Import {
            file,
            mapping,
            dry_run,
        } => import(&config, &file, mapping.as_deref(), dry_run).await,
        Command::ImportTemplate { output } => {
            tokio::fs::write(&output, TEMPLATE)
                .await
                .with_context(|| format!("Failed to write {}", output.display()))?;
            info!("📄 Template written to {}", output.display());
            Ok(())
        }
        Command::Media { command } => media(&config, command).await,
        Command::Settings { command } => settings(&config, command),
        Command::Catalog { slug } => {
            match slug {
                Some(slug) => {
                    let category = catalog::category(&slug)
                        .with_context(|| format!("Categoria não encontrada: {}", slug))?;
                    println!("{}", serde_json::to_string_pretty(category)?);
                }
                None => {
                    for category in CATEGORIES {
                        println!("{} ({})", category.name, category.slug);
                        for sub in category.subcategories {
                            let mark = if sub.featured { " *" } else { "" };
                            println!("  - {} ({}){}", sub.name, sub.slug, mark);
                        }
                    }
                    println!();
                    for product in FEATURED_PRODUCTS {
                        let unit = if product.price_per_meter { "/m" } else { "" };
                        println!("★ {} {}{}", product.name, format_currency(product.price), unit);
                    }
                }
            }
            Ok(())
        }
        Command::Metrics => {
            print!("{}", metrics().export_text()?);
            Ok(())
        }
    }
}

fn storefront(config: &AppConfig) -> Result<StorefrontClient> {
    StorefrontClient::new(&config.shopify).context("Storefront API not available")
}

fn admin_client(config: &AppConfig) -> Result<AdminClient> {
    AdminClient::new(&config.shopify).context("Admin API not available")
}

fn open_store(config: &AppConfig) -> Result<LocalStore> {
    LocalStore::open(&config.storage.path)
        .with_context(|| format!("Failed to open local store at {}", config.storage.path.display()))
}

/// Fail unless an admin session is active
fn require_admin(config: &AppConfig, store: &LocalStore) -> Result<()> {
    let auth = AdminAuth::new(config.admin.clone(), store.clone());
    if !auth.is_authenticated()? {
        bail!("Acesso restrito: faça login com `prado-store admin login`");
    }
    Ok(())
}

struct PieceSpec {
    length: f64,
    quantity: f64,
    service: ServiceType,
    details: Option<String>,
}

fn parse_piece(raw: &str) -> Result<PieceSpec> {
    let mut parts = raw.splitn(3, ':');
    let size = parts.next().unwrap_or_default();
    let (length, quantity) = size
        .split_once(['x', 'X'])
        .with_context(|| format!("Peça inválida '{}': use COMPRIMENTOxQTD", raw))?;

    let service = match parts.next() {
        Some(name) => ServiceType::from_str_opt(name.trim())
            .with_context(|| format!("Serviço desconhecido: {}", name))?,
        None => ServiceType::SemServico,
    };
    Ok(PieceSpec {
        length: parse_input(length),
        quantity: parse_input(quantity),
        service,
        details: parts.next().map(str::to_string),
    })
}

async fn build_configurator(config: &AppConfig, args: &QuoteArgs) -> Result<(Configurator, Option<String>)> {
    let defaults = config.pricing.product_defaults();
    let (mut product_config, variant_id) = match &args.handle {
        Some(handle) => {
            let product = storefront(config)?.product_by_handle(handle).await?;
            let variant_id = product.variant_id().map(str::to_string);
            (product.product_config(&defaults), variant_id)
        }
        None => (defaults, None),
    };
    if let Some(price) = args.price_per_meter {
        product_config.price_per_meter = price;
    }

    let mut configurator = Configurator::new(product_config);
    for (index, raw) in args.pieces.iter().enumerate() {
        let spec = parse_piece(raw)?;
        let id = match index {
            0 => configurator.pieces()[0].id,
            _ => configurator.add_piece(),
        };

        for check in [
            configurator.update_length(id, spec.length)?,
            configurator.update_quantity(id, spec.quantity)?,
        ] {
            if let Some(error) = check.error {
                bail!("Peça #{}: {}", index + 1, error);
            }
        }
        configurator.set_service(id, spec.service)?;
        if let Some(text) = spec.details {
            configurator.set_details(
                id,
                ServiceDetails {
                    text: Some(text),
                    ..Default::default()
                },
            )?;
        }
    }
    Ok((configurator, variant_id))
}

async fn quote(config: &AppConfig, args: QuoteArgs) -> Result<()> {
    let (configurator, _) = build_configurator(config, &args).await?;
    println!("{}", configurator.config().name);
    for (index, piece) in configurator.pieces().iter().enumerate() {
        println!(
            "Peça #{:<3} {:>5} mm x {:<4} {:<45} {:>14}",
            index + 1,
            piece.length_mm,
            piece.quantity,
            piece.service.label(),
            format_currency(piece.total_price)
        );
    }
    let summary = configurator.summary();
    println!(
        "Total: {:.3} m  {}",
        summary.total_meters,
        format_currency(summary.total_value)
    );
    if let Err(e) = configurator.validate() {
        warn!("⚠️ {}", e);
    }
    Ok(())
}

async fn checkout(config: &AppConfig, args: QuoteArgs) -> Result<()> {
    if args.handle.is_none() {
        bail!("Informe o produto com --handle para finalizar a compra");
    }
    let (configurator, variant_id) = build_configurator(config, &args).await?;
    let items = configurator.to_cart_items(variant_id.as_deref())?;

    let mut cart = CartStore::load(open_store(config)?)?;
    info!("🛒 {} item(s) to check out", cart.items().len() + items.len());

    let url = match cart.checkout_items(items, &storefront(config)?).await {
        Ok(url) => url,
        Err(CartError::Unsaved { url, source }) => {
            warn!("⚠️ Checkout created but the local cart was not saved: {}", source);
            url
        }
        Err(e) => return Err(e.into()),
    };
    println!("{}", url);
    Ok(())
}

async fn admin(config: &AppConfig, command: AdminCommand) -> Result<()> {
    if let AdminCommand::Hash { secret } = &command {
        println!("{}", hash_secret(secret));
        return Ok(());
    }

    let store = open_store(config)?;
    let auth = AdminAuth::new(config.admin.clone(), store.clone());
    match command {
        AdminCommand::Hash { .. } => Ok(()),
        AdminCommand::Login {
            email,
            password,
            secret,
        } => {
            let session = match (email, password, secret) {
                (Some(email), Some(password), _) => auth.login(&email, &password)?,
                (None, _, Some(secret)) => auth.login_with_secret(&secret)?,
                _ => bail!("Informe --email e --password, ou --secret"),
            };
            info!("🔑 Sessão válida até {}", session.expires_at);
            Ok(())
        }
        AdminCommand::Logout => {
            auth.logout()?;
            info!("👋 Sessão encerrada");
            Ok(())
        }
        AdminCommand::Whoami => {
            match auth.whoami()? {
                Some(user) => println!("{}", user.email),
                None => println!("Não autenticado"),
            }
            Ok(())
        }
        AdminCommand::Products => {
            require_admin(config, &store)?;
            let mut service = ProductConfigService::new(admin_client(config)?, config.pricing.product_defaults());
            for product in service.load_products().await? {
                println!(
                    "{:<45} {:<10} {:>12}  {}",
                    product.title,
                    product.status.as_deref().unwrap_or("-"),
                    product.variant_price.as_deref().unwrap_or("-"),
                    product.id
                );
            }
            Ok(())
        }
        AdminCommand::Config { command } => {
            require_admin(config, &store)?;
            product_config(config, command).await
        }
        AdminCommand::Collections {
            product_id,
            collection_ids,
        } => {
            require_admin(config, &store)?;
            let (added, removed) = admin_client(config)?
                .set_product_collections(&product_id, &collection_ids)
                .await?;
            info!("📚 Collections updated: +{} -{}", added.len(), removed.len());
            Ok(())
        }
    }
}

async fn product_config(config: &AppConfig, command: ConfigCommand) -> Result<()> {
    let mut service = ProductConfigService::new(admin_client(config)?, config.pricing.product_defaults());
    match command {
        ConfigCommand::Show { product_id } => {
            let product_config = service.select_product(&product_id).await?;
            println!("{}", serde_json::to_string_pretty(product_config)?);
        }
        ConfigCommand::Save {
            product_id,
            name,
            price_per_meter,
            min_length,
            max_length,
            surcharges,
        } => {
            if let Some(id) = &product_id {
                service.select_product(id).await?;
            }
            let mut edited = service.config().clone();
            if let Some(name) = name {
                edited.name = name;
            }
            if let Some(price) = price_per_meter {
                edited.price_per_meter = price;
            }
            if let Some(min) = min_length {
                edited.min_length_mm = min;
            }
            if let Some(max) = max_length {
                edited.max_length_mm = max;
            }
            if edited.min_length_mm < 1 || edited.min_length_mm > edited.max_length_mm {
                bail!(
                    "Limites de comprimento inválidos: {} a {} mm",
                    edited.min_length_mm,
                    edited.max_length_mm
                );
            }
            for raw in surcharges {
                let (name, amount) = raw
                    .split_once('=')
                    .with_context(|| format!("Sobretaxa inválida '{}': use servico=valor", raw))?;
                let service_type = ServiceType::from_str_opt(name.trim())
                    .with_context(|| format!("Serviço desconhecido: {}", name))?;
                let amount = parse_input(amount);
                if !amount.is_finite() || amount < 0.0 {
                    bail!("Sobretaxa inválida para {}", service_type.as_str());
                }
                edited.service_surcharges.insert(service_type.as_str().to_string(), amount);
            }
            service.set_config(edited);

            match product_id {
                Some(_) => service.save_config().await?,
                None => {
                    let created = service.create_product().await?;
                    println!("{}", created.id);
                }
            }
            info!("💾 Configuração salva");
        }
    }
    Ok(())
}

async fn import(config: &AppConfig, file: &Path, mapping: Option<&Path>, dry_run: bool) -> Result<()> {
    let is_csv = file
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);
    if !is_csv {
        bail!("Por favor, selecione um arquivo CSV válido.");
    }

    let text = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let products = parse_csv(&text)?;
    let mapping = match mapping {
        Some(path) => parse_category_mapping(
            &tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?,
        ),
        None => Default::default(),
    };
    info!("📋 {} produto(s) encontrados em {}", products.len(), file.display());

    if dry_run {
        for product in products.iter().take(PREVIEW_ROWS) {
            println!(
                "{:<12} {:<40} {:>10}  {}",
                product.code, product.description, product.price, product.category
            );
        }
        return Ok(());
    }

    require_admin(config, &open_store(config)?)?;
    let importer = Importer::new(
        admin_client(config)?,
        Duration::from_millis(config.import.row_delay_ms),
    )
    .with_category_mapping(mapping);
    let report = importer.run(&products).await;

    println!("Importados: {}  Falhas: {}", report.success, report.failed);
    for error in &report.errors {
        println!("  linha {}: {} - {}", error.row, error.product, error.error);
    }
    Ok(())
}

async fn media(config: &AppConfig, command: MediaCommand) -> Result<()> {
    require_admin(config, &open_store(config)?)?;
    let admin = admin_client(config)?;
    match command {
        MediaCommand::List { handle } => {
            let gallery = MediaGallery::from_product_media(admin.product_media_by_handle(&handle).await?);
            println!("{} ({})", gallery.title, gallery.product_id);
            for item in gallery.items() {
                println!(
                    "{:>3}. {}  {}",
                    item.position,
                    item.id,
                    item.alt.as_deref().unwrap_or("")
                );
            }
        }
        MediaCommand::Upload { handle, files } => {
            let product = admin.product_media_by_handle(&handle).await?;
            let mut uploads = Vec::with_capacity(files.len());
            for path in &files {
                uploads.push(
                    UploadFile::from_path(path)
                        .await
                        .with_context(|| format!("Failed to read {}", path.display()))?,
                );
            }

            let statuses = match upload_all(&admin, &product.product_id, uploads).await {
                Ok(statuses) => statuses,
                Err(messages) => bail!(messages.join("\n")),
            };
            for status in &statuses {
                match &status.state {
                    prado_store::shopify::UploadState::Error { message } => {
                        println!("✗ {}: {}", status.file_name, message)
                    }
                    _ => println!(
                        "✓ {} {}",
                        status.file_name,
                        status.media_id.as_deref().unwrap_or("")
                    ),
                }
            }
            let failed = statuses.iter().filter(|s| !s.is_done()).count();
            if failed > 0 {
                warn!("{} de {} upload(s) falharam", failed, statuses.len());
            }
        }
        MediaCommand::Edit {
            handle,
            captions,
            up,
            down,
            delete,
        } => {
            let mut gallery = MediaGallery::from_product_media(admin.product_media_by_handle(&handle).await?);
            for raw in captions {
                let (id, alt) = raw
                    .split_once('=')
                    .with_context(|| format!("Legenda inválida '{}': use id=texto", raw))?;
                if !gallery.set_caption(id, alt) {
                    warn!("Imagem não encontrada: {}", id);
                }
            }
            for id in up {
                let moved = position_of(&gallery, &id).map(|i| gallery.move_up(i)).unwrap_or(false);
                if !moved {
                    warn!("Não foi possível mover {}", id);
                }
            }
            for id in down {
                let moved = position_of(&gallery, &id).map(|i| gallery.move_down(i)).unwrap_or(false);
                if !moved {
                    warn!("Não foi possível mover {}", id);
                }
            }
            for id in delete {
                if !gallery.delete(&id) {
                    warn!("Imagem não encontrada: {}", id);
                }
            }
            gallery.sync(&admin).await?;
            info!("🖼️ Galeria atualizada ({} imagens)", gallery.items().len());
        }
    }
    Ok(())
}

fn position_of(gallery: &MediaGallery, id: &str) -> Option<usize> {
    gallery.items().iter().position(|item| item.id == id)
}

fn settings(config: &AppConfig, command: SettingsCommand) -> Result<()> {
    let store = open_store(config)?;
    match command {
        SettingsCommand::Show => {
            let settings = AdminSettings::load(&store)?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        SettingsCommand::Set { key, value } => {
            require_admin(config, &store)?;
            let mut fields = serde_json::to_value(AdminSettings::load(&store)?)?;
            let slot = fields
                .get_mut(&key)
                .with_context(|| format!("Configuração desconhecida: {}", key))?;
            *slot = if slot.is_boolean() {
                let flag: bool = value
                    .parse()
                    .with_context(|| format!("{} espera true ou false", key))?;
                serde_json::Value::Bool(flag)
            } else {
                serde_json::Value::String(value)
            };
            let settings: AdminSettings = serde_json::from_value(fields)?;
            settings.save(&store)?;
        }
        SettingsCommand::Reset => {
            require_admin(config, &store)?;
            AdminSettings::default().save(&store)?;
            info!("⚙️ Configurações restauradas");
        }
    }
    Ok(())
}
