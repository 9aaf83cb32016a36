//! Common types used throughout the storefront
//!
//! Wire names follow the JSON the storefront already stores in Shopify
//! metafields (camelCase Portuguese), so configs written by older builds
//! still deserialize.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Shortest piece the shop cuts, in millimetres
pub const MIN_LENGTH_MM: u32 = 1;

/// Longest piece the shop cuts, in millimetres
pub const MAX_LENGTH_MM: u32 = 3000;

/// Measuring tolerance at the input field (± mm)
pub const FIELD_TOLERANCE_MM: u32 = 1;

/// Worst-case tolerance after the saw cut (± mm)
pub const CUT_TOLERANCE_MM: u32 = 3;

/// Price per metre used when a product has no stored configuration
pub const DEFAULT_PRICE_PER_METER: f64 = 99.0;

/// Admin session lifetime
pub const ADMIN_SESSION_DURATION_HOURS: i64 = 8;

/// Largest image accepted by the media uploader (10 MiB)
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// MIME types accepted by the media uploader
pub const ALLOWED_IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

/// Metafield namespace holding the configurator settings of a product
pub const CONFIG_METAFIELD_NAMESPACE: &str = "configurador";

/// Metafield key holding the configurator settings of a product
pub const CONFIG_METAFIELD_KEY: &str = "perfil_config";

/// Machining service applied to a cut piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    SemServico,
    FuroChaveAllenPadrao,
    Rosca,
    CorteAngulo,
    FuroChaveAllenXmmVertical,
    FuroChaveAllenXmmHorizontal,
    FuroConexaoRosca,
    FuroConexaoCapaFechamento,
}

impl ServiceType {
    /// Every service, in the order the configurator lists them
    pub const ALL: [ServiceType; 8] = [
        ServiceType::SemServico,
        ServiceType::FuroChaveAllenPadrao,
        ServiceType::Rosca,
        ServiceType::CorteAngulo,
        ServiceType::FuroChaveAllenXmmVertical,
        ServiceType::FuroChaveAllenXmmHorizontal,
        ServiceType::FuroConexaoRosca,
        ServiceType::FuroConexaoCapaFechamento,
    ];

    /// Stable identifier used on the wire and as surcharge key
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::SemServico => "sem_servico",
            ServiceType::FuroChaveAllenPadrao => "furo_chave_allen_padrao",
            ServiceType::Rosca => "rosca",
            ServiceType::CorteAngulo => "corte_angulo",
            ServiceType::FuroChaveAllenXmmVertical => "furo_chave_allen_xmm_vertical",
            ServiceType::FuroChaveAllenXmmHorizontal => "furo_chave_allen_xmm_horizontal",
            ServiceType::FuroConexaoRosca => "furo_conexao_rosca",
            ServiceType::FuroConexaoCapaFechamento => "furo_conexao_capa_fechamento",
        }
    }

    /// Customer-facing label
    pub fn label(&self) -> &'static str {
        match self {
            ServiceType::SemServico => "Sem serviço",
            ServiceType::FuroChaveAllenPadrao => {
                "Furo p/ passagem de chave allen p/ montagem padrão"
            }
            ServiceType::Rosca => "Rosca",
            ServiceType::CorteAngulo => "Corte em ângulo",
            ServiceType::FuroChaveAllenXmmVertical => {
                "Furo p/ passagem de chave allen a X mm da face - Vertical"
            }
            ServiceType::FuroChaveAllenXmmHorizontal => {
                "Furo p/ passagem de chave allen a X mm da face - Horizontal"
            }
            ServiceType::FuroConexaoRosca => "Furo p/ Conexão + Rosca",
            ServiceType::FuroConexaoCapaFechamento => "Furo p/ Conexão + Capa de Fechamento",
        }
    }

    pub fn from_str_opt(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }

    /// Services that need a distance from the face plus the face itself
    pub fn needs_face_distance(&self) -> bool {
        matches!(
            self,
            ServiceType::FuroChaveAllenXmmVertical | ServiceType::FuroChaveAllenXmmHorizontal
        )
    }

    /// Services that need a thread size
    pub fn needs_thread(&self) -> bool {
        matches!(self, ServiceType::Rosca | ServiceType::FuroConexaoRosca)
    }
}

impl Default for ServiceType {
    fn default() -> Self {
        ServiceType::SemServico
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Profile face a hole is measured from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileFace {
    FaceSuperior,
    FaceInferior,
    FaceLateralEsquerda,
    FaceLateralDireita,
}

impl ProfileFace {
    pub fn label(&self) -> &'static str {
        match self {
            ProfileFace::FaceSuperior => "Face Superior",
            ProfileFace::FaceInferior => "Face Inferior",
            ProfileFace::FaceLateralEsquerda => "Face Lateral Esquerda",
            ProfileFace::FaceLateralDireita => "Face Lateral Direita",
        }
    }
}

/// Metric thread compatible with the 6 mm slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThreadSize {
    M3,
    M4,
    M5,
    M6,
    M8,
}

impl ThreadSize {
    /// Label including the tap drill diameter
    pub fn label(&self) -> &'static str {
        match self {
            ThreadSize::M3 => "M3 (Ø2,5mm)",
            ThreadSize::M4 => "M4 (Ø3,3mm)",
            ThreadSize::M5 => "M5 (Ø4,6mm)",
            ThreadSize::M6 => "M6 (Ø5,0mm)",
            ThreadSize::M8 => "M8 (Ø6,8mm)",
        }
    }
}

/// Which end of the profile an angled cut applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CutEnd {
    Inicio,
    Fim,
    Ambas,
}

impl CutEnd {
    pub fn label(&self) -> &'static str {
        match self {
            CutEnd::Inicio => "Início do perfil",
            CutEnd::Fim => "Fim do perfil",
            CutEnd::Ambas => "Ambas as extremidades",
        }
    }
}

/// Free text and structured fields describing a machining service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDetails {
    #[serde(rename = "tipoDetalhe", default, skip_serializing_if = "Option::is_none")]
    pub detail_type: Option<String>,

    #[serde(rename = "textoDetalhes", default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(rename = "distanciaXMm", default, skip_serializing_if = "Option::is_none")]
    pub distance_x_mm: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face: Option<ProfileFace>,

    #[serde(rename = "tipoRosca", default, skip_serializing_if = "Option::is_none")]
    pub thread: Option<ThreadSize>,

    #[serde(rename = "profundidade", default, skip_serializing_if = "Option::is_none")]
    pub depth_mm: Option<u32>,

    #[serde(rename = "angulo", default, skip_serializing_if = "Option::is_none")]
    pub angle_deg: Option<u32>,

    #[serde(rename = "extremidade", default, skip_serializing_if = "Option::is_none")]
    pub end: Option<CutEnd>,
}

impl ServiceDetails {
    /// Trimmed free text, if any was typed
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    /// Human readable description of the structured fields, for cart attributes
    pub fn describe(&self) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(distance) = self.distance_x_mm {
            parts.push(format!("{} mm da face", distance));
        }
        if let Some(face) = self.face {
            parts.push(face.label().to_string());
        }
        if let Some(thread) = self.thread {
            parts.push(format!("Rosca {}", thread.label()));
        }
        if let Some(depth) = self.depth_mm {
            parts.push(format!("Profundidade {} mm", depth));
        }
        if let Some(angle) = self.angle_deg {
            parts.push(format!("{}°", angle));
        }
        if let Some(end) = self.end {
            parts.push(end.label().to_string());
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

/// One configured line of a cut-to-order quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Piece {
    pub id: Uuid,
    pub length_mm: u32,
    pub quantity: u32,
    pub service: ServiceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_details: Option<ServiceDetails>,
    pub price_per_meter: f64,
    pub total_price: f64,
}

/// Length and quantity of a piece, the inputs of the order summary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceDimensions {
    pub length_mm: u32,
    pub quantity: u32,
}

impl PieceDimensions {
    pub fn new(length_mm: u32, quantity: u32) -> Self {
        Self { length_mm, quantity }
    }
}

impl Piece {
    pub fn dimensions(&self) -> PieceDimensions {
        PieceDimensions::new(self.length_mm, self.quantity)
    }
}

/// Configurator settings for one product, stored as a JSON metafield
///
/// Missing fields fall back to [`ProductConfig::default`], which is how a
/// stored config is merged over the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(rename = "nome")]
    pub name: String,

    #[serde(rename = "precoPorMetro")]
    pub price_per_meter: f64,

    #[serde(rename = "pesoPorMetroKg", skip_serializing_if = "Option::is_none")]
    pub weight_per_meter_kg: Option<f64>,

    #[serde(rename = "minComprimentoMm")]
    pub min_length_mm: u32,

    #[serde(rename = "maxComprimentoMm")]
    pub max_length_mm: u32,

    #[serde(rename = "comprimentoBarraMm")]
    pub bar_length_mm: u32,

    #[serde(rename = "toleranciaCorte")]
    pub cut_tolerance: String,

    #[serde(rename = "descricaoTecnica", skip_serializing_if = "Option::is_none")]
    pub technical_description: Option<String>,

    #[serde(rename = "servicosPermitidos")]
    pub allowed_services: Vec<ServiceType>,

    /// Additive cost per piece, keyed by service wire name
    #[serde(rename = "sobretaxasServico")]
    pub service_surcharges: BTreeMap<String, f64>,
}

impl Default for ProductConfig {
    fn default() -> Self {
        Self {
            id: None,
            name: "Perfil Estrutural em Alumínio 20x40 V-Slot Preto - Canal 6".to_string(),
            price_per_meter: DEFAULT_PRICE_PER_METER,
            weight_per_meter_kg: None,
            min_length_mm: MIN_LENGTH_MM,
            max_length_mm: MAX_LENGTH_MM,
            bar_length_mm: MAX_LENGTH_MM,
            cut_tolerance: format!(
                "Tolerância: ±{} mm (até ±{} mm após corte)",
                FIELD_TOLERANCE_MM, CUT_TOLERANCE_MM
            ),
            technical_description: None,
            allowed_services: ServiceType::ALL.to_vec(),
            service_surcharges: BTreeMap::new(),
        }
    }
}

impl ProductConfig {
    /// Surcharge for a service, zero when none is configured
    pub fn surcharge(&self, service: ServiceType) -> f64 {
        self.service_surcharges
            .get(service.as_str())
            .copied()
            .unwrap_or(0.0)
    }

    pub fn allows(&self, service: ServiceType) -> bool {
        self.allowed_services.contains(&service)
    }
}

/// Key/value attribute attached to a cart line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartAttribute {
    pub key: String,
    pub value: String,
}

impl CartAttribute {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Line item waiting in the cart until checkout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub variant_id: String,
    pub quantity: u32,
    #[serde(default)]
    pub attributes: Vec<CartAttribute>,
}

/// Product lifecycle status on the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    Active,
    Draft,
    Archived,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Active => "ACTIVE",
            ProductStatus::Draft => "DRAFT",
            ProductStatus::Archived => "ARCHIVED",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProductStatus::Active => "Ativo",
            ProductStatus::Draft => "Rascunho",
            ProductStatus::Archived => "Arquivado",
        }
    }
}

impl Default for ProductStatus {
    fn default() -> Self {
        ProductStatus::Active
    }
}
