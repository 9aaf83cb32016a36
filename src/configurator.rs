//! Cut-to-order configurator: the editable list of pieces for one product

use uuid::Uuid;

use crate::pricing::{
    compute_piece_total, summarize_lines, validate_length, validate_quantity, OrderSummary,
    Validation,
};
use crate::types::{CartAttribute, CartItem, Piece, ProductConfig, ServiceDetails, ServiceType};

/// Largest angle accepted for an angled cut, in degrees
pub const MAX_CUT_ANGLE_DEG: u32 = 89;

/// Check that a service has the details the workshop needs
///
/// Free text always satisfies the requirement; otherwise the structured
/// fields of the service must be filled in.
pub fn validate_service_details(service: ServiceType, details: Option<&ServiceDetails>) -> Validation {
    if service == ServiceType::SemServico {
        return Validation::ok();
    }

    let details = match details {
        Some(d) => d,
        None => return Validation::invalid("Por favor, preencha os detalhes do serviço"),
    };
    if details.text().is_some() {
        return Validation::ok();
    }

    if service.needs_face_distance() {
        if details.distance_x_mm.is_none() {
            return Validation::invalid("Informe a distância da face em mm");
        }
        if details.face.is_none() {
            return Validation::invalid("Selecione a face do perfil");
        }
        return Validation::ok();
    }

    if service.needs_thread() {
        if details.thread.is_none() {
            return Validation::invalid("Selecione o tipo de rosca");
        }
        return Validation::ok();
    }

    if service == ServiceType::CorteAngulo {
        match details.angle_deg {
            Some(angle) if (1..=MAX_CUT_ANGLE_DEG).contains(&angle) => {}
            _ => return Validation::invalid("O ângulo deve estar entre 1° e 89°"),
        }
        if details.end.is_none() {
            return Validation::invalid("Selecione a extremidade do corte");
        }
        return Validation::ok();
    }

    Validation::invalid("Por favor, preencha os detalhes do serviço")
}

/// Errors raised while turning the configured pieces into cart lines
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfiguratorError {
    #[error("Peça #{index}: {message}")]
    InvalidPiece { index: usize, message: String },

    #[error("Peça {0} não encontrada")]
    UnknownPiece(Uuid),

    #[error("Serviço '{0}' não está disponível para este produto")]
    ServiceNotAllowed(String),

    #[error("Nenhum produto selecionado para o pedido")]
    MissingVariant,
}

/// In-memory list of pieces priced against one product configuration
#[derive(Debug, Clone)]
pub struct Configurator {
    config: ProductConfig,
    pieces: Vec<Piece>,
}

impl Configurator {
    /// Start with a single default piece
    pub fn new(config: ProductConfig) -> Self {
        let mut configurator = Self {
            config,
            pieces: Vec::new(),
        };
        configurator.add_piece();
        configurator
    }

    pub fn config(&self) -> &ProductConfig {
        &self.config
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    fn price_piece(&self, piece: &mut Piece) {
        piece.price_per_meter = self.config.price_per_meter;
        piece.total_price = compute_piece_total(
            piece.length_mm,
            piece.quantity,
            piece.price_per_meter,
            self.config.surcharge(piece.service),
        );
    }

    fn piece_mut(&mut self, id: Uuid) -> Result<&mut Piece, ConfiguratorError> {
        self.pieces
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(ConfiguratorError::UnknownPiece(id))
    }

    /// Append a piece at the minimum length, quantity one, no service
    pub fn add_piece(&mut self) -> Uuid {
        let mut piece = Piece {
            id: Uuid::new_v4(),
            length_mm: self.config.min_length_mm,
            quantity: 1,
            service: ServiceType::SemServico,
            service_details: None,
            price_per_meter: self.config.price_per_meter,
            total_price: 0.0,
        };
        self.price_piece(&mut piece);
        let id = piece.id;
        self.pieces.push(piece);
        id
    }

    /// Remove a piece; the last remaining piece is kept
    pub fn remove_piece(&mut self, id: Uuid) -> bool {
        if self.pieces.len() <= 1 {
            return false;
        }
        let before = self.pieces.len();
        self.pieces.retain(|p| p.id != id);
        self.pieces.len() != before
    }

    /// Set the length of a piece from raw input
    ///
    /// Invalid input leaves the piece untouched and returns the failed
    /// validation.
    pub fn update_length(&mut self, id: Uuid, length: f64) -> Result<Validation, ConfiguratorError> {
        let validation = validate_length(
            length,
            Some(self.config.min_length_mm),
            Some(self.config.max_length_mm),
        );
        if !validation.valid {
            return Ok(validation);
        }

        let mut piece = self.piece_mut(id)?.clone();
        piece.length_mm = length as u32;
        self.price_piece(&mut piece);
        *self.piece_mut(id)? = piece;
        Ok(validation)
    }

    /// Set the quantity of a piece from raw input
    pub fn update_quantity(&mut self, id: Uuid, quantity: f64) -> Result<Validation, ConfiguratorError> {
        let validation = validate_quantity(quantity);
        if !validation.valid {
            return Ok(validation);
        }

        let mut piece = self.piece_mut(id)?.clone();
        piece.quantity = quantity as u32;
        self.price_piece(&mut piece);
        *self.piece_mut(id)? = piece;
        Ok(validation)
    }

    /// Change the service of a piece; previous details are discarded
    pub fn set_service(&mut self, id: Uuid, service: ServiceType) -> Result<(), ConfiguratorError> {
        if !self.config.allows(service) {
            return Err(ConfiguratorError::ServiceNotAllowed(service.as_str().to_string()));
        }
        let mut piece = self.piece_mut(id)?.clone();
        piece.service = service;
        piece.service_details = None;
        self.price_piece(&mut piece);
        *self.piece_mut(id)? = piece;
        Ok(())
    }

    pub fn set_details(&mut self, id: Uuid, details: ServiceDetails) -> Result<(), ConfiguratorError> {
        self.piece_mut(id)?.service_details = Some(details);
        Ok(())
    }

    /// Replace the product configuration and reprice every piece
    pub fn apply_config(&mut self, config: ProductConfig) {
        self.config = config;
        let mut pieces = std::mem::take(&mut self.pieces);
        for piece in &mut pieces {
            self.price_piece(piece);
        }
        self.pieces = pieces;
    }

    /// Metres and value of all pieces, surcharges included
    pub fn summary(&self) -> OrderSummary {
        summarize_lines(self.pieces.iter().map(|p| (p.dimensions(), p.total_price)))
    }

    /// First piece whose service details are incomplete
    pub fn validate(&self) -> Result<(), ConfiguratorError> {
        for (i, piece) in self.pieces.iter().enumerate() {
            let check = validate_service_details(piece.service, piece.service_details.as_ref());
            if let Some(message) = check.error {
                return Err(ConfiguratorError::InvalidPiece {
                    index: i + 1,
                    message,
                });
            }
        }
        Ok(())
    }

    /// One cart line per piece, described through line attributes
    pub fn to_cart_items(&self, variant_id: Option<&str>) -> Result<Vec<CartItem>, ConfiguratorError> {
        let variant_id = variant_id
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfiguratorError::MissingVariant)?;
        self.validate()?;

        Ok(self
            .pieces
            .iter()
            .enumerate()
            .map(|(i, piece)| CartItem {
                variant_id: variant_id.to_string(),
                quantity: 1,
                attributes: piece_attributes(i + 1, piece),
            })
            .collect())
    }
}

fn piece_attributes(index: usize, piece: &Piece) -> Vec<CartAttribute> {
    let prefix = format!("Peça #{}", index);
    let mut attributes = vec![
        CartAttribute::new(format!("{} - Comprimento", prefix), format!("{} mm", piece.length_mm)),
        CartAttribute::new(format!("{} - Quantidade", prefix), piece.quantity.to_string()),
        CartAttribute::new(format!("{} - Serviço", prefix), piece.service.label()),
    ];

    if let Some(details) = &piece.service_details {
        if let Some(kind) = details.detail_type.as_deref().filter(|k| !k.trim().is_empty()) {
            attributes.push(CartAttribute::new(format!("{} - Tipo", prefix), kind));
        }
        let described = match (details.text(), details.describe()) {
            (Some(text), Some(fields)) => Some(format!("{} ({})", text, fields)),
            (Some(text), None) => Some(text.to_string()),
            (None, fields) => fields,
        };
        if let Some(value) = described {
            attributes.push(CartAttribute::new(format!("{} - Detalhes", prefix), value));
        }
    }
    attributes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CutEnd, ProfileFace, ThreadSize};

    fn configurator() -> Configurator {
        Configurator::new(ProductConfig::default())
    }

    #[test]
    fn test_new_has_one_default_piece() {
        let c = configurator();
        assert_eq!(c.pieces().len(), 1);
        let piece = &c.pieces()[0];
        assert_eq!(piece.length_mm, 1);
        assert_eq!(piece.quantity, 1);
        assert_eq!(piece.service, ServiceType::SemServico);
        assert_eq!(piece.total_price, 0.1);
    }

    #[test]
    fn test_update_length_reprices() {
        let mut c = configurator();
        let id = c.pieces()[0].id;
        let result = c.update_length(id, 1000.0).unwrap();
        assert!(result.valid);
        assert_eq!(c.pieces()[0].total_price, 99.0);
    }

    #[test]
    fn test_invalid_length_keeps_piece() {
        let mut c = configurator();
        let id = c.pieces()[0].id;
        c.update_length(id, 500.0).unwrap();

        let result = c.update_length(id, 3001.0).unwrap();
        assert!(!result.valid);
        assert_eq!(c.pieces()[0].length_mm, 500);
        assert_eq!(c.pieces()[0].total_price, 49.5);
    }

    #[test]
    fn test_fractional_quantity_rejected() {
        let mut c = configurator();
        let id = c.pieces()[0].id;
        assert!(!c.update_quantity(id, 2.5).unwrap().valid);
        assert_eq!(c.pieces()[0].quantity, 1);
        assert!(c.update_quantity(id, 3.0).unwrap().valid);
        assert_eq!(c.pieces()[0].quantity, 3);
    }

    #[test]
    fn test_oversized_quantity_rejected() {
        let mut c = configurator();
        let id = c.pieces()[0].id;
        let before = c.pieces()[0].clone();
        let validation = c.update_quantity(id, 5e9).unwrap();
        assert!(!validation.valid);
        assert_eq!(c.pieces()[0], before);
    }

    #[test]
    fn test_last_piece_cannot_be_removed() {
        let mut c = configurator();
        let first = c.pieces()[0].id;
        assert!(!c.remove_piece(first));

        let second = c.add_piece();
        assert!(c.remove_piece(first));
        assert_eq!(c.pieces().len(), 1);
        assert_eq!(c.pieces()[0].id, second);
    }

    #[test]
    fn test_unknown_piece_is_an_error() {
        let mut c = configurator();
        let err = c.update_length(Uuid::new_v4(), 10.0).unwrap_err();
        assert!(matches!(err, ConfiguratorError::UnknownPiece(_)));
    }

    #[test]
    fn test_apply_config_reprices_with_surcharge() {
        let mut c = configurator();
        let id = c.pieces()[0].id;
        c.update_length(id, 1000.0).unwrap();
        c.set_service(id, ServiceType::Rosca).unwrap();

        let mut config = ProductConfig::default();
        config.price_per_meter = 120.0;
        config
            .service_surcharges
            .insert(ServiceType::Rosca.as_str().to_string(), 5.0);
        c.apply_config(config);

        assert_eq!(c.pieces()[0].price_per_meter, 120.0);
        assert_eq!(c.pieces()[0].total_price, 125.0);
    }

    #[test]
    fn test_disallowed_service_rejected() {
        let mut config = ProductConfig::default();
        config.allowed_services = vec![ServiceType::SemServico];
        let mut c = Configurator::new(config);
        let id = c.pieces()[0].id;
        assert!(matches!(
            c.set_service(id, ServiceType::Rosca),
            Err(ConfiguratorError::ServiceNotAllowed(_))
        ));
    }

    #[test]
    fn test_summary_uses_line_totals() {
        let mut c = configurator();
        let first = c.pieces()[0].id;
        c.update_length(first, 1000.0).unwrap();
        c.update_quantity(first, 2.0).unwrap();
        let second = c.add_piece();
        c.update_length(second, 500.0).unwrap();

        let summary = c.summary();
        assert_eq!(summary.total_meters, 2.5);
        assert_eq!(summary.total_value, 247.5);
    }

    #[test]
    fn test_service_details_requirements() {
        assert!(validate_service_details(ServiceType::SemServico, None).valid);
        assert!(!validate_service_details(ServiceType::FuroChaveAllenPadrao, None).valid);

        let face_only = ServiceDetails {
            face: Some(ProfileFace::FaceSuperior),
            ..Default::default()
        };
        assert!(!validate_service_details(ServiceType::FuroChaveAllenXmmVertical, Some(&face_only)).valid);

        let complete = ServiceDetails {
            face: Some(ProfileFace::FaceSuperior),
            distance_x_mm: Some(20),
            ..Default::default()
        };
        assert!(validate_service_details(ServiceType::FuroChaveAllenXmmVertical, Some(&complete)).valid);

        let thread = ServiceDetails {
            thread: Some(ThreadSize::M6),
            ..Default::default()
        };
        assert!(validate_service_details(ServiceType::Rosca, Some(&thread)).valid);

        let bad_angle = ServiceDetails {
            angle_deg: Some(90),
            end: Some(CutEnd::Fim),
            ..Default::default()
        };
        assert!(!validate_service_details(ServiceType::CorteAngulo, Some(&bad_angle)).valid);

        let text = ServiceDetails {
            text: Some("  ver desenho ".to_string()),
            ..Default::default()
        };
        assert!(validate_service_details(ServiceType::CorteAngulo, Some(&text)).valid);

        let blank = ServiceDetails {
            text: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(!validate_service_details(ServiceType::FuroConexaoCapaFechamento, Some(&blank)).valid);
    }

    #[test]
    fn test_cart_items_carry_attributes() {
        let mut c = configurator();
        let id = c.pieces()[0].id;
        c.update_length(id, 1200.0).unwrap();
        c.update_quantity(id, 4.0).unwrap();
        c.set_service(id, ServiceType::Rosca).unwrap();
        c.set_details(
            id,
            ServiceDetails {
                detail_type: Some("Furo em uma extremidade".to_string()),
                thread: Some(ThreadSize::M5),
                ..Default::default()
            },
        )
        .unwrap();

        let items = c.to_cart_items(Some("gid://shopify/ProductVariant/42")).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 1);

        let attrs = &items[0].attributes;
        assert_eq!(attrs[0], CartAttribute::new("Peça #1 - Comprimento", "1200 mm"));
        assert_eq!(attrs[1], CartAttribute::new("Peça #1 - Quantidade", "4"));
        assert_eq!(attrs[2], CartAttribute::new("Peça #1 - Serviço", "Rosca"));
        assert_eq!(attrs[3], CartAttribute::new("Peça #1 - Tipo", "Furo em uma extremidade"));
        assert_eq!(attrs[4].key, "Peça #1 - Detalhes");
        assert!(attrs[4].value.contains("M5"));
    }

    #[test]
    fn test_cart_items_blocked_by_missing_details() {
        let mut c = configurator();
        c.add_piece();
        let second = c.pieces()[1].id;
        c.set_service(second, ServiceType::FuroConexaoCapaFechamento).unwrap();

        let err = c.to_cart_items(Some("gid://shopify/ProductVariant/1")).unwrap_err();
        assert!(matches!(err, ConfiguratorError::InvalidPiece { index: 2, .. }));
    }

    #[test]
    fn test_cart_items_need_variant() {
        let c = configurator();
        assert_eq!(c.to_cart_items(None).unwrap_err(), ConfiguratorError::MissingVariant);
        assert_eq!(c.to_cart_items(Some(" ")).unwrap_err(), ConfiguratorError::MissingVariant);
    }
}
