//! Pricing and input validation for cut-to-order profiles
//!
//! Amounts travel as `f64` at the edges and are computed as exact decimals
//! inside, so the half-up rounding of the shop's quotes does not depend on
//! binary floating point artefacts (`1.005` rounds to `1.01`).

use bigdecimal::{BigDecimal, RoundingMode};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::types::{PieceDimensions, MAX_LENGTH_MM, MIN_LENGTH_MM};

const MM_PER_METER: u32 = 1000;

/// Decimal places of currency amounts
pub const CURRENCY_SCALE: i64 = 2;

/// Decimal places of metre totals
pub const METERS_SCALE: i64 = 3;

/// Outcome of validating one form input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validation {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Validation {
    pub fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(message.into()),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

/// Metres and value of a whole order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub total_meters: f64,
    pub total_value: f64,
}

/// Exact decimal for the shortest representation of `value`
///
/// NaN and infinities have no decimal form and count as zero.
fn to_decimal(value: f64) -> BigDecimal {
    match BigDecimal::from_str(&value.to_string()) {
        Ok(decimal) => decimal,
        Err(_) => {
            tracing::warn!(value = %value, "Non-finite amount treated as zero");
            BigDecimal::default()
        }
    }
}

fn to_f64(value: &BigDecimal) -> f64 {
    value.to_string().parse::<f64>().unwrap_or(0.0)
}

fn meters(length_mm: u32) -> BigDecimal {
    BigDecimal::from(length_mm) / BigDecimal::from(MM_PER_METER)
}

/// Round half away from zero to `scale` decimal places
pub fn round_half_up(value: f64, scale: i64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    to_f64(&to_decimal(value).with_scale_round(scale, RoundingMode::HalfUp))
}

fn unrounded_piece_total(
    length_mm: u32,
    quantity: u32,
    price_per_meter: &BigDecimal,
    service_surcharge: &BigDecimal,
) -> BigDecimal {
    let base = meters(length_mm) * price_per_meter + service_surcharge;
    base * BigDecimal::from(quantity)
}

/// Total price of one piece line
///
/// `((length_mm / 1000) * price_per_meter + service_surcharge) * quantity`,
/// rounded half-up to cents. A non-finite price or surcharge counts as zero.
pub fn compute_piece_total(
    length_mm: u32,
    quantity: u32,
    price_per_meter: f64,
    service_surcharge: f64,
) -> f64 {
    let total = unrounded_piece_total(
        length_mm,
        quantity,
        &to_decimal(price_per_meter),
        &to_decimal(service_surcharge),
    );
    to_f64(&total.with_scale_round(CURRENCY_SCALE, RoundingMode::HalfUp))
}

/// Sum metres and value of an order priced at one price per metre
///
/// Per-piece values are summed unrounded; only the totals are rounded
/// (metres to 3 places, value to cents).
pub fn compute_order_summary(pieces: &[PieceDimensions], price_per_meter: f64) -> OrderSummary {
    let price = to_decimal(price_per_meter);
    let zero = BigDecimal::from(0u32);
    let mut total_meters = BigDecimal::from(0u32);
    let mut total_value = BigDecimal::from(0u32);

    for piece in pieces {
        total_meters += meters(piece.length_mm) * BigDecimal::from(piece.quantity);
        total_value += unrounded_piece_total(piece.length_mm, piece.quantity, &price, &zero);
    }

    OrderSummary {
        total_meters: to_f64(&total_meters.with_scale_round(METERS_SCALE, RoundingMode::HalfUp)),
        total_value: to_f64(&total_value.with_scale_round(CURRENCY_SCALE, RoundingMode::HalfUp)),
    }
}

/// Sum already computed per-line totals and metres
pub(crate) fn summarize_lines(lines: impl IntoIterator<Item = (PieceDimensions, f64)>) -> OrderSummary {
    let mut total_meters = BigDecimal::from(0u32);
    let mut total_value = BigDecimal::from(0u32);
    for (dims, line_total) in lines {
        total_meters += meters(dims.length_mm) * BigDecimal::from(dims.quantity);
        total_value += to_decimal(line_total);
    }
    OrderSummary {
        total_meters: to_f64(&total_meters.with_scale_round(METERS_SCALE, RoundingMode::HalfUp)),
        total_value: to_f64(&total_value.with_scale_round(CURRENCY_SCALE, RoundingMode::HalfUp)),
    }
}

/// Check a typed length against the product bounds
///
/// Bounds default to 1 mm and 3000 mm.
pub fn validate_length(length: f64, min: Option<u32>, max: Option<u32>) -> Validation {
    let min = min.unwrap_or(MIN_LENGTH_MM);
    let max = max.unwrap_or(MAX_LENGTH_MM);

    if !length.is_finite() {
        return Validation::invalid("Por favor, insira um número válido");
    }
    if length < f64::from(min) {
        return Validation::invalid(format!("O comprimento mínimo é {} mm", min));
    }
    if length > f64::from(max) {
        return Validation::invalid(format!("O comprimento máximo é {} mm", max));
    }
    Validation::ok()
}

/// Check a typed quantity is an integer of at least one
///
/// The quantity must also fit a `u32` line quantity.
pub fn validate_quantity(quantity: f64) -> Validation {
    if !quantity.is_finite() || quantity < 1.0 || quantity.fract() != 0.0 {
        return Validation::invalid("A quantidade deve ser um número inteiro maior ou igual a 1");
    }
    if quantity > f64::from(u32::MAX) {
        return Validation::invalid(format!("A quantidade máxima é {}", u32::MAX));
    }
    Validation::ok()
}

/// Parse a form field the way a number input does; garbage becomes NaN
pub fn parse_input(raw: &str) -> f64 {
    let trimmed = raw.trim().replace(',', ".");
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// Format an amount as Brazilian reais, e.g. `R$ 1.234,56`
///
/// The separator after the symbol is a no-break space, matching what the
/// browser's pt-BR currency formatter emits. Non-finite values format as
/// zero.
pub fn format_currency(value: f64) -> String {
    let rounded = to_decimal(value).with_scale_round(CURRENCY_SCALE, RoundingMode::HalfUp);
    let text = rounded.to_string();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.as_str()),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if negative && digits.chars().any(|c| c != '0' && c != '.') {
        "-"
    } else {
        ""
    };
    format!("{}R$\u{a0}{},{:0<2}", sign, grouped, frac_part)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piece_total_one_meter() {
        assert_eq!(compute_piece_total(1000, 1, 99.0, 0.0), 99.0);
    }

    #[test]
    fn test_piece_total_half_meter_twice() {
        assert_eq!(compute_piece_total(500, 2, 99.0, 0.0), 99.0);
    }

    #[test]
    fn test_piece_total_surcharge_added_before_quantity() {
        // (0.5 * 99 + 2.5) * 3
        assert_eq!(compute_piece_total(500, 3, 99.0, 2.5), 156.0);
    }

    #[test]
    fn test_piece_total_rounds_half_up() {
        // 5 mm at 1.00/m is exactly 0.005
        assert_eq!(compute_piece_total(5, 1, 1.0, 0.0), 0.01);
        // 0.335 m at 3.00/m is exactly 1.005
        assert_eq!(compute_piece_total(335, 1, 3.0, 0.0), 1.01);
        assert_eq!(compute_piece_total(4, 1, 1.0, 0.0), 0.0);
    }

    #[test]
    fn test_non_finite_amounts_count_as_zero() {
        assert_eq!(compute_piece_total(1000, 1, f64::NAN, 0.0), 0.0);
        assert_eq!(compute_piece_total(1000, 2, 99.0, f64::INFINITY), 198.0);
    }

    #[test]
    fn test_round_half_up_helper() {
        assert_eq!(round_half_up(1.005, 2), 1.01);
        assert_eq!(round_half_up(2.0005, 3), 2.001);
        assert_eq!(round_half_up(-1.005, 2), -1.01);
        assert!(round_half_up(f64::NAN, 2).is_nan());
    }

    #[test]
    fn test_order_summary_example() {
        let pieces = [PieceDimensions::new(1000, 2), PieceDimensions::new(500, 1)];
        let summary = compute_order_summary(&pieces, 99.0);
        assert_eq!(summary.total_meters, 2.5);
        assert_eq!(summary.total_value, 247.5);
    }

    #[test]
    fn test_order_summary_empty() {
        let summary = compute_order_summary(&[], 99.0);
        assert_eq!(summary.total_meters, 0.0);
        assert_eq!(summary.total_value, 0.0);
    }

    #[test]
    fn test_order_summary_meter_rounding() {
        // 1 mm three times is 0.003 m; 1 mm once at scale 3 stays 0.001
        let summary = compute_order_summary(&[PieceDimensions::new(1, 3)], 99.0);
        assert_eq!(summary.total_meters, 0.003);
        assert_eq!(summary.total_value, 0.3);
    }

    #[test]
    fn test_validate_length_bounds() {
        assert!(!validate_length(0.0, None, None).valid);
        assert!(!validate_length(3001.0, None, None).valid);
        assert!(validate_length(1500.0, None, None).valid);
        assert!(validate_length(1.0, None, None).valid);
        assert!(validate_length(3000.0, None, None).valid);
    }

    #[test]
    fn test_validate_length_messages() {
        let below = validate_length(0.0, None, None);
        assert_eq!(below.error.as_deref(), Some("O comprimento mínimo é 1 mm"));

        let above = validate_length(700.0, Some(100), Some(600));
        assert_eq!(above.error.as_deref(), Some("O comprimento máximo é 600 mm"));

        let nan = validate_length(f64::NAN, None, None);
        assert_eq!(nan.error.as_deref(), Some("Por favor, insira um número válido"));
    }

    #[test]
    fn test_validate_quantity() {
        assert!(!validate_quantity(0.0).valid);
        assert!(!validate_quantity(2.5).valid);
        assert!(!validate_quantity(f64::NAN).valid);
        assert!(!validate_quantity(-3.0).valid);
        assert!(validate_quantity(3.0).valid);
        assert!(validate_quantity(1.0).valid);
        assert!(validate_quantity(f64::from(u32::MAX)).valid);
        assert!(!validate_quantity(f64::from(u32::MAX) + 1.0).valid);
        assert!(!validate_quantity(5e9).valid);
    }

    #[test]
    fn test_parse_input() {
        assert_eq!(parse_input(" 1500 "), 1500.0);
        assert_eq!(parse_input("2,5"), 2.5);
        assert!(parse_input("abc").is_nan());
        assert!(parse_input("").is_nan());
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(99.0), "R$\u{a0}99,00");
        assert_eq!(format_currency(1234.5), "R$\u{a0}1.234,50");
        assert_eq!(format_currency(1234567.891), "R$\u{a0}1.234.567,89");
        assert_eq!(format_currency(0.0), "R$\u{a0}0,00");
        assert_eq!(format_currency(-3.5), "-R$\u{a0}3,50");
        assert_eq!(format_currency(f64::NAN), "R$\u{a0}0,00");
    }
}
