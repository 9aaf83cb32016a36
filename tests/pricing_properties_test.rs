//! Property tests for quote pricing and input validation

use prado_store::pricing::{
    compute_order_summary, compute_piece_total, format_currency, round_half_up, validate_length,
    validate_quantity,
};
use prado_store::types::{PieceDimensions, MAX_LENGTH_MM, MIN_LENGTH_MM};
use proptest::prelude::*;

fn cents(value: f64) -> i64 {
    (value * 100.0).round() as i64
}

proptest! {
    #[test]
    fn piece_total_non_decreasing_in_length(
        a in MIN_LENGTH_MM..=MAX_LENGTH_MM,
        b in MIN_LENGTH_MM..=MAX_LENGTH_MM,
        qty in 1u32..500,
        price in 0.0f64..1000.0,
    ) {
        let (short, long) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(compute_piece_total(short, qty, price, 0.0) <= compute_piece_total(long, qty, price, 0.0));
    }

    #[test]
    fn piece_total_non_decreasing_in_quantity(
        length in MIN_LENGTH_MM..=MAX_LENGTH_MM,
        q1 in 1u32..1000,
        q2 in 1u32..1000,
        price in 0.0f64..1000.0,
        surcharge in 0.0f64..50.0,
    ) {
        let (low, high) = if q1 <= q2 { (q1, q2) } else { (q2, q1) };
        prop_assert!(
            compute_piece_total(length, low, price, surcharge)
                <= compute_piece_total(length, high, price, surcharge)
        );
    }

    #[test]
    fn piece_total_has_at_most_two_decimals(
        length in MIN_LENGTH_MM..=MAX_LENGTH_MM,
        qty in 1u32..100,
        price in 0.0f64..1000.0,
    ) {
        let total = compute_piece_total(length, qty, price, 0.0);
        prop_assert!((total * 100.0 - (total * 100.0).round()).abs() < 1e-6);
    }

    #[test]
    fn lengths_inside_bounds_are_valid(length in MIN_LENGTH_MM..=MAX_LENGTH_MM) {
        prop_assert!(validate_length(f64::from(length), None, None).valid);
    }

    #[test]
    fn lengths_outside_bounds_are_invalid(excess in 1u32..100_000) {
        prop_assert!(!validate_length(f64::from(MAX_LENGTH_MM + excess), None, None).valid);
        prop_assert!(!validate_length(-f64::from(excess), None, None).valid);
    }

    #[test]
    fn fractional_quantities_are_invalid(whole in 0u32..1000, frac in 0.01f64..0.99) {
        prop_assert!(!validate_quantity(f64::from(whole) + frac).valid);
    }

    #[test]
    fn summary_value_matches_sum_of_lines_within_rounding(
        lines in proptest::collection::vec((MIN_LENGTH_MM..=MAX_LENGTH_MM, 1u32..20), 1..20),
    ) {
        let pieces: Vec<PieceDimensions> = lines.iter().map(|(l, q)| PieceDimensions::new(*l, *q)).collect();
        let summary = compute_order_summary(&pieces, 99.0);
        let line_sum: i64 = pieces
            .iter()
            .map(|p| cents(compute_piece_total(p.length_mm, p.quantity, 99.0, 0.0)))
            .sum();
        // each rounded line can move the sum by at most half a cent
        let tolerance = pieces.len() as i64;
        prop_assert!((cents(summary.total_value) - line_sum).abs() <= tolerance);
    }

    #[test]
    fn currency_always_has_symbol_and_cents(value in 0.0f64..10_000_000.0) {
        let text = format_currency(value);
        prop_assert!(text.starts_with("R$\u{a0}"), "missing currency prefix in {:?}", text);
        let (_, frac) = text.rsplit_once(',').unwrap();
        prop_assert_eq!(frac.len(), 2);
    }
}

#[test]
fn test_reference_quotes() {
    assert_eq!(compute_piece_total(1000, 1, 99.0, 0.0), 99.0);
    assert_eq!(compute_piece_total(500, 2, 99.0, 0.0), 99.0);

    let summary = compute_order_summary(
        &[PieceDimensions::new(1000, 2), PieceDimensions::new(500, 1)],
        99.0,
    );
    assert_eq!(summary.total_meters, 2.5);
    assert_eq!(summary.total_value, 247.5);
}

#[test]
fn test_half_up_boundaries() {
    assert_eq!(round_half_up(1.005, 2), 1.01);
    assert_eq!(round_half_up(2.675, 2), 2.68);
    assert_eq!(round_half_up(0.0005, 3), 0.001);
    assert_eq!(round_half_up(1.0004, 3), 1.0);

    // 1 mm at 5.00/m is 0.005 per piece
    assert_eq!(compute_piece_total(1, 1, 5.0, 0.0), 0.01);
    let summary = compute_order_summary(&[PieceDimensions::new(1, 1)], 5.0);
    assert_eq!(summary.total_meters, 0.001);
    assert_eq!(summary.total_value, 0.01);
}

#[test]
fn test_validation_examples() {
    assert!(!validate_length(0.0, None, None).valid);
    assert!(!validate_length(3001.0, None, None).valid);
    assert!(validate_length(1500.0, None, None).valid);
    assert!(!validate_length(f64::NAN, None, None).valid);
    assert!(!validate_length(150.0, Some(200), Some(800)).valid);

    assert!(!validate_quantity(0.0).valid);
    assert!(!validate_quantity(2.5).valid);
    assert!(validate_quantity(3.0).valid);
}
