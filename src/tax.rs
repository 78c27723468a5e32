//! GST breakdown from tax-inclusive totals.

use crate::error::ParseError;
use crate::model::TaxCalculationResult;
use rust_decimal::Decimal;

/// Rounds to two decimal places half-to-even (banker's rounding), the
/// default strategy of `round_dp`. A midpoint value rounds to the nearest
/// even cent, avoiding systematic bias in financial sums.
pub fn round_half_even(value: Decimal) -> Decimal {
    value.round_dp(2)
}

/// Computes the tax breakdown of a tax-inclusive amount.
///
/// `exclusive = round2(inclusive / (1 + rate))` and
/// `tax = round2(inclusive - exclusive)`, each rounded independently so that
/// `exclusive + tax == inclusive` holds exactly. Pure and deterministic.
pub fn calculate_from_inclusive(
    tax_inclusive: Decimal,
    tax_rate: Decimal,
) -> Result<TaxCalculationResult, ParseError> {
    if tax_inclusive < Decimal::ZERO {
        return Err(ParseError::InvalidRequest {
            detail: format!("tax-inclusive amount must be non-negative, got {tax_inclusive}"),
        });
    }
    if tax_rate < Decimal::ZERO || tax_rate >= Decimal::ONE {
        return Err(ParseError::InvalidRequest {
            detail: format!("tax rate must be at least 0 and below 1, got {tax_rate}"),
        });
    }

    let tax_exclusive = round_half_even(tax_inclusive / (Decimal::ONE + tax_rate));
    let sales_tax = round_half_even(tax_inclusive - tax_exclusive);

    Ok(TaxCalculationResult {
        tax_exclusive,
        sales_tax,
        tax_inclusive,
        tax_rate,
    })
}
