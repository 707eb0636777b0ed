// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{CostStructure, PriceQuote, PricingTarget, ProfitBreakdown, TaxStatus};
use rust_decimal::Decimal;
use thiserror::Error;

/// Calculation failures. Every divisor is checked before dividing; a wrong
/// number is never returned in place of an error.
#[derive(Debug, Error)]
pub enum PricingError {
    #[error("Invalid tax rate {rate}%: the VAT divisor becomes zero")]
    InvalidRate { rate: Decimal },
    #[error(
        "Unreachable target ({target}) at commission {commission_rate_pct}% and VAT {tax_rate_pct}%: lower the target or the rates"
    )]
    InfeasibleTarget {
        target: PricingTarget,
        commission_rate_pct: Decimal,
        tax_rate_pct: Decimal,
    },
    #[error("Nothing to analyze: {context}")]
    EmptyDataset { context: String },
}

/// Strip VAT out of a VAT-inclusive amount. The rate is defined relative
/// to the exclusive base, so this is a division, not a subtraction.
pub fn exclusive_from_inclusive(
    amount_incl: Decimal,
    tax_rate_pct: Decimal,
) -> Result<Decimal, PricingError> {
    let divisor = Decimal::ONE + tax_rate_pct / Decimal::ONE_HUNDRED;
    if divisor.is_zero() {
        return Err(PricingError::InvalidRate { rate: tax_rate_pct });
    }
    Ok(amount_incl / divisor)
}

pub fn tax_portion(amount_incl: Decimal, tax_rate_pct: Decimal) -> Result<Decimal, PricingError> {
    Ok(amount_incl - exclusive_from_inclusive(amount_incl, tax_rate_pct)?)
}

/// Marketplace commission is always charged on the VAT-inclusive price.
pub fn commission_amount(sale_price_incl: Decimal, commission_rate_pct: Decimal) -> Decimal {
    sale_price_incl * commission_rate_pct / Decimal::ONE_HUNDRED
}

/// VAT collected on the sale minus VAT already paid on the purchase.
/// Negative means a net tax credit; it flows into profit unchanged.
pub fn net_owed_tax(
    sale_price_incl: Decimal,
    purchase_price_excl: Decimal,
    tax_rate_pct: Decimal,
) -> Result<Decimal, PricingError> {
    let collected = tax_portion(sale_price_incl, tax_rate_pct)?;
    Ok(collected - purchase_price_excl * tax_rate_pct / Decimal::ONE_HUNDRED)
}

fn purchase_price_excl(cs: &CostStructure) -> Result<Decimal, PricingError> {
    match cs.purchase_tax_status {
        TaxStatus::Inclusive => exclusive_from_inclusive(cs.purchase_price, cs.tax_rate_pct),
        TaxStatus::Exclusive => Ok(cs.purchase_price),
    }
}

/// Evaluate one unit sold at `sale_price_incl`. Returns `Ok(None)` when the
/// sale price is not positive: there is no profit to speak of at a free or
/// negative price, and callers must not read that as "zero profit".
pub fn compute_profit(
    sale_price_incl: Decimal,
    cs: &CostStructure,
) -> Result<Option<ProfitBreakdown>, PricingError> {
    if sale_price_incl <= Decimal::ZERO {
        return Ok(None);
    }
    let purchase_excl = purchase_price_excl(cs)?;
    let sale_price_excl = exclusive_from_inclusive(sale_price_incl, cs.tax_rate_pct)?;
    let commission = commission_amount(sale_price_incl, cs.commission_rate_pct);
    let owed_tax = net_owed_tax(sale_price_incl, purchase_excl, cs.tax_rate_pct)?;
    let total_cost =
        purchase_excl + cs.shipping_cost + cs.advertising_cost + commission + owed_tax;
    let net_profit = sale_price_excl - total_cost;
    let margin_pct = if sale_price_excl > Decimal::ZERO {
        net_profit / sale_price_excl * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };
    Ok(Some(ProfitBreakdown {
        sale_price_incl,
        sale_price_excl,
        commission,
        net_owed_tax: owed_tax,
        total_cost,
        net_profit,
        margin_pct,
    }))
}

/// Solve for the VAT-inclusive sale price that hits `target`. Closed-form
/// inverse of `compute_profit`; round-tripping through both reproduces the
/// target.
///
/// With v = VAT rate, k = commission rate (both as fractions) and
/// F = purchase + shipping + advertising, the profit identity
/// `profit = sale_excl * (1 - (1+v)k - v) - (F - purchase_tax)` rearranges
/// to a single division whose denominator must stay positive for a finite,
/// positive price to exist.
pub fn solve_price(
    target: &PricingTarget,
    cs: &CostStructure,
) -> Result<PriceQuote, PricingError> {
    let v = cs.tax_rate_pct / Decimal::ONE_HUNDRED;
    let k = cs.commission_rate_pct / Decimal::ONE_HUNDRED;
    let gross_up = Decimal::ONE + v;
    if gross_up.is_zero() {
        return Err(PricingError::InvalidRate {
            rate: cs.tax_rate_pct,
        });
    }
    let purchase_excl = purchase_price_excl(cs)?;
    let purchase_tax = purchase_excl * v;
    let fixed_costs = purchase_excl + cs.shipping_cost + cs.advertising_cost;

    let (numerator, denominator) = match target {
        PricingTarget::Margin(m) => (
            fixed_costs - purchase_tax,
            Decimal::ONE - m / Decimal::ONE_HUNDRED - gross_up * k - v,
        ),
        PricingTarget::Profit(p) => (
            fixed_costs - purchase_tax + p,
            Decimal::ONE - gross_up * k - v,
        ),
    };
    let infeasible = || PricingError::InfeasibleTarget {
        target: target.clone(),
        commission_rate_pct: cs.commission_rate_pct,
        tax_rate_pct: cs.tax_rate_pct,
    };
    if denominator <= Decimal::ZERO {
        return Err(infeasible());
    }

    // A vanishingly small denominator can push the quotient past Decimal's
    // range; treat that the same as a non-positive denominator.
    let sale_price_excl = numerator.checked_div(denominator).ok_or_else(infeasible)?;
    let sale_price_incl = sale_price_excl.checked_mul(gross_up).ok_or_else(infeasible)?;
    let breakdown = compute_profit(sale_price_incl, cs)?;
    Ok(PriceQuote {
        sale_price_incl,
        sale_price_excl,
        breakdown,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn sample_costs() -> CostStructure {
        CostStructure {
            purchase_price: dec("270"),
            purchase_tax_status: TaxStatus::Exclusive,
            tax_rate_pct: dec("10"),
            commission_rate_pct: dec("21.5"),
            shipping_cost: dec("80"),
            advertising_cost: dec("30"),
        }
    }

    fn close(a: Decimal, b: Decimal) -> bool {
        (a - b).abs() < dec("0.000001")
    }

    #[test]
    fn vat_conversion_divides_not_subtracts() {
        let excl = exclusive_from_inclusive(dec("110"), dec("10")).unwrap();
        assert_eq!(excl, dec("100"));
        let tax = tax_portion(dec("110"), dec("10")).unwrap();
        assert_eq!(tax, dec("10"));
    }

    #[test]
    fn degenerate_tax_rate_is_rejected() {
        let err = exclusive_from_inclusive(dec("100"), dec("-100")).unwrap_err();
        assert!(matches!(err, PricingError::InvalidRate { .. }));
        assert!(err.to_string().contains("-100"));
    }

    #[test]
    fn net_owed_tax_can_be_a_credit() {
        // Purchase VAT exceeds the VAT collected on a cheap sale.
        let owed = net_owed_tax(dec("100"), dec("200"), dec("10")).unwrap();
        assert!(owed < Decimal::ZERO);
    }

    #[test]
    fn forward_calculation_matches_hand_worked_example() {
        let cs = sample_costs();
        let b = compute_profit(dec("837.7562028047464940668824164"), &cs)
            .unwrap()
            .unwrap();
        assert_eq!(b.net_profit.round_dp(2), dec("152.32"));
        assert_eq!(b.margin_pct.round_dp(2), dec("20.00"));
        assert_eq!(b.commission.round_dp(2), dec("180.12"));
        assert_eq!(b.net_owed_tax.round_dp(2), dec("49.16"));
        assert_eq!(b.total_cost.round_dp(2), dec("609.28"));
    }

    #[test]
    fn inclusive_purchase_price_is_normalized_first() {
        let mut cs = sample_costs();
        cs.purchase_price = dec("297"); // 270 + 10% VAT
        cs.purchase_tax_status = TaxStatus::Inclusive;
        let incl = compute_profit(dec("900"), &cs).unwrap().unwrap();
        let base = compute_profit(dec("900"), &sample_costs()).unwrap().unwrap();
        assert!(close(incl.net_profit, base.net_profit));
    }

    #[test]
    fn non_positive_sale_price_is_not_applicable() {
        let cs = sample_costs();
        assert!(compute_profit(Decimal::ZERO, &cs).unwrap().is_none());
        assert!(compute_profit(dec("-5"), &cs).unwrap().is_none());
    }

    #[test]
    fn margin_of_zero_when_exclusive_price_not_positive() {
        let mut cs = sample_costs();
        cs.tax_rate_pct = dec("-150"); // exclusive base goes negative
        let b = compute_profit(dec("100"), &cs).unwrap().unwrap();
        assert!(b.sale_price_excl < Decimal::ZERO);
        assert_eq!(b.margin_pct, Decimal::ZERO);
    }

    #[test]
    fn margin_target_round_trips() {
        let cs = sample_costs();
        for m in ["5", "20", "35.5", "60"] {
            let quote = solve_price(&PricingTarget::Margin(dec(m)), &cs).unwrap();
            let b = compute_profit(quote.sale_price_incl, &cs).unwrap().unwrap();
            assert!(close(b.margin_pct, dec(m)), "margin {} drifted to {}", m, b.margin_pct);
        }
    }

    #[test]
    fn profit_target_round_trips() {
        let cs = sample_costs();
        for p in ["0", "150", "512.75"] {
            let quote = solve_price(&PricingTarget::Profit(dec(p)), &cs).unwrap();
            let b = compute_profit(quote.sale_price_incl, &cs).unwrap().unwrap();
            assert!(close(b.net_profit, dec(p)), "profit {} drifted to {}", p, b.net_profit);
        }
    }

    #[test]
    fn twenty_percent_margin_scenario() {
        let cs = sample_costs();
        let quote = solve_price(&PricingTarget::Margin(dec("20")), &cs).unwrap();
        assert_eq!(quote.sale_price_incl.round_dp(2), dec("837.76"));
        let b = quote.breakdown.unwrap();
        assert!(b.net_profit > Decimal::ZERO);
        assert!(close(b.margin_pct.round_dp(6), dec("20")));
    }

    #[test]
    fn profit_target_of_150_lands_on_expected_price() {
        let cs = sample_costs();
        let quote = solve_price(&PricingTarget::Profit(dec("150")), &cs).unwrap();
        assert_eq!(quote.sale_price_incl.round_dp(2), dec("833.91"));
    }

    #[test]
    fn zero_margin_and_zero_profit_solve_to_the_same_price() {
        let cs = sample_costs();
        let m0 = solve_price(&PricingTarget::Margin(Decimal::ZERO), &cs).unwrap();
        let p0 = solve_price(&PricingTarget::Profit(Decimal::ZERO), &cs).unwrap();
        assert!(close(m0.sale_price_incl, p0.sale_price_incl));
    }

    #[test]
    fn profit_is_strictly_increasing_in_sale_price() {
        let cs = sample_costs();
        let mut last = compute_profit(dec("100"), &cs).unwrap().unwrap().net_profit;
        for price in ["250", "400", "612.50", "900", "1500"] {
            let next = compute_profit(dec(price), &cs).unwrap().unwrap().net_profit;
            assert!(next > last, "profit not increasing at {}", price);
            last = next;
        }
    }

    #[test]
    fn ceiling_margin_target_is_infeasible() {
        let cs = sample_costs();
        let err = solve_price(&PricingTarget::Margin(dec("99.9")), &cs).unwrap_err();
        assert!(matches!(err, PricingError::InfeasibleTarget { .. }));
        assert!(err.to_string().contains("21.5"));
        assert!(err.to_string().contains("margin 99.9%"));
    }

    #[test]
    fn crushing_commission_makes_profit_targets_infeasible() {
        let mut cs = sample_costs();
        cs.commission_rate_pct = dec("85");
        let err = solve_price(&PricingTarget::Profit(dec("10")), &cs).unwrap_err();
        assert!(matches!(err, PricingError::InfeasibleTarget { .. }));
    }

    #[test]
    fn near_ceiling_margins_error_instead_of_overflowing() {
        // At these rates the ceiling margin is 66.35%. A hair below it the
        // denominator shrinks to 1e-28 and the solved price no longer fits
        // in a Decimal; the first value overflows the division, the second
        // survives it and overflows the VAT gross-up.
        let cs = sample_costs();
        for m in [
            "66.34999999999999999999999999",
            "66.34999999999999999999999954",
        ] {
            let err = solve_price(&PricingTarget::Margin(dec(m)), &cs).unwrap_err();
            assert!(
                matches!(err, PricingError::InfeasibleTarget { .. }),
                "margin {} did not report infeasible",
                m
            );
        }
    }

    #[test]
    fn deeply_negative_profit_target_yields_no_breakdown() {
        let mut cs = sample_costs();
        cs.purchase_price = dec("10");
        cs.shipping_cost = Decimal::ZERO;
        cs.advertising_cost = Decimal::ZERO;
        let quote = solve_price(&PricingTarget::Profit(dec("-1000")), &cs).unwrap();
        assert!(quote.sale_price_incl < Decimal::ZERO);
        assert!(quote.breakdown.is_none());
    }
}
