// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{
    AggregationResult, CostRecord, CostStructure, ModelSummary, OrderLine, TaxStatus,
};
use crate::pricing::{self, PricingError};
use crate::utils::normalize_barcode;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap, HashSet};

/// How the shipping spend is spread across sold units: either an aggregate
/// carrier invoice for the whole period, or a configured cost per order.
#[derive(Debug, Clone)]
pub enum ShippingPolicy {
    InvoiceTotal(Decimal),
    PerOrder(Decimal),
}

/// How advertising is spread: an aggregate budget across the units sold on
/// one advertised platform, or a flat per-unit cost on every platform.
#[derive(Debug, Clone)]
pub enum AdPolicy {
    PlatformBudget { platform: String, budget: Decimal },
    FlatPerUnit(Decimal),
}

#[derive(Debug, Clone)]
pub struct AnalysisParams {
    pub tax_rate_pct: Decimal,
    pub commission_rate_pct: Decimal,
    pub shipping: ShippingPolicy,
    pub advertising: AdPolicy,
}

/// Join order lines to the cost table by normalized barcode, allocate
/// shared costs, and roll profit up per model code.
///
/// Lines without a cost record are carried in `unmatched` for backfill and
/// contribute nothing to any total. Shared-cost allocations divide over
/// matched units only, so every allocated unit of cost lands in a computed
/// profit figure.
pub fn aggregate(
    lines: &[OrderLine],
    costs: &[CostRecord],
    params: &AnalysisParams,
) -> Result<AggregationResult, PricingError> {
    if lines.is_empty() {
        return Err(PricingError::EmptyDataset {
            context: "the order set is empty".into(),
        });
    }

    // Last write wins when the cost table repeats a barcode.
    let mut cost_by_barcode: HashMap<String, &CostRecord> = HashMap::new();
    for rec in costs {
        cost_by_barcode.insert(normalize_barcode(&rec.barcode), rec);
    }

    let mut matched: Vec<(&OrderLine, &CostRecord)> = Vec::new();
    let mut unmatched: Vec<OrderLine> = Vec::new();
    for line in lines {
        match cost_by_barcode.get(&normalize_barcode(&line.barcode)) {
            Some(rec) => matched.push((line, rec)),
            None => unmatched.push(line.clone()),
        }
    }

    let total_units: u64 = matched.iter().map(|(l, _)| u64::from(l.quantity)).sum();
    let shipping_per_unit = if total_units == 0 {
        Decimal::ZERO
    } else {
        let units = Decimal::from(total_units);
        match &params.shipping {
            ShippingPolicy::InvoiceTotal(total) => *total / units,
            ShippingPolicy::PerOrder(per_order) => {
                let orders: HashSet<&str> =
                    matched.iter().map(|(l, _)| l.order_id.as_str()).collect();
                *per_order * Decimal::from(orders.len() as u64) / units
            }
        }
    };

    let advertised_units: u64 = match &params.advertising {
        AdPolicy::PlatformBudget { platform, .. } => matched
            .iter()
            .filter(|(l, _)| l.platform.trim().eq_ignore_ascii_case(platform.trim()))
            .map(|(l, _)| u64::from(l.quantity))
            .sum(),
        AdPolicy::FlatPerUnit(_) => 0,
    };
    let ad_per_unit_for = |line: &OrderLine| -> Decimal {
        match &params.advertising {
            AdPolicy::FlatPerUnit(cost) => *cost,
            AdPolicy::PlatformBudget { platform, budget } => {
                if advertised_units == 0
                    || !line.platform.trim().eq_ignore_ascii_case(platform.trim())
                {
                    Decimal::ZERO
                } else {
                    *budget / Decimal::from(advertised_units)
                }
            }
        }
    };

    struct ModelAccum<'a> {
        units: u64,
        revenue: Decimal,
        ad_total: Decimal,
        cost: &'a CostRecord, // first matched line's record sets the price
    }
    let mut groups: BTreeMap<&str, ModelAccum<'_>> = BTreeMap::new();
    for (line, rec) in &matched {
        let qty = Decimal::from(line.quantity);
        let acc = groups
            .entry(rec.model_code.as_str())
            .or_insert_with(|| ModelAccum {
                units: 0,
                revenue: Decimal::ZERO,
                ad_total: Decimal::ZERO,
                cost: rec,
            });
        acc.units += u64::from(line.quantity);
        acc.revenue += line.amount * qty;
        acc.ad_total += ad_per_unit_for(line) * qty;
    }

    let mut models = Vec::with_capacity(groups.len());
    let mut portfolio_profit = Decimal::ZERO;
    for (model_code, acc) in groups {
        let units = Decimal::from(acc.units);
        let (avg_sale_price_incl, advertising_per_unit) = if acc.units == 0 {
            (Decimal::ZERO, Decimal::ZERO)
        } else {
            (acc.revenue / units, acc.ad_total / units)
        };
        let cs = CostStructure {
            purchase_price: acc.cost.purchase_price_excl_tax,
            purchase_tax_status: TaxStatus::Exclusive,
            tax_rate_pct: params.tax_rate_pct,
            commission_rate_pct: params.commission_rate_pct,
            shipping_cost: shipping_per_unit,
            advertising_cost: advertising_per_unit,
        };
        let summary = match pricing::compute_profit(avg_sale_price_incl, &cs)? {
            Some(b) => ModelSummary {
                model_code: model_code.to_string(),
                units: acc.units,
                avg_sale_price_incl,
                purchase_price_excl: acc.cost.purchase_price_excl_tax,
                shipping_per_unit,
                advertising_per_unit,
                commission_per_unit: b.commission,
                net_owed_tax_per_unit: b.net_owed_tax,
                unit_profit: b.net_profit,
                total_profit: b.net_profit * units,
            },
            // Average price not positive: nothing sensible to report.
            None => ModelSummary {
                model_code: model_code.to_string(),
                units: acc.units,
                avg_sale_price_incl,
                purchase_price_excl: acc.cost.purchase_price_excl_tax,
                shipping_per_unit,
                advertising_per_unit,
                commission_per_unit: Decimal::ZERO,
                net_owed_tax_per_unit: Decimal::ZERO,
                unit_profit: Decimal::ZERO,
                total_profit: Decimal::ZERO,
            },
        };
        portfolio_profit += summary.total_profit;
        models.push(summary);
    }

    Ok(AggregationResult {
        models,
        portfolio_profit,
        matched_lines: matched.len(),
        total_units,
        unmatched,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn cost(model: &str, barcode: &str, price: &str) -> CostRecord {
        CostRecord {
            model_code: model.to_string(),
            barcode: barcode.to_string(),
            purchase_price_excl_tax: dec(price),
        }
    }

    fn line(order: &str, day: u32, platform: &str, qty: u32, amount: &str, barcode: &str) -> OrderLine {
        OrderLine {
            order_id: order.to_string(),
            order_date: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
            platform: platform.to_string(),
            quantity: qty,
            amount: dec(amount),
            barcode: barcode.to_string(),
        }
    }

    fn fixture_costs() -> Vec<CostRecord> {
        vec![
            cost("ELB-320315", "869001", "270"),
            cost("ELB-320315", "869002", "280"),
            cost("TSH-100", "869100", "100"),
        ]
    }

    fn fixture_lines() -> Vec<OrderLine> {
        vec![
            line("o1", 1, "Trendyol", 2, "900", "869001.0"),
            line("o2", 2, "Trendyol", 1, "950", "869002"),
            line("o3", 3, "Hepsiburada", 1, "500", "869100"),
            line("o4", 4, "Trendyol", 1, "700", "999999"),
        ]
    }

    fn params(shipping: ShippingPolicy, advertising: AdPolicy) -> AnalysisParams {
        AnalysisParams {
            tax_rate_pct: dec("10"),
            commission_rate_pct: dec("21.5"),
            shipping,
            advertising,
        }
    }

    #[test]
    fn partition_is_complete_and_disjoint() {
        let lines = fixture_lines();
        let result = aggregate(
            &lines,
            &fixture_costs(),
            &params(ShippingPolicy::PerOrder(dec("80")), AdPolicy::FlatPerUnit(dec("30"))),
        )
        .unwrap();
        assert_eq!(result.matched_lines + result.unmatched.len(), lines.len());
        assert_eq!(result.unmatched.len(), 1);
        assert_eq!(result.unmatched[0].barcode, "999999");
        assert_eq!(result.total_units, 4);
    }

    #[test]
    fn barcodes_are_normalized_on_both_sides_before_matching() {
        let costs = vec![cost("ELB-320315", "869001.0", "270")];
        let lines = vec![line("o1", 1, "Trendyol", 1, "900", "  869001  ")];
        let result = aggregate(
            &lines,
            &costs,
            &params(ShippingPolicy::PerOrder(dec("80")), AdPolicy::FlatPerUnit(dec("30"))),
        )
        .unwrap();
        assert_eq!(result.matched_lines, 1);
        assert!(result.unmatched.is_empty());
    }

    #[test]
    fn per_order_shipping_spreads_over_matched_units() {
        let result = aggregate(
            &fixture_lines(),
            &fixture_costs(),
            &params(ShippingPolicy::PerOrder(dec("80")), AdPolicy::FlatPerUnit(dec("30"))),
        )
        .unwrap();
        // 3 distinct matched orders * 80 over 4 units
        for m in &result.models {
            assert_eq!(m.shipping_per_unit, dec("60"));
        }
    }

    #[test]
    fn invoice_total_shipping_divides_by_units() {
        let result = aggregate(
            &fixture_lines(),
            &fixture_costs(),
            &params(
                ShippingPolicy::InvoiceTotal(dec("400")),
                AdPolicy::FlatPerUnit(dec("30")),
            ),
        )
        .unwrap();
        for m in &result.models {
            assert_eq!(m.shipping_per_unit, dec("100"));
        }
    }

    #[test]
    fn zero_matched_units_never_divides() {
        let costs = vec![cost("ELB-320315", "869001", "270")];
        let lines = vec![line("o1", 1, "Trendyol", 0, "900", "869001")];
        let result = aggregate(
            &lines,
            &costs,
            &params(
                ShippingPolicy::InvoiceTotal(dec("500")),
                AdPolicy::PlatformBudget {
                    platform: "Trendyol".into(),
                    budget: dec("300"),
                },
            ),
        )
        .unwrap();
        assert_eq!(result.total_units, 0);
        assert_eq!(result.models.len(), 1);
        assert_eq!(result.models[0].shipping_per_unit, Decimal::ZERO);
        assert_eq!(result.models[0].total_profit, Decimal::ZERO);
        assert_eq!(result.portfolio_profit, Decimal::ZERO);
    }

    #[test]
    fn platform_budget_only_reaches_the_advertised_platform() {
        let result = aggregate(
            &fixture_lines(),
            &fixture_costs(),
            &params(
                ShippingPolicy::PerOrder(dec("80")),
                AdPolicy::PlatformBudget {
                    platform: "trendyol".into(),
                    budget: dec("300"),
                },
            ),
        )
        .unwrap();
        let elb = result.models.iter().find(|m| m.model_code == "ELB-320315").unwrap();
        let tsh = result.models.iter().find(|m| m.model_code == "TSH-100").unwrap();
        // 300 over the 3 Trendyol units; Hepsiburada pays nothing
        assert_eq!(elb.advertising_per_unit, dec("100"));
        assert_eq!(tsh.advertising_per_unit, Decimal::ZERO);
    }

    #[test]
    fn first_seen_purchase_price_wins_inside_a_model() {
        let result = aggregate(
            &fixture_lines(),
            &fixture_costs(),
            &params(ShippingPolicy::PerOrder(dec("80")), AdPolicy::FlatPerUnit(dec("30"))),
        )
        .unwrap();
        let elb = result.models.iter().find(|m| m.model_code == "ELB-320315").unwrap();
        assert_eq!(elb.purchase_price_excl, dec("270"));
        assert_eq!(elb.units, 3);
        assert_eq!(elb.avg_sale_price_incl.round_dp(2), dec("916.67"));
    }

    #[test]
    fn rollup_matches_the_single_unit_calculator() {
        let result = aggregate(
            &fixture_lines(),
            &fixture_costs(),
            &params(ShippingPolicy::PerOrder(dec("80")), AdPolicy::FlatPerUnit(dec("30"))),
        )
        .unwrap();
        let elb = result.models.iter().find(|m| m.model_code == "ELB-320315").unwrap();
        assert_eq!(elb.unit_profit.round_dp(2), dec("219.92"));
        assert_eq!(elb.total_profit.round_dp(2), dec("659.75"));
        let tsh = result.models.iter().find(|m| m.model_code == "TSH-100").unwrap();
        assert_eq!(tsh.unit_profit.round_dp(2), dec("121.59"));
        assert_eq!(result.portfolio_profit.round_dp(2), dec("781.34"));

        let cs = CostStructure {
            purchase_price: elb.purchase_price_excl,
            purchase_tax_status: TaxStatus::Exclusive,
            tax_rate_pct: dec("10"),
            commission_rate_pct: dec("21.5"),
            shipping_cost: elb.shipping_per_unit,
            advertising_cost: elb.advertising_per_unit,
        };
        let b = pricing::compute_profit(elb.avg_sale_price_incl, &cs)
            .unwrap()
            .unwrap();
        assert_eq!(b.net_profit, elb.unit_profit);
    }

    #[test]
    fn empty_order_set_is_a_typed_condition() {
        let err = aggregate(
            &[],
            &fixture_costs(),
            &params(ShippingPolicy::PerOrder(dec("80")), AdPolicy::FlatPerUnit(dec("30"))),
        )
        .unwrap_err();
        assert!(matches!(err, PricingError::EmptyDataset { .. }));
    }

    #[test]
    fn fully_unmatched_input_still_reports() {
        let lines = vec![line("o1", 1, "Trendyol", 2, "900", "111111")];
        let result = aggregate(
            &lines,
            &fixture_costs(),
            &params(ShippingPolicy::PerOrder(dec("80")), AdPolicy::FlatPerUnit(dec("30"))),
        )
        .unwrap();
        assert!(result.models.is_empty());
        assert_eq!(result.matched_lines, 0);
        assert_eq!(result.unmatched.len(), 1);
        assert_eq!(result.portfolio_profit, Decimal::ZERO);
    }
}
