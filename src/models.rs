// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One product's cost basis in the reference table, keyed by barcode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRecord {
    pub model_code: String,
    pub barcode: String,
    pub purchase_price_excl_tax: Decimal,
}

/// One sold unit group parsed from a marketplace order export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub order_id: String,
    pub order_date: NaiveDate,
    pub platform: String,
    pub quantity: u32,
    pub amount: Decimal, // unit sale price, VAT included
    pub barcode: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxStatus {
    Inclusive,
    Exclusive,
}

/// Everything needed to price one unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostStructure {
    pub purchase_price: Decimal,
    pub purchase_tax_status: TaxStatus,
    pub tax_rate_pct: Decimal,
    pub commission_rate_pct: Decimal,
    pub shipping_cost: Decimal,
    pub advertising_cost: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PricingTarget {
    Margin(Decimal),
    Profit(Decimal),
}

impl fmt::Display for PricingTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PricingTarget::Margin(m) => write!(f, "margin {}%", m),
            PricingTarget::Profit(p) => write!(f, "profit {}", p),
        }
    }
}

/// Forward calculation result for a single unit at a given sale price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfitBreakdown {
    pub sale_price_incl: Decimal,
    pub sale_price_excl: Decimal,
    pub commission: Decimal,
    pub net_owed_tax: Decimal,
    pub total_cost: Decimal,
    pub net_profit: Decimal,
    pub margin_pct: Decimal,
}

/// Solver output: the required sale price plus the forward breakdown at
/// that price. `breakdown` is None when the solved price is not positive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceQuote {
    pub sale_price_incl: Decimal,
    pub sale_price_excl: Decimal,
    pub breakdown: Option<ProfitBreakdown>,
}

/// Per model-code rollup produced by the batch engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSummary {
    pub model_code: String,
    pub units: u64,
    pub avg_sale_price_incl: Decimal,
    pub purchase_price_excl: Decimal,
    pub shipping_per_unit: Decimal,
    pub advertising_per_unit: Decimal,
    pub commission_per_unit: Decimal,
    pub net_owed_tax_per_unit: Decimal,
    pub unit_profit: Decimal,
    pub total_profit: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationResult {
    pub models: Vec<ModelSummary>,
    pub portfolio_profit: Decimal,
    pub matched_lines: usize,
    pub total_units: u64,
    pub unmatched: Vec<OrderLine>,
}

/// Inputs to the listing-title composer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TitleSpec {
    pub category: String,
    pub model_code: String,
    pub collar: String,
    pub sleeve: String,
    pub pattern: Option<String>,
    pub pockets: bool,
    pub fabric: Option<String>,
}

/// Persisted defaults for the pricing commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub commission_rate_pct: Decimal,
    pub shipping_cost: Decimal,
    pub advertising_cost: Decimal,
    pub tax_rate_pct: Decimal,
    pub target_margin_pct: Decimal,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            commission_rate_pct: Decimal::new(215, 1),
            shipping_cost: Decimal::new(80, 0),
            advertising_cost: Decimal::new(30, 0),
            tax_rate_pct: Decimal::new(10, 0),
            target_margin_pct: Decimal::new(20, 0),
        }
    }
}
