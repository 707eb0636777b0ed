// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{CostStructure, PricingTarget, ProfitBreakdown, Settings, TaxStatus};
use crate::pricing;
use crate::utils::{maybe_print_json, parse_decimal, pretty_table};
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde_json::json;

pub fn handle(settings: &Settings, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("solve", sub)) => solve(settings, sub),
        Some(("check", sub)) => check(settings, sub),
        _ => Ok(()),
    }
}

fn required_decimal(sub: &clap::ArgMatches, name: &str) -> Result<Decimal> {
    let raw = sub.get_one::<String>(name).unwrap();
    parse_decimal(raw).with_context(|| format!("Invalid --{} '{}'", name, raw))
}

fn decimal_or(sub: &clap::ArgMatches, name: &str, fallback: Decimal) -> Result<Decimal> {
    match sub.get_one::<String>(name) {
        Some(raw) => parse_decimal(raw).with_context(|| format!("Invalid --{} '{}'", name, raw)),
        None => Ok(fallback),
    }
}

fn cost_structure(settings: &Settings, sub: &clap::ArgMatches) -> Result<CostStructure> {
    let purchase_tax_status = if sub.get_flag("cost-includes-vat") {
        TaxStatus::Inclusive
    } else {
        TaxStatus::Exclusive
    };
    Ok(CostStructure {
        purchase_price: required_decimal(sub, "cost")?,
        purchase_tax_status,
        tax_rate_pct: decimal_or(sub, "vat", settings.tax_rate_pct)?,
        commission_rate_pct: decimal_or(sub, "commission", settings.commission_rate_pct)?,
        shipping_cost: decimal_or(sub, "shipping", settings.shipping_cost)?,
        advertising_cost: decimal_or(sub, "ads", settings.advertising_cost)?,
    })
}

fn breakdown_rows(b: &ProfitBreakdown) -> Vec<Vec<String>> {
    vec![
        vec!["Sale price (incl. VAT)".into(), format!("{:.2}", b.sale_price_incl)],
        vec!["Sale price (excl. VAT)".into(), format!("{:.2}", b.sale_price_excl)],
        vec!["Commission".into(), format!("{:.2}", b.commission)],
        vec!["Net owed VAT".into(), format!("{:.2}", b.net_owed_tax)],
        vec!["Total cost".into(), format!("{:.2}", b.total_cost)],
        vec!["Net profit".into(), format!("{:.2}", b.net_profit)],
        vec!["Margin %".into(), format!("{:.2}", b.margin_pct)],
    ]
}

fn solve(settings: &Settings, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let costs = cost_structure(settings, sub)?;
    let target = match (sub.get_one::<String>("margin"), sub.get_one::<String>("profit")) {
        (Some(raw), _) => PricingTarget::Margin(
            parse_decimal(raw).with_context(|| format!("Invalid --margin '{}'", raw))?,
        ),
        (None, Some(raw)) => PricingTarget::Profit(
            parse_decimal(raw).with_context(|| format!("Invalid --profit '{}'", raw))?,
        ),
        (None, None) => PricingTarget::Margin(settings.target_margin_pct),
    };

    let quote = pricing::solve_price(&target, &costs)?;
    if maybe_print_json(json_flag, jsonl_flag, &quote)? {
        return Ok(());
    }
    println!("Target: {}", target);
    match &quote.breakdown {
        Some(b) => println!("{}", pretty_table(&["Metric", "Value"], breakdown_rows(b))),
        None => {
            println!("Sale price (incl. VAT): {:.2}", quote.sale_price_incl);
            println!("Sale price (excl. VAT): {:.2}", quote.sale_price_excl);
        }
    }
    Ok(())
}

fn check(settings: &Settings, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let costs = cost_structure(settings, sub)?;
    let sale = required_decimal(sub, "sale")?;

    match pricing::compute_profit(sale, &costs)? {
        Some(b) => {
            if maybe_print_json(json_flag, jsonl_flag, &b)? {
                return Ok(());
            }
            println!("{}", pretty_table(&["Metric", "Value"], breakdown_rows(&b)));
        }
        None => {
            let note = json!({ "sale_price_incl": sale, "applicable": false });
            if maybe_print_json(json_flag, jsonl_flag, &note)? {
                return Ok(());
            }
            println!("Sale price {} is not positive; nothing to evaluate.", sale);
        }
    }
    Ok(())
}
