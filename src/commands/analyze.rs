// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::analysis::{self, AdPolicy, AnalysisParams, ShippingPolicy};
use crate::models::Settings;
use crate::orders;
use crate::pricing::PricingError;
use crate::store::CostStore;
use crate::utils::{maybe_print_json, parse_date, parse_decimal, pretty_table};
use anyhow::{Context, Result};
use serde_json::json;
use std::path::Path;

pub fn handle(store: &CostStore, settings: &Settings, m: &clap::ArgMatches) -> Result<()> {
    let json_flag = m.get_flag("json");
    let jsonl_flag = m.get_flag("jsonl");

    let path = m.get_one::<String>("orders").unwrap().trim();
    let ingest = orders::read_order_file(Path::new(path))?;
    if ingest.dropped > 0 {
        eprintln!("Skipped {} unusable order row(s) in {}", ingest.dropped, path);
    }
    let from = m.get_one::<String>("from").map(|s| parse_date(s)).transpose()?;
    let to = m.get_one::<String>("to").map(|s| parse_date(s)).transpose()?;
    let lines = orders::filter_date_range(ingest.lines, from, to);

    let shipping = match (
        m.get_one::<String>("shipping-invoice"),
        m.get_one::<String>("shipping-per-order"),
    ) {
        (Some(raw), _) => ShippingPolicy::InvoiceTotal(
            parse_decimal(raw).with_context(|| format!("Invalid --shipping-invoice '{}'", raw))?,
        ),
        (None, Some(raw)) => ShippingPolicy::PerOrder(
            parse_decimal(raw).with_context(|| format!("Invalid --shipping-per-order '{}'", raw))?,
        ),
        (None, None) => ShippingPolicy::PerOrder(settings.shipping_cost),
    };
    let advertising = match (
        m.get_one::<String>("ad-budget"),
        m.get_one::<String>("ad-per-unit"),
    ) {
        (Some(raw), _) => AdPolicy::PlatformBudget {
            platform: m.get_one::<String>("ad-platform").unwrap().clone(),
            budget: parse_decimal(raw)
                .with_context(|| format!("Invalid --ad-budget '{}'", raw))?,
        },
        (None, Some(raw)) => AdPolicy::FlatPerUnit(
            parse_decimal(raw).with_context(|| format!("Invalid --ad-per-unit '{}'", raw))?,
        ),
        (None, None) => AdPolicy::FlatPerUnit(settings.advertising_cost),
    };
    let params = AnalysisParams {
        tax_rate_pct: match m.get_one::<String>("vat") {
            Some(raw) => {
                parse_decimal(raw).with_context(|| format!("Invalid --vat '{}'", raw))?
            }
            None => settings.tax_rate_pct,
        },
        commission_rate_pct: match m.get_one::<String>("commission") {
            Some(raw) => {
                parse_decimal(raw).with_context(|| format!("Invalid --commission '{}'", raw))?
            }
            None => settings.commission_rate_pct,
        },
        shipping,
        advertising,
    };

    let load = store.load_all()?;
    if load.dropped > 0 {
        eprintln!(
            "Skipped {} unusable cost row(s) in {}",
            load.dropped,
            store.path().display()
        );
    }

    let result = match analysis::aggregate(&lines, &load.records, &params) {
        Ok(result) => result,
        Err(err @ PricingError::EmptyDataset { .. }) => {
            if !maybe_print_json(json_flag, jsonl_flag, &json!({ "warning": err.to_string() }))? {
                println!("{}", err);
            }
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    if maybe_print_json(json_flag, jsonl_flag, &result)? {
        return Ok(());
    }

    let data = result
        .models
        .iter()
        .map(|s| {
            vec![
                s.model_code.clone(),
                s.units.to_string(),
                format!("{:.2}", s.avg_sale_price_incl),
                format!("{:.2}", s.purchase_price_excl),
                format!("{:.2}", s.shipping_per_unit),
                format!("{:.2}", s.advertising_per_unit),
                format!("{:.2}", s.unit_profit),
                format!("{:.2}", s.total_profit),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &[
                "Model",
                "Units",
                "Avg Price",
                "Purchase",
                "Ship/u",
                "Ads/u",
                "Unit Profit",
                "Total Profit",
            ],
            data
        )
    );
    println!(
        "Matched {} line(s), {} unit(s); portfolio net profit {:.2}",
        result.matched_lines, result.total_units, result.portfolio_profit
    );

    if !result.unmatched.is_empty() {
        println!("{} line(s) had no cost record:", result.unmatched.len());
        let data = result
            .unmatched
            .iter()
            .map(|l| {
                vec![
                    l.order_id.clone(),
                    l.order_date.to_string(),
                    l.platform.clone(),
                    l.quantity.to_string(),
                    format!("{:.2}", l.amount),
                    l.barcode.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Order", "Date", "Platform", "Qty", "Amount", "Barcode"],
                data
            )
        );
    }
    Ok(())
}
