// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store;
use crate::utils::{maybe_print_json, parse_decimal, pretty_table};
use anyhow::{Context, Result, anyhow};
use std::path::Path;

pub fn handle(path: &Path, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => show(path, sub),
        Some(("set", sub)) => set(path, sub),
        _ => Ok(()),
    }
}

fn show(path: &Path, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let settings = store::load_settings(path)?;
    if maybe_print_json(json_flag, jsonl_flag, &settings)? {
        return Ok(());
    }
    let data = vec![
        vec!["commission".into(), format!("{}", settings.commission_rate_pct)],
        vec!["shipping".into(), format!("{}", settings.shipping_cost)],
        vec!["ads".into(), format!("{}", settings.advertising_cost)],
        vec!["vat".into(), format!("{}", settings.tax_rate_pct)],
        vec!["margin".into(), format!("{}", settings.target_margin_pct)],
    ];
    println!("{}", pretty_table(&["Key", "Value"], data));
    Ok(())
}

fn set(path: &Path, sub: &clap::ArgMatches) -> Result<()> {
    let key = sub.get_one::<String>("key").unwrap().to_lowercase();
    let raw = sub.get_one::<String>("value").unwrap();
    let value = parse_decimal(raw).with_context(|| format!("Invalid value '{}'", raw))?;

    let mut settings = store::load_settings(path)?;
    match key.as_str() {
        "commission" => settings.commission_rate_pct = value,
        "shipping" => settings.shipping_cost = value,
        "ads" => settings.advertising_cost = value,
        "vat" => settings.tax_rate_pct = value,
        "margin" => settings.target_margin_pct = value,
        other => {
            return Err(anyhow!(
                "Unknown config key '{}' (use commission, shipping, ads, vat or margin)",
                other
            ));
        }
    }
    store::save_settings(path, &settings)?;
    println!("{} set to {}", key, value);
    Ok(())
}
