// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::CostRecord;
use crate::store::{self, CostStore};
use crate::utils::{maybe_print_json, parse_decimal, pretty_table};
use anyhow::{Context, Result};
use serde_json::json;
use std::path::Path;

pub fn handle(store: &CostStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => list(store, sub),
        Some(("set", sub)) => set(store, sub),
        Some(("remove", sub)) => remove(store, sub),
        Some(("import", sub)) => import(store, sub),
        Some(("export", sub)) => export(store, sub),
        _ => Ok(()),
    }
}

fn list(store: &CostStore, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let load = store.load_all()?;
    if load.dropped > 0 {
        eprintln!(
            "Skipped {} unusable row(s) in {}",
            load.dropped,
            store.path().display()
        );
    }
    if maybe_print_json(json_flag, jsonl_flag, &load.records)? {
        return Ok(());
    }
    let data = load
        .records
        .iter()
        .map(|r| {
            vec![
                r.model_code.clone(),
                r.barcode.clone(),
                format!("{:.2}", r.purchase_price_excl_tax),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Model", "Barcode", "Purchase (excl. VAT)"], data)
    );
    Ok(())
}

fn set(store: &CostStore, sub: &clap::ArgMatches) -> Result<()> {
    let model = sub.get_one::<String>("model").unwrap().trim().to_string();
    let barcode = sub.get_one::<String>("barcode").unwrap();
    let raw_price = sub.get_one::<String>("price").unwrap();
    let price = parse_decimal(raw_price)
        .with_context(|| format!("Invalid --price '{}'", raw_price))?;
    let record = CostRecord {
        model_code: model,
        barcode: barcode.clone(),
        purchase_price_excl_tax: price,
    };
    store.upsert(record)?;
    println!("Saved cost for barcode {}", barcode.trim());
    Ok(())
}

fn remove(store: &CostStore, sub: &clap::ArgMatches) -> Result<()> {
    let barcode = sub.get_one::<String>("barcode").unwrap();
    if store.remove(barcode)? {
        println!("Removed barcode {}", barcode.trim());
    } else {
        println!("No cost record for barcode {}", barcode.trim());
    }
    Ok(())
}

fn import(store: &CostStore, sub: &clap::ArgMatches) -> Result<()> {
    let path = sub.get_one::<String>("path").unwrap().trim();
    let incoming = store::read_cost_sheet(Path::new(path))?;
    let mut current = store.load_all()?.records;
    let mut added = 0usize;
    let mut updated = 0usize;
    for rec in incoming.records {
        match current.iter_mut().find(|r| r.barcode == rec.barcode) {
            Some(existing) => {
                *existing = rec;
                updated += 1;
            }
            None => {
                current.push(rec);
                added += 1;
            }
        }
    }
    store.save_all(&current)?;
    println!(
        "Imported cost sheet {}: {} added, {} updated, {} skipped",
        path, added, updated, incoming.dropped
    );
    Ok(())
}

fn export(store: &CostStore, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();
    let load = store.load_all()?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)
                .with_context(|| format!("Write CSV {}", out))?;
            wtr.write_record(["model_code", "barcode", "purchase_price_excl_tax"])?;
            for rec in &load.records {
                wtr.write_record([
                    rec.model_code.as_str(),
                    rec.barcode.as_str(),
                    &rec.purchase_price_excl_tax.to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let mut items = Vec::new();
            for rec in &load.records {
                items.push(json!({
                    "model_code": rec.model_code,
                    "barcode": rec.barcode,
                    "purchase_price_excl_tax": rec.purchase_price_excl_tax,
                }));
            }
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        _ => {
            eprintln!("Unknown format: {} (use csv|json)", fmt);
            return Ok(());
        }
    }
    println!("Exported {} cost record(s) to {}", load.records.len(), out);
    Ok(())
}
